//! Static walk over generated lines that tracks how many words sit on the
//! machine stack. Every path is followed, so a label reached twice has to be
//! reached at the same depth.

use crate::code_generator::asm::AsmLine::{Directive, Instruction};
use crate::code_generator::asm::{
    AsmLine, BinaryInstruction, Instr, InstrOperand, InstrType, Register, UnaryInstruction,
    UnaryNotScaled,
};
use crate::code_generator::def_libary::Directives;
use crate::symbol_table::WORD_SIZE;
use std::collections::HashMap;

// depth right after `mov rbp, rsp` and once locals are reserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Frame {
    base: i64,
    top: i64,
}

#[derive(Debug, Clone, Copy)]
struct Path {
    pc: usize,
    depth: i64,
    frame: Option<Frame>,
}

enum Flow<'l> {
    Next,
    Jump(&'l str),
    Branch(&'l str),
    Stop,
}

/// Depth left at the end of `lines`, 0 when every path returns or exits.
///
/// Global labels are entered at depth 0. A `ret` must find the stack as the
/// call left it and the epilogue must find no operand words above the locals.
pub fn stack_depth(lines: &[AsmLine]) -> Result<i64, String> {
    let labels: HashMap<&str, usize> = lines
        .iter()
        .enumerate()
        .filter_map(|(pc, line)| match line {
            Directive(Directives::Label(name)) => Some((name.as_str(), pc)),
            _ => None,
        })
        .collect();

    let mut pending = vec![Path {
        pc: 0,
        depth: 0,
        frame: None,
    }];
    pending.extend(
        labels
            .iter()
            .filter(|(name, pc)| !name.starts_with('.') && **pc != 0)
            .map(|(_, pc)| Path {
                pc: *pc,
                depth: 0,
                frame: None,
            }),
    );

    let mut seen: Vec<Option<i64>> = vec![None; lines.len() + 1];
    while let Some(mut path) = pending.pop() {
        loop {
            if path.depth < 0 {
                return Err(format!("line {}: stack underflow", path.pc));
            }
            if let Some(known) = seen[path.pc] {
                if known != path.depth {
                    return Err(format!(
                        "line {}: reached with depth {} and {}",
                        path.pc, known, path.depth
                    ));
                }
                break;
            }
            seen[path.pc] = Some(path.depth);
            if path.pc == lines.len() {
                break;
            }

            let (target, branches) = match step(&lines[path.pc], &mut path)? {
                Flow::Next => {
                    path.pc += 1;
                    continue;
                }
                Flow::Stop => break,
                Flow::Jump(label) => (label, false),
                Flow::Branch(label) => (label, true),
            };
            let target_pc = *labels
                .get(target)
                .ok_or_else(|| format!("line {}: jump to unknown label {}", path.pc, target))?;
            if branches {
                pending.push(Path {
                    pc: path.pc + 1,
                    ..path
                });
            }
            path.pc = target_pc;
        }
    }

    Ok(seen[lines.len()].unwrap_or(0))
}

fn words(pc: usize, bytes: i64) -> Result<i64, String> {
    if bytes % WORD_SIZE as i64 != 0 {
        return Err(format!("line {}: rsp moved by {} bytes", pc, bytes));
    }
    Ok(bytes / WORD_SIZE as i64)
}

fn step<'l>(line: &'l AsmLine, path: &mut Path) -> Result<Flow<'l>, String> {
    let instr = match line {
        Directive(_) => return Ok(Flow::Next),
        Instruction(instr) => instr,
    };

    match instr {
        Instr::UnaryInstr(UnaryInstruction {
            instr_type: InstrType::Push,
            ..
        }) => path.depth += 1,
        Instr::UnaryInstr(UnaryInstruction {
            instr_type: InstrType::Pop,
            ..
        }) => path.depth -= 1,
        Instr::UnaryControl(UnaryNotScaled {
            instr_type: InstrType::Jump(condition),
            operand: InstrOperand::LabelRef(label),
        }) => {
            return Ok(match condition {
                Some(_) => Flow::Branch(label),
                None => Flow::Jump(label),
            })
        }
        Instr::BinaryInstr(BinaryInstruction {
            instr_type,
            src_operand,
            dst_operand,
            ..
        }) => stack_write(path, instr_type, src_operand, dst_operand)?,
        Instr::Ret => {
            if path.depth != 0 {
                return Err(format!("line {}: ret with {} words left", path.pc, path.depth));
            }
            return Ok(Flow::Stop);
        }
        // only ever the exit call
        Instr::NullaryInstr(InstrType::Syscall) => return Ok(Flow::Stop),
        _ => {}
    }
    Ok(Flow::Next)
}

fn stack_write(
    path: &mut Path,
    instr_type: &InstrType,
    src: &InstrOperand,
    dst: &InstrOperand,
) -> Result<(), String> {
    use InstrOperand::{Imm, Reg};
    use Register::{Rbp, Rsp};

    match (instr_type, src, dst) {
        (InstrType::Mov, Reg(Rsp), Reg(Rbp)) => {
            path.frame = Some(Frame {
                base: path.depth,
                top: path.depth,
            })
        }
        (InstrType::Mov, Reg(Rbp), Reg(Rsp)) => {
            let frame = path
                .frame
                .ok_or_else(|| format!("line {}: epilogue without a frame", path.pc))?;
            if path.depth != frame.top {
                return Err(format!(
                    "line {}: {} operand words left at epilogue",
                    path.pc,
                    path.depth - frame.top
                ));
            }
            path.depth = frame.base;
        }
        (InstrType::Add, Imm(bytes), Reg(Rsp)) => path.depth -= words(path.pc, *bytes)?,
        (InstrType::Sub, Imm(bytes), Reg(Rsp)) => {
            let before = path.depth;
            path.depth += words(path.pc, *bytes)?;
            if let Some(frame) = path.frame.as_mut() {
                // locals are reserved right after the prologue
                if frame.top == before {
                    frame.top = path.depth;
                }
            }
        }
        (_, _, Reg(Rsp)) => return Err(format!("line {}: untracked write to rsp", path.pc)),
        _ => {}
    }
    Ok(())
}
