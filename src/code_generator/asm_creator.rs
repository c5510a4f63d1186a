use crate::code_generator::asm::AsmLine::{Directive, Instruction};
use crate::code_generator::asm::Register::Rsp;
use crate::code_generator::asm::{
    BinaryInstruction, ConditionCode, GeneratedCode, Instr, InstrOperand, InstrType, Pushed,
    Register, Scale, UnaryInstruction, UnaryNotScaled,
};
use crate::code_generator::def_libary::Directives;
use crate::symbol_table::WORD_SIZE;

// push <operand>
pub fn push(code: &mut GeneratedCode, operand: InstrOperand) -> Pushed {
    code.codes
        .push(Instruction(Instr::UnaryInstr(UnaryInstruction::new_unary(
            InstrType::Push,
            Scale::default(),
            operand,
        ))));
    Pushed(())
}

pub fn push_register(code: &mut GeneratedCode, reg: Register) -> Pushed {
    push(code, InstrOperand::Reg(reg))
}

// pop <operand>
pub fn pop(code: &mut GeneratedCode, operand: InstrOperand, value: Pushed) {
    let Pushed(()) = value;
    code.codes
        .push(Instruction(Instr::UnaryInstr(UnaryInstruction::new_unary(
            InstrType::Pop,
            Scale::default(),
            operand,
        ))));
}

pub fn pop_register(code: &mut GeneratedCode, reg: Register, value: Pushed) {
    pop(code, InstrOperand::Reg(reg), value);
}

// add rsp, 8 * n : drop words nobody reads
pub fn discard(code: &mut GeneratedCode, values: Vec<Pushed>) {
    if values.is_empty() {
        return;
    }
    let bytes = (values.len() * WORD_SIZE) as i64;
    values.into_iter().for_each(|Pushed(())| {});
    binary(code, InstrType::Add, InstrOperand::Imm(bytes), InstrOperand::Reg(Rsp));
}

// <instr> <dst>, <src>
pub fn binary(code: &mut GeneratedCode, instr_type: InstrType, src: InstrOperand, dst: InstrOperand) {
    code.codes.push(Instruction(Instr::BinaryInstr(
        BinaryInstruction::new_single_scale(instr_type, Scale::default(), src, dst),
    )));
}

pub fn mov_registers(code: &mut GeneratedCode, src: Register, dst: Register) {
    binary(code, InstrType::Mov, InstrOperand::Reg(src), InstrOperand::Reg(dst));
}

pub fn mov_immediate(code: &mut GeneratedCode, value: i64, dst: Register) {
    binary(code, InstrType::Mov, InstrOperand::Imm(value), InstrOperand::Reg(dst));
}

// <instr> <operand>
pub fn unary(code: &mut GeneratedCode, instr_type: InstrType, operand: InstrOperand) {
    code.codes
        .push(Instruction(Instr::UnaryInstr(UnaryInstruction::new_unary(
            instr_type,
            Scale::default(),
            operand,
        ))));
}

pub fn nullary(code: &mut GeneratedCode, instr_type: InstrType) {
    code.codes.push(Instruction(Instr::NullaryInstr(instr_type)));
}

// cmp <reg>, 0
pub fn compare_zero(code: &mut GeneratedCode, reg: Register) {
    binary(code, InstrType::Cmp, InstrOperand::Imm(0), InstrOperand::Reg(reg));
}

pub fn jump_on_condition(code: &mut GeneratedCode, condition_code: ConditionCode, label: &str) {
    code.codes
        .push(Instruction(Instr::UnaryControl(UnaryNotScaled::new(
            InstrType::Jump(Some(condition_code)),
            InstrOperand::LabelRef(String::from(label)),
        ))));
}

pub fn jump(code: &mut GeneratedCode, label: &str) {
    code.codes
        .push(Instruction(Instr::UnaryControl(UnaryNotScaled::new(
            InstrType::Jump(None),
            InstrOperand::LabelRef(String::from(label)),
        ))));
}

pub fn call(code: &mut GeneratedCode, label: &str) {
    code.codes
        .push(Instruction(Instr::UnaryControl(UnaryNotScaled::new(
            InstrType::Call,
            InstrOperand::LabelRef(String::from(label)),
        ))));
}

pub fn label(code: &mut GeneratedCode, label: String) {
    code.codes.push(Directive(Directives::Label(label)));
}

pub fn comment(code: &mut GeneratedCode, text: impl Into<String>) {
    if code.emit_comments {
        code.codes.push(Directive(Directives::Comment(text.into())));
    }
}

// rbp chain in, frame reserved
pub fn prologue(code: &mut GeneratedCode, frame_size: usize) {
    let Pushed(()) = push_register(code, Register::Rbp);
    mov_registers(code, Rsp, Register::Rbp);
    if frame_size > 0 {
        binary(
            code,
            InstrType::Sub,
            InstrOperand::Imm(frame_size as i64),
            InstrOperand::Reg(Rsp),
        );
    }
}

// the frame goes regardless of what is left on the operand stack
pub fn epilogue(code: &mut GeneratedCode) {
    mov_registers(code, Register::Rbp, Rsp);
    code.codes
        .push(Instruction(Instr::UnaryInstr(UnaryInstruction::new_unary(
            InstrType::Pop,
            Scale::default(),
            InstrOperand::Reg(Register::Rbp),
        ))));
    code.codes.push(Instruction(Instr::Ret));
}
