use crate::code_generator::asm::{
    AsmLine, BinaryInstruction, ConditionCode, GeneratedCode, Instr, InstrOperand, InstrType,
    MemoryReference, MemoryReferenceImmediate, Register, Scale, UnaryInstruction, UnaryNotScaled,
};
use crate::code_generator::def_libary::Directives;
use std::fmt::{Display, Formatter};

impl Display for GeneratedCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.pre_defined
            .iter()
            .try_for_each(|asm| writeln!(f, "{}", asm))?;
        self.codes
            .iter()
            .try_for_each(|asm| writeln!(f, "{}", asm))
    }
}

impl Display for AsmLine {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AsmLine::Directive(dir) => write!(f, "{}", dir),
            AsmLine::Instruction(ins) => write!(f, "    {}", ins),
        }
    }
}

impl Display for Directives {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Directives::GlobalDeclare(s) => write!(f, "global {}", s),
            Directives::Extern(s) => write!(f, "extern {}", s),
            Directives::UninitialisedData => write!(f, "section .bss"),
            Directives::AssemblerText => write!(f, "section .text"),
            Directives::Reserve(label, bytes) => write!(f, "{}: resb {}", label, bytes),
            Directives::Label(label_str) => write!(f, "{}:", label_str),
            Directives::Comment(comment) => write!(f, "    ; {}", comment),
        }
    }
}

impl Display for Scale {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Scale::Byte => write!(f, "BYTE"),
            Scale::Quad => write!(f, "QWORD"),
        }
    }
}

impl Display for ConditionCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionCode::EQ => write!(f, "e"),
            ConditionCode::NEQ => write!(f, "ne"),
            ConditionCode::LT => write!(f, "l"),
            ConditionCode::LTE => write!(f, "le"),
            ConditionCode::GT => write!(f, "g"),
            ConditionCode::GTE => write!(f, "ge"),
        }
    }
}

impl Display for InstrType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrType::Push => write!(f, "push"),
            InstrType::Pop => write!(f, "pop"),
            InstrType::Neg => write!(f, "neg"),
            InstrType::Mov => write!(f, "mov"),
            InstrType::MovZx => write!(f, "movzx"),
            InstrType::Lea => write!(f, "lea"),
            InstrType::Add => write!(f, "add"),
            InstrType::Sub => write!(f, "sub"),
            InstrType::IMul => write!(f, "imul"),
            InstrType::IDiv => write!(f, "idiv"),
            InstrType::Cmp => write!(f, "cmp"),
            InstrType::Call => write!(f, "call"),
            InstrType::Jump(None) => write!(f, "jmp"),
            InstrType::Jump(Some(cc)) => write!(f, "j{}", cc),
            InstrType::Set(cc) => write!(f, "set{}", cc),
            InstrType::Cqo => write!(f, "cqo"),
            InstrType::Syscall => write!(f, "syscall"),
        }
    }
}

impl Display for Instr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Instr::UnaryControl(UnaryNotScaled {
                instr_type,
                operand,
            }) => write!(f, "{} {}", instr_type, operand),
            Instr::UnaryInstr(UnaryInstruction {
                instr_type,
                scale,
                operand,
            }) => write!(f, "{} {}", instr_type, Scaled(operand, *scale)),
            Instr::BinaryInstr(BinaryInstruction {
                instr_type: InstrType::Lea,
                src_operand,
                dst_operand,
                ..
            }) => write!(f, "lea {}, {}", dst_operand, src_operand),
            // Intel order: destination first
            Instr::BinaryInstr(BinaryInstruction {
                instr_type,
                src_scale,
                src_operand,
                dst_scale,
                dst_operand,
            }) => write!(
                f,
                "{} {}, {}",
                instr_type,
                Scaled(dst_operand, dst_scale.unwrap_or(*src_scale)),
                Scaled(src_operand, *src_scale)
            ),
            Instr::NullaryInstr(instr_type) => write!(f, "{}", instr_type),
            Instr::Ret => write!(f, "ret"),
        }
    }
}

// memory operands carry their size keyword, everything else prints bare
struct Scaled<'a>(&'a InstrOperand, Scale);

impl Display for Scaled<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            InstrOperand::Reference(_) => write!(f, "{} {}", self.1, self.0),
            operand => write!(f, "{}", operand),
        }
    }
}

impl Display for InstrOperand {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            InstrOperand::Reg(reg) => write!(f, "{}", reg),
            InstrOperand::RegVariant(reg, scale) => write!(f, "{}", sized_register(*reg, *scale)),
            InstrOperand::Imm(immediate) => write!(f, "{}", immediate),
            InstrOperand::LabelRef(label) => write!(f, "{}", label),
            InstrOperand::Reference(reference) => write!(f, "{}", reference),
        }
    }
}

impl Display for MemoryReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut terms: Vec<String> = Vec::new();
        if let Some(MemoryReferenceImmediate::LabelledImm(label, _)) = &self.imm {
            terms.push(label.clone());
        }
        if let Some(base) = self.base_reg {
            terms.push(base.to_string());
        }
        if let Some(index) = self.shift_unit_reg {
            match self.shift_cnt {
                Some(scale) => terms.push(format!("{} * {}", index, scale)),
                None => terms.push(index.to_string()),
            }
        }

        let offset = match self.imm {
            Some(MemoryReferenceImmediate::OffsetImm(offset))
            | Some(MemoryReferenceImmediate::LabelledImm(_, offset)) => offset,
            None => 0,
        };

        write!(f, "[{}", terms.join(" + "))?;
        match offset {
            0 if !terms.is_empty() => {}
            o if o < 0 => write!(f, " - {}", -(o as i64))?,
            o if terms.is_empty() => write!(f, "{}", o)?,
            o => write!(f, " + {}", o)?,
        }
        write!(f, "]")
    }
}

impl Display for Register {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Register::Rax => write!(f, "rax"),
            Register::Rcx => write!(f, "rcx"),
            Register::Rdx => write!(f, "rdx"),
            Register::Rsi => write!(f, "rsi"),
            Register::Rdi => write!(f, "rdi"),
            Register::Rbp => write!(f, "rbp"),
            Register::Rsp => write!(f, "rsp"),
            Register::R8 => write!(f, "r8"),
            Register::R9 => write!(f, "r9"),
        }
    }
}

// low byte of a general purpose register
fn sized_register(reg: Register, scale: Scale) -> String {
    match (scale, reg) {
        (Scale::Quad, reg) => reg.to_string(),
        (Scale::Byte, Register::Rax) => "al".to_string(),
        (Scale::Byte, Register::Rcx) => "cl".to_string(),
        (Scale::Byte, Register::Rdx) => "dl".to_string(),
        (Scale::Byte, Register::Rsi) => "sil".to_string(),
        (Scale::Byte, Register::Rdi) => "dil".to_string(),
        (Scale::Byte, Register::Rbp) => "bpl".to_string(),
        (Scale::Byte, Register::Rsp) => "spl".to_string(),
        (Scale::Byte, reg) => format!("{}b", reg),
    }
}
