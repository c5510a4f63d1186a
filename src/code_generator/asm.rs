use crate::code_generator::def_libary::Directives;

pub type Label = String;

#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum Register {
    Rax,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
    R8,
    R9,
}

pub const RESULT_REG: Register = Register::Rax;

// right operand of binary operators
pub const AUX_REG: Register = Register::Rcx;

// array base addresses
pub const ADDR_REG: Register = Register::Rdx;

// System V order: the n-th argument travels in ARG_REGS[n]
pub const ARG_REGS: [Register; 6] = [
    Register::Rdi,
    Register::Rsi,
    Register::Rdx,
    Register::Rcx,
    Register::R8,
    Register::R9,
];

// operand width; every slot is a quad, bytes only appear in `setcc`/`movzx`
#[derive(PartialEq, Debug, Clone, Copy, Hash, Eq, Default)]
pub enum Scale {
    Byte,
    #[default]
    Quad,
}

// Memory Addressing Mode:
// [Imm + R[base] + R[index] * s]
// Imm is a plain offset, or a label plus an offset for the global block

#[derive(PartialEq, Debug, Clone)]
pub enum MemoryReferenceImmediate {
    OffsetImm(i32),
    LabelledImm(Label, i32),
}

#[derive(PartialEq, Debug, Clone, Default)]
pub struct MemoryReference {
    pub imm: Option<MemoryReferenceImmediate>,
    // rb
    pub base_reg: Option<Register>,
    // ri
    pub shift_unit_reg: Option<Register>,
    // s
    pub shift_cnt: Option<i32>,
}

impl MemoryReference {
    // [rbp + offset]
    pub fn frame(offset: i32) -> Self {
        Self::default()
            .with_base_reg(Register::Rbp)
            .with_offset(MemoryReferenceImmediate::OffsetImm(offset))
    }

    // [label + offset]
    pub fn labelled(label: &str, offset: i32) -> Self {
        Self::default().with_offset(MemoryReferenceImmediate::LabelledImm(label.to_string(), offset))
    }

    pub fn with_offset(self, offset_immediate: MemoryReferenceImmediate) -> Self {
        Self {
            imm: Some(offset_immediate),
            ..self
        }
    }

    pub fn with_base_reg(self, base_reg: Register) -> Self {
        Self {
            base_reg: Some(base_reg),
            ..self
        }
    }

    pub fn with_shift_unit_reg(self, reg: Register) -> Self {
        Self {
            shift_unit_reg: Some(reg),
            ..self
        }
    }

    pub fn with_shift_cnt(self, shift_cnt: i32) -> Self {
        Self {
            shift_cnt: Some(shift_cnt),
            ..self
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum InstrOperand {
    Reg(Register),
    RegVariant(Register, Scale),
    Imm(i64),
    LabelRef(Label),
    Reference(MemoryReference),
}

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ConditionCode {
    EQ,
    NEQ,
    LT,
    LTE,
    GT,
    GTE,
}

#[derive(PartialEq, Debug, Clone)]
pub enum InstrType {
    Push,
    Pop,
    Neg,
    Mov,
    MovZx,
    Lea,
    Add,
    Sub,
    IMul,
    IDiv,
    Cmp,
    Call,
    Jump(Option<ConditionCode>),
    Set(ConditionCode),
    Cqo,
    Syscall,
}

#[derive(PartialEq, Debug, Clone)]
pub struct UnaryNotScaled {
    pub instr_type: InstrType,
    pub operand: InstrOperand,
}

impl UnaryNotScaled {
    pub fn new(instr_type: InstrType, operand: InstrOperand) -> Self {
        Self {
            instr_type,
            operand,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct UnaryInstruction {
    pub instr_type: InstrType,
    pub scale: Scale,
    pub operand: InstrOperand,
}

impl UnaryInstruction {
    pub fn new_unary(instr_type: InstrType, scale: Scale, operand: InstrOperand) -> Self {
        Self {
            instr_type,
            scale,
            operand,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub struct BinaryInstruction {
    pub instr_type: InstrType,
    pub src_scale: Scale,
    pub src_operand: InstrOperand,
    pub dst_scale: Option<Scale>,
    pub dst_operand: InstrOperand,
}

impl BinaryInstruction {
    pub fn new_single_scale(
        instr_type: InstrType,
        scale: Scale,
        src_operand: InstrOperand,
        dst_operand: InstrOperand,
    ) -> Self {
        Self {
            instr_type,
            src_scale: scale,
            src_operand,
            dst_scale: None,
            dst_operand,
        }
    }

    pub fn new_double_scale(
        instr_type: InstrType,
        src_scale: Scale,
        src_operand: InstrOperand,
        dst_scale: Scale,
        dst_operand: InstrOperand,
    ) -> Self {
        Self {
            instr_type,
            src_scale,
            src_operand,
            dst_scale: Some(dst_scale),
            dst_operand,
        }
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum Instr {
    UnaryControl(UnaryNotScaled),
    UnaryInstr(UnaryInstruction),
    BinaryInstr(BinaryInstruction),
    // cqo, syscall
    NullaryInstr(InstrType),
    Ret,
}

#[derive(PartialEq, Debug, Clone)]
pub enum AsmLine {
    Directive(Directives),
    Instruction(Instr),
}

/// Proof that one word was left on the operand stack.
/// Made only by `asm_creator::push` and spent only by `pop`/`discard`.
#[must_use = "a pushed value has to be popped, discarded or handed to the caller"]
#[derive(PartialEq, Eq, Debug)]
pub struct Pushed(pub(super) ());

impl Pushed {
    // the two arms of a branch each left their own word, at the same depth
    pub fn merge(self, other: Pushed) -> Pushed {
        let Pushed(()) = other;
        self
    }
}

#[derive(PartialEq, Debug, Default)]
pub struct GeneratedCode {
    // header: globals, externs, sections, entry point
    pub pre_defined: Vec<AsmLine>,
    pub codes: Vec<AsmLine>,
    next_label: usize,
    pub emit_comments: bool,
}

impl GeneratedCode {
    pub fn new(emit_comments: bool) -> Self {
        Self {
            emit_comments,
            ..Self::default()
        }
    }

    // one fresh number per construct; every label of the construct shares it
    pub fn get_control_label(&mut self) -> usize {
        let id = self.next_label;
        self.next_label += 1;
        id
    }

    pub fn labels_used(&self) -> usize {
        self.next_label
    }
}

pub fn control_label(kind: &str, id: usize) -> Label {
    format!(".{}_{}", kind, id)
}
