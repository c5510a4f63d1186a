use crate::ast::{BinaryOperator, Label, Node};
use crate::code_generator::asm::{
    control_label, BinaryInstruction, ConditionCode, GeneratedCode, Instr, InstrOperand,
    InstrType, MemoryReference, Pushed, Register, Scale, ADDR_REG, ARG_REGS, AUX_REG, RESULT_REG,
};
use crate::code_generator::asm::AsmLine::Instruction;
use crate::code_generator::asm_creator::{
    binary, call, compare_zero, discard, jump, jump_on_condition, label, nullary, pop_register,
    push, push_register, unary,
};
use crate::code_generator::def_libary::GLOBAL_VARS_LABEL;
use crate::code_generator::x86_generate::{Call, Expr, Generator};
use crate::symbol_table::{Location, ScopeInfo, Symbol, WORD_SIZE};

impl Generator for Expr<'_> {
    type Input = ();
    type Output = Pushed;

    // leaves exactly one word on the stack
    fn generate(&self, scope: &ScopeInfo, code: &mut GeneratedCode, _aux: ()) -> Self::Output {
        let node = self.0;
        match node.label {
            Label::Num => push(code, InstrOperand::Imm(node.num() as i64)),
            Label::Character => push(code, InstrOperand::Imm(node.byte() as i64)),
            Label::Ident if node.is_call() => {
                Call(node).generate(scope, code, ());
                push_register(code, RESULT_REG)
            }
            Label::Ident => generate_expr_ident(scope, code, node),
            Label::ArrayLR => {
                let address = element_address(scope, code, node);
                pop_register(code, RESULT_REG, address);
                push(
                    code,
                    InstrOperand::Reference(MemoryReference::default().with_base_reg(RESULT_REG)),
                )
            }
            Label::Addsub if node.children.len() == 1 => {
                let operand = Expr(node.child(0)).generate(scope, code, ());
                match node.byte() {
                    b'+' => operand,
                    b'-' => {
                        pop_register(code, RESULT_REG, operand);
                        unary(code, InstrType::Neg, InstrOperand::Reg(RESULT_REG));
                        push_register(code, RESULT_REG)
                    }
                    op => unreachable!("unknown unary operator '{}'", op as char),
                }
            }
            Label::Addsub | Label::Divstar => generate_arithmetic(scope, code, node),
            Label::Eq | Label::Order => generate_comparison(scope, code, node),
            Label::And => generate_logic(scope, code, node, true),
            Label::Or => generate_logic(scope, code, node, false),
            Label::Not => {
                let operand = Expr(node.child(0)).generate(scope, code, ());
                pop_register(code, RESULT_REG, operand);
                compare_zero(code, RESULT_REG);
                unary(
                    code,
                    InstrType::Set(ConditionCode::EQ),
                    InstrOperand::RegVariant(RESULT_REG, Scale::Byte),
                );
                code.codes.push(Instruction(Instr::BinaryInstr(
                    BinaryInstruction::new_double_scale(
                        InstrType::MovZx,
                        Scale::Byte,
                        InstrOperand::RegVariant(RESULT_REG, Scale::Byte),
                        Scale::Quad,
                        InstrOperand::Reg(RESULT_REG),
                    ),
                )));
                push_register(code, RESULT_REG)
            }
            other => unreachable!("{:?} at {}:{} is not an expression", other, node.line, node.column),
        }
    }
}

impl Generator for Call<'_> {
    type Input = ();
    type Output = ();

    // the result, if any, is left in rax
    fn generate(&self, scope: &ScopeInfo, code: &mut GeneratedCode, _aux: ()) -> Self::Output {
        let node = self.0;
        let callee = match scope.function_table(node.ident()) {
            Some(callee) => callee,
            None => unreachable!("'{}' is not a function", node.ident()),
        };

        // last argument first: the first one ends up on top
        let mut values: Vec<Pushed> = node
            .call_args()
            .iter()
            .rev()
            .map(|arg| Expr(arg).generate(scope, code, ()))
            .collect();

        let in_registers = values.len().min(ARG_REGS.len());
        let registered = values.split_off(values.len() - in_registers);
        registered
            .into_iter()
            .rev()
            .zip(ARG_REGS)
            .for_each(|(value, reg)| pop_register(code, reg, value));

        // rsp is only word aligned here, not 16-byte aligned; runtime
        // routines built against libc may fault on aligned SSE moves
        call(code, &callee.ident);

        // arguments past the sixth stayed on the stack for the callee
        discard(code, values);
    }
}

// anything bound must resolve once the checker has passed the tree
pub fn resolve<'a>(scope: &ScopeInfo<'a>, node: &Node) -> &'a Symbol {
    match scope.resolve(node.ident()) {
        Some(symbol) => symbol,
        None => unreachable!("'{}' reached code generation unresolved", node.ident()),
    }
}

pub fn value_reference(location: Location) -> MemoryReference {
    match location.frame_offset() {
        Some(offset) => MemoryReference::frame(offset),
        None => MemoryReference::labelled(GLOBAL_VARS_LABEL, location.address() as i32),
    }
}

fn generate_expr_ident(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) -> Pushed {
    let symbol = resolve(scope, node);
    match symbol {
        Symbol::Value { location, .. } => {
            push(code, InstrOperand::Reference(value_reference(*location)))
        }
        // an array name stands for its address
        Symbol::Array { .. } => {
            array_base(code, symbol);
            push_register(code, ADDR_REG)
        }
        Symbol::Function { .. } => unreachable!("function '{}' used as a value", symbol.ident()),
    }
}

// base address of an array into rdx
fn array_base(code: &mut GeneratedCode, symbol: &Symbol) {
    match symbol {
        // parameters hold a pointer
        Symbol::Array {
            length: None,
            location,
            ..
        } => binary(
            code,
            InstrType::Mov,
            InstrOperand::Reference(value_reference(*location)),
            InstrOperand::Reg(ADDR_REG),
        ),
        Symbol::Array { location, .. } => binary(
            code,
            InstrType::Lea,
            InstrOperand::Reference(value_reference(*location)),
            InstrOperand::Reg(ADDR_REG),
        ),
        other => unreachable!("'{}' is not an array", other.ident()),
    }
}

// pushes base + index * 8
pub fn element_address(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) -> Pushed {
    let symbol = resolve(scope, node);
    let index = Expr(node.child(0)).generate(scope, code, ());
    pop_register(code, RESULT_REG, index);
    array_base(code, symbol);
    binary(
        code,
        InstrType::Lea,
        InstrOperand::Reference(
            MemoryReference::default()
                .with_base_reg(ADDR_REG)
                .with_shift_unit_reg(RESULT_REG)
                .with_shift_cnt(WORD_SIZE as i32),
        ),
        InstrOperand::Reg(RESULT_REG),
    );
    push_register(code, RESULT_REG)
}

// left is pushed first so the right operand is popped first
fn pop_operands(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) {
    let lhs = Expr(node.child(0)).generate(scope, code, ());
    let rhs = Expr(node.child(1)).generate(scope, code, ());
    pop_register(code, AUX_REG, rhs);
    pop_register(code, RESULT_REG, lhs);
}

fn generate_arithmetic(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) -> Pushed {
    pop_operands(scope, code, node);
    let rhs = InstrOperand::Reg(AUX_REG);
    let lhs = InstrOperand::Reg(RESULT_REG);

    let result = match BinaryOperator::of(node) {
        BinaryOperator::Add => {
            binary(code, InstrType::Add, rhs, lhs);
            RESULT_REG
        }
        BinaryOperator::Sub => {
            binary(code, InstrType::Sub, rhs, lhs);
            RESULT_REG
        }
        BinaryOperator::Mul => {
            binary(code, InstrType::IMul, rhs, lhs);
            RESULT_REG
        }
        // quotient in rax, remainder in rdx
        BinaryOperator::Div => {
            nullary(code, InstrType::Cqo);
            unary(code, InstrType::IDiv, rhs);
            RESULT_REG
        }
        BinaryOperator::Modulo => {
            nullary(code, InstrType::Cqo);
            unary(code, InstrType::IDiv, rhs);
            Register::Rdx
        }
        other => unreachable!("{:?} is not arithmetic", other),
    };
    push_register(code, result)
}

fn generate_comparison(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) -> Pushed {
    let condition = match BinaryOperator::of(node) {
        BinaryOperator::Eq => ConditionCode::EQ,
        BinaryOperator::Neq => ConditionCode::NEQ,
        BinaryOperator::Lt => ConditionCode::LT,
        BinaryOperator::Lte => ConditionCode::LTE,
        BinaryOperator::Gt => ConditionCode::GT,
        BinaryOperator::Gte => ConditionCode::GTE,
        other => unreachable!("{:?} is not a comparison", other),
    };

    let id = code.get_control_label();
    let true_label = control_label("cmp_true", id);
    let end_label = control_label("cmp_end", id);

    pop_operands(scope, code, node);
    binary(code, InstrType::Cmp, InstrOperand::Reg(AUX_REG), InstrOperand::Reg(RESULT_REG));
    jump_on_condition(code, condition, &true_label);

    let falsity = push(code, InstrOperand::Imm(0));
    jump(code, &end_label);
    label(code, true_label);
    let truth = push(code, InstrOperand::Imm(1));
    label(code, end_label);
    falsity.merge(truth)
}

// `&&` jumps out on the first 0, `||` on the first non-zero
fn generate_logic(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node, is_and: bool) -> Pushed {
    let id = code.get_control_label();
    let (short_label, end_label, short_on, short_value) = if is_and {
        (control_label("and_false", id), control_label("and_end", id), ConditionCode::EQ, 0)
    } else {
        (control_label("or_true", id), control_label("or_end", id), ConditionCode::NEQ, 1)
    };

    for operand in &node.children[..2] {
        let value = Expr(operand).generate(scope, code, ());
        pop_register(code, RESULT_REG, value);
        compare_zero(code, RESULT_REG);
        jump_on_condition(code, short_on, &short_label);
    }

    // neither operand decided it
    let decided = push(code, InstrOperand::Imm(1 - short_value));
    jump(code, &end_label);
    label(code, short_label);
    let shorted = push(code, InstrOperand::Imm(short_value));
    label(code, end_label);
    decided.merge(shorted)
}
