use crate::ast::{Label, Node};
use crate::code_generator::asm::{
    control_label, ConditionCode, GeneratedCode, InstrOperand, InstrType, MemoryReference,
    RESULT_REG,
};
use crate::code_generator::asm_creator::{
    binary, comment, compare_zero, discard, epilogue, jump, jump_on_condition, label, pop,
    pop_register,
};
use crate::code_generator::expr::{element_address, resolve, value_reference};
use crate::code_generator::x86_generate::{Call, Expr, Generator, Stmt};
use crate::symbol_table::{ScopeInfo, Symbol};

impl Generator for Stmt<'_> {
    type Input = ();
    type Output = ();

    fn generate(&self, scope: &ScopeInfo, code: &mut GeneratedCode, _aux: ()) -> Self::Output {
        let node = self.0;
        match node.label {
            Label::Assignation => generate_stmt_assign(scope, code, node),
            Label::If => generate_stmt_if(scope, code, node),
            Label::While => generate_stmt_while(scope, code, node),
            Label::Return => generate_stmt_return(scope, code, node),
            Label::SuiteInstr => node
                .children
                .iter()
                .for_each(|instr| Stmt(instr).generate(scope, code, ())),
            Label::EmptyInstr => {}
            // the result of a call statement is never pushed
            Label::Ident if node.is_call() => {
                comment(code, format!("call {}", node.ident()));
                Call(node).generate(scope, code, ());
            }
            _ => {
                let unused = Expr(node).generate(scope, code, ());
                discard(code, vec![unused]);
            }
        }
    }
}

fn generate_stmt_assign(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) {
    let target = node.child(0);
    comment(code, format!("assign {}", target.ident()));

    let value = Expr(node.child(1)).generate(scope, code, ());
    match target.label {
        Label::Ident => {
            let location = match resolve(scope, target) {
                Symbol::Value { location, .. } => *location,
                other => unreachable!("'{}' is not assignable", other.ident()),
            };
            pop_register(code, RESULT_REG, value);
            binary(
                code,
                InstrType::Mov,
                InstrOperand::Reg(RESULT_REG),
                InstrOperand::Reference(value_reference(location)),
            );
        }
        Label::ArrayLR => {
            let address = element_address(scope, code, target);
            pop_register(code, RESULT_REG, address);
            pop(
                code,
                InstrOperand::Reference(MemoryReference::default().with_base_reg(RESULT_REG)),
                value,
            );
        }
        other => unreachable!("{:?} is not an lvalue", other),
    }
}

fn generate_stmt_if(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) {
    let id = code.get_control_label();
    let else_label = control_label("if_else", id);
    let end_label = control_label("if_end", id);

    // evaluate if-condition, 0 means false
    let cond = Expr(node.child(0)).generate(scope, code, ());
    pop_register(code, RESULT_REG, cond);
    compare_zero(code, RESULT_REG);
    jump_on_condition(code, ConditionCode::EQ, &else_label);

    Stmt(node.child(1)).generate(scope, code, ());
    jump(code, &end_label);

    label(code, else_label);
    if let Some(otherwise) = node.get_child(2) {
        Stmt(otherwise).generate(scope, code, ());
    }
    label(code, end_label);
}

fn generate_stmt_while(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) {
    let id = code.get_control_label();
    let start_label = control_label("while_start", id);
    let end_label = control_label("while_end", id);

    label(code, start_label.clone());
    let cond = Expr(node.child(0)).generate(scope, code, ());
    pop_register(code, RESULT_REG, cond);
    compare_zero(code, RESULT_REG);
    jump_on_condition(code, ConditionCode::EQ, &end_label);

    Stmt(node.child(1)).generate(scope, code, ());
    jump(code, &start_label);
    label(code, end_label);
}

fn generate_stmt_return(scope: &ScopeInfo, code: &mut GeneratedCode, node: &Node) {
    if let Some(expr) = node.get_child(0) {
        let value = Expr(expr).generate(scope, code, ());
        pop_register(code, RESULT_REG, value);
    }
    epilogue(code);
}
