use crate::ast::{Label, Node};
use crate::code_generator::asm::GeneratedCode;
use crate::symbol_table::{ProgramTable, ScopeInfo};
use std::fmt::Debug;
use tracing::{debug, instrument};

pub trait Generator: Debug {
    type Input;

    type Output;

    fn generate(&self, scope: &ScopeInfo, code: &mut GeneratedCode, aux: Self::Input) -> Self::Output;
}

// Views over the tree naming the role a node plays for the generator.

#[derive(Debug, Clone, Copy)]
pub struct Function<'n>(pub &'n Node);

#[derive(Debug, Clone, Copy)]
pub struct Stmt<'n>(pub &'n Node);

#[derive(Debug, Clone, Copy)]
pub struct Expr<'n>(pub &'n Node);

#[derive(Debug, Clone, Copy)]
pub struct Call<'n>(pub &'n Node);

/// Lower a checked program. Expects a tree the checker accepted.
#[instrument(skip_all)]
pub fn gen_x86_for_program(root: &Node, program: &ProgramTable, emit_comments: bool) -> GeneratedCode {
    assert!(root.is(Label::Prog));
    let mut code = GeneratedCode::new(emit_comments);

    code.global_init(program);

    let decl_foncts = root.child(1);
    for (decl_fonct, function) in decl_foncts.children.iter().zip(program.user_functions()) {
        let scope = ScopeInfo::new(program, function);
        Function(decl_fonct).generate(&scope, &mut code, ());
    }

    debug!(lines = code.codes.len(), labels = code.labels_used(), "assembly generated");
    code
}
