pub mod expr;
pub mod program;
pub mod stmt;
pub mod type_checker;

use crate::ast::Node;
use crate::error::{CheckResult, Diagnostic, DiagnosticKind, Diagnostics, Fatal};
use crate::symbol_table::{ScopeInfo, Symbol};

pub use program::semantic_check;

/// Walks one function body. The tables are only read; findings go to `diagnostics`.
pub struct Checker<'a> {
    pub scope: ScopeInfo<'a>,
    pub diagnostics: Diagnostics,
}

impl<'a> Checker<'a> {
    pub fn new(scope: ScopeInfo<'a>) -> Self {
        Self {
            scope,
            diagnostics: Diagnostics::new(),
        }
    }

    // a name with no binding ends the check
    pub fn resolve(&self, node: &Node) -> CheckResult<&'a Symbol> {
        self.scope.resolve(node.ident()).ok_or_else(|| {
            Fatal(Diagnostic::at(
                DiagnosticKind::UndeclaredSymbol,
                node,
                format!("use of undeclared identifier '{}'", node.ident()),
            ))
        })
    }

    pub fn report(&mut self, kind: DiagnosticKind, node: &Node, message: impl Into<String>) {
        self.diagnostics.report(kind, node, message);
    }
}
