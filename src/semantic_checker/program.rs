use crate::ast::{Label, Node};
use crate::error::{Aborted, CheckResult, Diagnostic, DiagnosticKind, Diagnostics, Fatal};
use crate::semantic_checker::Checker;
use crate::symbol_table::{ProgramTable, ScopeInfo, Type};
use tracing::{debug, instrument};

pub const MAIN_FUNCTION_TITLE: &str = "main";

/// Check every function body against the finished tables, then `main`.
/// Stops only at an identifier that does not resolve.
#[instrument(skip_all)]
pub fn semantic_check(root: &Node, program: &ProgramTable) -> Result<Diagnostics, Aborted> {
    assert!(root.is(Label::Prog));
    let mut diagnostics = Diagnostics::new();

    let decl_foncts = root.child(1);
    for (decl_fonct, function) in decl_foncts.children.iter().zip(program.user_functions()) {
        let mut checker = Checker::new(ScopeInfo::new(program, function));
        let result = checker.check_function(decl_fonct);
        diagnostics |= checker.diagnostics;

        if let Err(Fatal(diagnostic)) = result {
            debug!(function = %function.ident, "aborted on {}", diagnostic);
            diagnostics |= diagnostic;
            return Err(Aborted(diagnostics));
        }
    }

    main_check(program, &mut diagnostics);
    debug!(diagnostics = diagnostics.len(), "semantic check done");
    Ok(diagnostics)
}

impl<'a> Checker<'a> {
    #[instrument(skip_all, fields(function = %self.scope.function.ident))]
    pub fn check_function(&mut self, decl_fonct: &Node) -> CheckResult<()> {
        assert!(decl_fonct.is(Label::DeclFonct));
        let body = decl_fonct.child(1).child(1);
        assert!(body.is(Label::SuiteInstr));

        for instr in &body.children {
            self.check_instr(instr)?;
        }

        // only the top level of the body counts
        let function = self.scope.function;
        if function.return_type != Type::Void && !body.children.iter().any(|i| i.is(Label::Return)) {
            self.diagnostics.push(Diagnostic::new(
                DiagnosticKind::MissingReturn,
                function.line,
                function.column,
                format!(
                    "missing return statement in function '{}' returning non-void",
                    function.ident
                ),
            ));
        }
        Ok(())
    }
}

fn main_check(program: &ProgramTable, diagnostics: &mut Diagnostics) {
    let main = match program.function(MAIN_FUNCTION_TITLE) {
        Some(main) => main,
        None => {
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::MainUnavailable,
                0,
                0,
                "undefined reference to 'main'",
            ));
            return;
        }
    };

    if main.return_type != Type::Num {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::MainReturnType,
            main.line,
            main.column,
            "'main' must return 'int'",
        ));
    }
    if main.param_count() > 0 {
        diagnostics.push(Diagnostic::new(
            DiagnosticKind::MainParam,
            main.line,
            main.column,
            "'main' must not have any parameter (void)",
        ));
    }
}
