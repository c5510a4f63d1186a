use crate::ast::{Label, Node};
use crate::error::{CheckResult, DiagnosticKind};
use crate::semantic_checker::type_checker::{assign_check, conversion_message};
use crate::semantic_checker::Checker;
use crate::symbol_table::{SymbolKind, Type};

impl<'a> Checker<'a> {
    pub fn check_instr(&mut self, node: &Node) -> CheckResult<()> {
        match node.label {
            Label::Assignation => self.check_assignation(node),
            Label::If => {
                self.value(node.child(0))?;
                self.check_instr(node.child(1))?;
                match node.get_child(2) {
                    Some(otherwise) => self.check_instr(otherwise),
                    None => Ok(()),
                }
            }
            Label::While => {
                self.value(node.child(0))?;
                self.check_instr(node.child(1))
            }
            Label::Return => self.check_return(node),
            Label::SuiteInstr => node.children.iter().try_for_each(|instr| self.check_instr(instr)),
            Label::EmptyInstr => Ok(()),
            // expression statement, its value is dropped
            _ => self.check_expr(node).map(|_| ()),
        }
    }

    fn check_assignation(&mut self, node: &Node) -> CheckResult<()> {
        let target = self.check_lvalue(node.child(0))?;
        let value = node.child(1);
        let value_type = self.operand(value)?;

        if let Some(kind) = target.and_then(|ty| assign_check(ty, value_type)) {
            self.report(kind, value, conversion_message(kind));
        }
        Ok(())
    }

    // type of a valid assignment target, None once the target is reported
    fn check_lvalue(&mut self, node: &Node) -> CheckResult<Option<Type>> {
        match node.label {
            Label::Ident if !node.is_call() => {
                let symbol = self.resolve(node)?;
                if symbol.kind() == SymbolKind::Value {
                    return Ok(Some(symbol.ty()));
                }
            }
            Label::ArrayLR => {
                let ty = self.check_array_access(node)?;
                // a non-array was already reported as subscripted
                return Ok((self.resolve(node)?.kind() == SymbolKind::Array).then_some(ty));
            }
            _ => {
                self.check_expr(node)?;
            }
        }

        self.report(
            DiagnosticKind::NotAnLvalue,
            node,
            "lvalue required as left operand of assignment",
        );
        Ok(None)
    }

    fn check_return(&mut self, node: &Node) -> CheckResult<()> {
        let function = self.scope.function;
        let expr = match node.get_child(0) {
            Some(expr) => expr,
            None => {
                if function.return_type != Type::Void {
                    self.report(
                        DiagnosticKind::MustReturnValue,
                        node,
                        format!("non-void function '{}' should return a value", function.ident),
                    );
                }
                return Ok(());
            }
        };

        if function.return_type == Type::Void {
            self.report(
                DiagnosticKind::ReturnTypeNonVoid,
                node,
                format!("void function '{}' should not return a value", function.ident),
            );
        }

        let returned = self.operand(expr)?;
        if returned == Type::Void {
            self.report(
                DiagnosticKind::ReturnVoidExpr,
                expr,
                format!("void value returned by function '{}'", function.ident),
            );
        } else if function.return_type != Type::Void {
            if let Some(kind) = assign_check(function.return_type, returned) {
                self.report(kind, expr, conversion_message(kind));
            }
        }
        Ok(())
    }
}
