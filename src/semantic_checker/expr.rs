use crate::ast::{Label, Node};
use crate::error::{CheckResult, DiagnosticKind};
use crate::semantic_checker::type_checker::{
    argument_check, binary_operator_check, conversion_message, unary_operator_check, ExprType,
};
use crate::semantic_checker::Checker;
use crate::symbol_table::{Symbol, SymbolKind, Type};

impl<'a> Checker<'a> {
    pub fn check_expr(&mut self, node: &Node) -> CheckResult<ExprType> {
        match node.label {
            Label::Num => Ok(ExprType::Scalar(Type::Num)),
            Label::Character => Ok(ExprType::Scalar(Type::Byte)),
            Label::Ident if node.is_call() => self.check_call(node).map(ExprType::Scalar),
            Label::Ident => self.check_ident(node),
            Label::ArrayLR => self.check_array_access(node).map(ExprType::Scalar),
            Label::Addsub if node.children.len() == 1 => {
                let operand = self.operand(node.child(0))?;
                Ok(ExprType::Scalar(unary_operator_check(operand)))
            }
            Label::Not => {
                let operand = self.operand(node.child(0))?;
                Ok(ExprType::Scalar(unary_operator_check(operand)))
            }
            Label::Addsub | Label::Divstar | Label::Eq | Label::Order | Label::And | Label::Or => {
                let lhs = self.operand(node.child(0))?;
                let rhs = self.operand(node.child(1))?;
                Ok(ExprType::Scalar(binary_operator_check(lhs, rhs)))
            }
            other => unreachable!("{:?} at {}:{} is not an expression", other, node.line, node.column),
        }
    }

    // operands of operators must be scalars
    pub fn operand(&mut self, node: &Node) -> CheckResult<Type> {
        match self.check_expr(node)? {
            ExprType::Scalar(ty) => Ok(ty),
            ExprType::Array(_) => {
                self.report(
                    DiagnosticKind::NotAnRvalue,
                    node,
                    format!("array '{}' used as a value", node.ident()),
                );
                Ok(Type::Num)
            }
        }
    }

    // a scalar whose value is consumed: conditions, indices
    pub fn value(&mut self, node: &Node) -> CheckResult<Type> {
        let ty = self.operand(node)?;
        if ty == Type::Void {
            self.report(
                DiagnosticKind::NotAnRvalue,
                node,
                conversion_message(DiagnosticKind::NotAnRvalue),
            );
        }
        Ok(ty)
    }

    fn check_ident(&mut self, node: &Node) -> CheckResult<ExprType> {
        let symbol = self.resolve(node)?;
        Ok(match symbol {
            Symbol::Value { .. } => ExprType::Scalar(symbol.ty()),
            Symbol::Array { .. } => ExprType::Array(symbol.ty()),
            Symbol::Function { .. } => {
                self.report(
                    DiagnosticKind::FunctionAsRvalue,
                    node,
                    format!("Pointer to function '{}' used as rvalue (not allowed)", symbol.ident()),
                );
                ExprType::Scalar(symbol.ty())
            }
        })
    }

    // type of the element, whether or not the symbol really is an array
    pub fn check_array_access(&mut self, node: &Node) -> CheckResult<Type> {
        let symbol = self.resolve(node)?;
        self.value(node.child(0))?;
        if symbol.kind() != SymbolKind::Array {
            self.report(
                DiagnosticKind::SubscriptNotArray,
                node,
                format!("subscripted value '{}' is not an array", symbol.ident()),
            );
        }
        Ok(symbol.ty())
    }

    pub fn check_call(&mut self, node: &Node) -> CheckResult<Type> {
        let symbol = self.resolve(node)?;
        let callee = match symbol.kind() {
            SymbolKind::Function => self.scope.function_table(symbol.ident()),
            _ => None,
        };

        let callee = match callee {
            Some(callee) => callee,
            None => {
                self.report(
                    DiagnosticKind::SemIsNotCallable,
                    node,
                    format!("called object '{}' is not a function", symbol.ident()),
                );
                for arg in node.call_args() {
                    self.check_expr(arg)?;
                }
                return Ok(symbol.ty());
            }
        };

        if !callee.is_declared_before(self.scope.function) {
            self.report(
                DiagnosticKind::UseUndefinedFunction,
                node,
                format!("implicit declaration of function '{}'", callee.ident),
            );
        }

        let params = callee.params_in_order();
        let args = node.call_args();
        if args.len() > params.len() {
            self.report(
                DiagnosticKind::InvalidParamCount,
                node,
                format!("too many arguments to function '{}'", callee.ident),
            );
        } else if args.len() < params.len() {
            self.report(
                DiagnosticKind::InvalidParamCount,
                node,
                format!("too few arguments to function '{}'", callee.ident),
            );
        }

        for (position, arg) in args.iter().enumerate() {
            let arg_type = self.check_expr(arg)?;
            let param = match params.get(position) {
                Some(param) => *param,
                None => continue,
            };
            let message = match argument_check(param, arg_type) {
                None => continue,
                Some(kind @ DiagnosticKind::MismatchArrayType) => (
                    kind,
                    format!("incompatible array type for argument {} of '{}'", position + 1, callee.ident),
                ),
                Some(kind @ DiagnosticKind::InvalidArrayType) => (
                    kind,
                    format!("array and scalar mismatch for argument {} of '{}'", position + 1, callee.ident),
                ),
                Some(kind) => (kind, conversion_message(kind).to_string()),
            };
            self.report(message.0, arg, message.1);
        }

        Ok(callee.return_type)
    }
}
