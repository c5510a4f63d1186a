use crate::error::DiagnosticKind;
use crate::symbol_table::{Symbol, Type};

// what an expression evaluates to: a scalar, or an array name (decays to a pointer)
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum ExprType {
    Scalar(Type),
    Array(Type),
}

// arithmetic, comparison and logic all compute in int; a void operand poisons the result
pub fn binary_operator_check(lhs: Type, rhs: Type) -> Type {
    match (lhs, rhs) {
        (Type::Void, _) | (_, Type::Void) => Type::Void,
        _ => Type::Num,
    }
}

pub fn unary_operator_check(operand: Type) -> Type {
    binary_operator_check(operand, Type::Num)
}

// storing a value of type `value` where `target` is expected
pub fn assign_check(target: Type, value: Type) -> Option<DiagnosticKind> {
    match (target, value) {
        (_, Type::Void) => Some(DiagnosticKind::NotAnRvalue),
        (Type::Byte, Type::Num) => Some(DiagnosticKind::ImplicitIntToChar),
        _ => None,
    }
}

pub fn conversion_message(kind: DiagnosticKind) -> &'static str {
    match kind {
        DiagnosticKind::NotAnRvalue => "void value not ignored as it ought to be",
        DiagnosticKind::ImplicitIntToChar => "implicit conversion from 'int' to 'char'",
        other => unreachable!("{:?} is not a conversion diagnostic", other),
    }
}

// passing `argument` for `param`
pub fn argument_check(param: &Symbol, argument: ExprType) -> Option<DiagnosticKind> {
    match (param, argument) {
        (Symbol::Array { .. }, ExprType::Array(elem)) if elem != param.ty() => {
            Some(DiagnosticKind::MismatchArrayType)
        }
        (Symbol::Array { .. }, ExprType::Array(_)) => None,
        (Symbol::Array { .. }, ExprType::Scalar(_)) | (Symbol::Value { .. }, ExprType::Array(_)) => {
            Some(DiagnosticKind::InvalidArrayType)
        }
        (Symbol::Value { .. }, ExprType::Scalar(ty)) => assign_check(param.ty(), ty),
        (Symbol::Function { .. }, _) => unreachable!("functions are never parameters"),
    }
}
