use crate::symbol_table::{
    Declaration, FunctionTable, ProgramTable, ScopeKind, ScopeTable, Shape, Type,
};
use lazy_static::lazy_static;
use tracing::trace;

// runtime routines linked in from outside; they follow the user call protocol
#[derive(Debug)]
pub struct BuiltinSignature {
    pub name: &'static str,
    pub return_type: Type,
    pub params: Vec<(&'static str, Type)>,
}

lazy_static! {
    pub static ref BUILTINS: Vec<BuiltinSignature> = vec![
        BuiltinSignature {
            name: "putchar",
            return_type: Type::Void,
            params: vec![("character", Type::Byte)],
        },
        BuiltinSignature {
            name: "putint",
            return_type: Type::Void,
            params: vec![("number", Type::Num)],
        },
        BuiltinSignature {
            name: "getchar",
            return_type: Type::Byte,
            params: vec![],
        },
        BuiltinSignature {
            name: "getint",
            return_type: Type::Num,
            params: vec![],
        },
    ];
}

/// A program table holding only the builtins, ready for user declarations.
pub fn program_with_builtins() -> ProgramTable {
    let mut program = ProgramTable {
        globals: ScopeTable::new(ScopeKind::Global),
        functions: Vec::new(),
    };

    for builtin in BUILTINS.iter() {
        let declaration = Declaration::new(builtin.name, builtin.return_type, Shape::Function, 0, 0);
        if program.globals.add(declaration).is_err() {
            unreachable!("builtin '{}' registered twice", builtin.name);
        }

        let mut params = ScopeTable::new(ScopeKind::Param);
        for (ident, ty) in &builtin.params {
            if params.add(Declaration::new(ident, *ty, Shape::Value, 0, 0)).is_err() {
                unreachable!("builtin '{}' repeats parameter '{}'", builtin.name, ident);
            }
        }

        let locals = ScopeTable::starting_at(ScopeKind::Local, params.next_addr);
        program.functions.push(FunctionTable {
            ident: builtin.name.to_string(),
            return_type: builtin.return_type,
            index: program.functions.len(),
            params,
            locals,
            builtin: true,
            line: 0,
            column: 0,
        });
        trace!(builtin = builtin.name, "registered builtin");
    }

    program
}
