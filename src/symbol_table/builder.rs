use crate::ast::{Label, Node};
use crate::error::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::symbol_table::builtins::program_with_builtins;
use crate::symbol_table::{
    Declaration, FunctionTable, ProgramTable, ScopeKind, ScopeTable, Shape, Type,
};
use tracing::{debug, instrument, trace};

/// Walk the declarations of a whole program and give every symbol its storage.
/// Never stops early: whatever could be built is returned with the diagnostics.
#[instrument(skip_all)]
pub fn build_program(root: &Node) -> (ProgramTable, Diagnostics) {
    assert!(root.is(Label::Prog), "program root must be Prog, found {:?}", root.label);

    let mut program = program_with_builtins();
    let mut diagnostics = Diagnostics::new();

    declare_vars(root.child(0), &mut program.globals, None, &mut diagnostics);

    let decl_foncts = root.child(1);
    assert!(decl_foncts.is(Label::DeclFoncts));
    for decl_fonct in &decl_foncts.children {
        let function = declare_function(decl_fonct, &mut program, &mut diagnostics);
        program.functions.push(function);
    }

    debug!(
        globals = program.globals.len(),
        functions = program.functions.len(),
        diagnostics = diagnostics.len(),
        "symbol tables built"
    );
    (program, diagnostics)
}

fn declare_function(
    decl_fonct: &Node,
    program: &mut ProgramTable,
    diagnostics: &mut Diagnostics,
) -> FunctionTable {
    assert!(decl_fonct.is(Label::DeclFonct));
    let header = decl_fonct.child(0);
    let body = decl_fonct.child(1);
    assert!(header.is(Label::EnTeteFonct) && body.is(Label::Corps));

    let return_node = header.child(0);
    let return_type = match return_node.label {
        Label::Void => Type::Void,
        Label::Type => Type::from_key_word(return_node.key_word()),
        other => unreachable!("unexpected return type node {:?}", other),
    };

    let ident_node = header.child(1);
    let ident = ident_node.ident();
    insert(
        &mut program.globals,
        Declaration::new(ident, return_type, Shape::Function, ident_node.line, ident_node.column),
        diagnostics,
    );

    let mut params = ScopeTable::new(ScopeKind::Param);
    declare_params(header.child(2), &mut params, diagnostics);

    let mut locals = ScopeTable::starting_at(ScopeKind::Local, params.next_addr);
    declare_vars(body.child(0), &mut locals, Some(&params), diagnostics);

    FunctionTable {
        ident: ident.to_string(),
        return_type,
        index: program.functions.len(),
        params,
        locals,
        builtin: false,
        line: ident_node.line,
        column: ident_node.column,
    }
}

fn declare_params(list: &Node, params: &mut ScopeTable, diagnostics: &mut Diagnostics) {
    if list.is(Label::Void) {
        return;
    }
    assert!(list.is(Label::ListTypVar), "parameter list must be ListTypVar or Void");

    for param in &list.children {
        let ty = Type::from_key_word(param.key_word());
        // array parameters only receive a pointer
        let shape = match param.label {
            Label::Type => Shape::Value,
            Label::DeclFonctArray => Shape::Array(None),
            other => unreachable!("unexpected parameter node {:?}", other),
        };
        for ident_node in &param.children {
            let declaration =
                Declaration::new(ident_node.ident(), ty, shape, ident_node.line, ident_node.column);
            insert(params, declaration, diagnostics);
        }
    }
}

// `params` is given for function bodies: locals may not reuse a parameter name
fn declare_vars(
    decl_vars: &Node,
    scope: &mut ScopeTable,
    params: Option<&ScopeTable>,
    diagnostics: &mut Diagnostics,
) {
    assert!(decl_vars.is(Label::DeclVars), "expected DeclVars, found {:?}", decl_vars.label);

    for type_node in &decl_vars.children {
        let ty = Type::from_key_word(type_node.key_word());
        for declarator in &type_node.children {
            let shape = match declarator.label {
                Label::Ident => Shape::Value,
                Label::DeclArray => Shape::Array(Some(array_length(declarator, diagnostics))),
                other => unreachable!("unexpected declarator {:?}", other),
            };
            let declaration =
                Declaration::new(declarator.ident(), ty, shape, declarator.line, declarator.column);

            if params.map_or(false, |p| p.contains(&declaration.ident)) {
                diagnostics.push(Diagnostic::new(
                    DiagnosticKind::RedeclaredSymbol,
                    declaration.line,
                    declaration.column,
                    format!(
                        "redeclaration of '{}' was already declared in parameters list",
                        declaration.ident
                    ),
                ));
                continue;
            }

            insert(scope, declaration, diagnostics);
        }
    }
}

// zero or negative lengths are reported and stored as 0
fn array_length(declarator: &Node, diagnostics: &mut Diagnostics) -> usize {
    let length = declarator.child(0).num();
    if length > 0 {
        return length as usize;
    }

    let message = if length == 0 {
        format!("ISO C forbids zero-size array '{}'", declarator.ident())
    } else {
        format!("size of array '{}' is negative", declarator.ident())
    };
    diagnostics.report(DiagnosticKind::ArrayZeroSize, declarator, message);
    0
}

fn insert(scope: &mut ScopeTable, declaration: Declaration, diagnostics: &mut Diagnostics) {
    let kind = scope.kind;
    match scope.add(declaration) {
        Ok(symbol) => trace!(scope = ?kind, symbol = %symbol, "inserted"),
        Err(rejected) => {
            let message = match (kind, rejected.shape) {
                (ScopeKind::Param, _) => format!("redeclaration of parameter '{}'", rejected.ident),
                (_, Shape::Function) => format!("redefinition of function '{}'", rejected.ident),
                _ => format!("redeclaration of '{}'", rejected.ident),
            };
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::RedeclaredSymbol,
                rejected.line,
                rejected.column,
                message,
            ));
        }
    }
}
