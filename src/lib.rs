//! Backend of the TPC compiler: symbol tables, semantic checks and
//! x86-64 code generation over an already parsed tree.

pub mod ast;
pub mod code_generator;
pub mod config;
pub mod error;
pub mod semantic_checker;
pub mod symbol_table;

#[cfg(test)]
mod unit_tests;

use crate::ast::Node;
use crate::code_generator::x86_generate::gen_x86_for_program;
use crate::config::CompileOptions;
use crate::error::{Aborted, CompileError, Diagnostic, DiagnosticKind, Diagnostics};
use crate::semantic_checker::semantic_check;
use crate::symbol_table::builder::build_program;
use crate::symbol_table::ProgramTable;
use fs_err as fs;
use tracing::{error, info, instrument, warn};

/// Everything a successful run produced.
#[derive(Debug)]
pub struct Compilation {
    pub symbols: ProgramTable,
    /// Warnings only, errors never make it this far.
    pub diagnostics: Diagnostics,
    /// `None` when only the semantic check was asked for.
    pub assembly: Option<String>,
}

impl Compilation {
    pub fn exit_code(&self) -> i32 {
        self.diagnostics.exit_code()
    }

    pub fn render(&self, source: Option<&str>) -> String {
        self.diagnostics.render(source)
    }
}

/// Build the tables, check the tree and, unless told otherwise, generate.
/// Whatever was reported is logged, against `options.source` when it is set.
#[instrument(skip_all)]
pub fn compile(tree: &Node, options: &CompileOptions) -> Result<Compilation, CompileError> {
    let result = check_and_generate(tree, options);
    log_outcome(&result, options);
    result
}

fn check_and_generate(tree: &Node, options: &CompileOptions) -> Result<Compilation, CompileError> {
    let (symbols, mut diagnostics) = build_program(tree);
    if options.dump_symbols {
        info!("symbol tables\n{}", symbols);
    }

    match semantic_check(tree, &symbols) {
        Ok(checked) => diagnostics |= checked,
        Err(Aborted(checked)) => {
            diagnostics |= checked;
            return Err(CompileError::Aborted(diagnostics));
        }
    }

    if diagnostics.has_errors() {
        return Err(CompileError::Rejected(diagnostics));
    }

    let assembly = if options.only_semantic {
        None
    } else {
        Some(gen_x86_for_program(tree, &symbols, options.emit_comments).to_string())
    };

    Ok(Compilation {
        symbols,
        diagnostics,
        assembly,
    })
}

fn log_outcome(result: &Result<Compilation, CompileError>, options: &CompileOptions) {
    let source = options.source.as_deref();
    match result {
        Ok(compilation) if !compilation.diagnostics.is_empty() => {
            warn!("{}", compilation.render(source))
        }
        Ok(_) => {}
        Err(e) => error!("{}", e.render(source)),
    }
}

/// [`compile`], then write the assembly to `options.output`.
pub fn compile_to_file(tree: &Node, options: &CompileOptions) -> Result<Compilation, CompileError> {
    let compilation = compile(tree, options)?;

    if let Some(assembly) = &compilation.assembly {
        if let Err(e) = fs::write(&options.output, assembly) {
            let mut diagnostics = compilation.diagnostics;
            diagnostics.push(Diagnostic::new(
                DiagnosticKind::FileOpen,
                0,
                0,
                format!("cannot open '{}': {}", options.output.display(), e),
            ));
            let error = CompileError::Rejected(diagnostics);
            error!("{}", error.render(options.source.as_deref()));
            return Err(error);
        }
        info!(output = %options.output.display(), "assembly written");
    }

    Ok(compilation)
}
