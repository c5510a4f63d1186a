use crate::ast::Label;
use crate::code_generator::asm::AsmLine::Directive;
use crate::code_generator::asm::{
    GeneratedCode, InstrOperand, InstrType, MemoryReference, Register, ARG_REGS, RESULT_REG,
};
use crate::code_generator::asm_creator::{
    binary, call, comment, epilogue, label, mov_immediate, mov_registers, nullary, prologue,
};
use crate::code_generator::def_libary::{
    Directives, DEBUG_ROUTINES, ENTRY_LABEL, GLOBAL_VARS_LABEL, SYS_EXIT,
};
use crate::code_generator::x86_generate::{Function, Generator, Stmt};
use crate::semantic_checker::program::MAIN_FUNCTION_TITLE;
use crate::symbol_table::builtins::BUILTINS;
use crate::symbol_table::{Location, ProgramTable, ScopeInfo};
use tracing::instrument;

impl GeneratedCode {
    // header, static block and the process entry point
    pub fn global_init(&mut self, program: &ProgramTable) {
        self.pre_defined
            .push(Directive(Directives::GlobalDeclare(ENTRY_LABEL.to_string())));
        DEBUG_ROUTINES
            .iter()
            .copied()
            .chain(BUILTINS.iter().map(|b| b.name))
            .for_each(|name| self.pre_defined.push(Directive(Directives::Extern(name.to_string()))));

        self.pre_defined.push(Directive(Directives::UninitialisedData));
        self.pre_defined.push(Directive(Directives::Reserve(
            GLOBAL_VARS_LABEL.to_string(),
            program.static_size(),
        )));
        self.pre_defined.push(Directive(Directives::AssemblerText));

        // main's result becomes the exit status
        label(self, ENTRY_LABEL.to_string());
        call(self, MAIN_FUNCTION_TITLE);
        mov_registers(self, RESULT_REG, Register::Rdi);
        mov_immediate(self, SYS_EXIT, RESULT_REG);
        nullary(self, InstrType::Syscall);
    }
}

impl Generator for Function<'_> {
    type Input = ();
    type Output = ();

    #[instrument(skip_all, fields(function = %scope.function.ident))]
    fn generate(&self, scope: &ScopeInfo, code: &mut GeneratedCode, _aux: ()) -> Self::Output {
        let function = scope.function;
        label(code, function.ident.clone());
        comment(
            code,
            format!("{} {}, frame of {} bytes", function.return_type, function.ident, function.frame_size()),
        );

        // frame sizes are whole words, so rsp keeps no 16-byte alignment
        prologue(code, function.frame_size());

        // register parameters are only ever read from their frame slot
        for param in function.params_in_order() {
            if let Some(Location::Register { slot, offset }) = param.location() {
                binary(
                    code,
                    InstrType::Mov,
                    InstrOperand::Reg(ARG_REGS[slot]),
                    InstrOperand::Reference(MemoryReference::frame(offset)),
                );
            }
        }

        let body = self.0.child(1).child(1);
        body.children
            .iter()
            .for_each(|instr| Stmt(instr).generate(scope, code, ()));

        // falling off the end of main exits with 0
        let ends_in_return = body.children.last().map_or(false, |i| i.is(Label::Return));
        if !ends_in_return {
            if function.ident == MAIN_FUNCTION_TITLE {
                mov_immediate(code, 0, RESULT_REG);
            }
            epilogue(code);
        }
    }
}
