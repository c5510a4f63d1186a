pub mod asm;
mod asm_creator;
pub mod def_libary;
mod display;
mod expr;
mod program;
mod stmt;
pub mod stack_check;
pub mod x86_generate;
