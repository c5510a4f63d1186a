pub const ENTRY_LABEL: &str = "_start";

// base of the static block holding every global
pub const GLOBAL_VARS_LABEL: &str = "global_vars";

// debugging helpers shipped with the runtime
pub const DEBUG_ROUTINES: [&str; 2] = ["show_registers", "show_stack"];

pub const SYS_EXIT: i64 = 60;

#[derive(PartialEq, Debug, Clone)]
pub enum Directives {
    GlobalDeclare(String),
    Extern(String),
    UninitialisedData,
    AssemblerText,
    // label: resb bytes
    Reserve(String, usize),
    Label(String),
    Comment(String),
}
