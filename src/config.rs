use derive_builder::Builder;
use std::path::{Path, PathBuf};

const DEFAULT_OUTPUT: &str = "_anonymous.asm";
const ASSEMBLY_EXTENSION: &str = "asm";

/// Knobs for a single compilation.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct CompileOptions {
    /// Stop once the program has been checked.
    #[builder(default = "false")]
    pub only_semantic: bool,

    /// Interleave `;` comments naming functions and statements.
    #[builder(default = "false")]
    pub emit_comments: bool,

    /// Log every symbol table at `info`.
    #[builder(default = "false")]
    pub dump_symbols: bool,

    #[builder(setter(into), default = "PathBuf::from(DEFAULT_OUTPUT)")]
    pub output: PathBuf,

    /// Text of the compiled file, used to point at the offending line in reports.
    #[builder(setter(into, strip_option), default = "None")]
    pub source: Option<String>,
}

impl CompileOptionsBuilder {
    /// Write `<stem>.asm` in the working directory for `input`.
    ///
    /// ```
    /// use tpcc::config::CompileOptionsBuilder;
    /// use std::path::PathBuf;
    ///
    /// let options = CompileOptionsBuilder::default()
    ///     .for_input("tests/good/fibo.tpc")
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(options.output, PathBuf::from("fibo.asm"));
    /// ```
    pub fn for_input<P: AsRef<Path>>(&mut self, input: P) -> &mut Self {
        let output = input
            .as_ref()
            .file_stem()
            .map(|stem| Path::new(stem).with_extension(ASSEMBLY_EXTENSION))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        self.output = Some(output);
        self
    }
}
