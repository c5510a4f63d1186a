use crate::ast::Node;
use ariadne::{Color, Config, Label, Report, ReportKind, Source};
use modular_bitfield::prelude::*;
use std::fmt::{Display, Formatter};
use std::ops::{BitOrAssign, Range};

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum Severity {
    Parse,
    Semantic,
    Critical,
    Warn,
}

impl Severity {
    pub fn level(&self) -> &'static str {
        match self {
            Severity::Parse | Severity::Semantic => "error",
            Severity::Critical => "critical",
            Severity::Warn => "warning",
        }
    }
}

/// Which severity classes are present in a set of diagnostics.
/// Only used to derive the process exit code.
#[bitfield(filled = false)]
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct SeverityMask {
    pub parse: bool,
    pub semantic: bool,
    pub critical: bool,
    pub warn: bool,
}

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_PARSE: i32 = 1;
pub const EXIT_SEMANTIC: i32 = 2;
pub const EXIT_CRITICAL: i32 = 3;

impl SeverityMask {
    pub fn record(&mut self, severity: Severity) {
        match severity {
            Severity::Parse => self.set_parse(true),
            Severity::Semantic => self.set_semantic(true),
            Severity::Critical => self.set_critical(true),
            Severity::Warn => self.set_warn(true),
        }
    }

    // critical > parse > semantic > warnings or nothing
    pub fn exit_code(&self) -> i32 {
        if self.critical() {
            EXIT_CRITICAL
        } else if self.parse() {
            EXIT_PARSE
        } else if self.semantic() {
            EXIT_SEMANTIC
        } else {
            EXIT_SUCCESS
        }
    }
}

#[derive(PartialEq, Eq, Clone, Copy, Debug, Hash)]
pub enum DiagnosticKind {
    Syntax,
    NoMemory,
    FileOpen,
    ArrayZeroSize,
    RedeclaredSymbol,
    SemIsNotCallable,
    InvalidParamCount,
    MismatchArrayType,
    InvalidArrayType,
    ImplicitIntToChar,
    UseUndefinedFunction,
    NotAnLvalue,
    FunctionAsRvalue,
    NotAnRvalue,
    SubscriptNotArray,
    ReturnTypeNonVoid,
    MustReturnValue,
    ReturnVoidExpr,
    MissingReturn,
    MainUnavailable,
    MainReturnType,
    MainParam,
    UndeclaredSymbol,
}

impl DiagnosticKind {
    pub fn severity(&self) -> Severity {
        use DiagnosticKind::*;
        match self {
            Syntax => Severity::Parse,
            NoMemory | FileOpen => Severity::Critical,
            ImplicitIntToChar | UseUndefinedFunction | MissingReturn => Severity::Warn,
            ArrayZeroSize | RedeclaredSymbol | SemIsNotCallable | InvalidParamCount
            | MismatchArrayType | InvalidArrayType | NotAnLvalue | FunctionAsRvalue
            | NotAnRvalue | SubscriptNotArray | ReturnTypeNonVoid | MustReturnValue
            | ReturnVoidExpr | MainUnavailable | MainReturnType | MainParam
            | UndeclaredSymbol => Severity::Semantic,
        }
    }
}

#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, line: usize, column: usize, message: impl Into<String>) -> Self {
        Self {
            kind,
            line,
            column,
            message: message.into(),
        }
    }

    // positioned on the given node
    pub fn at(kind: DiagnosticKind, node: &Node, message: impl Into<String>) -> Self {
        Self::new(kind, node.line, node.column, message)
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warn
    }

    /// Render with the offending source line underneath.
    pub fn render(&self, source: &str) -> String {
        let span = source_span(source, self.line, self.column);
        let (kind, color) = match self.severity() {
            Severity::Warn => (ReportKind::Warning, Color::Yellow),
            Severity::Critical => (ReportKind::Custom("Critical", Color::Magenta), Color::Magenta),
            Severity::Parse | Severity::Semantic => (ReportKind::Error, Color::Red),
        };

        let mut buffer = Vec::new();
        let written = Report::build(kind, (), span.start)
            .with_config(Config::default().with_color(false))
            .with_message(&self.message)
            .with_label(Label::new(span).with_message(format!("{:?}", self.kind)).with_color(color))
            .finish()
            .write(Source::from(source.to_string()), &mut buffer);

        match written {
            Ok(()) => String::from_utf8_lossy(&buffer).into_owned(),
            // fall back to the one-line form
            Err(_) => format!("{}\n", self),
        }
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: position: {}:{}: {}",
            self.severity().level(),
            self.line,
            self.column,
            self.message
        )
    }
}

// byte range of the character at line:column (both 1-based), clamped to the source
fn source_span(source: &str, line: usize, column: usize) -> Range<usize> {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            let start = offset + column.saturating_sub(1).min(text.trim_end().len());
            return start..(start + 1).min(source.len()).max(start);
        }
        offset += text.len();
    }
    source.len()..source.len()
}

/// Every diagnostic reported during one compilation, in report order.
#[derive(PartialEq, Eq, Clone, Debug, Default)]
pub struct Diagnostics {
    list: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.list.push(diagnostic);
    }

    pub fn report(&mut self, kind: DiagnosticKind, node: &Node, message: impl Into<String>) {
        self.push(Diagnostic::at(kind, node, message));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.list.iter()
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn contains(&self, kind: DiagnosticKind) -> bool {
        self.list.iter().any(|d| d.kind == kind)
    }

    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.list.iter().filter(|d| d.kind == kind).count()
    }

    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.list.iter().map(|d| d.kind).collect()
    }

    pub fn mask(&self) -> SeverityMask {
        let mut mask = SeverityMask::new();
        self.list.iter().for_each(|d| mask.record(d.severity()));
        mask
    }

    // anything that must stop code generation
    pub fn has_errors(&self) -> bool {
        let mask = self.mask();
        mask.parse() || mask.semantic() || mask.critical()
    }

    pub fn exit_code(&self) -> i32 {
        self.mask().exit_code()
    }

    /// One-line form for each diagnostic, or full reports when the source is at hand.
    pub fn render(&self, source: Option<&str>) -> String {
        match source {
            Some(text) => self.list.iter().map(|d| d.render(text)).collect(),
            None => self.list.iter().map(|d| format!("{}\n", d)).collect(),
        }
    }
}

impl BitOrAssign for Diagnostics {
    fn bitor_assign(&mut self, rhs: Self) {
        self.list.extend(rhs.list);
    }
}

impl BitOrAssign<Diagnostic> for Diagnostics {
    fn bitor_assign(&mut self, rhs: Diagnostic) {
        self.list.push(rhs);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.list.iter()
    }
}

impl Display for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.list.iter().try_for_each(|d| writeln!(f, "{}", d))
    }
}

/// A diagnostic after which checking cannot go on (an identifier with no binding).
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Fatal(pub Diagnostic);

pub type CheckResult<T> = Result<T, Fatal>;

/// The check stopped early; holds what was reported up to and including the fatal one.
#[derive(PartialEq, Eq, Clone, Debug)]
pub struct Aborted(pub Diagnostics);

#[derive(PartialEq, Eq, Clone, Debug)]
pub enum CompileError {
    // checking stopped at an unresolved identifier
    Aborted(Diagnostics),
    // errors were reported so no code was generated
    Rejected(Diagnostics),
}

impl CompileError {
    pub fn diagnostics(&self) -> &Diagnostics {
        match self {
            CompileError::Aborted(diagnostics) | CompileError::Rejected(diagnostics) => diagnostics,
        }
    }

    pub fn exit_code(&self) -> i32 {
        self.diagnostics().exit_code()
    }

    pub fn render(&self, source: Option<&str>) -> String {
        self.diagnostics().render(source)
    }
}

impl From<Aborted> for CompileError {
    fn from(Aborted(diagnostics): Aborted) -> Self {
        CompileError::Aborted(diagnostics)
    }
}

impl Display for CompileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileError::Aborted(d) => write!(f, "compilation aborted\n{}", d),
            CompileError::Rejected(d) => write!(f, "compilation failed\n{}", d),
        }
    }
}

impl std::error::Error for CompileError {}

#[cfg(test)]
mod error_tests {
    use crate::error::{
        Diagnostic, DiagnosticKind, Diagnostics, SeverityMask, EXIT_CRITICAL, EXIT_PARSE,
        EXIT_SEMANTIC, EXIT_SUCCESS,
    };

    #[test]
    fn display_format_test() {
        let d = Diagnostic::new(DiagnosticKind::MissingReturn, 3, 5, "missing return");
        assert_eq!(d.to_string(), "warning: position: 3:5: missing return");

        let d = Diagnostic::new(DiagnosticKind::NotAnLvalue, 1, 2, "bad");
        assert_eq!(d.to_string(), "error: position: 1:2: bad");

        let d = Diagnostic::new(DiagnosticKind::FileOpen, 0, 0, "cannot open");
        assert_eq!(d.to_string(), "critical: position: 0:0: cannot open");
    }

    #[test]
    fn exit_code_precedence_test() {
        let mut diagnostics = Diagnostics::new();
        assert_eq!(diagnostics.exit_code(), EXIT_SUCCESS);

        diagnostics |= Diagnostic::new(DiagnosticKind::ImplicitIntToChar, 1, 1, "w");
        assert_eq!(diagnostics.exit_code(), EXIT_SUCCESS);
        assert!(!diagnostics.has_errors());

        diagnostics |= Diagnostic::new(DiagnosticKind::RedeclaredSymbol, 1, 1, "e");
        assert_eq!(diagnostics.exit_code(), EXIT_SEMANTIC);

        diagnostics |= Diagnostic::new(DiagnosticKind::Syntax, 1, 1, "p");
        assert_eq!(diagnostics.exit_code(), EXIT_PARSE);

        diagnostics |= Diagnostic::new(DiagnosticKind::NoMemory, 1, 1, "c");
        assert_eq!(diagnostics.exit_code(), EXIT_CRITICAL);
    }

    #[test]
    fn mask_test() {
        let mut diagnostics = Diagnostics::new();
        diagnostics |= Diagnostic::new(DiagnosticKind::MissingReturn, 1, 1, "w");
        diagnostics |= Diagnostic::new(DiagnosticKind::MainParam, 1, 1, "e");

        let mask = diagnostics.mask();
        assert!(mask.warn());
        assert!(mask.semantic());
        assert!(!mask.parse());
        assert_ne!(mask, SeverityMask::new());
    }

    #[test]
    fn render_with_source_test() {
        let d = Diagnostic::new(DiagnosticKind::NotAnLvalue, 2, 3, "lvalue required");
        let rendered = d.render("int main(void) {\n  f = 1;\n}\n");
        assert!(rendered.contains("lvalue required"));
        assert!(rendered.contains("f = 1;"));
    }
}
