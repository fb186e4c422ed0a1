//! Diagnostics.
//!
//! Passes report problems by building a [`Diagnostic`] (usually through the
//! `error!` and `warning!` macros) and handing it to an [`ErrorSink`].  The
//! sink is append-only: a pass keeps going after reporting so that one run
//! surfaces every problem, and only at the very end does it consult
//! [`ErrorSink::error_occurred`] to decide between success and
//! [`ErrorReported`].

use codespan_reporting::diagnostic as cs;
use codespan_reporting::term;
use codespan_reporting::term::termcolor as tc;

use crate::pos::{FileId, Files, HasSpan};

pub use codespan_reporting::diagnostic::Severity;

type CsDiagnostic = cs::Diagnostic<FileId>;
type CsLabel = cs::Label<FileId>;

/// Zero-sized marker for "a diagnostic has already reached the sink".
///
/// Returning this instead of the diagnostic itself keeps error paths cheap
/// and makes it impossible to report the same problem twice.
#[derive(thiserror::Error, Debug, Copy, Clone, PartialEq, Eq)]
#[error("an error has already been reported")]
pub struct ErrorReported;

/// A single error or warning, with optional source labels and notes.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    imp: CsDiagnostic,
}

impl Diagnostic {
    pub fn error() -> Self {
        Diagnostic { imp: CsDiagnostic::error() }
    }

    pub fn warning() -> Self {
        Diagnostic { imp: CsDiagnostic::warning() }
    }

    pub fn severity(&self) -> Severity {
        self.imp.severity
    }

    pub fn is_error(&self) -> bool {
        matches!(self.imp.severity, Severity::Bug | Severity::Error)
    }

    pub fn message(&mut self, message: impl Into<String>) {
        self.imp.message = message.into();
    }

    pub fn primary(&mut self, span: impl HasSpan, message: impl Into<String>) {
        let span = span.span();
        self.imp.labels.push(
            CsLabel::primary(span.file_id, span).with_message(message)
        );
    }

    pub fn secondary(&mut self, span: impl HasSpan, message: impl Into<String>) {
        let span = span.span();
        self.imp.labels.push(
            CsLabel::secondary(span.file_id, span).with_message(message)
        );
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.imp.notes.push(message.into());
    }

    /// The top-level message, without labels or notes.
    pub fn text(&self) -> &str {
        &self.imp.message
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.imp.severity {
            Severity::Error | Severity::Bug => "error",
            Severity::Warning => "warning",
            Severity::Note | Severity::Help => "note",
        };
        write!(f, "{}: {}", severity, self.imp.message)
    }
}

/// Construct an error [`Diagnostic`].
///
/// ```text
/// error!(
///     message("undefined label `{}`", name),
///     primary(name, "no such label in this function"),
///     note("labels are function-local"),
/// )
/// ```
macro_rules! error {
    ($($arg:tt)+) => { diagnostic!(error, $($arg)+) };
}

/// Construct a warning [`Diagnostic`].  Same shape as `error!`.
macro_rules! warning {
    ($($arg:tt)+) => { diagnostic!(warning, $($arg)+) };
}

macro_rules! diagnostic {
    (
        $severity:ident,
        message($($message:tt)+)
        $(, $part:ident( $($part_args:tt)+ ))*
        $(,)?
    ) => {{
        let mut d = $crate::error::Diagnostic::$severity();
        d.message(format!($($message)+));
        $( diagnostic_part!(d, $part($($part_args)+)); )*
        d
    }};
}

macro_rules! diagnostic_part {
    ($d:ident, primary($span:expr, $($fmt:tt)+)) => {
        $d.primary(&$span, format!($($fmt)+))
    };
    ($d:ident, secondary($span:expr, $($fmt:tt)+)) => {
        $d.secondary(&$span, format!($($fmt)+))
    };
    ($d:ident, note($($fmt:tt)+)) => {
        $d.note(format!($($fmt)+))
    };
}

/// Collects every diagnostic produced by a pass.
///
/// This is deliberately not a pretty-printer; rendering happens once at the
/// end via [`ErrorSink::print_all`], after the whole input has been
/// processed.
#[derive(Debug, Default)]
pub struct ErrorSink {
    diagnostics: Vec<Diagnostic>,
    errors: usize,
}

impl ErrorSink {
    pub fn new() -> Self {
        ErrorSink::default()
    }

    pub fn emit(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_error() {
            self.errors += 1;
        }
        self.diagnostics.push(diagnostic);
    }

    /// Has anything of error severity been emitted?
    pub fn error_occurred(&self) -> bool {
        self.errors > 0
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Render everything to stderr.
    ///
    /// Diagnostics whose spans have no registered file (compiler-synthesized
    /// locations) fall back to a plain one-line rendering.
    pub fn print_all(&self, files: &Files) {
        let writer = tc::StandardStream::stderr(tc::ColorChoice::Auto);
        let config = term::Config::default();
        for diagnostic in &self.diagnostics {
            if term::emit(&mut writer.lock(), &config, files, &diagnostic.imp).is_err() {
                eprintln!("{}", diagnostic);
            }
        }
    }
}
