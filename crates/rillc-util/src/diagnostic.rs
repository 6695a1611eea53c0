//! Diagnostic collection and reporting.
//!
//! Every compiler pass reports problems into a shared [`Handler`] instead of
//! aborting, so a single run surfaces as many independent errors as possible.
//! The driver inspects the handler between stages and stops the pipeline
//! after the first stage that produced errors, mapping that stage to the
//! process exit code.
//!
//! # Examples
//!
//! ```
//! use rillc_util::{Handler, Level, Span, Stage};
//!
//! let mut handler = Handler::new();
//! handler.error(Stage::Parse, "unexpected token", Span::DUMMY);
//!
//! assert!(handler.has_errors());
//! assert_eq!(handler.errors_in(Stage::Parse), 1);
//! ```

use std::fmt;

use crate::Span;

/// Diagnostic severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    /// Prevents compilation from proceeding past the current stage.
    Error,
    /// Reported but never fatal.
    Warning,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Error => write!(f, "error"),
            Level::Warning => write!(f, "warning"),
        }
    }
}

/// The pipeline stage a diagnostic originates from.
///
/// Stages are ordered by the data flow of the compiler; the driver exits with
/// the code of the earliest failing stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    /// Reading the source or the import/export table, writing the module.
    Io,
    /// Tokenization.
    Lex,
    /// Syntax analysis.
    Parse,
    /// Semantic analysis.
    Sem,
    /// WebAssembly emission.
    Codegen,
}

impl Stage {
    /// Process exit code associated with errors from this stage.
    pub fn exit_code(self) -> i32 {
        match self {
            Stage::Io => 1,
            Stage::Lex => 2,
            Stage::Parse => 3,
            Stage::Sem => 4,
            Stage::Codegen => 5,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Io => write!(f, "io"),
            Stage::Lex => write!(f, "lexical"),
            Stage::Parse => write!(f, "syntax"),
            Stage::Sem => write!(f, "semantic"),
            Stage::Codegen => write!(f, "codegen"),
        }
    }
}

/// A single reported problem.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// Severity.
    pub level: Level,
    /// Originating stage, used for exit codes and rendering.
    pub stage: Stage,
    /// Human-readable message.
    pub message: String,
    /// Source location.
    pub span: Span,
}

impl Diagnostic {
    /// Render as `<file>:<line>:<col>: <kind>: <message>`.
    pub fn render(&self, file: &str) -> String {
        format!(
            "{}:{}:{}: {} {}: {}",
            file, self.span.start_line, self.span.start_column, self.stage, self.level, self.message
        )
    }
}

/// Ordered sink for diagnostics.
///
/// The handler owns every diagnostic emitted during one compilation, in
/// emission order.
#[derive(Debug, Default)]
pub struct Handler {
    diagnostics: Vec<Diagnostic>,
}

impl Handler {
    /// Create an empty handler.
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    /// Report an error.
    pub fn error(&mut self, stage: Stage, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic {
            level: Level::Error,
            stage,
            message: message.into(),
            span,
        });
    }

    /// Report a warning.
    pub fn warning(&mut self, stage: Stage, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic {
            level: Level::Warning,
            stage,
            message: message.into(),
            span,
        });
    }

    /// Returns true if any error has been reported.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.level == Level::Error)
    }

    /// Total number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == Level::Error)
            .count()
    }

    /// Number of errors reported by a particular stage.
    pub fn errors_in(&self, stage: Stage) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.level == Level::Error && d.stage == stage)
            .count()
    }

    /// The earliest pipeline stage that reported an error, if any.
    pub fn first_error_stage(&self) -> Option<Stage> {
        self.diagnostics
            .iter()
            .filter(|d| d.level == Level::Error)
            .map(|d| d.stage)
            .min()
    }

    /// All diagnostics in emission order.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_handler() {
        let handler = Handler::new();
        assert!(!handler.has_errors());
        assert_eq!(handler.error_count(), 0);
        assert_eq!(handler.first_error_stage(), None);
    }

    #[test]
    fn test_error_counts_per_stage() {
        let mut handler = Handler::new();
        handler.error(Stage::Lex, "bad literal", Span::DUMMY);
        handler.error(Stage::Sem, "type mismatch", Span::DUMMY);
        handler.error(Stage::Sem, "unknown identifier", Span::DUMMY);

        assert!(handler.has_errors());
        assert_eq!(handler.error_count(), 3);
        assert_eq!(handler.errors_in(Stage::Lex), 1);
        assert_eq!(handler.errors_in(Stage::Sem), 2);
        assert_eq!(handler.errors_in(Stage::Parse), 0);
    }

    #[test]
    fn test_warnings_are_not_errors() {
        let mut handler = Handler::new();
        handler.warning(Stage::Sem, "unused", Span::DUMMY);
        assert!(!handler.has_errors());
        assert_eq!(handler.diagnostics().len(), 1);
    }

    #[test]
    fn test_first_error_stage_follows_pipeline_order() {
        let mut handler = Handler::new();
        handler.error(Stage::Sem, "late", Span::DUMMY);
        handler.error(Stage::Lex, "early", Span::DUMMY);
        assert_eq!(handler.first_error_stage(), Some(Stage::Lex));
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(Stage::Io.exit_code(), 1);
        assert_eq!(Stage::Lex.exit_code(), 2);
        assert_eq!(Stage::Parse.exit_code(), 3);
        assert_eq!(Stage::Sem.exit_code(), 4);
        assert_eq!(Stage::Codegen.exit_code(), 5);
    }

    #[test]
    fn test_render_format() {
        let mut handler = Handler::new();
        handler.error(
            Stage::Lex,
            "unterminated string literal",
            Span::new(3, 7, 20, 3, 8, 21),
        );
        let rendered = handler.diagnostics()[0].render("main.rl");
        assert_eq!(rendered, "main.rl:3:7: lexical error: unterminated string literal");
    }
}
