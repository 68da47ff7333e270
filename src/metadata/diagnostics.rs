//! Diagnostic channel shared between the weaving host and its weavers.
//!
//! Weavers never abort a weave because a symbol cannot be handled. Instead they report
//! the symbol here and leave the metadata untouched, so an operator can review what the
//! pass could not fix.
//!
//! # Key Components
//!
//! - [`Diagnostics`] - Thread-safe container for diagnostic entries
//! - [`Diagnostic`] - Individual diagnostic entry with severity and context
//! - [`DiagnosticSeverity`] - Severity level (Debug, Warning, Error)
//! - [`DiagnosticCategory`] - Category of the diagnostic source
//!
//! # Logging
//!
//! Every entry pushed into a [`Diagnostics`] container is also forwarded to the `log`
//! facade under the `cilpurge` target, at the level matching its severity. Hosts that
//! install a logger therefore see diagnostics as they happen; hosts that don't can still
//! inspect the collected entries after the weave.
//!
//! # Usage Examples
//!
//! ```rust
//! use cilpurge::metadata::diagnostics::{Diagnostics, DiagnosticCategory};
//!
//! let diagnostics = Diagnostics::new();
//!
//! diagnostics.warning(
//!     DiagnosticCategory::Field,
//!     "Unresolved field reference: [FSharp.Core]Microsoft.FSharp.Core.Unit::value",
//! );
//!
//! assert!(diagnostics.has_warnings());
//! for entry in diagnostics.iter() {
//!     println!("{}", entry);
//! }
//! ```
//!
//! # Thread Safety
//!
//! All types in this module are [`Send`] and [`Sync`]. The [`Diagnostics`] container
//! uses `boxcar::Vec` internally, which provides lock-free concurrent append operations.

use std::fmt::{self, Write};

use crate::metadata::{references::ReferenceKind, token::Token};

/// Severity level of a diagnostic entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticSeverity {
    /// Trace information about the weave, not indicating a problem.
    Debug,

    /// A symbol or construct the weaver could not handle.
    ///
    /// The module is still written, but it may keep a dependency the weaver was
    /// supposed to remove.
    Warning,

    /// A failure that makes the woven module unusable.
    Error,
}

impl DiagnosticSeverity {
    /// Returns the `log` level this severity is mirrored at.
    #[must_use]
    pub fn log_level(self) -> log::Level {
        match self {
            DiagnosticSeverity::Debug => log::Level::Debug,
            DiagnosticSeverity::Warning => log::Level::Warn,
            DiagnosticSeverity::Error => log::Level::Error,
        }
    }
}

impl fmt::Display for DiagnosticSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticSeverity::Debug => write!(f, "DEBUG"),
            DiagnosticSeverity::Warning => write!(f, "WARN"),
            DiagnosticSeverity::Error => write!(f, "ERROR"),
        }
    }
}

/// Category indicating the kind of metadata a diagnostic is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    /// Unresolved type references in signatures, locals or operands.
    Type,

    /// Unresolved field references in instruction operands.
    Field,

    /// Unresolved method references in instruction operands.
    Method,

    /// Anything not fitting the other categories.
    General,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Type => write!(f, "Type"),
            DiagnosticCategory::Field => write!(f, "Field"),
            DiagnosticCategory::Method => write!(f, "Method"),
            DiagnosticCategory::General => write!(f, "General"),
        }
    }
}

impl From<ReferenceKind> for DiagnosticCategory {
    fn from(kind: ReferenceKind) -> Self {
        match kind {
            ReferenceKind::Type => DiagnosticCategory::Type,
            ReferenceKind::Field => DiagnosticCategory::Field,
            ReferenceKind::Method => DiagnosticCategory::Method,
        }
    }
}

/// A single diagnostic entry with context information.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level of this diagnostic.
    pub severity: DiagnosticSeverity,

    /// Category indicating the source of this diagnostic.
    pub category: DiagnosticCategory,

    /// Human-readable description of the issue.
    pub message: String,

    /// Optional full name of the symbol the diagnostic is about.
    pub symbol: Option<String>,

    /// Optional metadata token of the element containing the symbol.
    pub token: Option<Token>,
}

impl Diagnostic {
    /// Creates a new diagnostic entry.
    ///
    /// # Arguments
    ///
    /// * `severity` - Severity level of the diagnostic
    /// * `category` - Category of the diagnostic source
    /// * `message` - Human-readable description
    pub fn new(
        severity: DiagnosticSeverity,
        category: DiagnosticCategory,
        message: impl Into<String>,
    ) -> Self {
        Self {
            severity,
            category,
            message: message.into(),
            symbol: None,
            token: None,
        }
    }

    /// Adds the full name of the offending symbol to the diagnostic.
    #[must_use]
    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    /// Adds metadata token information to the diagnostic.
    #[must_use]
    pub fn with_token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.category, self.message)?;

        if let Some(token) = self.token {
            write!(f, " (token: {})", token)?;
        }

        Ok(())
    }
}

/// Thread-safe container for collecting diagnostic entries.
///
/// This is the diagnostic channel a host hands to each weaver. It offers one sink per
/// severity ([`Diagnostics::debug`], [`Diagnostics::warning`], [`Diagnostics::error`])
/// and keeps every entry for inspection after the weave.
#[derive(Debug)]
pub struct Diagnostics {
    entries: boxcar::Vec<Diagnostic>,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

impl Diagnostics {
    /// Creates a new empty diagnostics container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: boxcar::Vec::new(),
        }
    }

    /// Adds a debug-level diagnostic.
    pub fn debug(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(DiagnosticSeverity::Debug, category, message));
    }

    /// Adds a warning diagnostic.
    pub fn warning(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Warning,
            category,
            message,
        ));
    }

    /// Adds an error diagnostic.
    pub fn error(&self, category: DiagnosticCategory, message: impl Into<String>) {
        self.push(Diagnostic::new(
            DiagnosticSeverity::Error,
            category,
            message,
        ));
    }

    /// Adds a diagnostic entry directly and mirrors it to the `log` facade.
    ///
    /// Use this for diagnostics that carry a symbol name or token.
    pub fn push(&self, diagnostic: Diagnostic) {
        log::log!(
            target: "cilpurge",
            diagnostic.severity.log_level(),
            "{}: {}",
            diagnostic.category,
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    /// Returns true if any diagnostics have been collected.
    pub fn has_any(&self) -> bool {
        self.entries.count() > 0
    }

    /// Returns true if any error-level diagnostics have been collected.
    pub fn has_errors(&self) -> bool {
        self.any_of(DiagnosticSeverity::Error)
    }

    /// Returns true if any warning-level diagnostics have been collected.
    pub fn has_warnings(&self) -> bool {
        self.any_of(DiagnosticSeverity::Warning)
    }

    /// Returns the total number of diagnostics.
    pub fn count(&self) -> usize {
        self.entries.count()
    }

    /// Returns the number of error-level diagnostics.
    pub fn error_count(&self) -> usize {
        self.count_of(DiagnosticSeverity::Error)
    }

    /// Returns the number of warning-level diagnostics.
    pub fn warning_count(&self) -> usize {
        self.count_of(DiagnosticSeverity::Warning)
    }

    /// Returns the number of debug-level diagnostics.
    pub fn debug_count(&self) -> usize {
        self.count_of(DiagnosticSeverity::Debug)
    }

    /// Returns an iterator over all diagnostics, in the order they were reported.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().map(|(_, d)| d)
    }

    /// Returns all errors as a vector.
    pub fn errors(&self) -> Vec<&Diagnostic> {
        self.of_severity(DiagnosticSeverity::Error)
    }

    /// Returns all warnings as a vector.
    pub fn warnings(&self) -> Vec<&Diagnostic> {
        self.of_severity(DiagnosticSeverity::Warning)
    }

    /// Returns diagnostics filtered by category.
    pub fn by_category(&self, category: DiagnosticCategory) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.category == category).collect()
    }

    /// Returns diagnostics reported for the symbol with the given full name.
    pub fn by_symbol(&self, symbol: &str) -> Vec<&Diagnostic> {
        self.iter()
            .filter(|d| d.symbol.as_deref() == Some(symbol))
            .collect()
    }

    /// Formats a summary of all diagnostics for display.
    pub fn summary(&self) -> String {
        let mut output = String::new();

        let error_count = self.error_count();
        let warning_count = self.warning_count();

        let _ = writeln!(
            output,
            "Diagnostics: {} error(s), {} warning(s), {} debug",
            error_count,
            warning_count,
            self.debug_count()
        );

        if error_count > 0 {
            output.push_str("\nErrors:\n");
            for diag in self.errors() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        if warning_count > 0 {
            output.push_str("\nWarnings:\n");
            for diag in self.warnings() {
                let _ = writeln!(output, "  {diag}");
            }
        }

        output
    }

    fn any_of(&self, severity: DiagnosticSeverity) -> bool {
        self.iter().any(|d| d.severity == severity)
    }

    fn count_of(&self, severity: DiagnosticSeverity) -> usize {
        self.iter().filter(|d| d.severity == severity).count()
    }

    fn of_severity(&self, severity: DiagnosticSeverity) -> Vec<&Diagnostic> {
        self.iter().filter(|d| d.severity == severity).collect()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
