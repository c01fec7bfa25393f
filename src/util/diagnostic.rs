//! User-friendly diagnostic messages.
//!
//! Every error shown to a user carries the root cause, whatever context
//! explains it, and numbered suggestions for fixing it.

use std::fmt;
use std::path::PathBuf;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Holder ids look like `item:<id>` or `entity:<id>`.
    pub const HOLDER_FORMAT: &str = "Write holders as `item:<id>` or `entity:<id>`";

    /// Keys must be namespaced.
    pub const KEY_FORMAT: &str = "Write keys as `namespace:key`, e.g. `demo:owner`";

    /// Typed value literal syntax.
    pub const VALUE_FORMAT: &str =
        "Write values as `type:value`, e.g. `int:3`, `string:hi`, `ints:1,2,3`";

    /// Pointing the CLI at a different host.
    pub const HOST_VERSION: &str =
        "Pass `--host-version <version>` or set `host.version` in hostcompat.toml";

    /// Inspecting the registry.
    pub const LIST_SHIMS: &str = "Run `hostcompat shims list` to see supported host versions";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Note => write!(f, "note"),
        }
    }
}

/// A diagnostic message with optional suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    /// Severity level
    pub severity: Severity,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
    /// Related file, e.g. the host state snapshot
    pub location: Option<PathBuf>,
}

impl Diagnostic {
    fn with_severity(message: impl Into<String>, severity: Severity) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            context: Vec::new(),
            suggestions: Vec::new(),
            location: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Error)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Warning)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Self::with_severity(message, Severity::Note)
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_location(mut self, path: impl Into<PathBuf>) -> Self {
        self.location = Some(path.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        let severity = if color {
            match self.severity {
                Severity::Error => "\x1b[1;31merror\x1b[0m",
                Severity::Warning => "\x1b[1;33mwarning\x1b[0m",
                Severity::Note => "\x1b[1;36mnote\x1b[0m",
            }
        } else {
            match self.severity {
                Severity::Error => "error",
                Severity::Warning => "warning",
                Severity::Note => "note",
            }
        };

        output.push_str(&format!("{}: {}\n", severity, self.message));

        if let Some(ref path) = self.location {
            output.push_str(&format!("  --> {}\n", path.display()));
        }

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            output.push('\n');
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            output.push_str(&format!("{}: consider:\n", help));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_formatting() {
        let diag = Diagnostic::error("no shim supports host version 1.20.0")
            .with_context("registered shims: v1_21_1 (>=1.21.0, <1.21.4)")
            .with_suggestion(suggestions::LIST_SHIMS)
            .with_suggestion(suggestions::HOST_VERSION);

        let output = diag.format(false);
        assert!(output.contains("error: no shim supports"));
        assert!(output.contains("= registered shims"));
        assert!(output.contains("help: consider:"));
        assert!(output.contains("1. Run `hostcompat shims list`"));
        assert!(output.contains("2. Pass `--host-version"));
    }

    #[test]
    fn test_location_and_color() {
        let diag = Diagnostic::warning("host state is stale").with_location("state.json");
        let plain = diag.format(false);
        assert!(plain.starts_with("warning: host state is stale"));
        assert!(plain.contains("--> state.json"));
        assert!(!plain.contains("help:"));

        assert!(diag.format(true).contains("\x1b[1;33mwarning"));
        assert_eq!(Diagnostic::note("x").to_string(), "note: x\n");
    }
}
