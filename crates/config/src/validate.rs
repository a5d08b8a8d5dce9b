//! Semantic checks on a loaded configuration.
//!
//! Parsing already rejects malformed files; this catches values that parse
//! fine but cannot work at runtime.

use crate::schema::SigrelayConfig;

/// Severity level for a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warning => write!(f, "warning"),
        }
    }
}

/// A single validation diagnostic.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Category: "url", "timeout", "group"
    pub category: &'static str,
    /// Dotted path, e.g. "signal.api_url"
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{}] {}: {}", self.severity, self.category, self.path, self.message)
    }
}

/// Result of validating a configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationResult {
    /// Returns `true` if any diagnostic is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .iter()
            .any(|d| d.severity == Severity::Error)
    }

    /// Count diagnostics by severity.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }

    fn push(&mut self, severity: Severity, category: &'static str, path: &str, message: String) {
        self.diagnostics.push(Diagnostic {
            severity,
            category,
            path: path.into(),
            message,
        });
    }
}

/// Validate a parsed configuration.
#[must_use]
pub fn validate(config: &SigrelayConfig) -> ValidationResult {
    let mut result = ValidationResult::default();
    let signal = &config.signal;

    match url::Url::parse(&signal.api_url) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {},
        Ok(url) => result.push(
            Severity::Error,
            "url",
            "signal.api_url",
            format!("unsupported scheme '{}', expected http or https", url.scheme()),
        ),
        Err(e) => result.push(
            Severity::Error,
            "url",
            "signal.api_url",
            format!("invalid URL '{}': {e}", signal.api_url),
        ),
    }

    if signal.request_timeout_secs <= signal.receive_timeout_secs {
        result.push(
            Severity::Error,
            "timeout",
            "signal.request_timeout_secs",
            format!(
                "must be greater than receive_timeout_secs ({}) or every long poll times out",
                signal.receive_timeout_secs
            ),
        );
    }

    if signal.poll_backoff_secs == 0 {
        result.push(
            Severity::Warning,
            "timeout",
            "signal.poll_backoff_secs",
            "zero backoff retries a failing daemon in a tight loop".into(),
        );
    }

    let group_id = config
        .bot
        .control_group_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty());
    if let Some(id) = group_id
        && let Some(bad) = id.chars().find(|c| !is_group_id_char(*c))
    {
        result.push(
            Severity::Error,
            "group",
            "bot.control_group_id",
            format!("group id '{id}' contains invalid character '{bad}'"),
        );
    }
    let has_id = group_id.is_some();
    if !has_id && config.bot.control_group_name.trim().is_empty() {
        result.push(
            Severity::Error,
            "group",
            "bot.control_group_name",
            "either control_group_name or control_group_id must be set".into(),
        );
    }

    result
}

/// Group ids are base64 (`group.` prefixed for sending), so only base64
/// characters plus `.` and `-` are allowed.
fn is_group_id_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '=' | '.' | '-')
}
