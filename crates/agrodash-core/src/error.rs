//! Error types for agrodash-core
//!
//! Provides the error hierarchy (thiserror) plus the load report used for
//! graceful degradation when a snapshot contains inconsistent records.

use crate::models::EntityKind;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for agrodash operations
#[derive(Error, Debug)]
pub enum CoreError {
    // ===================
    // IO Errors
    // ===================
    #[error("Failed to read file: {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    // ===================
    // Parse Errors
    // ===================
    #[error("Failed to parse JSON in {path}: {message}")]
    JsonParse {
        path: PathBuf,
        message: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to parse TOML in {path}: {message}")]
    TomlParse { path: PathBuf, message: String },

    // ===================
    // Store Errors
    // ===================
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    #[error("Constraint violated on {kind}: {message}")]
    ConstraintViolation { kind: EntityKind, message: String },

    #[error("Entity store unavailable during {operation}: {message}")]
    UpstreamUnavailable { operation: String, message: String },

    // ===================
    // Config Errors
    // ===================
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    // ===================
    // Deadlines
    // ===================
    #[error("Operation timed out after {timeout_ms}ms: {operation}")]
    Timeout { operation: String, timeout_ms: u64 },
}

impl CoreError {
    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn constraint(kind: EntityKind, message: impl Into<String>) -> Self {
        CoreError::ConstraintViolation {
            kind,
            message: message.into(),
        }
    }

    pub fn unavailable(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::UpstreamUnavailable {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// True for a root identifier that did not resolve
    pub fn is_not_found(&self) -> bool {
        matches!(self, CoreError::NotFound { .. })
    }
}

/// Severity level for errors during load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Non-critical, record kept
    Warning,
    /// Record rejected
    Error,
    /// Cannot continue
    Fatal,
}

/// Individual error entry in load report
#[derive(Debug, Clone)]
pub struct LoadError {
    pub source: String,
    pub message: String,
    pub severity: ErrorSeverity,
    /// Actionable suggestion for user (optional)
    pub suggestion: Option<String>,
}

impl LoadError {
    pub fn warning(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Warning,
            suggestion: None,
        }
    }

    pub fn error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Error,
            suggestion: None,
        }
    }

    pub fn fatal(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            message: message.into(),
            severity: ErrorSeverity::Fatal,
            suggestion: None,
        }
    }

    /// Add an actionable suggestion to this error
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Create user-friendly error from CoreError with context-aware suggestions
    pub fn from_core_error(source: impl Into<String>, error: &CoreError) -> Self {
        let source = source.into();
        let (message, suggestion) = match error {
            CoreError::FileNotFound { path } => (
                format!("File not found: {}", path.display()),
                Some(format!("Check if file exists: ls {}", path.display())),
            ),
            CoreError::FileRead { path, .. } => (
                format!("Cannot read file: {}", path.display()),
                Some(format!("Check permissions: chmod +r {}", path.display())),
            ),
            CoreError::JsonParse { path, message, .. } => (
                format!("Invalid JSON in {}: {}", path.display(), message),
                Some("Validate JSON syntax with: jq . <file>".to_string()),
            ),
            CoreError::ConstraintViolation { kind, message } => (
                format!("{} rejected: {}", kind, message),
                Some("Fix the record in the snapshot and reload".to_string()),
            ),
            _ => (error.to_string(), None),
        };

        Self {
            source,
            message,
            severity: ErrorSeverity::Error,
            suggestion,
        }
    }
}

/// Report of errors encountered while loading a snapshot
///
/// Tracks partial failures instead of failing the whole load: rejected
/// records are counted, dangling references are kept and warned about.
#[derive(Debug, Default)]
pub struct LoadReport {
    pub errors: Vec<LoadError>,
    pub snapshot_loaded: bool,
    pub records_loaded: usize,
    pub records_rejected: usize,
}

impl LoadReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: LoadError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::warning(source, message));
    }

    pub fn add_fatal(&mut self, source: impl Into<String>, message: impl Into<String>) {
        self.errors.push(LoadError::fatal(source, message));
    }

    /// Returns true if there are any fatal errors
    pub fn has_fatal_errors(&self) -> bool {
        self.errors
            .iter()
            .any(|e| e.severity == ErrorSeverity::Fatal)
    }

    /// Returns true if there are any errors (including warnings)
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Returns only warnings
    pub fn warnings(&self) -> impl Iterator<Item = &LoadError> {
        self.errors
            .iter()
            .filter(|e| e.severity == ErrorSeverity::Warning)
    }

    /// Returns count by severity
    pub fn error_count(&self) -> (usize, usize, usize) {
        let count = |severity: ErrorSeverity| {
            self.errors
                .iter()
                .filter(|e| e.severity == severity)
                .count()
        };
        (
            count(ErrorSeverity::Warning),
            count(ErrorSeverity::Error),
            count(ErrorSeverity::Fatal),
        )
    }

    /// Merge another report into this one
    pub fn merge(&mut self, other: LoadReport) {
        self.errors.extend(other.errors);
        self.snapshot_loaded = self.snapshot_loaded || other.snapshot_loaded;
        self.records_loaded += other.records_loaded;
        self.records_rejected += other.records_rejected;
    }
}

/// Degraded state indicator for the data store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DegradedState {
    /// Everything loaded successfully
    Healthy,
    /// Some records rejected or inconsistent but functional
    PartialData {
        missing: Vec<String>,
        reason: String,
    },
}

impl DegradedState {
    pub fn is_healthy(&self) -> bool {
        matches!(self, DegradedState::Healthy)
    }

    pub fn is_degraded(&self) -> bool {
        !self.is_healthy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_report_severity_counting() {
        let mut report = LoadReport::new();
        report.add_warning("farms", "Dangling farmer reference");
        report.add_error(LoadError::error("crops", "Duplicate id"));
        report.add_fatal("snapshot", "File missing");

        let (warnings, errors, fatal) = report.error_count();
        assert_eq!(warnings, 1);
        assert_eq!(errors, 1);
        assert_eq!(fatal, 1);
        assert!(report.has_fatal_errors());
    }

    #[test]
    fn test_load_report_merge() {
        let mut report1 = LoadReport::new();
        report1.snapshot_loaded = true;
        report1.records_loaded = 10;

        let mut report2 = LoadReport::new();
        report2.records_loaded = 20;
        report2.records_rejected = 2;
        report2.add_warning("test", "warning");

        report1.merge(report2);

        assert!(report1.snapshot_loaded);
        assert_eq!(report1.records_loaded, 30);
        assert_eq!(report1.records_rejected, 2);
        assert_eq!(report1.errors.len(), 1);
    }

    #[test]
    fn test_not_found_display() {
        let err = CoreError::not_found(EntityKind::Officer, "abc");
        assert_eq!(err.to_string(), "Officer not found: abc");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_constraint_suggestion() {
        let err = CoreError::constraint(EntityKind::Farmer, "nationalId already registered");
        let load_error = LoadError::from_core_error("farmers", &err);
        assert_eq!(load_error.severity, ErrorSeverity::Error);
        assert!(load_error.suggestion.is_some());
        assert!(load_error.message.contains("nationalId"));
    }
}
