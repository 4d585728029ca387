//! Structured error types shared across primescape crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`ScapeError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Contextual key value pairs (values, sizes, names).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for the primescape pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum ScapeError {
    /// A precondition on an input value was violated.
    #[error("invalid input: {0}")]
    InvalidInput(ErrorInfo),
    /// A parallel worker terminated abnormally.
    #[error("worker failure: {0}")]
    WorkerFailure(ErrorInfo),
    /// Palette bucketing was requested without any property values.
    #[error("empty palette input: {0}")]
    EmptyPaletteInput(ErrorInfo),
    /// A record property name could not be resolved.
    #[error("unknown property: {0}")]
    UnknownProperty(ErrorInfo),
    /// A batch was stopped through its cancellation flag.
    #[error("cancelled: {0}")]
    Cancelled(ErrorInfo),
    /// Relational storage errors.
    #[error("store error: {0}")]
    Store(ErrorInfo),
    /// I/O and serialization errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl ScapeError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            ScapeError::InvalidInput(info)
            | ScapeError::WorkerFailure(info)
            | ScapeError::EmptyPaletteInput(info)
            | ScapeError::UnknownProperty(info)
            | ScapeError::Cancelled(info)
            | ScapeError::Store(info)
            | ScapeError::Serde(info) => info,
        }
    }

    /// Applies `f` to the payload, keeping the error family.
    pub fn map_info(self, f: impl FnOnce(ErrorInfo) -> ErrorInfo) -> Self {
        match self {
            ScapeError::InvalidInput(info) => ScapeError::InvalidInput(f(info)),
            ScapeError::WorkerFailure(info) => ScapeError::WorkerFailure(f(info)),
            ScapeError::EmptyPaletteInput(info) => ScapeError::EmptyPaletteInput(f(info)),
            ScapeError::UnknownProperty(info) => ScapeError::UnknownProperty(f(info)),
            ScapeError::Cancelled(info) => ScapeError::Cancelled(f(info)),
            ScapeError::Store(info) => ScapeError::Store(f(info)),
            ScapeError::Serde(info) => ScapeError::Serde(f(info)),
        }
    }

    /// Returns true for signals the caller is expected to handle as a normal
    /// outcome ("nothing to color") rather than as a failure.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ScapeError::EmptyPaletteInput(_))
    }

    /// Shorthand for an [`ScapeError::InvalidInput`] error.
    pub fn invalid_input(code: &str, message: impl Into<String>) -> Self {
        ScapeError::InvalidInput(ErrorInfo::new(code, message))
    }

    /// Shorthand for an [`ScapeError::Serde`] error wrapping any displayable cause.
    pub fn serde(code: &str, err: impl ToString) -> Self {
        ScapeError::Serde(ErrorInfo::new(code, err.to_string()))
    }
}
