//! Error types for editor operations.
//!
//! Two layers live here. [`CanvasError`] covers failures of canvas operations
//! (unknown item, wrong item kind). [`AppError`] is the application-wide
//! taxonomy shared by storage, network and submission code: a tagged error
//! carrying its [`ErrorKind`], a message and the [`SourceLocation`] where it
//! was raised.

use std::fmt;

use thiserror::Error;

/// Result type for canvas operations.
pub type CanvasResult<T> = Result<T, CanvasError>;

/// Errors that can occur in canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    /// Item not found on the canvas.
    #[error("Item not found: {0}")]
    ItemNotFound(String),

    /// Operation not valid for this item.
    #[error("Invalid operation on item: {0}")]
    InvalidOperation(String),

    /// A deletion was confirmed that is no longer pending.
    #[error("No deletion pending for item: {0}")]
    NoPendingDeletion(String),
}

/// Where an [`AppError`] was raised.
///
/// Built with the [`location!`](crate::location) macro at the raise site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file.
    pub file: &'static str,
    /// Line number.
    pub line: u32,
    /// Module path of the raising code.
    pub module: &'static str,
}

impl SourceLocation {
    /// Create a location from its parts.
    #[must_use]
    pub const fn new(file: &'static str, line: u32, module: &'static str) -> Self {
        Self { file, line, module }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} ({})", self.file, self.line, self.module)
    }
}

/// Capture the current [`SourceLocation`].
#[macro_export]
macro_rules! location {
    () => {
        $crate::error::SourceLocation::new(file!(), line!(), module_path!())
    };
}

/// Category of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required optional value was absent.
    Nil,
    /// The remote service answered with a non-success code.
    Service {
        /// Numeric status or envelope code.
        code: i32,
    },
    /// The caller is not authenticated.
    Unauthenticated,
    /// An operation was attempted in a state that does not allow it.
    Illegal,
    /// Any other runtime failure.
    Runtime,
}

impl ErrorKind {
    /// Short label used in user-facing messages.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Nil => "Nil",
            Self::Service { .. } => "Service",
            Self::Unauthenticated => "Unauthenticated",
            Self::Illegal => "Illegal",
            Self::Runtime => "Runtime",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service { code } => write!(f, "Service({code})"),
            other => f.write_str(other.label()),
        }
    }
}

/// Application error with category, message and raise site.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message} (at {location})")]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    location: SourceLocation,
}

impl AppError {
    /// Create an error of the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>, location: SourceLocation) -> Self {
        Self {
            kind,
            message: message.into(),
            location,
        }
    }

    /// A required value was missing.
    #[must_use]
    pub fn nil(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Nil, message, location)
    }

    /// Non-success answer from the remote service.
    ///
    /// The stored message is formatted as `[code]: message`.
    #[must_use]
    pub fn service(code: i32, message: &str, location: SourceLocation) -> Self {
        Self::new(
            ErrorKind::Service { code },
            format!("[{code}]: {message}"),
            location,
        )
    }

    /// Caller is not authenticated.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Unauthenticated, message, location)
    }

    /// Operation not allowed in the current state.
    #[must_use]
    pub fn illegal(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Illegal, message, location)
    }

    /// Generic runtime failure.
    #[must_use]
    pub fn runtime(message: impl Into<String>, location: SourceLocation) -> Self {
        Self::new(ErrorKind::Runtime, message, location)
    }

    /// The error category.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The error message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Where the error was raised.
    #[must_use]
    pub fn location(&self) -> SourceLocation {
        self.location
    }

    /// The service code, if this is a service error.
    #[must_use]
    pub fn service_code(&self) -> Option<i32> {
        match self.kind {
            ErrorKind::Service { code } => Some(code),
            _ => None,
        }
    }

    /// Message suitable for showing to the user.
    ///
    /// Debug builds include the category; release builds only expose service
    /// messages and hide everything else behind a generic text.
    #[must_use]
    pub fn user_message(&self) -> String {
        if cfg!(debug_assertions) {
            format!("POD {} Error: {}", self.kind.label(), self.message)
        } else if matches!(self.kind, ErrorKind::Service { .. }) {
            self.message.clone()
        } else {
            GENERIC_USER_MESSAGE.to_string()
        }
    }

    /// Emit this error as a structured `warn` record.
    pub fn trace_warn(&self, context: &str) {
        tracing::warn!(
            kind = %self.kind,
            file = self.location.file,
            line = self.location.line,
            module = self.location.module,
            message = %self.message,
            "{context}"
        );
    }

    /// Emit this error as a structured `error` record.
    pub fn trace_error(&self, context: &str) {
        tracing::error!(
            kind = %self.kind,
            file = self.location.file,
            line = self.location.line,
            module = self.location.module,
            message = %self.message,
            "{context}"
        );
    }
}

/// Shown to users in release builds for non-service failures.
pub const GENERIC_USER_MESSAGE: &str = "An error has occurred";

/// Turn an absent optional value into a [`ErrorKind::Nil`] error.
pub trait Require<T> {
    /// Return the value, or a nil error raised at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Nil`] when the value is absent.
    fn require(self, location: SourceLocation) -> Result<T, AppError>;
}

impl<T> Require<T> for Option<T> {
    fn require(self, location: SourceLocation) -> Result<T, AppError> {
        self.ok_or_else(|| AppError::nil("Value is required.", location))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_present_value() {
        let value = Some(7).require(crate::location!()).expect("present");
        assert_eq!(value, 7);
    }

    #[test]
    fn test_require_missing_value_records_location() {
        let err = None::<u8>.require(crate::location!()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Nil);
        assert!(err.location().file.ends_with("error.rs"));
        assert!(err.location().module.contains("error"));
        assert!(err.location().line > 0);
    }

    #[test]
    fn test_service_error_formats_code() {
        let err = AppError::service(500, "Something went wrong", crate::location!());
        assert_eq!(err.service_code(), Some(500));
        assert_eq!(err.message(), "[500]: Something went wrong");
        assert!(err.to_string().contains("Service(500)"));
    }

    #[test]
    fn test_non_service_errors_have_no_code() {
        let err = AppError::illegal("busy", crate::location!());
        assert_eq!(err.service_code(), None);
        assert_eq!(err.kind().label(), "Illegal");
    }

    #[test]
    fn test_user_message_in_debug_includes_category() {
        let err = AppError::runtime("disk full", crate::location!());
        if cfg!(debug_assertions) {
            assert_eq!(err.user_message(), "POD Runtime Error: disk full");
        } else {
            assert_eq!(err.user_message(), GENERIC_USER_MESSAGE);
        }
    }
}
