//! Unified error handling for entigen.
//!
//! Validation failures keep their structured form so the caller can report
//! every offending key path; the rest of the pipeline reports plain messages.

use crate::validation::ValidationErrors;

/// Unified error type for entigen.
#[derive(Debug, Clone, thiserror::Error)]
pub enum Error {
    /// Configuration-related errors (bad input files, unsupported formats).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The configuration document did not match its schema.
    #[error("Validation failed:\n{0}")]
    Validation(#[from] ValidationErrors),

    /// Code generation errors.
    #[error("Code generation error: {0}")]
    Codegen(String),

    /// A referenced id or entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for convenience.
pub type Result<T> = std::result::Result<T, Error>;

#[macro_export]
macro_rules! config_err {
    ($msg:expr) => {
        $crate::error::Error::Config($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Config(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! codegen_err {
    ($msg:expr) => {
        $crate::error::Error::Codegen($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::Codegen(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! not_found_err {
    ($msg:expr) => {
        $crate::error::Error::NotFound($msg.into())
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::Error::NotFound(format!($fmt, $($arg)*))
    };
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn codegen(msg: impl Into<String>) -> Self {
        Self::Codegen(msg.into())
    }

    /// Returns the structured validation errors, if this is a validation failure.
    pub fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::{ValidationError, ValidationErrorKind};

    #[test]
    fn test_error_display() {
        let err = codegen_err!("variable {} has type {}", "t_boiler_sensor", "int");
        assert_eq!(
            err.to_string(),
            "Code generation error: variable t_boiler_sensor has type int"
        );

        let err = not_found_err!("opentherm_hub");
        assert!(err.to_string().contains("opentherm_hub"));
    }

    #[test]
    fn test_validation_errors_are_kept_structured() {
        let errors = ValidationErrors::from(vec![ValidationError::new(
            vec!["t_boiler".to_string(), "data_type".to_string()],
            ValidationErrorKind::InvalidOption {
                value: "f16".to_string(),
                options: vec!["f88".to_string()],
            },
        )]);
        let err: Error = errors.into();

        let inner = err.validation_errors().unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(inner.iter().next().unwrap().code(), "INVALID_OPTION");
        assert!(err.to_string().contains("t_boiler->data_type"));
    }
}
