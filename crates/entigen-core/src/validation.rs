//! Validation error taxonomy.
//!
//! Every error carries the key path from the document root to the offending
//! value, so the host can point the user at the exact configuration entry.

use std::collections::HashMap;
use std::fmt;

/// What went wrong with a single configuration value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationErrorKind {
    #[error("extra keys not allowed")]
    UnknownKey,

    #[error("required key not provided")]
    MissingRequired,

    #[error("unknown value '{value}', valid options are {}", quote_all(options))]
    InvalidOption { value: String, options: Vec<String> },

    #[error("expected {expected}, got {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("value {value} is out of range [{min}, {max}]")]
    OutOfRange { value: i64, min: i64, max: i64 },

    #[error("invalid value '{value}': {reason}")]
    InvalidFormat { value: String, reason: String },
}

fn quote_all(options: &[String]) -> String {
    options
        .iter()
        .map(|o| format!("'{}'", o))
        .collect::<Vec<_>>()
        .join(", ")
}

/// A single validation failure at a key path.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub path: Vec<String>,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(path: Vec<String>, kind: ValidationErrorKind) -> Self {
        Self { path, kind }
    }

    /// Get error code for client handling.
    pub fn code(&self) -> &'static str {
        match self.kind {
            ValidationErrorKind::UnknownKey => "UNKNOWN_KEY",
            ValidationErrorKind::MissingRequired => "MISSING_REQUIRED",
            ValidationErrorKind::InvalidOption { .. } => "INVALID_OPTION",
            ValidationErrorKind::TypeMismatch { .. } => "TYPE_MISMATCH",
            ValidationErrorKind::OutOfRange { .. } => "OUT_OF_RANGE",
            ValidationErrorKind::InvalidFormat { .. } => "INVALID_FORMAT",
        }
    }

    /// Get error details as a map.
    pub fn details(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("path".to_string(), self.path_string());
        match &self.kind {
            ValidationErrorKind::InvalidOption { value, options } => {
                map.insert("value".to_string(), value.clone());
                map.insert("options".to_string(), options.join(","));
            }
            ValidationErrorKind::TypeMismatch { expected, found } => {
                map.insert("expected".to_string(), expected.to_string());
                map.insert("found".to_string(), found.to_string());
            }
            ValidationErrorKind::OutOfRange { value, min, max } => {
                map.insert("value".to_string(), value.to_string());
                map.insert("min".to_string(), min.to_string());
                map.insert("max".to_string(), max.to_string());
            }
            ValidationErrorKind::InvalidFormat { value, reason } => {
                map.insert("value".to_string(), value.clone());
                map.insert("reason".to_string(), reason.clone());
            }
            ValidationErrorKind::UnknownKey | ValidationErrorKind::MissingRequired => {}
        }
        map
    }

    /// Key path rendered as `a->b->c`.
    pub fn path_string(&self) -> String {
        self.path.join("->")
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "[{}] {}", self.path_string(), self.kind)
        }
    }
}

impl std::error::Error for ValidationError {}

/// All failures found while validating one document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors(Vec<ValidationError>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: ValidationError) {
        self.0.push(error);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Errors whose path starts with the given prefix.
    pub fn at<'a>(&'a self, prefix: &'a [&str]) -> impl Iterator<Item = &'a ValidationError> {
        self.0.iter().filter(move |e| {
            e.path.len() >= prefix.len() && e.path.iter().zip(prefix).all(|(a, b)| a == b)
        })
    }
}

impl From<Vec<ValidationError>> for ValidationErrors {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self(errors)
    }
}

impl IntoIterator for ValidationErrors {
    type Item = ValidationError;
    type IntoIter = std::vec::IntoIter<ValidationError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_invalid_option_message_lists_valid_set() {
        let err = ValidationError::new(
            path(&["t_boiler", "data_type"]),
            ValidationErrorKind::InvalidOption {
                value: "u32".to_string(),
                options: vec!["u16".to_string(), "s16".to_string()],
            },
        );

        assert_eq!(
            err.to_string(),
            "[t_boiler->data_type] unknown value 'u32', valid options are 'u16', 's16'"
        );
        assert_eq!(err.details().get("value").unwrap(), "u32");
        assert_eq!(err.details().get("options").unwrap(), "u16,s16");
    }

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ValidationErrorKind::UnknownKey,
            ValidationErrorKind::MissingRequired,
            ValidationErrorKind::InvalidOption {
                value: String::new(),
                options: vec![],
            },
            ValidationErrorKind::TypeMismatch {
                expected: "string",
                found: "integer",
            },
            ValidationErrorKind::OutOfRange {
                value: 9,
                min: 0,
                max: 6,
            },
            ValidationErrorKind::InvalidFormat {
                value: String::new(),
                reason: String::new(),
            },
        ];
        let codes: std::collections::HashSet<_> = kinds
            .into_iter()
            .map(|k| ValidationError::new(vec![], k).code())
            .collect();
        assert_eq!(codes.len(), 6);
    }

    #[test]
    fn test_errors_at_prefix() {
        let errors = ValidationErrors::from(vec![
            ValidationError::new(path(&["sensor", "a"]), ValidationErrorKind::UnknownKey),
            ValidationError::new(
                path(&["opentherm", "in_pin"]),
                ValidationErrorKind::MissingRequired,
            ),
        ]);

        assert_eq!(errors.at(&["sensor"]).count(), 1);
        assert_eq!(errors.at(&["opentherm", "in_pin"]).count(), 1);
        assert_eq!(errors.at(&["hub"]).count(), 0);
    }
}
