//! Validation Error Types

use std::fmt;
use thiserror::Error;

/// A single failing field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Missing or blank required field
    #[error("{field}: {message}")]
    Required {
        field: &'static str,
        message: &'static str,
    },

    /// Present but malformed field
    #[error("{field}: {message}")]
    Invalid {
        field: &'static str,
        message: &'static str,
    },
}

impl ValidationError {
    /// Wire name of the failing field
    pub fn field(&self) -> &'static str {
        match self {
            Self::Required { field, .. } | Self::Invalid { field, .. } => field,
        }
    }

    /// Human readable message
    pub fn message(&self) -> &'static str {
        match self {
            Self::Required { message, .. } | Self::Invalid { message, .. } => message,
        }
    }
}

/// Every failing field of one record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ValidationErrors {
    entity: &'static str,
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub(crate) fn new(entity: &'static str) -> Self {
        Self {
            entity,
            errors: Vec::new(),
        }
    }

    pub(crate) fn push(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub(crate) fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, Self> {
        if self.errors.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }

    /// The failing fields, in declaration order
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Message for one field, if it failed
    pub fn for_field(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field() == field)
            .map(ValidationError::message)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation failed: ", self.entity)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}
