//! Error types for Strata domain values.
//!
//! These errors cover input validation and conversion between
//! configuration documents and their text form. They carry no notion
//! of remote storage; the repository engine wraps them into its own
//! error type at the boundary.
//!
//! # Example
//!
//! ```
//! use strata_core::{CoreError, Result};
//!
//! fn require_name(name: &str) -> Result<&str> {
//!     if name.is_empty() {
//!         return Err(CoreError::invalid_application(name, "name cannot be empty"));
//!     }
//!     Ok(name)
//! }
//!
//! assert!(require_name("").unwrap_err().is_invalid_input());
//! ```

use thiserror::Error;

/// Main error type for domain-level operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Application name is invalid or empty.
    #[error("invalid application name '{name}': {reason}")]
    InvalidApplication {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Environment name is invalid.
    #[error("invalid environment name '{name}': {reason}")]
    InvalidEnvironment {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Text could not be parsed into a configuration document.
    #[error("failed to parse '{source_name}': {message}")]
    Parse {
        /// File or stream the text came from
        source_name: String,
        /// Parser diagnostic
        message: String,
    },

    /// A configuration document could not be rendered.
    #[error("failed to serialize configuration as {target}: {message}")]
    Serialize {
        /// Output format
        target: String,
        /// Serializer diagnostic
        message: String,
    },
}

impl CoreError {
    pub fn invalid_application(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidApplication {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_environment(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnvironment {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn serialize(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Serialize {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Returns true for rejected identifiers.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidApplication { .. } | Self::InvalidEnvironment { .. }
        )
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    pub fn is_serialize(&self) -> bool {
        matches!(self, Self::Serialize { .. })
    }
}

/// Result alias for domain operations.
pub type Result<T> = std::result::Result<T, CoreError>;
