//! Unified error types for the routedoc core library.
//!
//! [`RoutedocError`] covers the failures that happen *outside* a request:
//! registering routes, compiling schemas, loading configuration. Client input
//! problems (missing or invalid parameters) are not errors at this level;
//! they are reported as a [`ValidationResult`](crate::validation::ValidationResult).
//!
//! # Example
//!
//! ```rust
//! use routedoc_core::error::{Result, RoutedocError};
//!
//! fn check_limit(limit: usize) -> Result<()> {
//!     if limit == 0 {
//!         return Err(RoutedocError::ConfigValidation("body limit must be positive".into()));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

use crate::types::ParamLocation;

/// The unified error type for routedoc operations.
#[derive(Debug, Error)]
pub enum RoutedocError {
    // =========================================================================
    // REGISTRATION ERRORS
    // =========================================================================
    /// A parameter schema could not be compiled into a validator.
    #[error("Invalid schema for parameter `{parameter}` in `{location}`: {reason}")]
    InvalidSchema {
        /// Parameter name.
        parameter: String,
        /// Parameter location.
        location: ParamLocation,
        /// Compiler diagnostic.
        reason: String,
    },

    /// A method name outside the supported set.
    #[error("Unsupported HTTP method: '{0}'")]
    UnsupportedMethod(String),

    /// A route path the router cannot mount.
    #[error("Invalid route path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The base document could not be turned into a JSON object.
    #[error("Invalid base document: {0}")]
    InvalidBaseDocument(String),

    /// A route source failed to produce its routes.
    #[error("Failed to load routes from {source_name}: {reason}")]
    RouteSource {
        /// Human-readable name of the source.
        source_name: String,
        /// Why loading failed.
        reason: String,
    },

    // =========================================================================
    // REQUEST-TIME FAILURES
    // =========================================================================
    /// A handler, middleware or error handler panicked.
    #[error("Handler panicked: {0}")]
    HandlerPanicked(String),

    // =========================================================================
    // CONFIGURATION ERRORS
    // =========================================================================
    /// Configuration sources could not be read or deserialized.
    #[error("Failed to load configuration: {0}")]
    ConfigLoad(#[from] config::ConfigError),

    /// Configuration was read but contains invalid values.
    #[error("Configuration validation failed: {0}")]
    ConfigValidation(String),

    // =========================================================================
    // SERIALIZATION
    // =========================================================================
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized [`Result`] type for routedoc operations.
pub type Result<T> = std::result::Result<T, RoutedocError>;

impl RoutedocError {
    /// Returns `true` if this error happened while registering routes.
    ///
    /// These errors are meant to abort startup.
    #[inline]
    #[must_use]
    pub const fn is_registration_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSchema { .. }
                | Self::UnsupportedMethod(_)
                | Self::InvalidPath { .. }
                | Self::InvalidBaseDocument(_)
                | Self::RouteSource { .. }
        )
    }

    #[inline]
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigLoad(_) | Self::ConfigValidation(_))
    }

    /// Returns a machine-readable error code.
    #[inline]
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidSchema { .. } => "INVALID_SCHEMA",
            Self::UnsupportedMethod(_) => "UNSUPPORTED_METHOD",
            Self::InvalidPath { .. } => "INVALID_PATH",
            Self::InvalidBaseDocument(_) => "INVALID_BASE_DOCUMENT",
            Self::RouteSource { .. } => "ROUTE_SOURCE",
            Self::HandlerPanicked(_) => "HANDLER_PANICKED",
            Self::ConfigLoad(_) => "CONFIG_LOAD",
            Self::ConfigValidation(_) => "CONFIG_VALIDATION",
            Self::Json(_) => "JSON",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_schema_message_names_parameter() {
        let err = RoutedocError::InvalidSchema {
            parameter: "pet".into(),
            location: ParamLocation::Body,
            reason: "bad type".into(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid schema for parameter `pet` in `body`: bad type"
        );
        assert!(err.is_registration_error());
        assert_eq!(err.error_code(), "INVALID_SCHEMA");
    }

    #[test]
    fn test_error_classification() {
        assert!(RoutedocError::ConfigValidation("x".into()).is_config_error());
        assert!(!RoutedocError::HandlerPanicked("boom".into()).is_registration_error());
    }
}
