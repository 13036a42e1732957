//! # routedoc-core
//!
//! Core logic for routedoc: declarative route metadata turned into request
//! validators and API documents.
//!
//! This crate provides:
//! - Route metadata types (methods, parameters, operation docs)
//! - Path conversion from `:name` to `{name}` syntax, plus the routing form
//!   of each path
//! - JSON Schema to legacy document schema conversion
//! - Parameter validation with compiled JSON Schema validators
//! - API document generation in the legacy and modern dialects
//! - Layered runtime configuration
//!
//! ## Architecture
//!
//! - [`types`] - Route metadata shared by every other module
//! - [`path`] - Route path conversion and routing patterns
//! - [`schema`] - Schema and parameter conversion for legacy documents
//! - [`validation`] - Registration-time schema compilation and request validation
//! - [`document`] - Document generation from routes and a base document
//! - [`config`] - Settings loading and validation
//! - [`error`] - Unified error types for the crate
//!
//! The HTTP side (handlers, pipelines, routers) lives in `routedoc-server`.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod document;
pub mod error;
pub mod path;
pub mod schema;
pub mod types;
pub mod validation;

// Re-export primary types for convenience
pub use config::{
    BodySettings, DocsSettings, LoggingSettings, ServerSettings, Settings, DEFAULT_BODY_LIMIT,
};
pub use document::{generate_document, ApiDocument, BaseDocument, Dialect};
pub use error::{Result, RoutedocError};
pub use path::{convert_path, RoutePattern};
pub use schema::{convert_parameters, convert_schema, UNSUPPORTED_KEYWORDS};
pub use types::{HttpMethod, OperationMetadata, ParamLocation, Parameter, RouteInfo};
pub use validation::{
    CompiledParameter, ParameterSource, ParameterValidator, SchemaViolation, ValidationError,
    ValidationResult, ValidatorFactory,
};
