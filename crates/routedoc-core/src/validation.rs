//! Request parameter validation against JSON Schemas.
//!
//! Validation happens in two phases:
//!
//! 1. **Registration** - [`ParameterValidator::compile`] turns every
//!    parameter schema into a compiled validator. Malformed schemas fail here,
//!    at startup, instead of on the first request.
//! 2. **Request** - [`ParameterValidator::validate`] pulls each parameter's
//!    value out of a [`ParameterSource`], applies the required/optional policy
//!    and runs the compiled validator. All parameters are checked, so one
//!    response can report every problem at once.
//!
//! Compiled validators hold no per-call state and can be shared freely
//! between concurrent requests.

use std::borrow::Cow;
use std::fmt;

use jsonschema::{Draft, Validator};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Result, RoutedocError};
use crate::types::{ParamLocation, Parameter};

/// Read access to the parts of a request parameters can live in.
pub trait ParameterSource {
    /// The parsed JSON body, or `None` when the request carried no body.
    fn body(&self) -> Option<&Value>;

    fn path_param(&self, name: &str) -> Option<&str>;

    fn query_param(&self, name: &str) -> Option<&str>;

    /// Header lookup; implementations must match names case-insensitively.
    fn header(&self, name: &str) -> Option<Cow<'_, str>>;
}

/// One diagnostic reported by the schema validator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaViolation {
    pub message: String,
    /// JSON pointer to the offending part of the value (empty for the root).
    pub instance_path: String,
}

/// A single parameter that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub parameter: String,
    #[serde(rename = "in")]
    pub location: ParamLocation,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<SchemaViolation>,
}

impl ValidationError {
    fn missing(parameter: &Parameter) -> Self {
        Self {
            message: format!(
                "missing required parameter `{}` in `{}`",
                parameter.name, parameter.location
            ),
            parameter: parameter.name.clone(),
            location: parameter.location,
            details: Vec::new(),
        }
    }

    fn invalid(parameter: &Parameter, details: Vec<SchemaViolation>) -> Self {
        Self {
            message: format!(
                "validation failed for parameter `{}` in `{}`",
                parameter.name, parameter.location
            ),
            parameter: parameter.name.clone(),
            location: parameter.location,
            details,
        }
    }
}

/// Aggregated outcome of validating every parameter of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    #[must_use]
    pub const fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    fn record(&mut self, error: Option<ValidationError>) {
        if let Some(error) = error {
            self.valid = false;
            self.errors.push(error);
        }
    }
}

/// Compiles parameter schemas with a fixed JSON Schema configuration.
///
/// Created once and reused for every route. Validators it builds report all
/// errors, not just the first one.
#[derive(Debug, Clone, Copy)]
pub struct ValidatorFactory {
    draft: Draft,
}

impl Default for ValidatorFactory {
    fn default() -> Self {
        Self {
            draft: Draft::Draft7,
        }
    }
}

impl ValidatorFactory {
    #[must_use]
    pub const fn with_draft(draft: Draft) -> Self {
        Self { draft }
    }

    /// Compiles a single parameter.
    ///
    /// Schema-less parameters are validated as plain strings, matching how
    /// they are documented.
    ///
    /// # Errors
    ///
    /// Returns [`RoutedocError::InvalidSchema`] if the schema does not compile.
    pub fn compile(&self, parameter: &Parameter) -> Result<CompiledParameter> {
        let default_schema;
        let schema = match &parameter.schema {
            Some(schema) => schema,
            None => {
                default_schema = json!({ "type": "string" });
                &default_schema
            }
        };

        let validator = jsonschema::options()
            .with_draft(self.draft)
            .build(schema)
            .map_err(|err| RoutedocError::InvalidSchema {
                parameter: parameter.name.clone(),
                location: parameter.location,
                reason: err.to_string(),
            })?;

        Ok(CompiledParameter {
            parameter: parameter.clone(),
            validator,
        })
    }
}

/// A parameter bundled with its compiled validator.
pub struct CompiledParameter {
    parameter: Parameter,
    validator: Validator,
}

impl fmt::Debug for CompiledParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledParameter")
            .field("parameter", &self.parameter)
            .finish_non_exhaustive()
    }
}

impl CompiledParameter {
    #[must_use]
    pub const fn parameter(&self) -> &Parameter {
        &self.parameter
    }

    fn extract<'a, S>(&self, source: &'a S) -> Option<Cow<'a, Value>>
    where
        S: ParameterSource + ?Sized,
    {
        let name = self.parameter.name.as_str();
        match self.parameter.location {
            ParamLocation::Body => source.body().map(Cow::Borrowed),
            ParamLocation::Path => source
                .path_param(name)
                .map(|value| Cow::Owned(Value::String(value.to_owned()))),
            ParamLocation::Query => source
                .query_param(name)
                .map(|value| Cow::Owned(Value::String(value.to_owned()))),
            ParamLocation::Header => source
                .header(name)
                .map(|value| Cow::Owned(Value::String(value.into_owned()))),
        }
    }

    /// Checks this parameter, returning an error if it is missing or invalid.
    pub fn check<S>(&self, source: &S) -> Option<ValidationError>
    where
        S: ParameterSource + ?Sized,
    {
        let Some(value) = self.extract(source) else {
            return self
                .parameter
                .required
                .then(|| ValidationError::missing(&self.parameter));
        };

        let details: Vec<SchemaViolation> = self
            .validator
            .iter_errors(&*value)
            .map(|err| SchemaViolation {
                message: err.to_string(),
                instance_path: err.instance_path.to_string(),
            })
            .collect();

        if details.is_empty() {
            None
        } else {
            Some(ValidationError::invalid(&self.parameter, details))
        }
    }
}

/// The compiled parameter set of one route.
#[derive(Debug, Default)]
pub struct ParameterValidator {
    parameters: Vec<CompiledParameter>,
}

impl ParameterValidator {
    /// Compiles all parameters of a route.
    ///
    /// # Errors
    ///
    /// Fails on the first parameter whose schema does not compile.
    pub fn compile(factory: &ValidatorFactory, parameters: &[Parameter]) -> Result<Self> {
        let parameters = parameters
            .iter()
            .map(|parameter| factory.compile(parameter))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { parameters })
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    #[must_use]
    pub fn parameters(&self) -> &[CompiledParameter] {
        &self.parameters
    }

    /// Validates every parameter against the request.
    ///
    /// Errors are reported in parameter declaration order.
    pub fn validate<S>(&self, source: &S) -> ValidationResult
    where
        S: ParameterSource + ?Sized,
    {
        let mut result = ValidationResult::ok();
        for compiled in &self.parameters {
            result.record(compiled.check(source));
        }
        if !result.valid {
            tracing::debug!(errors = result.errors.len(), "Request parameters failed validation");
        }
        result
    }
}
