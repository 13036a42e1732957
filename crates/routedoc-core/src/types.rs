//! Route metadata shared by document generation, validation and the server.
//!
//! These types describe *what* a route is (method, path, parameters and
//! operation docs). Handlers and middleware live in `routedoc-server`, which
//! wraps a [`RouteInfo`] into a full route descriptor.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, RoutedocError};

/// HTTP verbs a route can be registered for, WebDAV extensions included.
///
/// Parsing is case-insensitive; the canonical rendering is lowercase, which
/// is also the key used for operations in generated documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Checkout,
    Connect,
    Copy,
    Lock,
    Merge,
    Mkactivity,
    Mkcol,
    Move,
    #[serde(rename = "m-search")]
    MSearch,
    Notify,
    Propfind,
    Proppatch,
    Purge,
    Report,
    Search,
    Subscribe,
    Trace,
    Unlock,
    Unsubscribe,
}

impl HttpMethod {
    /// Every supported method, in declaration order.
    pub const ALL: [Self; 26] = [
        Self::Get,
        Self::Post,
        Self::Put,
        Self::Delete,
        Self::Patch,
        Self::Options,
        Self::Head,
        Self::Checkout,
        Self::Connect,
        Self::Copy,
        Self::Lock,
        Self::Merge,
        Self::Mkactivity,
        Self::Mkcol,
        Self::Move,
        Self::MSearch,
        Self::Notify,
        Self::Propfind,
        Self::Proppatch,
        Self::Purge,
        Self::Report,
        Self::Search,
        Self::Subscribe,
        Self::Trace,
        Self::Unlock,
        Self::Unsubscribe,
    ];

    /// Lowercase method name, as used in API documents.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
            Self::Options => "options",
            Self::Head => "head",
            Self::Checkout => "checkout",
            Self::Connect => "connect",
            Self::Copy => "copy",
            Self::Lock => "lock",
            Self::Merge => "merge",
            Self::Mkactivity => "mkactivity",
            Self::Mkcol => "mkcol",
            Self::Move => "move",
            Self::MSearch => "m-search",
            Self::Notify => "notify",
            Self::Propfind => "propfind",
            Self::Proppatch => "proppatch",
            Self::Purge => "purge",
            Self::Report => "report",
            Self::Search => "search",
            Self::Subscribe => "subscribe",
            Self::Trace => "trace",
            Self::Unlock => "unlock",
            Self::Unsubscribe => "unsubscribe",
        }
    }

    /// Method token as it appears on the wire (uppercase).
    #[must_use]
    pub fn wire_name(self) -> String {
        self.as_str().to_ascii_uppercase()
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = RoutedocError;

    fn from_str(s: &str) -> Result<Self> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|method| method.as_str() == lowered)
            .ok_or_else(|| RoutedocError::UnsupportedMethod(s.to_string()))
    }
}

/// Where a parameter's value is read from on an incoming request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamLocation {
    Body,
    Path,
    Query,
    Header,
}

impl ParamLocation {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Path => "path",
            Self::Query => "query",
            Self::Header => "header",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A route parameter and the JSON Schema its value must satisfy.
///
/// A parameter without a schema is treated as a plain string, both in the
/// generated document and when validating requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,

    #[serde(rename = "in")]
    pub location: ParamLocation,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<Value>,
}

impl Parameter {
    /// Creates an optional, schema-less parameter.
    pub fn new(name: impl Into<String>, location: ParamLocation) -> Self {
        Self {
            name: name.into(),
            location,
            required: false,
            description: None,
            schema: None,
        }
    }

    /// Shorthand for a body parameter.
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Body)
    }

    /// Shorthand for a path parameter. Path parameters are always required.
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Path).required()
    }

    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Query)
    }

    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name, ParamLocation::Header)
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(schema);
        self
    }
}

/// Free-form operation documentation (description, tags, responses, ...).
///
/// The content is merged into generated documents as-is; only the legacy
/// dialect adds a `400 Validation failed` response to it.
pub type OperationMetadata = Map<String, Value>;

/// Everything about a route except the code that serves it.
///
/// This is the projection attached to in-flight requests, so middleware and
/// error handlers can tell which route matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub operation: OperationMetadata,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl RouteInfo {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            operation: OperationMetadata::new(),
            parameters: Vec::new(),
        }
    }

    /// The path in document/router syntax (`{name}` captures).
    #[must_use]
    pub fn document_path(&self) -> String {
        crate::path::convert_path(&self.path)
    }
}
