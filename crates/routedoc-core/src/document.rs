//! API document generation.
//!
//! Two dialects are supported:
//!
//! - **Legacy** (Swagger 2.0): operations are assembled from route metadata,
//!   parameters are converted to the legacy schema subset and every operation
//!   documents a `400 Validation failed` response.
//! - **Modern** (OpenAPI 3.x): operations are copied verbatim from route
//!   metadata.
//!
//! A generated [`ApiDocument`] is a snapshot. Routes registered afterwards are
//! not reflected in it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::error::{Result, RoutedocError};
use crate::path::convert_path;
use crate::schema::convert_parameters;
use crate::types::{HttpMethod, RouteInfo};

/// Base-document keys carried over into modern documents.
const OPENAPI_BASE_KEYS: [&str; 7] = [
    "openapi",
    "info",
    "servers",
    "components",
    "security",
    "tags",
    "externalDocs",
];

/// Document dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Swagger 2.0.
    #[default]
    Legacy,
    /// OpenAPI 3.x.
    Modern,
}

impl Dialect {
    /// File name the raw document is served under.
    #[must_use]
    pub const fn docs_filename(self) -> &'static str {
        match self {
            Self::Legacy => "swagger.json",
            Self::Modern => "openapi.json",
        }
    }
}

/// Everything in a document that does not come from routes.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseDocument {
    dialect: Dialect,
    fields: Map<String, Value>,
}

impl BaseDocument {
    /// Starts a legacy (Swagger 2.0) base document.
    ///
    /// # Errors
    ///
    /// Fails if `info` does not serialize to a JSON object.
    pub fn swagger(info: &utoipa::openapi::Info) -> Result<Self> {
        let info = serde_json::to_value(info)?;
        if !info.is_object() {
            return Err(RoutedocError::InvalidBaseDocument(
                "info must be an object".into(),
            ));
        }

        let mut fields = Map::new();
        fields.insert("swagger".into(), json!("2.0"));
        fields.insert("basePath".into(), json!("/"));
        fields.insert("info".into(), info);
        fields.insert("consumes".into(), json!(["application/json"]));
        fields.insert("produces".into(), json!(["application/json"]));
        Ok(Self {
            dialect: Dialect::Legacy,
            fields,
        })
    }

    /// Builds a modern base document from a utoipa [`OpenApi`](utoipa::openapi::OpenApi).
    ///
    /// Only the top-level metadata is kept; any paths already present are
    /// dropped, since operations come from routes.
    ///
    /// # Errors
    ///
    /// Fails if the document does not serialize to a JSON object.
    pub fn openapi(openapi: &utoipa::openapi::OpenApi) -> Result<Self> {
        let Value::Object(mut source) = serde_json::to_value(openapi)? else {
            return Err(RoutedocError::InvalidBaseDocument(
                "OpenAPI document must be an object".into(),
            ));
        };

        let fields = OPENAPI_BASE_KEYS
            .iter()
            .filter_map(|key| source.remove(*key).map(|value| ((*key).to_string(), value)))
            .collect();
        Ok(Self {
            dialect: Dialect::Modern,
            fields,
        })
    }

    /// Sets the legacy `host` field.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.fields.insert("host".into(), Value::String(host.into()));
        self
    }

    /// Sets the legacy `basePath` field (defaults to `/`).
    #[must_use]
    pub fn base_path(mut self, base_path: impl Into<String>) -> Self {
        self.fields
            .insert("basePath".into(), Value::String(base_path.into()));
        self
    }

    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    #[must_use]
    pub const fn docs_filename(&self) -> &'static str {
        self.dialect.docs_filename()
    }
}

/// A generated API document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ApiDocument(Value);

impl ApiDocument {
    #[must_use]
    pub const fn as_value(&self) -> &Value {
        &self.0
    }

    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Looks up the operation registered for a path (either syntax) and method.
    #[must_use]
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&Value> {
        self.0
            .get("paths")?
            .get(convert_path(path))?
            .get(method.as_str())
    }

    /// # Errors
    ///
    /// Fails only if serialization fails, which a `Value` cannot do in practice.
    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

/// Generates a document from a base document and routes.
///
/// Each route contributes one operation at its converted path under its
/// lowercase method. When several routes share a path and method, the last
/// one wins.
pub fn generate_document<'a, I>(base: &BaseDocument, routes: I) -> ApiDocument
where
    I: IntoIterator<Item = &'a RouteInfo>,
{
    let mut paths = Map::new();
    for route in routes {
        let operation = match base.dialect {
            Dialect::Legacy => legacy_operation(route),
            Dialect::Modern => Value::Object(route.operation.clone()),
        };
        let entry = paths
            .entry(route.document_path())
            .or_insert_with(|| Value::Object(Map::new()));
        if let Value::Object(methods) = entry {
            if methods
                .insert(route.method.as_str().to_string(), operation)
                .is_some()
            {
                tracing::warn!(
                    method = %route.method,
                    path = %route.path,
                    "Duplicate route, later registration replaces the earlier operation"
                );
            }
        }
    }

    let mut document = base.fields.clone();
    document.insert("paths".into(), Value::Object(paths));
    ApiDocument(Value::Object(document))
}

fn legacy_operation(route: &RouteInfo) -> Value {
    let mut operation = route.operation.clone();

    operation
        .entry("tags")
        .or_insert_with(|| Value::Array(Vec::new()));
    operation.insert(
        "parameters".into(),
        Value::Array(convert_parameters(&route.parameters)),
    );

    let mut responses = match operation.remove("responses") {
        Some(Value::Object(responses)) => responses,
        _ => Map::new(),
    };
    responses.insert("400".into(), json!({ "description": "Validation failed" }));
    operation.insert("responses".into(), Value::Object(responses));

    Value::Object(operation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Parameter;
    use utoipa::openapi::{Info, OpenApiBuilder};

    fn info() -> Info {
        Info::new("api", "1.0.0")
    }

    fn route(method: HttpMethod, path: &str, operation: Value) -> RouteInfo {
        let mut route = RouteInfo::new(method, path);
        if let Value::Object(operation) = operation {
            route.operation = operation;
        }
        route
    }

    #[test]
    fn test_legacy_document_shape() {
        let base = BaseDocument::swagger(&info()).unwrap().host("example.com");
        let mut first = route(
            HttpMethod::Post,
            "/path/:one",
            json!({
                "operationId": "operation id one",
                "description": "path one",
                "tags": ["tag"],
                "responses": { "200": { "description": "ok" } }
            }),
        );
        first.parameters = vec![Parameter::body("param").schema(json!({ "type": "object" }))];
        let mut second = route(
            HttpMethod::Put,
            "/path/:two",
            json!({ "description": "path two", "responses": { "200": { "description": "ok" } } }),
        );
        second.parameters = vec![Parameter::query("param")];

        let document = generate_document(&base, [&first, &second]).into_value();

        assert_eq!(document["swagger"], "2.0");
        assert_eq!(document["host"], "example.com");
        assert_eq!(document["basePath"], "/");
        assert_eq!(document["info"]["title"], "api");
        assert_eq!(document["consumes"], json!(["application/json"]));
        assert_eq!(document["produces"], json!(["application/json"]));
        assert_eq!(
            document["paths"]["/path/{one}"]["post"],
            json!({
                "operationId": "operation id one",
                "description": "path one",
                "tags": ["tag"],
                "parameters": [{
                    "name": "param",
                    "in": "body",
                    "schema": { "type": "object" },
                    "x-schema": { "type": "object" }
                }],
                "responses": {
                    "200": { "description": "ok" },
                    "400": { "description": "Validation failed" }
                }
            })
        );
        assert_eq!(
            document["paths"]["/path/{two}"]["put"],
            json!({
                "description": "path two",
                "tags": [],
                "parameters": [{ "name": "param", "in": "query", "type": "string" }],
                "responses": {
                    "200": { "description": "ok" },
                    "400": { "description": "Validation failed" }
                }
            })
        );
    }

    #[test]
    fn test_modern_document_passes_operations_verbatim() {
        let openapi = OpenApiBuilder::new().info(info()).build();
        let base = BaseDocument::openapi(&openapi).unwrap();
        let operation = json!({ "responses": { "200": { "description": "ok" } }, "x-custom": 1 });
        let first = route(HttpMethod::Get, "/users/:id", operation.clone());

        let document = generate_document(&base, [&first]);
        assert_eq!(document.as_value()["info"]["version"], "1.0.0");
        assert!(document.as_value()["openapi"].is_string());
        assert_eq!(document.operation("/users/:id", HttpMethod::Get), Some(&operation));
        assert_eq!(base.docs_filename(), "openapi.json");
    }

    #[test]
    fn test_same_path_different_methods_share_entry() {
        let base = BaseDocument::openapi(&OpenApiBuilder::new().info(info()).build()).unwrap();
        let get = route(HttpMethod::Get, "/pets", json!({ "operationId": "list" }));
        let post = route(HttpMethod::Post, "/pets", json!({ "operationId": "create" }));

        let document = generate_document(&base, [&get, &post]).into_value();
        let methods = document["paths"]["/pets"].as_object().unwrap();
        assert_eq!(methods.len(), 2);
    }

    #[test]
    fn test_duplicate_routes_last_registration_wins() {
        let base = BaseDocument::openapi(&OpenApiBuilder::new().info(info()).build()).unwrap();
        let first = route(HttpMethod::Get, "/pets", json!({ "operationId": "first" }));
        let second = route(HttpMethod::Get, "/pets", json!({ "operationId": "second" }));

        let document = generate_document(&base, [&first, &second]);
        let methods = document.as_value()["paths"]["/pets"].as_object().unwrap();
        assert_eq!(methods.len(), 1);
        assert_eq!(
            document.operation("/pets", HttpMethod::Get),
            Some(&json!({ "operationId": "second" }))
        );
    }

    #[test]
    fn test_legacy_filename() {
        assert_eq!(BaseDocument::swagger(&info()).unwrap().docs_filename(), "swagger.json");
    }
}
