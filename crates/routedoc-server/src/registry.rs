//! Route registration and router generation.
//!
//! A [`RouteRegistry`] goes through two phases. While routes, shared
//! middleware and shared error handlers are being added, nothing is built.
//! [`RouteRegistry::generate_document`] and [`RouteRegistry::generate_router`]
//! then snapshot the current registrations; later additions only show up in
//! later generations.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{MethodFilter, MethodRouter};
use axum::Router;
use routedoc_core::{
    generate_document, ApiDocument, BaseDocument, HttpMethod, Parameter, Result, RouteInfo,
    RoutedocError, Settings, ValidatorFactory, DEFAULT_BODY_LIMIT,
};
use serde_json::Value;
use tower_http::decompression::RequestDecompressionLayer;

use crate::docs::DocServer;
use crate::handler::{ErrorHandler, Handler, Middleware};
use crate::pipeline::{Candidates, Pipeline, SharedSteps};

/// One route: metadata plus the steps that serve it.
#[derive(Debug, Clone)]
pub struct RouteDescriptor {
    info: RouteInfo,
    pub(crate) middleware: Vec<Middleware>,
    pub(crate) error_handlers: Vec<ErrorHandler>,
    pub(crate) handler: Handler,
}

impl RouteDescriptor {
    /// Starts a route. `path` may use `:name` captures.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>, handler: Handler) -> Self {
        Self {
            info: RouteInfo::new(method, path),
            middleware: Vec::new(),
            error_handlers: Vec::new(),
            handler,
        }
    }

    #[must_use]
    pub fn get(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(HttpMethod::Get, path, handler)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(HttpMethod::Post, path, handler)
    }

    #[must_use]
    pub fn put(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(HttpMethod::Put, path, handler)
    }

    #[must_use]
    pub fn delete(path: impl Into<String>, handler: Handler) -> Self {
        Self::new(HttpMethod::Delete, path, handler)
    }

    /// Sets the operation metadata (description, tags, responses...).
    ///
    /// Anything other than a JSON object is ignored with a warning.
    #[must_use]
    pub fn operation(mut self, operation: Value) -> Self {
        match operation {
            Value::Object(operation) => self.info.operation = operation,
            other => tracing::warn!(
                method = %self.info.method,
                path = %self.info.path,
                kind = ?other,
                "Ignoring non-object operation metadata"
            ),
        }
        self
    }

    #[must_use]
    pub fn parameter(mut self, parameter: Parameter) -> Self {
        self.info.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    #[must_use]
    pub fn error_handler(mut self, error_handler: ErrorHandler) -> Self {
        self.error_handlers.push(error_handler);
        self
    }

    #[must_use]
    pub const fn info(&self) -> &RouteInfo {
        &self.info
    }
}

/// Something that yields routes to register, such as a module of route
/// definitions.
pub trait RouteSource {
    /// # Errors
    ///
    /// Returns [`RoutedocError::RouteSource`] (or any other registration
    /// error) if the routes cannot be produced.
    fn routes(self) -> Result<Vec<RouteDescriptor>>;
}

impl RouteSource for Vec<RouteDescriptor> {
    fn routes(self) -> Result<Vec<RouteDescriptor>> {
        Ok(self)
    }
}

impl<const N: usize> RouteSource for [RouteDescriptor; N] {
    fn routes(self) -> Result<Vec<RouteDescriptor>> {
        Ok(self.into())
    }
}

/// A [`RouteSource`] backed by a loader function.
#[derive(Debug, Clone, Copy)]
pub struct FnSource<F>(F);

/// Wraps a loader function as a [`RouteSource`].
pub const fn from_fn<F>(loader: F) -> FnSource<F>
where
    F: FnOnce() -> Result<Vec<RouteDescriptor>>,
{
    FnSource(loader)
}

impl<F> RouteSource for FnSource<F>
where
    F: FnOnce() -> Result<Vec<RouteDescriptor>>,
{
    fn routes(self) -> Result<Vec<RouteDescriptor>> {
        (self.0)()
    }
}

/// Collects routes and shared steps, then generates documents and routers.
#[derive(Debug, Clone)]
pub struct RouteRegistry {
    base: BaseDocument,
    middleware: Vec<Middleware>,
    error_handlers: Vec<ErrorHandler>,
    routes: Vec<RouteDescriptor>,
    factory: ValidatorFactory,
    body_limit: usize,
    docs: Option<DocServer>,
}

impl RouteRegistry {
    #[must_use]
    pub fn new(base: BaseDocument) -> Self {
        Self {
            base,
            middleware: Vec::new(),
            error_handlers: Vec::new(),
            routes: Vec::new(),
            factory: ValidatorFactory::default(),
            body_limit: DEFAULT_BODY_LIMIT,
            docs: None,
        }
    }

    /// Applies body limit and documentation settings.
    #[must_use]
    pub fn with_settings(self, settings: &Settings) -> Self {
        let mut registry = self.with_body_limit(settings.body.limit_bytes);
        registry.docs = DocServer::from_settings(&settings.docs);
        registry
    }

    #[must_use]
    pub const fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    #[must_use]
    pub fn with_docs(mut self, docs: DocServer) -> Self {
        self.docs = Some(docs);
        self
    }

    #[must_use]
    pub const fn with_validator_factory(mut self, factory: ValidatorFactory) -> Self {
        self.factory = factory;
        self
    }

    /// Adds middleware that runs for every route, before route middleware.
    #[must_use]
    pub fn add_middleware(mut self, middleware: Middleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Adds an error handler that runs for every route, after route error
    /// handlers.
    #[must_use]
    pub fn add_error_handler(mut self, error_handler: ErrorHandler) -> Self {
        self.error_handlers.push(error_handler);
        self
    }

    #[must_use]
    pub fn add_route(mut self, route: RouteDescriptor) -> Self {
        tracing::debug!(method = %route.info.method, path = %route.info.path, "Route registered");
        self.routes.push(route);
        self
    }

    /// Registers every route a source yields, in order.
    ///
    /// # Errors
    ///
    /// Propagates the source's error; nothing is registered in that case.
    pub fn load_routes_from<S: RouteSource>(self, source: S) -> Result<Self> {
        Ok(source.routes()?.into_iter().fold(self, Self::add_route))
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    #[must_use]
    pub const fn base_document(&self) -> &BaseDocument {
        &self.base
    }

    /// Generates the API document for the routes registered so far.
    #[must_use]
    pub fn generate_document(&self) -> ApiDocument {
        generate_document(&self.base, self.routes.iter().map(RouteDescriptor::info))
    }

    /// Builds a router serving the routes registered so far, plus the
    /// documentation endpoints when enabled.
    ///
    /// Paths that differ only in capture names, like `/users/:id` and
    /// `/users/:userId`, share one router entry. Request bodies compressed
    /// with gzip or deflate are decompressed before parsing.
    ///
    /// # Errors
    ///
    /// Fails on an invalid route path or parameter schema.
    pub fn generate_router(&self) -> Result<Router> {
        let document = Arc::new(self.generate_document());
        let shared = SharedSteps {
            middleware: &self.middleware,
            error_handlers: &self.error_handlers,
        };

        let mut table: BTreeMap<String, BTreeMap<HttpMethod, Candidates>> = BTreeMap::new();
        for route in &self.routes {
            let pipeline = Pipeline::build(
                route,
                shared,
                Arc::clone(&document),
                &self.factory,
                self.body_limit,
            )?;
            table
                .entry(pipeline.router_path().to_string())
                .or_default()
                .entry(route.info.method)
                .or_default()
                .insert(pipeline);
        }

        let mut router = Router::new();
        for (path, methods) in table {
            router = router.route(&path, method_router(methods)?);
        }
        router = router.layer(RequestDecompressionLayer::new().pass_through_unaccepted(true));

        if let Some(docs) = &self.docs {
            router = router.merge(docs.router(&document, self.base.docs_filename()));
        }

        tracing::info!(routes = self.routes.len(), "Router generated");
        Ok(router)
    }
}

fn method_router(methods: BTreeMap<HttpMethod, Candidates>) -> Result<MethodRouter> {
    let mut router = MethodRouter::new();
    let mut extension_methods: HashMap<Method, Candidates> = HashMap::new();

    for (method, candidates) in methods {
        if let Some(filter) = method_filter(method) {
            let candidates = Arc::new(candidates);
            router = router.on(filter, move |request: Request| {
                let candidates = Arc::clone(&candidates);
                async move { candidates.dispatch(request).await }
            });
        } else {
            let wire = Method::from_bytes(method.wire_name().as_bytes())
                .map_err(|_| RoutedocError::UnsupportedMethod(method.to_string()))?;
            extension_methods.insert(wire, candidates);
        }
    }

    // Verbs axum has no filter for are dispatched by hand.
    if !extension_methods.is_empty() {
        let extension_methods = Arc::new(extension_methods);
        router = router.fallback(move |request: Request| {
            let extension_methods = Arc::clone(&extension_methods);
            async move {
                match extension_methods.get(request.method()) {
                    Some(candidates) => candidates.dispatch(request).await,
                    None => StatusCode::METHOD_NOT_ALLOWED.into_response(),
                }
            }
        });
    }

    Ok(router)
}

const fn method_filter(method: HttpMethod) -> Option<MethodFilter> {
    match method {
        HttpMethod::Get => Some(MethodFilter::GET),
        HttpMethod::Post => Some(MethodFilter::POST),
        HttpMethod::Put => Some(MethodFilter::PUT),
        HttpMethod::Delete => Some(MethodFilter::DELETE),
        HttpMethod::Patch => Some(MethodFilter::PATCH),
        HttpMethod::Options => Some(MethodFilter::OPTIONS),
        HttpMethod::Head => Some(MethodFilter::HEAD),
        HttpMethod::Trace => Some(MethodFilter::TRACE),
        HttpMethod::Connect => Some(MethodFilter::CONNECT),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::BoxError;
    use axum::http::StatusCode;
    use routedoc_core::Dialect;
    use serde_json::json;
    use utoipa::openapi::Info;

    fn base() -> BaseDocument {
        BaseDocument::swagger(&Info::new("test", "1.0.0")).unwrap()
    }

    fn ok_handler() -> Handler {
        Handler::sync(|_| Ok::<_, BoxError>(StatusCode::OK))
    }

    #[test]
    fn test_standard_verbs_have_filters() {
        assert!(method_filter(HttpMethod::Get).is_some());
        assert!(method_filter(HttpMethod::Connect).is_some());
        assert!(method_filter(HttpMethod::Propfind).is_none());
        assert!(method_filter(HttpMethod::MSearch).is_none());
    }

    #[test]
    fn test_descriptor_builder_collects_metadata() {
        let route = RouteDescriptor::post("/pets", ok_handler())
            .operation(json!({ "description": "create a pet" }))
            .parameter(Parameter::body("pet").required())
            .operation(json!("not an object"));

        assert_eq!(route.info().method, HttpMethod::Post);
        assert_eq!(route.info().operation["description"], "create a pet");
        assert_eq!(route.info().parameters.len(), 1);
    }

    #[test]
    fn test_load_routes_from_function() {
        let registry = RouteRegistry::new(base())
            .load_routes_from(from_fn(|| {
                Ok(vec![
                    RouteDescriptor::get("/a", ok_handler()),
                    RouteDescriptor::get("/b", ok_handler()),
                ])
            }))
            .unwrap();
        assert_eq!(registry.routes().len(), 2);
    }

    #[test]
    fn test_failing_source_propagates() {
        let result = RouteRegistry::new(base()).load_routes_from(from_fn(|| {
            Err(RoutedocError::RouteSource {
                source_name: "pets".into(),
                reason: "boom".into(),
            })
        }));
        assert!(result.unwrap_err().is_registration_error());
    }

    #[test]
    fn test_document_reflects_registration_order() {
        let registry = RouteRegistry::new(base())
            .add_route(RouteDescriptor::get("/users/:id", ok_handler()))
            .add_route(RouteDescriptor::delete("/users/:id", ok_handler()));
        let document = registry.generate_document();
        assert!(document.operation("/users/:id", HttpMethod::Get).is_some());
        assert!(document.operation("/users/{id}", HttpMethod::Delete).is_some());
        assert_eq!(registry.base_document().dialect(), Dialect::Legacy);
    }

    #[test]
    fn test_relative_path_is_rejected() {
        let registry = RouteRegistry::new(base()).add_route(RouteDescriptor::get("pets", ok_handler()));
        let err = registry.generate_router().unwrap_err();
        assert!(matches!(err, RoutedocError::InvalidPath { .. }));
        assert_eq!(err.error_code(), "INVALID_PATH");
    }

    #[test]
    fn test_capture_names_may_differ_between_methods() {
        let registry = RouteRegistry::new(base())
            .add_route(RouteDescriptor::get("/users/:id", ok_handler()))
            .add_route(RouteDescriptor::delete("/users/:userId", ok_handler()))
            .add_route(RouteDescriptor::get("/users/:userId/roles", ok_handler()))
            .add_route(RouteDescriptor::put("/users/:id/roles", ok_handler()));
        assert!(registry.generate_router().is_ok());
    }

    #[test]
    fn test_capture_with_literal_suffix_mounts() {
        let registry = RouteRegistry::new(base())
            .add_route(RouteDescriptor::get("/files/:name.json", ok_handler()))
            .add_route(RouteDescriptor::get("/files/:name", ok_handler()));
        assert!(registry.generate_router().is_ok());
    }

    #[test]
    fn test_duplicate_route_replaces_candidate() {
        let mut candidates = Candidates::default();
        let document = Arc::new(RouteRegistry::new(base()).generate_document());
        for path in ["/users/:id", "/users/:id.json", "/users/:id"] {
            let route = RouteDescriptor::get(path, ok_handler());
            let shared = SharedSteps {
                middleware: &[],
                error_handlers: &[],
            };
            let pipeline = Pipeline::build(
                &route,
                shared,
                Arc::clone(&document),
                &ValidatorFactory::default(),
                DEFAULT_BODY_LIMIT,
            )
            .unwrap();
            candidates.insert(pipeline);
        }
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn test_invalid_schema_fails_router_generation() {
        let registry = RouteRegistry::new(base()).add_route(
            RouteDescriptor::get("/pets", ok_handler())
                .parameter(Parameter::query("limit").schema(json!({ "type": 12 }))),
        );
        let err = registry.generate_router().unwrap_err();
        assert!(matches!(err, RoutedocError::InvalidSchema { .. }));
    }
}
