//! Per-route request pipeline.
//!
//! Step order for every request:
//!
//! 1. request decoration (route and document attached)
//! 2. shared middleware, in registration order
//! 3. route middleware, in declaration order
//! 4. parameter validation (answers 400 on failure)
//! 5. the route handler
//!
//! Errors on the error channel go to the route's error handlers, then to the
//! shared ones. An error nobody resolves becomes a 500.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::rejection::RawPathParamsRejection;
use axum::extract::{FromRequestParts, RawPathParams, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use routedoc_core::{
    ApiDocument, ParameterValidator, Result, RouteInfo, RoutePattern, ValidatorFactory,
};

use crate::catch;
use crate::decorate::RequestDecorator;
use crate::error::ApiError;
use crate::handler::{BoxError, ErrorHandler, Handler, Middleware, Next};
use crate::registry::RouteDescriptor;
use crate::request::Convrequest;

/// Steps shared by every route of a registry.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SharedSteps<'a> {
    pub middleware: &'a [Middleware],
    pub error_handlers: &'a [ErrorHandler],
}

/// The assembled, ready-to-serve pipeline of one route.
#[derive(Debug)]
pub(crate) struct Pipeline {
    route: Arc<RouteInfo>,
    pattern: RoutePattern,
    decorator: RequestDecorator,
    chain: Arc<[Middleware]>,
    endpoint: Handler,
    error_handlers: Vec<ErrorHandler>,
    body_limit: usize,
}

impl Pipeline {
    /// Assembles a route's pipeline, compiling its parameter validators.
    pub(crate) fn build(
        route: &RouteDescriptor,
        shared: SharedSteps<'_>,
        document: Arc<ApiDocument>,
        factory: &ValidatorFactory,
        body_limit: usize,
    ) -> Result<Self> {
        let info = Arc::new(route.info().clone());
        let pattern = RoutePattern::parse(&info.path)?;
        let validator = ParameterValidator::compile(factory, &info.parameters)?;
        let decorator = RequestDecorator::new(Arc::clone(&info), document);

        let mut chain = vec![decorator.middleware()];
        chain.extend(shared.middleware.iter().cloned().map(catch::middleware));
        chain.extend(route.middleware.iter().cloned().map(catch::middleware));
        if !validator.is_empty() {
            chain.push(validation_step(Arc::new(validator)));
        }

        let error_handlers = route
            .error_handlers
            .iter()
            .chain(shared.error_handlers)
            .cloned()
            .map(catch::error_handler)
            .collect();

        Ok(Self {
            route: info,
            pattern,
            decorator,
            chain: chain.into(),
            endpoint: catch::handler(route.handler.clone()),
            error_handlers,
            body_limit,
        })
    }

    pub(crate) fn router_path(&self) -> &str {
        self.pattern.router_path()
    }

    async fn handle(&self, request: Request, path_params: HashMap<String, String>) -> Response {
        let parsed = Convrequest::from_request(request, path_params, self.body_limit).await;
        let request = match parsed {
            Ok(request) => request,
            Err(rejection) => {
                tracing::debug!(
                    method = %self.route.method,
                    path = %self.route.path,
                    reason = %rejection,
                    "Request body rejected"
                );
                return rejection.into_response();
            }
        };

        // Error handlers see the request as it was before middleware ran. The
        // parsed body is shared with the snapshot, not copied.
        let snapshot = (!self.error_handlers.is_empty()).then(|| {
            let mut snapshot = request.clone();
            self.decorator.decorate(&mut snapshot);
            snapshot
        });

        match Next::new(Arc::clone(&self.chain), self.endpoint.clone())
            .run(request)
            .await
        {
            Ok(response) => response,
            Err(error) => self.recover(error, snapshot).await,
        }
    }

    async fn recover(&self, mut error: BoxError, snapshot: Option<Convrequest>) -> Response {
        if let Some(request) = snapshot {
            for error_handler in &self.error_handlers {
                match error_handler.call(error, request.clone()).await {
                    Ok(response) => return response,
                    Err(forwarded) => error = forwarded,
                }
            }
        }

        ApiError::internal(format!(
            "unhandled error in {} {}: {error}",
            self.route.method, self.route.path
        ))
        .into_response()
    }
}

/// Pipelines sharing one router path and method, in registration order.
///
/// Routes whose paths differ only in capture names or in literal text around
/// captures land on the same router entry; the first whose pattern fits the
/// request serves it.
#[derive(Debug, Default)]
pub(crate) struct Candidates(Vec<Arc<Pipeline>>);

impl Candidates {
    /// Adds a pipeline. One registered earlier for the same route path is
    /// replaced in place.
    pub(crate) fn insert(&mut self, pipeline: Pipeline) {
        let document_path = pipeline.route.document_path();
        match self
            .0
            .iter_mut()
            .find(|existing| existing.route.document_path() == document_path)
        {
            Some(existing) => *existing = Arc::new(pipeline),
            None => self.0.push(Arc::new(pipeline)),
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.0.len()
    }

    pub(crate) async fn dispatch(&self, request: Request) -> Response {
        let (mut parts, body) = request.into_parts();
        let raw: HashMap<String, String> =
            match RawPathParams::from_request_parts(&mut parts, &()).await {
                Ok(params) => params
                    .iter()
                    .map(|(name, value)| (name.to_owned(), value.to_owned()))
                    .collect(),
                Err(RawPathParamsRejection::MissingPathParams(_)) => HashMap::new(),
                Err(rejection) => return rejection.into_response(),
            };
        let request = Request::from_parts(parts, body);

        for pipeline in &self.0 {
            if let Some(path_params) = pipeline.pattern.extract(&raw) {
                return pipeline.handle(request, path_params).await;
            }
        }
        StatusCode::NOT_FOUND.into_response()
    }
}

fn validation_step(validator: Arc<ParameterValidator>) -> Middleware {
    Middleware::new(move |request, next| {
        let result = validator.validate(&request);
        async move {
            if result.valid {
                next.run(request).await
            } else {
                Ok(ApiError::ValidationFailed {
                    errors: result.errors,
                }
                .into_response())
            }
        }
    })
}
