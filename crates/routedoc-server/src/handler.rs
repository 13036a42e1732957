//! Pipeline step kinds.
//!
//! A route pipeline is made of three kinds of steps, each with its own fixed
//! signature:
//!
//! - [`Middleware`] receives the request and a [`Next`] continuation. It can
//!   answer directly, or call [`Next::run`] and post-process the result.
//! - [`Handler`] receives the request and produces the response.
//! - [`ErrorHandler`] receives an error and a snapshot of the request. It
//!   either resolves the error with a response or returns an error, which is
//!   offered to the next error handler in the chain.
//!
//! Steps return `Result<Response, BoxError>`; `Err` is the error channel.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::response::{IntoResponse, Response};
use futures::future::{self, BoxFuture, FutureExt};

use crate::request::Convrequest;

pub use axum::BoxError;

/// Outcome of a pipeline step.
pub type HandlerResult = Result<Response, BoxError>;

type HandlerFn = dyn Fn(Convrequest) -> BoxFuture<'static, HandlerResult> + Send + Sync;
type MiddlewareFn = dyn Fn(Convrequest, Next) -> BoxFuture<'static, HandlerResult> + Send + Sync;
type ErrorHandlerFn =
    dyn Fn(BoxError, Convrequest) -> BoxFuture<'static, HandlerResult> + Send + Sync;

/// The main handler of a route.
#[derive(Clone)]
pub struct Handler(Arc<HandlerFn>);

impl Handler {
    /// Creates a handler from an async function.
    ///
    /// ```rust,ignore
    /// let handler = Handler::new(|_request| async {
    ///     Ok::<_, BoxError>(Json(json!([{ "species": "dog" }])))
    /// });
    /// ```
    pub fn new<F, Fut, R, E>(handler: F) -> Self
    where
        F: Fn(Convrequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse,
        E: Into<BoxError>,
    {
        Self(Arc::new(move |request| {
            handler(request)
                .map(|result| result.map(IntoResponse::into_response).map_err(Into::into))
                .boxed()
        }))
    }

    /// Creates a handler from a synchronous function.
    pub fn sync<F, R, E>(handler: F) -> Self
    where
        F: Fn(Convrequest) -> Result<R, E> + Send + Sync + 'static,
        R: IntoResponse,
        E: Into<BoxError>,
    {
        Self(Arc::new(move |request| {
            let result = handler(request)
                .map(IntoResponse::into_response)
                .map_err(Into::into);
            future::ready(result).boxed()
        }))
    }

    pub(crate) fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(Convrequest) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
    {
        Self(Arc::new(handler))
    }

    pub fn call(&self, request: Convrequest) -> BoxFuture<'static, HandlerResult> {
        (self.0)(request)
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Handler")
    }
}

/// A step that runs before the handler.
#[derive(Clone)]
pub struct Middleware(Arc<MiddlewareFn>);

impl Middleware {
    /// Creates a middleware from an async function.
    ///
    /// ```rust,ignore
    /// let timing = Middleware::new(|request, next| async move {
    ///     let started = Instant::now();
    ///     let response = next.run(request).await?;
    ///     tracing::info!(elapsed = ?started.elapsed(), "request served");
    ///     Ok(response)
    /// });
    /// ```
    pub fn new<F, Fut>(middleware: F) -> Self
    where
        F: Fn(Convrequest, Next) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        Self(Arc::new(move |request, next| middleware(request, next).boxed()))
    }

    pub(crate) fn from_fn<F>(middleware: F) -> Self
    where
        F: Fn(Convrequest, Next) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
    {
        Self(Arc::new(middleware))
    }

    pub fn call(&self, request: Convrequest, next: Next) -> BoxFuture<'static, HandlerResult> {
        (self.0)(request, next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// A step that handles errors raised by middleware or the handler.
///
/// Returning `Err` (the original error or a new one) passes it on to the next
/// error handler.
#[derive(Clone)]
pub struct ErrorHandler(Arc<ErrorHandlerFn>);

impl ErrorHandler {
    pub fn new<F, Fut, R, E>(error_handler: F) -> Self
    where
        F: Fn(BoxError, Convrequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<R, E>> + Send + 'static,
        R: IntoResponse,
        E: Into<BoxError>,
    {
        Self(Arc::new(move |error, request| {
            error_handler(error, request)
                .map(|result| result.map(IntoResponse::into_response).map_err(Into::into))
                .boxed()
        }))
    }

    pub fn sync<F, R, E>(error_handler: F) -> Self
    where
        F: Fn(BoxError, Convrequest) -> Result<R, E> + Send + Sync + 'static,
        R: IntoResponse,
        E: Into<BoxError>,
    {
        Self(Arc::new(move |error, request| {
            let result = error_handler(error, request)
                .map(IntoResponse::into_response)
                .map_err(Into::into);
            future::ready(result).boxed()
        }))
    }

    pub(crate) fn from_fn<F>(error_handler: F) -> Self
    where
        F: Fn(BoxError, Convrequest) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static,
    {
        Self(Arc::new(error_handler))
    }

    pub fn call(&self, error: BoxError, request: Convrequest) -> BoxFuture<'static, HandlerResult> {
        (self.0)(error, request)
    }
}

impl fmt::Debug for ErrorHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ErrorHandler")
    }
}

/// The remainder of a pipeline, handed to each middleware.
#[derive(Clone)]
pub struct Next {
    chain: Arc<[Middleware]>,
    endpoint: Handler,
    position: usize,
}

impl Next {
    pub(crate) fn new(chain: Arc<[Middleware]>, endpoint: Handler) -> Self {
        Self {
            chain,
            endpoint,
            position: 0,
        }
    }

    /// Runs the next step: the following middleware, or the handler once the
    /// middleware chain is exhausted.
    pub fn run(mut self, request: Convrequest) -> BoxFuture<'static, HandlerResult> {
        match self.chain.get(self.position).cloned() {
            Some(step) => {
                self.position += 1;
                step.call(request, self)
            }
            None => self.endpoint.call(request),
        }
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("remaining", &self.chain.len().saturating_sub(self.position))
            .finish()
    }
}
