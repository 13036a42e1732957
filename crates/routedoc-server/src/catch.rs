//! Panic containment for user-supplied steps.
//!
//! Every handler, middleware and error handler is wrapped before it enters a
//! pipeline. A panic, whether raised while the step is called or while its
//! future is polled, is turned into a [`RoutedocError::HandlerPanicked`] on the
//! error channel instead of tearing down the connection task.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use futures::future::{self, BoxFuture, FutureExt};
use routedoc_core::RoutedocError;

use crate::handler::{BoxError, ErrorHandler, Handler, HandlerResult, Middleware};

#[must_use]
pub fn handler(handler: Handler) -> Handler {
    Handler::from_fn(move |request| guard(|| handler.call(request)))
}

#[must_use]
pub fn middleware(middleware: Middleware) -> Middleware {
    Middleware::from_fn(move |request, next| guard(|| middleware.call(request, next)))
}

#[must_use]
pub fn error_handler(error_handler: ErrorHandler) -> ErrorHandler {
    ErrorHandler::from_fn(move |error, request| guard(|| error_handler.call(error, request)))
}

fn guard<F>(invoke: F) -> BoxFuture<'static, HandlerResult>
where
    F: FnOnce() -> BoxFuture<'static, HandlerResult>,
{
    match panic::catch_unwind(AssertUnwindSafe(invoke)) {
        Ok(pending) => AssertUnwindSafe(pending)
            .catch_unwind()
            .map(|outcome| outcome.unwrap_or_else(|payload| Err(panic_error(&*payload))))
            .boxed(),
        Err(payload) => future::ready(Err(panic_error(&*payload))).boxed(),
    }
}

fn panic_error(payload: &(dyn Any + Send)) -> BoxError {
    let message = payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string());
    tracing::error!(panic = %message, "Pipeline step panicked");
    Box::new(RoutedocError::HandlerPanicked(message))
}
