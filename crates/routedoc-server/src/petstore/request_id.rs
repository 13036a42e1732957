//! Request id propagation.

use axum::http::{HeaderName, HeaderValue};
use uuid::Uuid;

use crate::handler::{BoxError, Middleware};

pub const REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Reuses the caller's `x-request-id` or assigns a new one, and echoes it on
/// the response.
#[must_use]
pub fn middleware() -> Middleware {
    Middleware::new(|mut request, next| async move {
        let id = if let Some(id) = request.headers.get(&REQUEST_ID) {
            id.clone()
        } else {
            let id = HeaderValue::try_from(Uuid::new_v4().to_string())?;
            request.headers.insert(REQUEST_ID, id.clone());
            id
        };

        let mut response = next.run(request).await?;
        response.headers_mut().insert(REQUEST_ID, id);
        Ok::<_, BoxError>(response)
    })
}
