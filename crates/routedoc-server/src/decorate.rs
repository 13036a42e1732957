//! Attaches route metadata to requests.

use std::sync::Arc;

use routedoc_core::{ApiDocument, RouteInfo};

use crate::handler::Middleware;
use crate::request::Convrequest;

/// Makes the matched route and the API document reachable from a request via
/// [`Convrequest::route`] and [`Convrequest::document`].
#[derive(Debug, Clone)]
pub struct RequestDecorator {
    route: Arc<RouteInfo>,
    document: Arc<ApiDocument>,
}

impl RequestDecorator {
    #[must_use]
    pub const fn new(route: Arc<RouteInfo>, document: Arc<ApiDocument>) -> Self {
        Self { route, document }
    }

    pub fn decorate(&self, request: &mut Convrequest) {
        request.extensions.insert(Arc::clone(&self.route));
        request.extensions.insert(Arc::clone(&self.document));
    }

    /// The decorator as the first step of a pipeline.
    #[must_use]
    pub fn middleware(&self) -> Middleware {
        let decorator = self.clone();
        Middleware::new(move |mut request, next| {
            decorator.decorate(&mut request);
            next.run(request)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::{BoxError, Handler, Next};
    use axum::http::{Extensions, HeaderMap, Method, StatusCode, Uri};
    use routedoc_core::{generate_document, BaseDocument, HttpMethod};
    use utoipa::openapi::Info;

    #[test]
    fn test_middleware_exposes_route_and_document() {
        let route = Arc::new(RouteInfo::new(HttpMethod::Get, "/pets/:petId"));
        let base = BaseDocument::swagger(&Info::new("pets", "1.0.0")).unwrap();
        let document = Arc::new(generate_document(&base, [route.as_ref()]));
        let decorator = RequestDecorator::new(Arc::clone(&route), document);

        let endpoint = Handler::sync(|request| {
            let route = request.route().ok_or("route missing")?;
            let document = request.document().ok_or("document missing")?;
            assert_eq!(route.path, "/pets/:petId");
            assert!(document.operation("/pets/{petId}", HttpMethod::Get).is_some());
            Ok::<_, BoxError>(StatusCode::NO_CONTENT)
        });
        let next = Next::new(Arc::from(vec![decorator.middleware()]), endpoint);

        let request = Convrequest {
            method: Method::GET,
            uri: Uri::from_static("/pets/1"),
            headers: HeaderMap::new(),
            extensions: Extensions::new(),
            path_params: Default::default(),
            query: Default::default(),
            body: None,
        };
        let response = tokio_test::block_on(next.run(request)).unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }
}
