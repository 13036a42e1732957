//! The request object seen by pipeline steps.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, Request};
use axum::http::{Extensions, HeaderMap, Method, Uri};
use routedoc_core::{ApiDocument, ParameterSource, RouteInfo};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::body::{parse_json_body, BodyRejection};

/// An in-flight request with its body already parsed.
///
/// `body` is `None` when the request carried no body at all, which is
/// distinct from an empty JSON object. Clones share the parsed body.
#[derive(Debug, Clone)]
pub struct Convrequest {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub extensions: Extensions,
    /// Captures under the names the route path declares.
    pub path_params: HashMap<String, String>,
    /// One value per key. A repeated key keeps its last value, and a query
    /// string that does not decode leaves the map empty.
    pub query: HashMap<String, String>,
    pub body: Option<Arc<Value>>,
}

impl Convrequest {
    /// Builds a request from an axum request, parsing the JSON body.
    pub(crate) async fn from_request(
        request: Request,
        path_params: HashMap<String, String>,
        body_limit: usize,
    ) -> Result<Self, BodyRejection> {
        let (parts, body) = request.into_parts();
        let body = parse_json_body(&parts.headers, body, body_limit)
            .await?
            .map(Arc::new);
        let query = parse_query(&parts.uri);

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            extensions: parts.extensions,
            path_params,
            query,
            body,
        })
    }

    /// The route that matched this request.
    ///
    /// Always set once the request has passed the first pipeline step.
    #[must_use]
    pub fn route(&self) -> Option<&RouteInfo> {
        self.extensions.get::<Arc<RouteInfo>>().map(AsRef::as_ref)
    }

    /// The API document the matched route belongs to.
    #[must_use]
    pub fn document(&self) -> Option<&ApiDocument> {
        self.extensions.get::<Arc<ApiDocument>>().map(AsRef::as_ref)
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.path_params.get(name).map(String::as_str)
    }

    /// Deserializes the body. A missing body deserializes from `null`.
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the body does not fit `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        match self.body.as_deref() {
            Some(body) => T::deserialize(body),
            None => T::deserialize(Value::Null),
        }
    }
}

fn parse_query(uri: &Uri) -> HashMap<String, String> {
    match Query::<HashMap<String, String>>::try_from_uri(uri) {
        Ok(Query(query)) => query,
        Err(rejection) => {
            tracing::debug!(uri = %uri, reason = %rejection, "Ignoring undecodable query string");
            HashMap::new()
        }
    }
}

impl ParameterSource for Convrequest {
    fn body(&self) -> Option<&Value> {
        self.body.as_deref()
    }

    fn path_param(&self, name: &str) -> Option<&str> {
        self.param(name)
    }

    fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    fn header(&self, name: &str) -> Option<Cow<'_, str>> {
        self.headers
            .get(name)
            .map(|value| String::from_utf8_lossy(value.as_bytes()))
    }
}
