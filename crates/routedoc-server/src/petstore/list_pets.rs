//! `GET /pets`

use axum::Json;
use routedoc_core::HttpMethod;
use serde_json::json;

use crate::handler::{BoxError, Handler};
use crate::registry::RouteDescriptor;
use crate::state::PetStore;

pub const PATH: &str = "/pets";

#[must_use]
pub fn route(store: PetStore) -> RouteDescriptor {
    RouteDescriptor::new(
        HttpMethod::Get,
        PATH,
        Handler::new(move |_request| {
            let store = store.clone();
            async move { Ok::<_, BoxError>(Json(store.list().await)) }
        }),
    )
    .operation(json!({
        "operationId": "listPets",
        "summary": "List pets",
        "description": "Returns every pet in the store, in insertion order.",
        "tags": ["pets"],
        "responses": {
            "200": { "description": "The pets" }
        }
    }))
}
