//! `GET /pets/:petId`

use axum::response::IntoResponse;
use axum::Json;
use routedoc_core::{HttpMethod, Parameter};
use serde_json::json;

use crate::error::ApiError;
use crate::handler::{BoxError, Handler};
use crate::registry::RouteDescriptor;
use crate::state::PetStore;

pub const PATH: &str = "/pets/:petId";

#[must_use]
pub fn route(store: PetStore) -> RouteDescriptor {
    RouteDescriptor::new(
        HttpMethod::Get,
        PATH,
        Handler::new(move |request| {
            let store = store.clone();
            async move {
                let id = request.param("petId").and_then(|id| id.parse::<usize>().ok());
                let pet = match id {
                    Some(id) => store.get(id).await,
                    None => None,
                };
                let response = match pet {
                    Some(pet) => Json(pet).into_response(),
                    None => ApiError::not_found("Pet not found").into_response(),
                };
                Ok::<_, BoxError>(response)
            }
        }),
    )
    .operation(json!({
        "operationId": "getPet",
        "summary": "Get a pet by id",
        "tags": ["pets"],
        "responses": {
            "200": { "description": "The pet" },
            "404": { "description": "No pet with that id" }
        }
    }))
    .parameter(
        Parameter::path("petId")
            .description("Index of the pet in the store")
            .schema(json!({ "type": "string", "pattern": "^[0-9]+$" })),
    )
}
