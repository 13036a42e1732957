//! `POST /pets`

use axum::http::StatusCode;
use axum::Json;
use routedoc_core::{HttpMethod, Parameter};
use serde_json::json;

use crate::handler::{BoxError, Handler};
use crate::registry::RouteDescriptor;
use crate::state::{Pet, PetStore};

pub const PATH: &str = "/pets";

#[must_use]
pub fn route(store: PetStore) -> RouteDescriptor {
    RouteDescriptor::new(
        HttpMethod::Post,
        PATH,
        Handler::new(move |request| {
            let store = store.clone();
            async move {
                let pet: Pet = request.json()?;
                let id = store.add(pet.clone()).await;
                tracing::info!(id, species = %pet.species, "Pet created");
                Ok::<_, BoxError>((StatusCode::CREATED, Json(pet)))
            }
        }),
    )
    .operation(json!({
        "operationId": "createPet",
        "summary": "Add a pet",
        "description": "Stores a pet and echoes it back.",
        "tags": ["pets"],
        "responses": {
            "201": { "description": "The stored pet" }
        }
    }))
    .parameter(
        Parameter::body("pet")
            .required()
            .description("The pet to store")
            .schema(json!({
                "type": "object",
                "properties": {
                    "species": { "type": "string" }
                },
                "additionalProperties": false,
                "required": ["species"]
            })),
    )
}
