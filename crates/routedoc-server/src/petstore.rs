//! Demo pet store application.
//!
//! Each route lives in its own module and exposes a `route` function; this
//! module gathers them into a [`RouteRegistry`].
//!
//! ```text
//! GET  /pets          - list pets
//! POST /pets          - add a pet (body validated)
//! GET  /pets/:petId   - get one pet
//! ```

use axum::response::Response;
use axum::Router;
use routedoc_core::{BaseDocument, Dialect, Result, Settings};
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handler::ErrorHandler;
use crate::registry::{RouteDescriptor, RouteRegistry};
use crate::state::{Pet, PetStore};

pub mod create_pet;
pub mod get_pet;
pub mod list_pets;
pub mod request_id;

/// Top-level metadata of the pet store document.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "petstore",
        version = "1.0.0",
        description = "A small pet store served through routedoc."
    ),
    components(schemas(Pet, ErrorResponse)),
    tags((name = "pets", description = "Pet management"))
)]
pub struct PetstoreDoc;

/// Every pet store route, in registration order.
#[must_use]
pub fn routes(store: &PetStore) -> Vec<RouteDescriptor> {
    vec![
        list_pets::route(store.clone()),
        create_pet::route(store.clone()),
        get_pet::route(store.clone()),
    ]
}

/// Base document for the requested dialect.
///
/// # Errors
///
/// Fails if the document metadata does not serialize to an object.
pub fn base_document(dialect: Dialect, settings: &Settings) -> Result<BaseDocument> {
    let openapi = PetstoreDoc::openapi();
    match dialect {
        Dialect::Legacy => Ok(BaseDocument::swagger(&openapi.info)?
            .host(format!("localhost:{}", settings.server.port))),
        Dialect::Modern => BaseDocument::openapi(&openapi),
    }
}

/// Logs failures with their route, then passes them on.
#[must_use]
pub fn log_errors() -> ErrorHandler {
    ErrorHandler::sync(|error, request| {
        let route = request.route().map_or_else(
            || request.uri.path().to_string(),
            |route| format!("{} {}", route.method, route.path),
        );
        tracing::warn!(route = %route, error = %error, "Request failed");
        Err::<Response, _>(error)
    })
}

/// The fully configured pet store registry.
///
/// # Errors
///
/// Fails if the base document cannot be built.
pub fn registry(store: &PetStore, settings: &Settings) -> Result<RouteRegistry> {
    RouteRegistry::new(base_document(settings.docs.dialect, settings)?)
        .with_settings(settings)
        .add_middleware(request_id::middleware())
        .add_error_handler(log_errors())
        .load_routes_from(routes(store))
}

/// The pet store router.
///
/// # Errors
///
/// Fails on registration errors such as an invalid parameter schema.
pub fn app(store: &PetStore, settings: &Settings) -> Result<Router> {
    registry(store, settings)?.generate_router()
}

#[cfg(test)]
mod tests {
    use super::*;
    use routedoc_core::HttpMethod;

    #[test]
    fn test_legacy_document_lists_every_route() {
        let settings = Settings::default();
        let document = registry(&PetStore::default(), &settings)
            .unwrap()
            .generate_document();

        assert_eq!(document.as_value()["swagger"], "2.0");
        assert_eq!(document.as_value()["host"], "localhost:8080");
        assert!(document.operation("/pets", HttpMethod::Get).is_some());
        assert!(document.operation("/pets", HttpMethod::Post).is_some());

        let get_pet = document.operation("/pets/:petId", HttpMethod::Get).unwrap();
        assert_eq!(get_pet["parameters"][0]["name"], "petId");
        assert_eq!(get_pet["parameters"][0]["required"], true);
        assert_eq!(get_pet["responses"]["400"]["description"], "Validation failed");
    }

    #[test]
    fn test_modern_document_keeps_components() {
        let mut settings = Settings::default();
        settings.docs.dialect = Dialect::Modern;
        let document = registry(&PetStore::default(), &settings)
            .unwrap()
            .generate_document();

        let value = document.as_value();
        assert!(value["openapi"].as_str().unwrap().starts_with("3."));
        assert!(value["components"]["schemas"]["Pet"].is_object());
        assert!(value.get("host").is_none());
        assert_eq!(
            document.operation("/pets", HttpMethod::Post).unwrap()["operationId"],
            "createPet"
        );
    }
}
