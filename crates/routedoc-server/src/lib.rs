//! # routedoc-server
//!
//! axum integration for routedoc.
//!
//! Routes are declared once, as a [`RouteDescriptor`], and the same
//! declaration drives request handling and documentation:
//!
//! - [`RouteRegistry::generate_router`] builds an axum router where each route
//!   gets JSON body parsing, parameter validation, panic containment and an
//!   error-handler chain.
//! - [`RouteRegistry::generate_document`] builds the matching API document,
//!   optionally served with a UI by [`DocServer`].
//!
//! ```rust,ignore
//! let router = RouteRegistry::new(base)
//!     .add_middleware(request_id::middleware())
//!     .add_route(
//!         RouteDescriptor::get("/users/:id", Handler::new(get_user))
//!             .parameter(Parameter::path("id")),
//!     )
//!     .with_docs(DocServer::new("/api-docs"))
//!     .generate_router()?;
//! ```
//!
//! The `petstore` module is a complete example application.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod body;
pub mod catch;
pub mod decorate;
pub mod docs;
pub mod error;
pub mod handler;
pub mod logging;
pub mod petstore;
mod pipeline;
pub mod registry;
pub mod request;
pub mod state;

pub use docs::DocServer;
pub use error::{ApiError, ErrorResponse};
pub use handler::{BoxError, ErrorHandler, Handler, HandlerResult, Middleware, Next};
pub use registry::{RouteDescriptor, RouteRegistry, RouteSource};
pub use request::Convrequest;
