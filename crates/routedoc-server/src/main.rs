//! # routedoc-server
//!
//! Runs the pet store demo application.
//!
//! ## Running
//!
//! ```bash
//! # Defaults, or values from ./routedoc.toml when present
//! cargo run --package routedoc-server
//!
//! # Another config file
//! ROUTEDOC_CONFIG=/etc/routedoc/config.toml ./routedoc-server
//!
//! # Single overrides
//! ROUTEDOC__SERVER__PORT=3000 ROUTEDOC__DOCS__DIALECT=modern ./routedoc-server
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

use std::path::PathBuf;

use routedoc_core::Settings;
use routedoc_server::{logging, petstore, state::PetStore};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "routedoc.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::var("ROUTEDOC_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);
    let settings = Settings::load(Some(config_path.as_path()))?;

    logging::init(&settings.logging)?;

    info!(config = %config_path.display(), "Starting routedoc-server");

    let app = petstore::app(&PetStore::default(), &settings)?.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new()),
    );

    let addr = settings.bind_address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Listening on {}", addr);
    if settings.docs.enabled {
        info!("API docs at http://{}{}/", addr, settings.docs.path.trim_end_matches('/'));
    }

    axum::serve(listener, app).await?;

    Ok(())
}
