//! Serves the generated API document and an interactive UI for it.

use axum::Router;
use routedoc_core::{ApiDocument, DocsSettings};
use utoipa_swagger_ui::SwaggerUi;

/// Mounts the document at `<base>/<filename>` and the UI at `<base>/`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocServer {
    base_path: String,
}

impl DocServer {
    /// `base_path` is taken as absolute with no trailing `/`, so `api-docs`,
    /// `/api-docs` and `/api-docs/` all mount at `/api-docs`.
    #[must_use]
    pub fn new(base_path: impl Into<String>) -> Self {
        let base_path = base_path.into();
        let trimmed = base_path.trim_matches('/');
        Self {
            base_path: if trimmed.is_empty() {
                String::new()
            } else {
                format!("/{trimmed}")
            },
        }
    }

    /// `None` when documentation serving is disabled.
    #[must_use]
    pub fn from_settings(settings: &DocsSettings) -> Option<Self> {
        settings.enabled.then(|| Self::new(settings.path.as_str()))
    }

    #[must_use]
    pub fn document_path(&self, filename: &str) -> String {
        format!("{}/{filename}", self.base_path)
    }

    #[must_use]
    pub fn ui_path(&self) -> String {
        format!("{}/", self.base_path)
    }

    /// Routes serving `document` and the UI pointing at it.
    #[must_use]
    pub fn router(&self, document: &ApiDocument, filename: &str) -> Router {
        let ui_mount = if self.base_path.is_empty() {
            "/".to_string()
        } else {
            self.base_path.clone()
        };
        tracing::info!(
            ui = %self.ui_path(),
            document = %self.document_path(filename),
            "Serving API documentation"
        );
        SwaggerUi::new(ui_mount)
            .external_url_unchecked(self.document_path(filename), document.as_value().clone())
            .into()
    }
}
