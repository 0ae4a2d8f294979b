use std::sync::Arc;

use crate::catalog::CatalogStore;
use crate::finalize::Finalizer;
use crate::letter::CoverStamper;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogStore>,
    pub stamper: Arc<CoverStamper>,
    /// Holds the post-processor behind `Arc<dyn PostProcessor>`; swap it in tests.
    pub finalizer: Arc<Finalizer>,
}
