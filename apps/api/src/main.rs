mod catalog;
mod config;
mod errors;
mod finalize;
mod layout;
mod letter;
mod pdf;
mod proposal;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::catalog::CatalogStore;
use crate::config::Config;
use crate::finalize::{Finalizer, Ghostscript};
use crate::layout::Geometry;
use crate::letter::CoverStamper;
use crate::pdf::FontSource;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting proposer v{}", env!("CARGO_PKG_VERSION"));

    check_template(&config.cover_template_path, &config.geometry);
    check_template(&config.terms_path, &config.geometry);

    let catalog = Arc::new(CatalogStore::new(config.catalog_path.clone()));
    info!("Service catalog at {}", config.catalog_path.display());

    let stamper = Arc::new(CoverStamper::new(
        config.cover_template_path.clone(),
        FontSource::Embedded(config.font_bold_path.clone()),
        config.geometry.stamp.clone(),
    ));

    let ghostscript = match &config.ghostscript_path {
        Some(program) => Ghostscript::with_program(program.clone(), config.postprocess_timeout),
        None => Ghostscript::new(config.postprocess_timeout),
    };
    let finalizer = Arc::new(Finalizer::new(
        config.terms_path.clone(),
        FontSource::Embedded(config.font_regular_path.clone()),
        FontSource::Embedded(config.font_bold_path.clone()),
        config.geometry.clone(),
        config.work_dir.clone(),
        Arc::new(ghostscript),
    ));
    info!(
        "Finalizer ready (work dir: {}, post-process timeout: {:?})",
        config.work_dir.display(),
        config.postprocess_timeout
    );

    let state = AppState {
        catalog,
        stamper,
        finalizer,
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Warns when a template is missing or its page size disagrees with the layout.
fn check_template(path: &Path, geometry: &Geometry) {
    if !path.exists() {
        warn!("Template {} not found; requests that need it will fail", path.display());
        return;
    }
    let size = pdf::document::load_path(path).and_then(|doc| pdf::document::first_page_size(&doc));
    match size {
        Ok((width, height)) => {
            if let Some(mismatch) = geometry.check_page_size(width, height) {
                warn!("Template {}: {mismatch}", path.display());
            }
        }
        Err(e) => warn!("Template {} could not be inspected: {e}", path.display()),
    }
}
