//! HTTP surface of the gateway.

pub mod convert;
pub mod error;
pub mod items;
pub mod ops;

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{Router, middleware, routing::get};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{info, warn};

use crate::core::config::AppConfig;
use crate::core::{FallbackTable, RateResolver};
use crate::metrics::Metrics;
use crate::providers::ExchangeRateHostProvider;
use crate::store::{ConversionHistory, FavoriteStore, ItemStore};

/// Everything the handlers share. Built once and passed to the router.
pub struct AppState {
    pub resolver: RateResolver,
    pub items: ItemStore,
    pub history: ConversionHistory,
    pub favorites: FavoriteStore,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(resolver: RateResolver) -> Self {
        Self {
            resolver,
            items: ItemStore::new(),
            history: ConversionHistory::new(),
            favorites: FavoriteStore::new(),
            metrics: Metrics::new(),
        }
    }
}

pub fn build_resolver(config: &AppConfig) -> Result<RateResolver> {
    let table = Arc::new(FallbackTable::builtin());
    let provider_config = &config.provider;
    if !provider_config.enabled {
        info!("Live provider disabled, serving fallback rates only");
        return Ok(RateResolver::offline(table));
    }

    let provider =
        ExchangeRateHostProvider::new(&provider_config.base_url, provider_config.timeout())
            .context("Failed to build live rate provider")?
            .with_access_key(provider_config.access_key.clone());
    info!(base_url = %provider_config.base_url, "Live provider configured");
    Ok(RateResolver::new(Arc::new(provider), table).with_timeout(provider_config.timeout()))
}

pub fn build_state(config: &AppConfig) -> Result<Arc<AppState>> {
    let resolver = build_resolver(config)?;
    Ok(Arc::new(AppState::new(resolver)))
}

pub fn app_router(state: Arc<AppState>, config: &AppConfig) -> Router {
    let router = Router::new()
        .merge(convert::router())
        .merge(items::router())
        .merge(ops::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ops::track_requests,
        ))
        .route("/metrics", get(ops::metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match &config.server.static_dir {
        Some(dir) if dir.is_dir() => {
            info!(static_dir = %dir.display(), "Serving static files");
            router.fallback_service(ServeDir::new(dir))
        }
        Some(dir) => {
            warn!(static_dir = %dir.display(), "Static directory not found, skipping");
            router
        }
        None => router,
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn serve(config: &AppConfig) -> Result<()> {
    let state = build_state(config)?;
    let router = app_router(state, config);

    let listener = tokio::net::TcpListener::bind(config.server.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.listen_addr))?;
    info!(listen_addr = %config.server.listen_addr, "Gateway listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Gateway shutdown complete");
    Ok(())
}
