use axum::{routing::get, Router};
use pitchside_core::config::PitchsideConfig;
use pitchside_hub::{Emitter, Hub};
use std::sync::Arc;

/// Central shared state — passed as Arc<AppState> to all Axum handlers.
pub struct AppState {
    pub config: PitchsideConfig,
    /// Room membership and fan-out for every viewer socket.
    pub hub: Arc<Hub>,
    /// In-process entry point for the CRUD layer; shares `hub`.
    pub emitter: Emitter,
}

impl AppState {
    pub fn new(config: PitchsideConfig) -> Self {
        Self::with_hub(config, Arc::new(Hub::new()))
    }

    /// Build state around an existing hub, e.g. one the CRUD layer already
    /// holds an emitter for.
    pub fn with_hub(config: PitchsideConfig, hub: Arc<Hub>) -> Self {
        Self {
            config,
            emitter: Emitter::new(Arc::clone(&hub)),
            hub,
        }
    }
}

/// Assemble the full Axum router.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(crate::http::health::health_handler))
        .route("/ws", get(crate::ws::connection::ws_handler))
        .route("/rooms", get(crate::http::rooms::list_rooms))
        .route("/rooms/{room}", get(crate::http::rooms::room_size))
        .with_state(state)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}
