use axum::{
    extract::{ws::WebSocketUpgrade, State},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use gesture_core::{ClassifierSettings, LandmarkProvider, ProviderError};
use gesture_shared::LivenessResponse;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

use crate::config::DetectorConfig;
use crate::connection;

pub type BoxedProvider = Box<dyn LandmarkProvider + Send>;

/// Builds a fresh provider for each session that asks for one
pub type ProviderFactory =
    Arc<dyn Fn() -> Result<BoxedProvider, ProviderError> + Send + Sync>;

#[derive(Clone)]
pub struct AppState {
    pub settings: ClassifierSettings,
    pub providers: ProviderFactory,
}

impl AppState {
    pub fn new(settings: ClassifierSettings, providers: ProviderFactory) -> Self {
        Self {
            settings,
            providers,
        }
    }
}

pub fn skin_detector_factory(config: DetectorConfig) -> ProviderFactory {
    Arc::new(move || Ok::<_, ProviderError>(Box::new(config.build()) as BoxedProvider))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(liveness))
        .route("/ws", get(websocket))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        log::info!("Listening on {}", addr);
    }
    axum::serve(listener, router(state)).await
}

async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse::ready())
}

async fn websocket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| connection::handle_socket(socket, state))
        .into_response()
}
