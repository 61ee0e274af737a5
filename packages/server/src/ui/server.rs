//! Server execution logic.

use std::sync::Arc;

use axum::{
    Router,
    http::Method,
    routing::{get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::{
    handler::{
        get_room_detail, get_rooms, get_rooms_by_platform, get_users, get_users_by_platform,
        health_check, post_alert, post_notification, websocket_handler,
    },
    signal::shutdown_signal,
    state::AppState,
};

/// Collaboration server
///
/// # Example
///
/// ```ignore
/// let state = AppState::new(connections, rooms, message_pusher, clock);
/// Server::new(state).run("127.0.0.1".to_string(), 3005).await?;
/// ```
pub struct Server {
    state: Arc<AppState>,
}

impl Server {
    pub fn new(state: AppState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Build the router (WebSocket gateway + HTTP side-channel)
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/alert", post(post_alert))
            .route("/notification", post(post_notification))
            .route("/users", get(get_users))
            .route("/users/{platform}", get(get_users_by_platform))
            .route("/rooms", get(get_rooms))
            .route("/rooms/{platform}", get(get_rooms_by_platform))
            .route("/rooms/{platform}/{room_id}", get(get_room_detail))
            .route("/api/health", get(health_check))
            .layer(cors_layer())
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the server
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.router();

        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "Collaboration server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}

/// Browser clients may be served from any origin.
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers(Any)
}
