//! UI 層
//!
//! axum のルーター、WebSocket ハンドラー（Event Gateway）、HTTP ハンドラーを提供します。

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
