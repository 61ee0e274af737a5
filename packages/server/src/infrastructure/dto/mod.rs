//! Data Transfer Objects (DTOs) for the collaboration server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frame DTOs (event gateway)
//! - `http`: HTTP side-channel request/response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
