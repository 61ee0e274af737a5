//! Request handlers.

mod http;
mod websocket;

pub use http::{
    get_room_detail, get_rooms, get_rooms_by_platform, get_users, get_users_by_platform,
    health_check, post_alert, post_notification,
};
pub use websocket::websocket_handler;
