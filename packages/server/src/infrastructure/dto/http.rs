//! HTTP side-channel DTOs.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::websocket::{ConnectionDto, RoomUserDto, UserIdDto};

/// Failure body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// `POST /alert` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertResponse {
    pub ok: bool,
    pub body: Value,
}

/// `POST /notification` request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub user_ids: Vec<UserIdDto>,
    pub notification: Value,
    pub platform: String,
}

/// `POST /notification` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub ok: bool,
    pub notification: Value,
    pub senders: Vec<ConnectionDto>,
}

/// `GET /users` and `GET /users/{platform}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientsResponse {
    pub ok: bool,
    pub clients: Vec<ConnectionDto>,
}

/// Room summary for list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSummaryDto {
    pub room_id: String,
    pub platform: String,
    pub users: Vec<String>,
    pub editor: Option<String>,
    pub created_at: String,
}

/// `GET /rooms` and `GET /rooms/{platform}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomsResponse {
    pub ok: bool,
    pub rooms: Vec<RoomSummaryDto>,
}

/// `GET /rooms/{platform}/{room_id}` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomDetailDto {
    pub room_id: String,
    pub platform: String,
    pub users: Vec<RoomMemberDetailDto>,
    pub data: Map<String, Value>,
    pub last_event_id: String,
    pub editor: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomMemberDetailDto {
    #[serde(flatten)]
    pub user: RoomUserDto,
    pub joined_at: String,
}
