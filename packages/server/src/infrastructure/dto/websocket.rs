//! WebSocket frame DTOs.
//!
//! Client → server: `{"event": "...", "data": {...}, "ack": 1}`
//!
//! Server → client: `{"event": "...", "data": {...}}`, acknowledgements carry
//! the `ack` id of the request they answer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// External user identifier, accepted as a JSON number or string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserIdDto {
    Number(i64),
    Text(String),
}

// ========================================
// Client → Server
// ========================================

/// Inbound events.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    ConfigureIdentity(ConfigureIdentityPayload),
    JoinRoom(RoomPayload),
    LeaveRoom(RoomPayload),
    JoinRoomWithPermissions(RoomPayload),
    LeaveRoomWithPermissions(RoomPayload),
    UpdateRoomData(UpdateRoomDataPayload),
    GetRoomInfo(RoomPayload),
}

impl ClientEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::ConfigureIdentity(_) => "configure-identity",
            Self::JoinRoom(_) => "join-room",
            Self::LeaveRoom(_) => "leave-room",
            Self::JoinRoomWithPermissions(_) => "join-room-with-permissions",
            Self::LeaveRoomWithPermissions(_) => "leave-room-with-permissions",
            Self::UpdateRoomData(_) => "update-room-data",
            Self::GetRoomInfo(_) => "get-room-info",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureIdentityPayload {
    pub name: Option<String>,
    pub user_id: Option<UserIdDto>,
    pub platform: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomPayload {
    pub room_id: String,
    #[serde(default)]
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoomDataPayload {
    pub room_id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub data: Map<String, Value>,
    pub event_id: Option<String>,
}

/// A parsed inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFrame {
    pub ack: Option<u64>,
    pub event: ClientEvent,
}

#[derive(Debug, Clone, Error, PartialEq)]
#[error("Invalid payload: {reason}")]
pub struct FrameError {
    /// Ack id, when it could be read from the frame.
    pub ack: Option<u64>,
    pub reason: String,
}

impl ClientFrame {
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let value: Value = serde_json::from_str(text).map_err(|e| FrameError {
            ack: None,
            reason: e.to_string(),
        })?;
        let ack = value.get("ack").and_then(Value::as_u64);
        let event = serde_json::from_value::<ClientEvent>(value).map_err(|e| FrameError {
            ack,
            reason: e.to_string(),
        })?;
        Ok(Self { ack, event })
    }
}

// ========================================
// Server → Client
// ========================================

/// Outbound event names. Room and platform scoped events carry the platform suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerEvent<'a> {
    Connected,
    Ack,
    PlatformRoster(&'a str),
    RoomUsers(&'a str),
    RoomUpdated(&'a str),
    RoomEvent(&'a str),
    RoomClosed(&'a str),
    Alert(&'a str),
    Notifications,
}

impl ServerEvent<'_> {
    pub fn name(&self) -> String {
        match self {
            Self::Connected => "connected".to_string(),
            Self::Ack => "ack".to_string(),
            Self::PlatformRoster(platform) => format!("all-connected-users-{}", platform),
            Self::RoomUsers(platform) => format!("room-users-{}", platform),
            Self::RoomUpdated(platform) => format!("room-updated-{}", platform),
            Self::RoomEvent(platform) => format!("room-event-{}", platform),
            Self::RoomClosed(platform) => format!("room-closed-{}", platform),
            Self::Alert(platform) => format!("alert-{}", platform),
            Self::Notifications => "notifications".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ServerFrame<T> {
    pub event: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    pub data: T,
}

impl<T: Serialize> ServerFrame<T> {
    pub fn new(event: ServerEvent<'_>, data: T) -> Self {
        Self {
            event: event.name(),
            ack: None,
            data,
        }
    }

    pub fn ack(ack: u64, data: T) -> Self {
        Self {
            event: ServerEvent::Ack.name(),
            ack: Some(ack),
            data,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub socket_id: String,
}

/// Generic acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AckMessage {
    pub ok: bool,
    pub message: String,
}

impl AckMessage {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// Acknowledgement for room events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub room: Option<RoomSnapshot>,
}

impl RoomResponse {
    pub fn ok(message: impl Into<String>, room: Option<RoomSnapshot>) -> Self {
        Self {
            ok: true,
            message: message.into(),
            room,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
            room: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: String,
    pub users: Vec<RoomUserDto>,
    pub data: Map<String, Value>,
    pub last_event_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub can_edit: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomUserDto {
    pub socket_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserIdDto>,
    pub name: String,
    pub can_edit: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionDto {
    pub socket_id: String,
    pub user_id: Option<UserIdDto>,
    pub name: String,
    pub platform: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomEventPayload {
    pub room_id: String,
    pub event_id: String,
    pub data: Map<String, Value>,
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomClosedPayload {
    pub room_id: String,
}
