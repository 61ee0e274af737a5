//! Conversion logic between DTOs and domain entities.

use agora_shared::time::millis_to_rfc3339;

use crate::domain::{
    Connection, DisplayName, EventId, IdentityUpdate, Member, Platform, Room, RoomId, RoomKey,
    UserId, ValueObjectError,
};
use crate::infrastructure::dto::{http, websocket as dto};

// ========================================
// DTO → Domain
// ========================================

impl TryFrom<dto::UserIdDto> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: dto::UserIdDto) -> Result<Self, Self::Error> {
        match value {
            dto::UserIdDto::Number(number) => Ok(UserId::from_number(number)),
            dto::UserIdDto::Text(text) => UserId::new(text),
        }
    }
}

/// Blank strings are treated as "not provided".
fn provided(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<dto::ConfigureIdentityPayload> for IdentityUpdate {
    type Error = ValueObjectError;

    fn try_from(payload: dto::ConfigureIdentityPayload) -> Result<Self, Self::Error> {
        Ok(Self {
            display_name: provided(payload.name).map(DisplayName::new).transpose()?,
            user_id: payload.user_id.map(UserId::try_from).transpose()?,
            platform: provided(payload.platform).map(Platform::new).transpose()?,
        })
    }
}

impl dto::RoomPayload {
    pub fn key(&self) -> Result<RoomKey, ValueObjectError> {
        room_key(&self.room_id, &self.platform)
    }
}

impl dto::UpdateRoomDataPayload {
    pub fn key(&self) -> Result<RoomKey, ValueObjectError> {
        room_key(&self.room_id, &self.platform)
    }

    pub fn event_id(&self) -> Option<EventId> {
        provided(self.event_id.clone()).and_then(|id| EventId::new(id).ok())
    }
}

fn room_key(room_id: &str, platform: &str) -> Result<RoomKey, ValueObjectError> {
    Ok(RoomKey::new(
        RoomId::new(room_id.to_string())?,
        Platform::new(platform.to_string())?,
    ))
}

// ========================================
// Domain → DTO
// ========================================

impl From<&UserId> for dto::UserIdDto {
    fn from(user_id: &UserId) -> Self {
        match user_id.as_number() {
            Some(number) => Self::Number(number),
            None => Self::Text(user_id.as_str().to_string()),
        }
    }
}

impl From<&Member> for dto::RoomUserDto {
    fn from(member: &Member) -> Self {
        Self {
            socket_id: member.connection_id.as_str().to_string(),
            user_id: member.user_id.as_ref().map(dto::UserIdDto::from),
            name: member.display_name.as_str().to_string(),
            can_edit: member.can_edit,
        }
    }
}

impl From<&Connection> for dto::ConnectionDto {
    fn from(connection: &Connection) -> Self {
        Self {
            socket_id: connection.id.as_str().to_string(),
            user_id: connection.user_id.as_ref().map(dto::UserIdDto::from),
            name: connection.display_name.as_str().to_string(),
            platform: connection.platform.as_str().to_string(),
        }
    }
}

impl From<&Room> for dto::RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.room_id().as_str().to_string(),
            users: room.members().iter().map(dto::RoomUserDto::from).collect(),
            data: room.shared_state().clone(),
            last_event_id: room
                .last_event_id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            can_edit: None,
        }
    }
}

impl dto::RoomSnapshot {
    /// Snapshot as seen by one connection (`canEdit` filled in).
    pub fn for_viewer(room: &Room, viewer: &crate::domain::ConnectionId) -> Self {
        Self {
            can_edit: Some(room.can_edit(viewer)),
            ..Self::from(room)
        }
    }
}

impl From<&Room> for http::RoomSummaryDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.room_id().as_str().to_string(),
            platform: room.platform().as_str().to_string(),
            users: room
                .members()
                .iter()
                .map(|m| m.connection_id.as_str().to_string())
                .collect(),
            editor: room.editor_connection_id().map(|id| id.as_str().to_string()),
            created_at: millis_to_rfc3339(room.created_at().value()),
        }
    }
}

impl From<&Room> for http::RoomDetailDto {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.room_id().as_str().to_string(),
            platform: room.platform().as_str().to_string(),
            users: room
                .members()
                .iter()
                .map(|m| http::RoomMemberDetailDto {
                    user: dto::RoomUserDto::from(m),
                    joined_at: millis_to_rfc3339(m.joined_at.value()),
                })
                .collect(),
            data: room.shared_state().clone(),
            last_event_id: room
                .last_event_id()
                .map(|id| id.as_str().to_string())
                .unwrap_or_default(),
            editor: room.editor_connection_id().map(|id| id.as_str().to_string()),
            created_at: millis_to_rfc3339(room.created_at().value()),
        }
    }
}
