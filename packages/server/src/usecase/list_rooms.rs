//! UseCase: ルーム一覧の取得（`GET /rooms` 系）

use std::sync::Arc;

use crate::domain::{Platform, Room, RoomKey, RoomRepository};

use super::error::GetRoomError;

pub struct ListRoomsUseCase {
    rooms: Arc<dyn RoomRepository>,
}

impl ListRoomsUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    /// キー順の全ルーム
    pub async fn all(&self) -> Vec<Room> {
        self.rooms.list_rooms().await
    }

    pub async fn by_platform(&self, platform: &Platform) -> Vec<Room> {
        self.rooms.list_rooms_by_platform(platform).await
    }

    pub async fn detail(&self, key: &RoomKey) -> Result<Room, GetRoomError> {
        self.rooms
            .get_room(key)
            .await
            .ok_or(GetRoomError::RoomNotFound)
    }
}
