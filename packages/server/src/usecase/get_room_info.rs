//! UseCase: ルーム情報の取得（`get-room-info`）

use std::sync::Arc;

use crate::domain::{Room, RoomKey, RoomRepository};

use super::error::GetRoomError;

pub struct GetRoomInfoUseCase {
    rooms: Arc<dyn RoomRepository>,
}

impl GetRoomInfoUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>) -> Self {
        Self { rooms }
    }

    pub async fn execute(&self, key: &RoomKey) -> Result<Room, GetRoomError> {
        self.rooms
            .get_room(key)
            .await
            .ok_or(GetRoomError::RoomNotFound)
    }
}
