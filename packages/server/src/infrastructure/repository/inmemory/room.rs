//! InMemory Room Repository 実装（Room Registry）
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `BTreeMap` をインメモリ DB として使用し、(platform, roomId) の順で走査します。
//!
//! 全操作は 1 つの Mutex の内側で完結するため、「取得または作成してから追加」や
//! 「削除してから空なら破棄」が他の操作と交錯することはありません。

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, EventId, Platform, RepositoryError, Room, RoomKey, RoomRemoval,
    RoomRepository, RoomSweep, SharedState, Timestamp, UserId,
};

/// インメモリ Room Repository 実装
#[derive(Default)]
pub struct InMemoryRoomRepository {
    rooms: Mutex<BTreeMap<RoomKey, Room>>,
}

impl InMemoryRoomRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn create_room(&self, key: &RoomKey, created_at: Timestamp) -> Room {
        let mut rooms = self.rooms.lock().await;
        rooms
            .entry(key.clone())
            .or_insert_with(|| {
                tracing::info!("Room {} created", key);
                Room::new(key.clone(), created_at)
            })
            .clone()
    }

    async fn get_room(&self, key: &RoomKey) -> Option<Room> {
        let rooms = self.rooms.lock().await;
        rooms.get(key).cloned()
    }

    async fn delete_room(&self, key: &RoomKey) -> Option<Room> {
        let mut rooms = self.rooms.lock().await;
        rooms.remove(key)
    }

    async fn add_member_to_room(
        &self,
        key: &RoomKey,
        connection_id: ConnectionId,
        user_id: Option<UserId>,
        display_name: Option<DisplayName>,
        joined_at: Timestamp,
    ) -> Room {
        let mut rooms = self.rooms.lock().await;
        let room = rooms.entry(key.clone()).or_insert_with(|| {
            tracing::info!("Room {} created", key);
            Room::new(key.clone(), joined_at)
        });
        room.add_member(
            connection_id,
            user_id,
            display_name,
            Some(key.platform.clone()),
            joined_at,
        );
        room.clone()
    }

    async fn remove_member_from_room(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
    ) -> RoomRemoval {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(key) else {
            return RoomRemoval::NotFound;
        };

        room.remove_member(connection_id);
        if !room.is_empty() {
            return RoomRemoval::Remaining(room.clone());
        }

        match rooms.remove(key) {
            Some(closed) => {
                tracing::info!("Room {} closed", key);
                RoomRemoval::Closed(closed)
            }
            None => RoomRemoval::NotFound,
        }
    }

    async fn remove_connection_from_all_rooms(&self, connection_id: &ConnectionId) -> RoomSweep {
        let mut rooms = self.rooms.lock().await;
        let mut sweep = RoomSweep::default();

        for room in rooms.values_mut() {
            // 重複参加していた場合も含め、切断した接続のメンバーはすべて削除する
            let mut removed = false;
            while room.remove_member(connection_id).is_some() {
                removed = true;
            }
            if removed {
                if room.is_empty() {
                    sweep.closed.push(room.clone());
                } else {
                    sweep.updated.push(room.clone());
                }
            }
        }

        rooms.retain(|key, room| {
            let keep = !room.is_empty();
            if !keep {
                tracing::info!("Room {} closed", key);
            }
            keep
        });

        sweep
    }

    async fn update_room_data(
        &self,
        key: &RoomKey,
        editor: &ConnectionId,
        partial: SharedState,
        event_id: Option<EventId>,
    ) -> Result<Room, RepositoryError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .get_mut(key)
            .ok_or_else(|| RepositoryError::RoomNotFound(key.to_string()))?;
        room.apply_edit(editor, partial, event_id)?;
        Ok(room.clone())
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms.values().cloned().collect()
    }

    async fn list_rooms_by_platform(&self, platform: &Platform) -> Vec<Room> {
        let rooms = self.rooms.lock().await;
        rooms
            .values()
            .filter(|room| room.platform() == platform)
            .cloned()
            .collect()
    }
}
