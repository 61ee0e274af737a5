//! UseCase: 権限付きルーム退出（`leave-room-with-permissions`）

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePusher, RoomKey, RoomRemoval, RoomRepository};

/// 権限付きルーム退出のユースケース
pub struct LeaveRoomUseCase {
    /// Room Registry
    rooms: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self {
            rooms,
            message_pusher,
        }
    }

    /// ルームから退出する
    ///
    /// ルームが存在しない、またはメンバーでない場合も失敗にはしない。
    pub async fn execute(&self, connection_id: &ConnectionId, key: &RoomKey) -> RoomRemoval {
        self.message_pusher
            .leave_channel(connection_id, &key.room_id)
            .await;
        self.rooms.remove_member_from_room(key, connection_id).await
    }
}
