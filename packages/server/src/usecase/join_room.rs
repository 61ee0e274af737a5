//! UseCase: 権限付きルーム参加（`join-room-with-permissions`）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - Room Registry へのメンバー追加とチャンネル購読
//!
//! ### なぜこのテストが必要か
//! - 最初の参加者だけが編集権限を得ることを保証するため
//! - 未設定の接続やプラットフォーム未指定の参加を拒否するため
//!
//! ### どのような状況を想定しているか
//! - 正常系：空のルームへの参加、既存ルームへの参加
//! - 異常系：プラットフォーム未指定、未登録の接続

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{
    ConnectionId, ConnectionRepository, MessagePusher, Platform, Room, RoomId, RoomKey,
    RoomRepository, Timestamp,
};

use super::error::JoinRoomError;

/// 権限付きルーム参加のユースケース
pub struct JoinRoomUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
    /// Room Registry
    rooms: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connections,
            rooms,
            message_pusher,
            clock,
        }
    }

    /// ルームに参加する（ルームがなければ作成）
    ///
    /// メンバーの表示名と外部ユーザー ID は User Registry の値を使う。
    ///
    /// # Returns
    ///
    /// 参加後のルーム
    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        room_id: RoomId,
        platform: Option<Platform>,
    ) -> Result<Room, JoinRoomError> {
        let connection = self.connections.get_connection(connection_id).await;
        let (Some(connection), Some(platform)) = (connection, platform) else {
            return Err(JoinRoomError::NotConfigured);
        };

        let key = RoomKey::new(room_id, platform);
        self.message_pusher
            .join_channel(connection_id, &key.room_id)
            .await;

        let room = self
            .rooms
            .add_member_to_room(
                &key,
                connection.id,
                connection.user_id,
                Some(connection.display_name),
                Timestamp::new(self.clock.now_millis()),
            )
            .await;
        tracing::info!("Connection '{}' joined room {}", connection_id, key);
        Ok(room)
    }
}
