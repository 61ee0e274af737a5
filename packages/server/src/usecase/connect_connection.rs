//! UseCase: 接続の受け付け
//!
//! トランスポート層が割り当てた接続 ID を User Registry と MessagePusher に登録します。

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{ConnectionId, ConnectionRepository, MessagePusher, PusherChannel, Timestamp};

/// 接続受け付けのユースケース
pub struct ConnectConnectionUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    clock: Arc<dyn Clock>,
}

impl ConnectConnectionUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            connections,
            message_pusher,
            clock,
        }
    }

    /// 接続を登録する
    ///
    /// # Returns
    ///
    /// 接続時刻
    pub async fn execute(&self, connection_id: ConnectionId, sender: PusherChannel) -> Timestamp {
        let connected_at = Timestamp::new(self.clock.now_millis());
        self.connections
            .add_connection(connection_id.clone(), connected_at)
            .await;
        self.message_pusher
            .register_client(connection_id, sender)
            .await;
        connected_at
    }
}
