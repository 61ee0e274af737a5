//! UseCase: ブロードキャスト対象の解決と送信
//!
//! 各イベントの結果をどの接続へ届けるかを決めます。
//!
//! - プラットフォーム単位: そのプラットフォームに設定された全接続
//! - チャンネル単位: roomId のチャンネルを購読している全接続

use std::sync::Arc;

use crate::domain::{
    Connection, ConnectionId, ConnectionRepository, MessagePushError, MessagePusher, Platform,
    RoomId,
};

/// ブロードキャストのユースケース
pub struct BroadcastUseCase {
    /// User Registry
    connections: Arc<dyn ConnectionRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl BroadcastUseCase {
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            connections,
            message_pusher,
        }
    }

    /// プラットフォームに属する接続の一覧（接続順）
    pub async fn platform_roster(&self, platform: &Platform) -> Vec<Connection> {
        self.connections.list_by_platform(platform).await
    }

    /// チャンネルを購読している接続のうち、プラットフォームが一致するもの
    pub async fn channel_roster(&self, channel: &RoomId, platform: &Platform) -> Vec<Connection> {
        let subscribers = self.message_pusher.channel_members(channel).await;
        self.connections.list_by_ids(&subscribers, platform).await
    }

    /// プラットフォームに属する全接続へ送信
    ///
    /// # Returns
    ///
    /// 送信対象の接続 ID
    pub async fn to_platform(
        &self,
        platform: &Platform,
        message: &str,
    ) -> Result<Vec<ConnectionId>, MessagePushError> {
        let targets: Vec<ConnectionId> = self
            .platform_roster(platform)
            .await
            .into_iter()
            .map(|c| c.id)
            .collect();
        self.message_pusher
            .broadcast(targets.clone(), message)
            .await?;
        Ok(targets)
    }

    /// チャンネルの全購読者へ送信
    pub async fn to_channel(
        &self,
        channel: &RoomId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher
            .broadcast_to_channel(channel, message)
            .await
    }

    /// 特定の接続へ送信（ack の返送に使う）
    pub async fn to_connection(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection_id, message).await
    }
}
