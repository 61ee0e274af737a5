//! メッセージ送信（通知）の抽象化
//!
//! UseCase 層はこの trait を通してクライアントへメッセージを届けます。
//! チャンネルはトランスポート層のルーム（roomId 単位の購読）に相当します。

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ConnectionId, MessagePushError, RoomId};

/// クライアントへの送信キュー
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// クライアントの送信キューを登録
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// クライアントの送信キューを登録解除
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// 特定のクライアントへ送信
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// 複数のクライアントへ送信（一部の失敗は許容）
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// チャンネルを購読
    async fn join_channel(&self, connection_id: &ConnectionId, channel: &RoomId);

    /// チャンネルの購読を解除
    async fn leave_channel(&self, connection_id: &ConnectionId, channel: &RoomId);

    /// 全チャンネルの購読を解除し、購読していたチャンネルを返す
    async fn leave_all_channels(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// チャンネルの購読者（購読順）
    async fn channel_members(&self, channel: &RoomId) -> Vec<ConnectionId>;

    /// チャンネルの全購読者へ送信
    async fn broadcast_to_channel(
        &self,
        channel: &RoomId,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
