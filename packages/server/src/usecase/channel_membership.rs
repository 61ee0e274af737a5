//! UseCase: 権限なしのルーム参加・退出（`join-room` / `leave-room`）
//!
//! トランスポート層のチャンネルを購読・解除するだけで、Room Registry は変更しません。

use std::sync::Arc;

use crate::domain::{Connection, ConnectionId, MessagePusher, Platform, RoomId};

use super::BroadcastUseCase;

/// チャンネル購読のユースケース
pub struct ChannelMembershipUseCase {
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    broadcast: Arc<BroadcastUseCase>,
}

impl ChannelMembershipUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>, broadcast: Arc<BroadcastUseCase>) -> Self {
        Self {
            message_pusher,
            broadcast,
        }
    }

    /// チャンネルを購読し、プラットフォームが一致する購読者一覧を返す
    pub async fn join(
        &self,
        connection_id: &ConnectionId,
        channel: &RoomId,
        platform: &Platform,
    ) -> Vec<Connection> {
        self.message_pusher.join_channel(connection_id, channel).await;
        self.broadcast.channel_roster(channel, platform).await
    }

    /// チャンネルの購読を解除し、プラットフォームが一致する残りの購読者一覧を返す
    pub async fn leave(
        &self,
        connection_id: &ConnectionId,
        channel: &RoomId,
        platform: &Platform,
    ) -> Vec<Connection> {
        self.message_pusher
            .leave_channel(connection_id, channel)
            .await;
        self.broadcast.channel_roster(channel, platform).await
    }
}
