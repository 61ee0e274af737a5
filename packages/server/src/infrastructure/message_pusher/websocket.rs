//! WebSocket を使った MessagePusher 実装
//!
//! ## 責務
//!
//! - 接続ごとの `UnboundedSender` を管理
//! - トランスポート層のチャンネル（roomId 単位の購読）を管理
//! - クライアントへのメッセージ送信（push_to, broadcast, broadcast_to_channel）
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! この実装は生成された `UnboundedSender` を受け取り、メッセージ送信に使用します。
//! 送信はキューへの投入のみで完了するため、ロックを保持したまま送信しても
//! 他の接続の書き込みを待つことはありません。

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel, RoomId};

/// WebSocket を使った MessagePusher 実装
#[derive(Default)]
pub struct WebSocketMessagePusher {
    /// 接続中のクライアントの WebSocket sender
    ///
    /// Key: connection id
    clients: Mutex<HashMap<ConnectionId, PusherChannel>>,
    /// チャンネルごとの購読者（購読順）
    ///
    /// Key: channel (roomId)
    channels: Mutex<HashMap<RoomId, Vec<ConnectionId>>>,
}

impl WebSocketMessagePusher {
    pub fn new() -> Self {
        Self::default()
    }

    /// 送信キューへ投入する（失敗はログに残して続行）
    fn send_each(
        clients: &HashMap<ConnectionId, PusherChannel>,
        targets: &[ConnectionId],
        content: &str,
    ) {
        for target in targets {
            match clients.get(target) {
                Some(sender) => {
                    if let Err(e) = sender.send(content.to_string()) {
                        tracing::warn!("Failed to push message to client '{}': {}", target, e);
                    } else {
                        tracing::debug!("Broadcasted message to client '{}'", target);
                    }
                }
                None => {
                    tracing::warn!("Client '{}' not found during broadcast, skipping", target);
                }
            }
        }
    }
}

#[async_trait]
impl MessagePusher for WebSocketMessagePusher {
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let mut clients = self.clients.lock().await;
        tracing::debug!("Client '{}' registered to MessagePusher", connection_id);
        clients.insert(connection_id, sender);
    }

    async fn unregister_client(&self, connection_id: &ConnectionId) {
        let mut clients = self.clients.lock().await;
        clients.remove(connection_id);
        tracing::debug!("Client '{}' unregistered from MessagePusher", connection_id);
    }

    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;

        let sender = clients
            .get(connection_id)
            .ok_or_else(|| MessagePushError::ClientNotFound(connection_id.to_string()))?;
        sender
            .send(content.to_string())
            .map_err(|e| MessagePushError::PushFailed(e.to_string()))?;
        tracing::debug!("Pushed message to client '{}'", connection_id);
        Ok(())
    }

    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let clients = self.clients.lock().await;
        // ブロードキャストでは一部の送信失敗を許容
        Self::send_each(&clients, &targets, content);
        Ok(())
    }

    async fn join_channel(&self, connection_id: &ConnectionId, channel: &RoomId) {
        let mut channels = self.channels.lock().await;
        let subscribers = channels.entry(channel.clone()).or_default();
        if !subscribers.contains(connection_id) {
            subscribers.push(connection_id.clone());
            tracing::debug!("Client '{}' joined channel '{}'", connection_id, channel);
        }
    }

    async fn leave_channel(&self, connection_id: &ConnectionId, channel: &RoomId) {
        let mut channels = self.channels.lock().await;
        if let Some(subscribers) = channels.get_mut(channel) {
            subscribers.retain(|id| id != connection_id);
            if subscribers.is_empty() {
                channels.remove(channel);
            }
            tracing::debug!("Client '{}' left channel '{}'", connection_id, channel);
        }
    }

    async fn leave_all_channels(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let mut channels = self.channels.lock().await;
        let mut left = Vec::new();
        for (channel, subscribers) in channels.iter_mut() {
            let before = subscribers.len();
            subscribers.retain(|id| id != connection_id);
            if subscribers.len() != before {
                left.push(channel.clone());
            }
        }
        channels.retain(|_, subscribers| !subscribers.is_empty());
        left.sort();
        left
    }

    async fn channel_members(&self, channel: &RoomId) -> Vec<ConnectionId> {
        let channels = self.channels.lock().await;
        channels.get(channel).cloned().unwrap_or_default()
    }

    async fn broadcast_to_channel(
        &self,
        channel: &RoomId,
        content: &str,
    ) -> Result<(), MessagePushError> {
        let targets = self.channel_members(channel).await;
        let clients = self.clients.lock().await;
        Self::send_each(&clients, &targets, content);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - push_to: 特定のクライアントへの送信
    // - broadcast: 複数クライアントへの送信（部分失敗の許容）
    // - チャンネルの購読・解除とチャンネル単位の送信
    //
    // 【なぜこのテストが必要か】
    // - ルームの更新通知はチャンネルの購読者にのみ届く必要がある
    // - 切断時に購読していたチャンネルを漏れなく返す必要がある
    // ========================================

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn channel(id: &str) -> RoomId {
        RoomId::new(id.to_string()).unwrap()
    }

    async fn registered(
        pusher: &WebSocketMessagePusher,
        id: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        pusher.register_client(conn(id), tx).await;
        rx
    }

    #[tokio::test]
    async fn test_push_to_success() {
        // テスト項目: 特定のクライアントにメッセージを送信できる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx = registered(&pusher, "alice").await;

        // when (操作):
        let result = pusher.push_to(&conn("alice"), "Hello").await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Hello".to_string()));
    }

    #[tokio::test]
    async fn test_push_to_client_not_found() {
        // テスト項目: 存在しないクライアントへの送信はエラーを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        let result = pusher.push_to(&conn("nonexistent"), "Hello").await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(MessagePushError::ClientNotFound("nonexistent".to_string()))
        );
    }

    #[tokio::test]
    async fn test_broadcast_partial_failure() {
        // テスト項目: ブロードキャスト時、一部のクライアントが存在しなくても成功する
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut rx = registered(&pusher, "alice").await;

        // when (操作):
        let result = pusher
            .broadcast(vec![conn("alice"), conn("ghost")], "Broadcast message")
            .await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(rx.recv().await, Some("Broadcast message".to_string()));
    }

    #[tokio::test]
    async fn test_broadcast_to_channel_reaches_only_subscribers() {
        // テスト項目: チャンネル単位の送信は購読者にのみ届く
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        let mut alice = registered(&pusher, "alice").await;
        let mut bob = registered(&pusher, "bob").await;
        pusher.join_channel(&conn("alice"), &channel("R1")).await;

        // when (操作):
        pusher
            .broadcast_to_channel(&channel("R1"), "update")
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(alice.recv().await, Some("update".to_string()));
        assert!(bob.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_join_channel_twice_subscribes_once() {
        // テスト項目: 同じチャンネルへの二重購読は 1 件として扱われる
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();

        // when (操作):
        pusher.join_channel(&conn("alice"), &channel("R1")).await;
        pusher.join_channel(&conn("alice"), &channel("R1")).await;
        pusher.join_channel(&conn("bob"), &channel("R1")).await;

        // then (期待する結果):
        assert_eq!(
            pusher.channel_members(&channel("R1")).await,
            vec![conn("alice"), conn("bob")]
        );
    }

    #[tokio::test]
    async fn test_leave_all_channels_returns_left_channels() {
        // テスト項目: 全チャンネルからの離脱は購読していたチャンネルを返す
        // given (前提条件):
        let pusher = WebSocketMessagePusher::new();
        pusher.join_channel(&conn("alice"), &channel("R2")).await;
        pusher.join_channel(&conn("alice"), &channel("R1")).await;
        pusher.join_channel(&conn("bob"), &channel("R1")).await;

        // when (操作):
        let left = pusher.leave_all_channels(&conn("alice")).await;

        // then (期待する結果):
        assert_eq!(left, vec![channel("R1"), channel("R2")]);
        assert_eq!(pusher.channel_members(&channel("R1")).await, vec![conn("bob")]);
        assert!(pusher.channel_members(&channel("R2")).await.is_empty());
    }
}
