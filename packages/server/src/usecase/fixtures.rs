//! UseCase テスト用のヘルパー

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionRepository, DisplayName, IdentityUpdate, MessagePusher, Platform,
        RoomId, RoomKey, SharedState, Timestamp, UserId,
    },
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{InMemoryConnectionRepository, InMemoryRoomRepository},
    },
};

pub const NOW: i64 = 1_700_000_000_000;

pub struct Fixture {
    pub connections: Arc<InMemoryConnectionRepository>,
    pub rooms: Arc<InMemoryRoomRepository>,
    pub pusher: Arc<WebSocketMessagePusher>,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            connections: Arc::new(InMemoryConnectionRepository::new()),
            rooms: Arc::new(InMemoryRoomRepository::new()),
            pusher: Arc::new(WebSocketMessagePusher::new()),
        }
    }

    /// 接続を登録し、識別情報を設定する
    pub async fn connect(
        &self,
        id: &str,
        name: &str,
        user_id: Option<&str>,
        platform_name: &str,
    ) -> mpsc::UnboundedReceiver<String> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.connections
            .add_connection(conn(id), Timestamp::new(NOW))
            .await;
        self.connections
            .configure_connection(
                &conn(id),
                IdentityUpdate {
                    display_name: Some(DisplayName::new(name.to_string()).unwrap()),
                    user_id: user_id.map(|u| UserId::new(u.to_string()).unwrap()),
                    platform: Some(platform(platform_name)),
                },
            )
            .await;
        self.pusher.register_client(conn(id), tx).await;
        rx
    }
}

pub fn conn(id: &str) -> ConnectionId {
    ConnectionId::new(id.to_string()).unwrap()
}

pub fn platform(value: &str) -> Platform {
    Platform::new(value.to_string()).unwrap()
}

pub fn room_id(value: &str) -> RoomId {
    RoomId::new(value.to_string()).unwrap()
}

pub fn room_key(room: &str, platform_name: &str) -> RoomKey {
    RoomKey::new(room_id(room), platform(platform_name))
}

pub fn state(value: serde_json::Value) -> SharedState {
    match value {
        serde_json::Value::Object(map) => map,
        _ => panic!("state must be a JSON object"),
    }
}

/// 受信済みのメッセージをすべて取り出す
pub fn drain(rx: &mut mpsc::UnboundedReceiver<String>) -> Vec<String> {
    let mut received = Vec::new();
    while let Ok(message) = rx.try_recv() {
        received.push(message);
    }
    received
}
