//! UseCase: 共有データの更新（`update-room-data`）
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - UpdateRoomDataUseCase::execute() メソッド
//! - 共有データの浅いマージと lastEventId の記録
//!
//! ### なぜこのテストが必要か
//! - 編集者以外の更新で共有データが変わらないことを保証するため
//! - eventId がある場合にのみ個別イベントが生成されることを確認するため
//!
//! ### どのような状況を想定しているか
//! - 正常系：編集者による eventId 付き / なしの更新
//! - 異常系：存在しないルーム、編集者以外による更新

use std::sync::Arc;

use agora_shared::time::Clock;

use crate::domain::{
    ConnectionId, EventId, RepositoryError, Room, RoomKey, RoomRepository, SharedState, Timestamp,
};

use super::error::UpdateRoomDataError;

/// eventId 付きの更新で生成される個別イベント
#[derive(Debug, Clone, PartialEq)]
pub struct RoomEvent {
    pub event_id: EventId,
    /// 送信された部分データ（マージ前）
    pub data: SharedState,
    pub timestamp: Timestamp,
}

/// 更新結果
#[derive(Debug, Clone, PartialEq)]
pub struct RoomUpdate {
    pub room: Room,
    pub event: Option<RoomEvent>,
}

/// 共有データ更新のユースケース
pub struct UpdateRoomDataUseCase {
    /// Room Registry
    rooms: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl UpdateRoomDataUseCase {
    pub fn new(rooms: Arc<dyn RoomRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { rooms, clock }
    }

    pub async fn execute(
        &self,
        connection_id: &ConnectionId,
        key: &RoomKey,
        data: SharedState,
        event_id: Option<EventId>,
    ) -> Result<RoomUpdate, UpdateRoomDataError> {
        let event = event_id.clone().map(|event_id| RoomEvent {
            event_id,
            data: data.clone(),
            timestamp: Timestamp::new(self.clock.now_millis()),
        });

        let room = self
            .rooms
            .update_room_data(key, connection_id, data, event_id)
            .await
            .map_err(|e| match e {
                RepositoryError::Room(_) => UpdateRoomDataError::EditPermissionDenied,
                _ => UpdateRoomDataError::RoomNotFound,
            })?;

        Ok(RoomUpdate { room, event })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::fixtures::{Fixture, NOW, conn, room_key, state};
    use agora_shared::time::FixedClock;
    use serde_json::json;

    async fn setup() -> (Fixture, UpdateRoomDataUseCase, RoomKey) {
        let fixture = Fixture::new();
        let key = room_key("R1", "web");
        for id in ["A", "B"] {
            fixture
                .rooms
                .add_member_to_room(&key, conn(id), None, None, Timestamp::new(NOW))
                .await;
        }
        let usecase =
            UpdateRoomDataUseCase::new(fixture.rooms.clone(), Arc::new(FixedClock::new(NOW)));
        (fixture, usecase, key)
    }

    #[tokio::test]
    async fn test_editor_update_with_event_id() {
        // テスト項目: 編集者の eventId 付き更新はマージされ、個別イベントが生成される
        // given (前提条件):
        let (_fixture, usecase, key) = setup().await;
        usecase
            .execute(&conn("A"), &key, state(json!({"score": 1})), None)
            .await
            .unwrap();

        // when (操作):
        let update = usecase
            .execute(
                &conn("A"),
                &key,
                state(json!({"turn": "B"})),
                Some(EventId::new("e1".to_string()).unwrap()),
            )
            .await
            .unwrap();

        // then (期待する結果):
        assert_eq!(
            update.room.shared_state(),
            &state(json!({"score": 1, "turn": "B"}))
        );
        assert_eq!(update.room.last_event_id().map(|e| e.as_str()), Some("e1"));
        let event = update.event.unwrap();
        assert_eq!(event.event_id.as_str(), "e1");
        assert_eq!(event.data, state(json!({"turn": "B"})));
        assert_eq!(event.timestamp, Timestamp::new(NOW));
    }

    #[tokio::test]
    async fn test_update_without_event_id_has_no_event() {
        // テスト項目: eventId なしの更新では個別イベントは生成されない
        // given (前提条件):
        let (_fixture, usecase, key) = setup().await;

        // when (操作):
        let update = usecase
            .execute(&conn("A"), &key, state(json!({"x": 1})), None)
            .await
            .unwrap();

        // then (期待する結果):
        assert!(update.event.is_none());
        assert!(update.room.last_event_id().is_none());
    }

    #[tokio::test]
    async fn test_non_editor_update_is_rejected() {
        // テスト項目: 編集者以外の更新は拒否され、共有データは変わらない
        // given (前提条件):
        let (fixture, usecase, key) = setup().await;

        // when (操作):
        let result = usecase
            .execute(&conn("B"), &key, state(json!({"x": 1})), None)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(UpdateRoomDataError::EditPermissionDenied));
        let room = fixture.rooms.get_room(&key).await.unwrap();
        assert!(room.shared_state().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_room() {
        // テスト項目: 存在しないルームの更新は RoomNotFound になる
        // given (前提条件):
        let (_fixture, usecase, _key) = setup().await;

        // when (操作):
        let result = usecase
            .execute(&conn("A"), &room_key("R9", "web"), state(json!({})), None)
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(UpdateRoomDataError::RoomNotFound));
    }
}
