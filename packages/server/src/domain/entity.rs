//! Entities
//!
//! - `Connection`: 1 本の双方向接続（User Registry が保持する）
//! - `Member`: ルームから見た接続（編集権限を持つ）
//! - `Room`: プラットフォーム内の共同編集セッション
//!
//! ## 編集権限の不変条件
//!
//! - メンバーが 1 人以上いるルームでは、`can_edit = true` のメンバーはちょうど 1 人
//! - メンバーがいないルームでは誰も編集権限を持たない
//! - 編集者が抜けた場合、残っているメンバーの先頭（参加順）に権限が移る

use serde_json::{Map, Value};

use super::{
    ConnectionId, DisplayName, EventId, Platform, RoomError, RoomId, RoomKey, Timestamp, UserId,
};

/// ルームの共有データ（スキーマを持たない JSON オブジェクト）
pub type SharedState = Map<String, Value>;

/// 接続中のクライアント
#[derive(Debug, Clone, PartialEq)]
pub struct Connection {
    pub id: ConnectionId,
    pub display_name: DisplayName,
    pub user_id: Option<UserId>,
    pub platform: Platform,
    pub connected_at: Timestamp,
}

impl Connection {
    /// 接続直後の Connection を作成（識別情報は既定値）
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            display_name: DisplayName::default(),
            user_id: None,
            platform: Platform::default(),
            connected_at,
        }
    }

    /// 指定されたフィールドだけを上書きする
    pub fn apply(&mut self, update: IdentityUpdate) {
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(user_id) = update.user_id {
            self.user_id = Some(user_id);
        }
        if let Some(platform) = update.platform {
            self.platform = platform;
        }
    }
}

/// `configure-identity` で送られてくる識別情報の差分
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdentityUpdate {
    pub display_name: Option<DisplayName>,
    pub user_id: Option<UserId>,
    pub platform: Option<Platform>,
}

/// ルームのメンバー
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub user_id: Option<UserId>,
    pub display_name: DisplayName,
    pub platform: Platform,
    pub can_edit: bool,
    pub joined_at: Timestamp,
}

/// 共同編集ルーム
#[derive(Debug, Clone, PartialEq)]
pub struct Room {
    key: RoomKey,
    members: Vec<Member>,
    shared_state: SharedState,
    last_event_id: Option<EventId>,
    editor: Option<ConnectionId>,
    created_at: Timestamp,
}

impl Room {
    pub fn new(key: RoomKey, created_at: Timestamp) -> Self {
        Self {
            key,
            members: Vec::new(),
            shared_state: SharedState::new(),
            last_event_id: None,
            editor: None,
            created_at,
        }
    }

    pub fn key(&self) -> &RoomKey {
        &self.key
    }

    pub fn room_id(&self) -> &RoomId {
        &self.key.room_id
    }

    pub fn platform(&self) -> &Platform {
        &self.key.platform
    }

    /// 参加順のメンバー一覧
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn shared_state(&self) -> &SharedState {
        &self.shared_state
    }

    pub fn last_event_id(&self) -> Option<&EventId> {
        self.last_event_id.as_ref()
    }

    pub fn editor_connection_id(&self) -> Option<&ConnectionId> {
        self.editor.as_ref()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    /// メンバーを末尾に追加する
    ///
    /// 空のルームに最初に参加したメンバーが編集権限を得る。
    /// 同じ接続が複数回参加した場合は、参加の数だけメンバーが登録される。
    pub fn add_member(
        &mut self,
        connection_id: ConnectionId,
        user_id: Option<UserId>,
        display_name: Option<DisplayName>,
        platform: Option<Platform>,
        joined_at: Timestamp,
    ) -> Member {
        let can_edit = self.members.is_empty();
        if can_edit {
            self.editor = Some(connection_id.clone());
        }

        let member = Member {
            connection_id,
            user_id,
            display_name: display_name.unwrap_or_default(),
            platform: platform.unwrap_or_default(),
            can_edit,
            joined_at,
        };
        self.members.push(member.clone());
        member
    }

    /// 接続 ID が最初に一致したメンバーを削除する
    ///
    /// 削除されたメンバーが編集者だった場合、残りの先頭メンバーに権限を移す。
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> Option<Member> {
        let index = self
            .members
            .iter()
            .position(|member| &member.connection_id == connection_id)?;
        let removed = self.members.remove(index);

        if removed.can_edit {
            match self.members.first_mut() {
                Some(successor) => {
                    successor.can_edit = true;
                    self.editor = Some(successor.connection_id.clone());
                }
                None => self.editor = None,
            }
        }

        Some(removed)
    }

    /// 共有データへの浅いマージ（キー単位で後勝ち）
    pub fn merge_state(&mut self, partial: SharedState) {
        self.shared_state.extend(partial);
    }

    pub fn set_last_event_id(&mut self, event_id: EventId) {
        self.last_event_id = Some(event_id);
    }

    /// 編集者による更新を適用する
    pub fn apply_edit(
        &mut self,
        by: &ConnectionId,
        partial: SharedState,
        event_id: Option<EventId>,
    ) -> Result<(), RoomError> {
        if !self.can_edit(by) {
            return Err(RoomError::EditPermissionDenied(by.as_str().to_string()));
        }
        self.merge_state(partial);
        if let Some(event_id) = event_id {
            self.set_last_event_id(event_id);
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|member| &member.connection_id == connection_id)
    }

    pub fn current_editor(&self) -> Option<&Member> {
        self.members.iter().find(|member| member.can_edit)
    }

    /// 非メンバーの場合はエラーではなく `false`
    pub fn can_edit(&self, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .find(|member| &member.connection_id == connection_id)
            .is_some_and(|member| member.can_edit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn key(room_id: &str, platform: &str) -> RoomKey {
        RoomKey::new(
            RoomId::new(room_id.to_string()).unwrap(),
            Platform::new(platform.to_string()).unwrap(),
        )
    }

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn join(room: &mut Room, id: &str) -> Member {
        room.add_member(conn(id), None, None, None, Timestamp::new(1000))
    }

    fn state(value: serde_json::Value) -> SharedState {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("state must be a JSON object"),
        }
    }

    fn editor_count(room: &Room) -> usize {
        room.members().iter().filter(|m| m.can_edit).count()
    }

    #[test]
    fn test_first_member_becomes_editor() {
        // テスト項目: 空のルームに最初に参加したメンバーが編集権限を得る
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));

        // when (操作):
        let member = join(&mut room, "A");

        // then (期待する結果):
        assert!(member.can_edit);
        assert_eq!(room.current_editor().map(|m| m.connection_id.as_str()), Some("A"));
        assert_eq!(room.editor_connection_id(), Some(&conn("A")));
    }

    #[test]
    fn test_members_keep_join_order_and_single_editor() {
        // テスト項目: 後から参加したメンバーは編集権限を持たず、参加順が保持される
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));

        // when (操作):
        join(&mut room, "A");
        let b = join(&mut room, "B");

        // then (期待する結果):
        assert!(!b.can_edit);
        assert!(room.can_edit(&conn("A")));
        assert!(!room.can_edit(&conn("B")));
        let order: Vec<&str> = room
            .members()
            .iter()
            .map(|m| m.connection_id.as_str())
            .collect();
        assert_eq!(order, vec!["A", "B"]);
        assert_eq!(editor_count(&room), 1);
    }

    #[test]
    fn test_editor_leaving_promotes_next_member_in_join_order() {
        // テスト項目: 編集者が抜けると、参加順で先頭のメンバーに権限が移る
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "A");
        join(&mut room, "B");
        join(&mut room, "C");

        // when (操作):
        let removed = room.remove_member(&conn("A"));

        // then (期待する結果):
        assert!(removed.is_some_and(|m| m.can_edit));
        assert_eq!(room.current_editor().map(|m| m.connection_id.as_str()), Some("B"));
        assert_eq!(room.editor_connection_id(), Some(&conn("B")));
        assert!(!room.can_edit(&conn("C")));
        assert_eq!(editor_count(&room), 1);
    }

    #[test]
    fn test_non_editor_leaving_keeps_editor() {
        // テスト項目: 編集者以外が抜けても編集者は変わらない
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "A");
        join(&mut room, "B");
        join(&mut room, "C");

        // when (操作):
        room.remove_member(&conn("B"));

        // then (期待する結果):
        assert_eq!(room.editor_connection_id(), Some(&conn("A")));
        assert_eq!(editor_count(&room), 1);
        assert_eq!(room.members().len(), 2);
    }

    #[test]
    fn test_last_member_leaving_clears_editor() {
        // テスト項目: 最後のメンバーが抜けると編集者がいなくなる
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "A");

        // when (操作):
        room.remove_member(&conn("A"));

        // then (期待する結果):
        assert!(room.is_empty());
        assert!(room.current_editor().is_none());
        assert!(room.editor_connection_id().is_none());
    }

    #[test]
    fn test_remove_unknown_member_returns_none() {
        // テスト項目: メンバーでない接続の削除は None を返し、状態を変えない
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "A");

        // when (操作):
        let removed = room.remove_member(&conn("Z"));

        // then (期待する結果):
        assert!(removed.is_none());
        assert_eq!(room.members().len(), 1);
        assert_eq!(room.editor_connection_id(), Some(&conn("A")));
    }

    #[test]
    fn test_duplicate_join_keeps_single_editor() {
        // テスト項目: 同じ接続が二重に参加しても編集者は常に 1 人
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "B");
        join(&mut room, "A");
        room.remove_member(&conn("B"));
        join(&mut room, "A");
        assert_eq!(room.members().len(), 2);

        // when (操作):
        room.remove_member(&conn("A"));

        // then (期待する結果): 残った A の 2 件目に権限が移る
        assert_eq!(room.members().len(), 1);
        assert_eq!(editor_count(&room), 1);
        assert!(room.can_edit(&conn("A")));
    }

    #[test]
    fn test_add_member_uses_default_identity() {
        // テスト項目: 表示名とプラットフォームが省略された場合は既定値が使われる
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));

        // when (操作):
        let member = room.add_member(
            conn("A"),
            Some(UserId::new("42".to_string()).unwrap()),
            None,
            None,
            Timestamp::new(2000),
        );

        // then (期待する結果):
        assert_eq!(member.display_name.as_str(), "nameless");
        assert_eq!(member.platform.as_str(), "general");
        assert_eq!(member.user_id.map(|id| id.as_str().to_string()), Some("42".to_string()));
        assert_eq!(member.joined_at, Timestamp::new(2000));
    }

    #[test]
    fn test_merge_state_is_shallow_last_writer_wins() {
        // テスト項目: 共有データはキー単位で上書きされ、他のキーは保持される
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        room.merge_state(state(json!({"title": "draft", "page": {"n": 1, "m": 2}})));

        // when (操作):
        room.merge_state(state(json!({"page": {"n": 3}, "color": "red"})));

        // then (期待する結果):
        assert_eq!(
            serde_json::Value::Object(room.shared_state().clone()),
            json!({"title": "draft", "page": {"n": 3}, "color": "red"})
        );
    }

    #[test]
    fn test_apply_edit_requires_edit_permission() {
        // テスト項目: 編集権限を持たない接続からの更新は拒否され、状態は変わらない
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "A");
        join(&mut room, "B");

        // when (操作):
        let result = room.apply_edit(
            &conn("B"),
            state(json!({"title": "hijack"})),
            Some(EventId::new("e1".to_string()).unwrap()),
        );

        // then (期待する結果):
        assert_eq!(
            result,
            Err(RoomError::EditPermissionDenied("B".to_string()))
        );
        assert!(room.shared_state().is_empty());
        assert!(room.last_event_id().is_none());
    }

    #[test]
    fn test_apply_edit_by_editor_records_event_id() {
        // テスト項目: 編集者の更新はマージされ、イベント ID が記録される
        // given (前提条件):
        let mut room = Room::new(key("R1", "web"), Timestamp::new(1000));
        join(&mut room, "A");

        // when (操作):
        let result = room.apply_edit(
            &conn("A"),
            state(json!({"title": "final"})),
            Some(EventId::new("e1".to_string()).unwrap()),
        );

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(room.shared_state().get("title"), Some(&json!("final")));
        assert_eq!(room.last_event_id().map(EventId::as_str), Some("e1"));
    }

    #[test]
    fn test_connection_apply_only_overwrites_given_fields() {
        // テスト項目: 識別情報の更新は指定されたフィールドのみ反映される
        // given (前提条件):
        let mut connection = Connection::new(conn("A"), Timestamp::new(1000));

        // when (操作):
        connection.apply(IdentityUpdate {
            display_name: Some(DisplayName::new("Alice".to_string()).unwrap()),
            user_id: None,
            platform: None,
        });

        // then (期待する結果):
        assert_eq!(connection.display_name.as_str(), "Alice");
        assert!(connection.user_id.is_none());
        assert_eq!(connection.platform.as_str(), "general");
    }
}
