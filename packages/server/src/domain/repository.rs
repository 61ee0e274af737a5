//! Repository trait 定義
//!
//! ドメイン層が必要とするデータアクセスのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。
//!
//! ## 一貫性
//!
//! 「ルームを取得または作成してメンバーを追加する」「メンバーを削除し、空なら
//! ルームを削除する」といった読み取り・変更・書き込みの組は、それぞれ 1 つの
//! メソッドとして提供されます。実装はメソッド単位で排他制御を行う必要があります。

use async_trait::async_trait;

use super::{
    Connection, ConnectionId, DisplayName, EventId, IdentityUpdate, Platform, RepositoryError,
    Room, RoomKey, SharedState, Timestamp, UserId,
};

/// User Registry
///
/// 接続中の全クライアントとそのプラットフォームを管理する。
#[async_trait]
pub trait ConnectionRepository: Send + Sync {
    /// 既定の識別情報で接続を登録
    async fn add_connection(&self, connection_id: ConnectionId, connected_at: Timestamp);

    /// 指定されたフィールドを更新（存在しない接続は何もしない）
    async fn configure_connection(
        &self,
        connection_id: &ConnectionId,
        update: IdentityUpdate,
    ) -> Option<Connection>;

    async fn get_connection(&self, connection_id: &ConnectionId) -> Option<Connection>;

    /// 接続を削除して返す
    async fn remove_connection(
        &self,
        connection_id: &ConnectionId,
    ) -> Result<Connection, RepositoryError>;

    /// 接続順の全接続
    async fn list_all(&self) -> Vec<Connection>;

    async fn list_by_platform(&self, platform: &Platform) -> Vec<Connection>;

    /// 指定された接続 ID のうち、プラットフォームが一致するもの
    async fn list_by_ids(
        &self,
        connection_ids: &[ConnectionId],
        platform: &Platform,
    ) -> Vec<Connection>;

    /// 外部ユーザー ID から接続を解決する（未知の ID は無視）
    async fn resolve_user_ids(&self, user_ids: &[UserId], platform: &Platform)
    -> ResolvedRecipients;
}

/// `resolve_user_ids` の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedRecipients {
    pub connection_ids: Vec<ConnectionId>,
    pub connections: Vec<Connection>,
}

impl ResolvedRecipients {
    pub fn is_empty(&self) -> bool {
        self.connection_ids.is_empty()
    }
}

/// `remove_member_from_room` の結果
#[derive(Debug, Clone, PartialEq)]
pub enum RoomRemoval {
    /// メンバーが削除され、ルームは残っている
    Remaining(Room),
    /// 最後のメンバーが削除され、ルームは破棄された
    Closed(Room),
    /// ルームが存在しない
    NotFound,
}

/// `remove_connection_from_all_rooms` の結果
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomSweep {
    /// 変更されたが残っているルーム
    pub updated: Vec<Room>,
    /// 空になって破棄されたルーム
    pub closed: Vec<Room>,
}

/// Room Registry
///
/// (roomId, platform) をキーとしてルームを管理する。
/// メンバーが 0 人のルームはレジストリに存在しない。
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// ルームを取得、なければ作成
    async fn create_room(&self, key: &RoomKey, created_at: Timestamp) -> Room;

    async fn get_room(&self, key: &RoomKey) -> Option<Room>;

    async fn delete_room(&self, key: &RoomKey) -> Option<Room>;

    /// ルームを取得または作成し、メンバーを追加
    async fn add_member_to_room(
        &self,
        key: &RoomKey,
        connection_id: ConnectionId,
        user_id: Option<UserId>,
        display_name: Option<DisplayName>,
        joined_at: Timestamp,
    ) -> Room;

    /// メンバーを削除し、空になったルームは破棄する
    async fn remove_member_from_room(
        &self,
        key: &RoomKey,
        connection_id: &ConnectionId,
    ) -> RoomRemoval;

    /// 全ルームから接続を削除し、空になったルームを破棄する
    async fn remove_connection_from_all_rooms(&self, connection_id: &ConnectionId) -> RoomSweep;

    /// 編集者による共有データの更新
    async fn update_room_data(
        &self,
        key: &RoomKey,
        editor: &ConnectionId,
        partial: SharedState,
        event_id: Option<EventId>,
    ) -> Result<Room, RepositoryError>;

    /// キー順の全ルーム
    async fn list_rooms(&self) -> Vec<Room>;

    async fn list_rooms_by_platform(&self, platform: &Platform) -> Vec<Room>;
}
