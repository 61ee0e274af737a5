//! UseCase 層のエラー
//!
//! `Display` の文字列はそのままクライアントへの `message` として返されます。

use thiserror::Error;

/// 切断処理のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DisconnectError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),
}

/// 権限付きルーム参加のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JoinRoomError {
    /// 接続が登録されていない、またはプラットフォームが指定されていない
    #[error("User not configured or platform missing")]
    NotConfigured,
}

/// ルームデータ更新のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpdateRoomDataError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("User does not have edit permissions")]
    EditPermissionDenied,
}

/// ルーム取得のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GetRoomError {
    #[error("Room not found")]
    RoomNotFound,
}

/// 対象ユーザーへの通知のエラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NotifyUsersError {
    #[error("No active sockets found for the given user IDs")]
    NoActiveConnections,
}
