//! Domain errors.

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    /// 空文字列（空白のみを含む）は許可されない
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Room エンティティの操作エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RoomError {
    /// 編集権限を持たない接続からの更新
    #[error("connection '{0}' does not have edit permissions")]
    EditPermissionDenied(String),
}

/// Repository の操作エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("connection '{0}' not found")]
    ConnectionNotFound(String),
    #[error("room '{0}' not found")]
    RoomNotFound(String),
    #[error(transparent)]
    Room(#[from] RoomError),
}

/// MessagePusher の送信エラー
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),
    #[error("failed to push message: {0}")]
    PushFailed(String),
}
