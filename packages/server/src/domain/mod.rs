//! Domain 層
//!
//! 接続（Connection）とコラボレーションルーム（Room）のモデル、
//! および Infrastructure 層が実装すべきインターフェースを定義します。

pub mod entity;
pub mod error;
pub mod message_pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Connection, IdentityUpdate, Member, Room, SharedState};
pub use error::{MessagePushError, RepositoryError, RoomError, ValueObjectError};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use repository::{
    ConnectionRepository, ResolvedRecipients, RoomRemoval, RoomRepository, RoomSweep,
};
pub use value_object::{
    ConnectionId, ConnectionIdFactory, DisplayName, EventId, Platform, RoomId, RoomKey, Timestamp,
    UserId,
};
