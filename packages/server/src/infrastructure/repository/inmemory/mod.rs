//! インメモリ Repository 実装
//!
//! プロセスの生存期間だけ状態を保持します（永続化はしない）。

pub mod connection;
pub mod room;

pub use connection::InMemoryConnectionRepository;
pub use room::InMemoryRoomRepository;
