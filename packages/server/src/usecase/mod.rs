//! UseCase 層
//!
//! 受信イベントや HTTP リクエストごとのアプリケーションロジックを提供します。
//! レジストリ（Repository）の状態は必ずここで定義された操作を通して変更されます。

mod broadcast;
mod channel_membership;
mod configure_identity;
mod connect_connection;
mod disconnect_connection;
mod error;
#[cfg(test)]
mod fixtures;
mod get_room_info;
mod join_room;
mod leave_room;
mod list_connections;
mod list_rooms;
mod notify_users;
mod send_alert;
mod update_room_data;

pub use broadcast::BroadcastUseCase;
pub use channel_membership::ChannelMembershipUseCase;
pub use configure_identity::ConfigureIdentityUseCase;
pub use connect_connection::ConnectConnectionUseCase;
pub use disconnect_connection::{DisconnectConnectionUseCase, DisconnectOutcome};
pub use error::{
    DisconnectError, GetRoomError, JoinRoomError, NotifyUsersError, UpdateRoomDataError,
};
pub use get_room_info::GetRoomInfoUseCase;
pub use join_room::JoinRoomUseCase;
pub use leave_room::LeaveRoomUseCase;
pub use list_connections::ListConnectionsUseCase;
pub use list_rooms::ListRoomsUseCase;
pub use notify_users::NotifyUsersUseCase;
pub use send_alert::SendAlertUseCase;
pub use update_room_data::{RoomEvent, RoomUpdate, UpdateRoomDataUseCase};
