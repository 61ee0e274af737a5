//! Application state shared by every handler.

use std::sync::Arc;

use agora_shared::time::Clock;
use tokio::sync::Mutex;

use crate::{
    domain::{ConnectionRepository, MessagePusher, RoomRepository},
    usecase::{
        BroadcastUseCase, ChannelMembershipUseCase, ConfigureIdentityUseCase,
        ConnectConnectionUseCase, DisconnectConnectionUseCase, GetRoomInfoUseCase,
        JoinRoomUseCase, LeaveRoomUseCase, ListConnectionsUseCase, ListRoomsUseCase,
        NotifyUsersUseCase, SendAlertUseCase, UpdateRoomDataUseCase,
    },
};

/// Shared application state
pub struct AppState {
    pub connect_usecase: Arc<ConnectConnectionUseCase>,
    pub configure_identity_usecase: Arc<ConfigureIdentityUseCase>,
    pub disconnect_usecase: Arc<DisconnectConnectionUseCase>,
    pub channel_membership_usecase: Arc<ChannelMembershipUseCase>,
    pub join_room_usecase: Arc<JoinRoomUseCase>,
    pub leave_room_usecase: Arc<LeaveRoomUseCase>,
    pub update_room_data_usecase: Arc<UpdateRoomDataUseCase>,
    pub get_room_info_usecase: Arc<GetRoomInfoUseCase>,
    pub broadcast_usecase: Arc<BroadcastUseCase>,
    pub send_alert_usecase: Arc<SendAlertUseCase>,
    pub notify_users_usecase: Arc<NotifyUsersUseCase>,
    pub list_connections_usecase: Arc<ListConnectionsUseCase>,
    pub list_rooms_usecase: Arc<ListRoomsUseCase>,
    /// イベント単位の排他ロック
    ///
    /// 1 つの受信イベント（レジストリの変更とそのブロードキャスト）は、
    /// このロックを保持したまま最後まで処理される。
    pub event_turn: Mutex<()>,
}

impl AppState {
    /// レジストリ・MessagePusher・時計から全ユースケースを組み立てる
    pub fn new(
        connections: Arc<dyn ConnectionRepository>,
        rooms: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let broadcast_usecase = Arc::new(BroadcastUseCase::new(
            connections.clone(),
            message_pusher.clone(),
        ));

        Self {
            connect_usecase: Arc::new(ConnectConnectionUseCase::new(
                connections.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            configure_identity_usecase: Arc::new(ConfigureIdentityUseCase::new(
                connections.clone(),
            )),
            disconnect_usecase: Arc::new(DisconnectConnectionUseCase::new(
                connections.clone(),
                rooms.clone(),
                message_pusher.clone(),
            )),
            channel_membership_usecase: Arc::new(ChannelMembershipUseCase::new(
                message_pusher.clone(),
                broadcast_usecase.clone(),
            )),
            join_room_usecase: Arc::new(JoinRoomUseCase::new(
                connections.clone(),
                rooms.clone(),
                message_pusher.clone(),
                clock.clone(),
            )),
            leave_room_usecase: Arc::new(LeaveRoomUseCase::new(
                rooms.clone(),
                message_pusher.clone(),
            )),
            update_room_data_usecase: Arc::new(UpdateRoomDataUseCase::new(
                rooms.clone(),
                clock,
            )),
            get_room_info_usecase: Arc::new(GetRoomInfoUseCase::new(rooms.clone())),
            broadcast_usecase,
            send_alert_usecase: Arc::new(SendAlertUseCase::new(
                connections.clone(),
                message_pusher.clone(),
            )),
            notify_users_usecase: Arc::new(NotifyUsersUseCase::new(
                connections.clone(),
                message_pusher,
            )),
            list_connections_usecase: Arc::new(ListConnectionsUseCase::new(connections)),
            list_rooms_usecase: Arc::new(ListRoomsUseCase::new(rooms)),
            event_turn: Mutex::new(()),
        }
    }
}
