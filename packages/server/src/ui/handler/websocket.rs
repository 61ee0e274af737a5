//! WebSocket connection handlers (Event Gateway).
//!
//! Each inbound frame is dispatched to one use case. The registry mutation and
//! every broadcast it triggers run while the connection holds the event turn
//! lock, so observers of a room see the broadcasts of one event before those of
//! the next. Acknowledgements are pushed through the same outbound queue as
//! broadcasts.

use std::sync::Arc;

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::Serialize;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, ConnectionIdFactory, IdentityUpdate, Platform, Room, RoomId, RoomRemoval,
    },
    infrastructure::dto::websocket::{
        AckMessage, ClientEvent, ClientFrame, ConfigureIdentityPayload, ConnectedPayload,
        ConnectionDto, RoomClosedPayload, RoomEventPayload, RoomPayload, RoomResponse,
        RoomSnapshot, ServerEvent, ServerFrame, UpdateRoomDataPayload,
    },
    ui::state::AppState,
    usecase::DisconnectOutcome,
};
use agora_shared::time::millis_to_rfc3339;

const JOINED_MESSAGE: &str = "Successfully joined room with permissions";
const LEFT_MESSAGE: &str = "Successfully left room";
const UPDATED_MESSAGE: &str = "Room data updated successfully";
const INFO_MESSAGE: &str = "Room info retrieved successfully";

pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let connection_id = ConnectionIdFactory::generate();
    ws.on_upgrade(move |socket| handle_socket(socket, state, connection_id))
}

/// Spawns a task that drains this connection's outbound queue into the WebSocket.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg.into())).await.is_err() {
                break;
            }
        }
    })
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>, connection_id: ConnectionId) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();

    {
        let _turn = state.event_turn.lock().await;
        state.connect_usecase.execute(connection_id.clone(), tx).await;
        let connected = ServerFrame::new(
            ServerEvent::Connected,
            ConnectedPayload {
                socket_id: connection_id.to_string(),
            },
        );
        push(&state, &connection_id, connected).await;
    }
    tracing::info!("Connection '{}' established", connection_id);

    let mut send_task = pusher_loop(rx, sender);

    // Frames are handled inline so that an event in progress is never
    // cancelled by the connection closing.
    loop {
        tokio::select! {
            msg = receiver.next() => {
                let msg = match msg {
                    Some(Ok(msg)) => msg,
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                        break;
                    }
                    None => break,
                };

                match msg {
                    Message::Text(text) => {
                        let _turn = state.event_turn.lock().await;
                        handle_text(&state, &connection_id, text.as_str()).await;
                    }
                    Message::Ping(_) => {
                        tracing::debug!("Received ping from '{}'", connection_id);
                    }
                    Message::Close(_) => {
                        tracing::info!("Connection '{}' requested close", connection_id);
                        break;
                    }
                    _ => {}
                }
            }
            _ = &mut send_task => {
                tracing::debug!("Outbound stream of '{}' closed", connection_id);
                break;
            }
        }
    }
    send_task.abort();

    let _turn = state.event_turn.lock().await;
    match state.disconnect_usecase.execute(&connection_id).await {
        Ok(outcome) => {
            tracing::info!(
                "Connection '{}' disconnected and removed from registry",
                connection_id
            );
            on_disconnected(&state, outcome).await;
        }
        Err(e) => {
            tracing::warn!("Failed to disconnect '{}': {}", connection_id, e);
        }
    }
}

async fn handle_text(state: &AppState, connection_id: &ConnectionId, text: &str) {
    let frame = match ClientFrame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            tracing::warn!("Rejected frame from '{}': {}", connection_id, e);
            reply(state, connection_id, e.ack, AckMessage::failure(e.to_string())).await;
            return;
        }
    };
    tracing::debug!(
        "Received '{}' from '{}'",
        frame.event.name(),
        connection_id
    );

    let ack = frame.ack;
    match frame.event {
        ClientEvent::ConfigureIdentity(payload) => {
            on_configure_identity(state, connection_id, ack, payload).await
        }
        ClientEvent::JoinRoom(payload) => on_join_channel(state, connection_id, payload).await,
        ClientEvent::LeaveRoom(payload) => on_leave_channel(state, connection_id, payload).await,
        ClientEvent::JoinRoomWithPermissions(payload) => {
            on_join_room(state, connection_id, ack, payload).await
        }
        ClientEvent::LeaveRoomWithPermissions(payload) => {
            on_leave_room(state, connection_id, ack, payload).await
        }
        ClientEvent::UpdateRoomData(payload) => {
            on_update_room_data(state, connection_id, ack, payload).await
        }
        ClientEvent::GetRoomInfo(payload) => {
            on_get_room_info(state, connection_id, ack, payload).await
        }
    }
}

// ========================================
// Inbound events
// ========================================

async fn on_configure_identity(
    state: &AppState,
    connection_id: &ConnectionId,
    ack: Option<u64>,
    payload: ConfigureIdentityPayload,
) {
    let update = match IdentityUpdate::try_from(payload) {
        Ok(update) => update,
        Err(e) => {
            reply(state, connection_id, ack, AckMessage::failure(invalid(e))).await;
            return;
        }
    };
    let configured_platform = update.platform.clone();

    let Some(connection) = state
        .configure_identity_usecase
        .execute(connection_id, update)
        .await
    else {
        let message = format!("Connection '{}' is not registered", connection_id);
        reply(state, connection_id, ack, AckMessage::failure(message)).await;
        return;
    };

    if let Some(platform) = configured_platform {
        emit_platform_roster(state, &platform).await;
    }

    let message = format!(
        "user {}, configured for platform {}",
        connection.display_name, connection.platform
    );
    reply(state, connection_id, ack, AckMessage::ok(message)).await;
}

async fn on_join_channel(state: &AppState, connection_id: &ConnectionId, payload: RoomPayload) {
    let key = match payload.key() {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Ignoring join-room from '{}': {}", connection_id, e);
            return;
        }
    };

    let roster = state
        .channel_membership_usecase
        .join(connection_id, &key.room_id, &key.platform)
        .await;
    let users: Vec<ConnectionDto> = roster.iter().map(ConnectionDto::from).collect();
    emit_to_channel(
        state,
        &key.room_id,
        ServerEvent::RoomUsers(key.platform.as_str()),
        users,
    )
    .await;
}

async fn on_leave_channel(state: &AppState, connection_id: &ConnectionId, payload: RoomPayload) {
    let key = match payload.key() {
        Ok(key) => key,
        Err(e) => {
            tracing::warn!("Ignoring leave-room from '{}': {}", connection_id, e);
            return;
        }
    };

    let roster = state
        .channel_membership_usecase
        .leave(connection_id, &key.room_id, &key.platform)
        .await;
    let users: Vec<ConnectionDto> = roster.iter().map(ConnectionDto::from).collect();
    emit_to_channel(
        state,
        &key.room_id,
        ServerEvent::RoomUsers(key.platform.as_str()),
        users,
    )
    .await;
}

async fn on_join_room(
    state: &AppState,
    connection_id: &ConnectionId,
    ack: Option<u64>,
    payload: RoomPayload,
) {
    let room_id = match RoomId::new(payload.room_id) {
        Ok(room_id) => room_id,
        Err(e) => {
            reply(state, connection_id, ack, RoomResponse::failure(invalid(e))).await;
            return;
        }
    };
    let platform = Platform::new(payload.platform).ok();

    match state
        .join_room_usecase
        .execute(connection_id, room_id, platform)
        .await
    {
        Ok(room) => {
            emit_room_updated(state, &room).await;
            let snapshot = RoomSnapshot::from(&room);
            reply(
                state,
                connection_id,
                ack,
                RoomResponse::ok(JOINED_MESSAGE, Some(snapshot)),
            )
            .await;
        }
        Err(e) => {
            tracing::warn!("Rejected join from '{}': {}", connection_id, e);
            reply(state, connection_id, ack, RoomResponse::failure(e.to_string())).await;
        }
    }
}

async fn on_leave_room(
    state: &AppState,
    connection_id: &ConnectionId,
    ack: Option<u64>,
    payload: RoomPayload,
) {
    let key = match payload.key() {
        Ok(key) => key,
        Err(e) => {
            reply(state, connection_id, ack, RoomResponse::failure(invalid(e))).await;
            return;
        }
    };

    match state.leave_room_usecase.execute(connection_id, &key).await {
        RoomRemoval::Remaining(room) => emit_room_updated(state, &room).await,
        RoomRemoval::Closed(room) => emit_room_closed(state, &room).await,
        RoomRemoval::NotFound => {
            tracing::debug!("'{}' left room {} it was not in", connection_id, key);
        }
    }
    reply(state, connection_id, ack, RoomResponse::ok(LEFT_MESSAGE, None)).await;
}

async fn on_update_room_data(
    state: &AppState,
    connection_id: &ConnectionId,
    ack: Option<u64>,
    payload: UpdateRoomDataPayload,
) {
    let key = match payload.key() {
        Ok(key) => key,
        Err(e) => {
            reply(state, connection_id, ack, RoomResponse::failure(invalid(e))).await;
            return;
        }
    };
    let event_id = payload.event_id();

    let update = match state
        .update_room_data_usecase
        .execute(connection_id, &key, payload.data, event_id)
        .await
    {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!("Rejected update of {} from '{}': {}", key, connection_id, e);
            reply(state, connection_id, ack, RoomResponse::failure(e.to_string())).await;
            return;
        }
    };

    emit_room_updated(state, &update.room).await;
    if let Some(event) = update.event {
        let payload = RoomEventPayload {
            room_id: key.room_id.to_string(),
            event_id: event.event_id.as_str().to_string(),
            data: event.data,
            timestamp: millis_to_rfc3339(event.timestamp.value()),
        };
        emit_to_channel(
            state,
            &key.room_id,
            ServerEvent::RoomEvent(key.platform.as_str()),
            payload,
        )
        .await;
    }

    let snapshot = RoomSnapshot::from(&update.room);
    reply(
        state,
        connection_id,
        ack,
        RoomResponse::ok(UPDATED_MESSAGE, Some(snapshot)),
    )
    .await;
}

async fn on_get_room_info(
    state: &AppState,
    connection_id: &ConnectionId,
    ack: Option<u64>,
    payload: RoomPayload,
) {
    let key = match payload.key() {
        Ok(key) => key,
        Err(e) => {
            reply(state, connection_id, ack, RoomResponse::failure(invalid(e))).await;
            return;
        }
    };

    let response = match state.get_room_info_usecase.execute(&key).await {
        Ok(room) => RoomResponse::ok(
            INFO_MESSAGE,
            Some(RoomSnapshot::for_viewer(&room, connection_id)),
        ),
        Err(e) => RoomResponse::failure(e.to_string()),
    };
    reply(state, connection_id, ack, response).await;
}

async fn on_disconnected(state: &AppState, outcome: DisconnectOutcome) {
    let platform = &outcome.connection.platform;
    emit_platform_roster(state, platform).await;

    for channel in &outcome.left_channels {
        let roster = state
            .broadcast_usecase
            .channel_roster(channel, platform)
            .await;
        let users: Vec<ConnectionDto> = roster.iter().map(ConnectionDto::from).collect();
        emit_to_channel(state, channel, ServerEvent::RoomUsers(platform.as_str()), users).await;
    }

    for room in &outcome.sweep.updated {
        emit_room_updated(state, room).await;
    }
    for room in &outcome.sweep.closed {
        emit_room_closed(state, room).await;
    }
}

// ========================================
// Outbound helpers
// ========================================

fn invalid(reason: impl std::fmt::Display) -> String {
    format!("Invalid payload: {}", reason)
}

fn encode<T: Serialize>(frame: &ServerFrame<T>) -> Option<String> {
    match frame.to_json() {
        Ok(json) => Some(json),
        Err(e) => {
            tracing::error!("Failed to serialize '{}' frame: {}", frame.event, e);
            None
        }
    }
}

async fn push<T: Serialize>(state: &AppState, connection_id: &ConnectionId, frame: ServerFrame<T>) {
    let Some(json) = encode(&frame) else {
        return;
    };
    if let Err(e) = state
        .broadcast_usecase
        .to_connection(connection_id, &json)
        .await
    {
        tracing::warn!("Failed to push '{}' to '{}': {}", frame.event, connection_id, e);
    }
}

/// Acknowledge the request when the client asked for it.
async fn reply<T: Serialize>(
    state: &AppState,
    connection_id: &ConnectionId,
    ack: Option<u64>,
    data: T,
) {
    if let Some(ack) = ack {
        push(state, connection_id, ServerFrame::ack(ack, data)).await;
    }
}

async fn emit_to_channel<T: Serialize>(
    state: &AppState,
    channel: &RoomId,
    event: ServerEvent<'_>,
    data: T,
) {
    let frame = ServerFrame::new(event, data);
    let Some(json) = encode(&frame) else {
        return;
    };
    if let Err(e) = state.broadcast_usecase.to_channel(channel, &json).await {
        tracing::warn!("Failed to broadcast '{}': {}", frame.event, e);
    }
}

async fn emit_platform_roster(state: &AppState, platform: &Platform) {
    let roster = state.broadcast_usecase.platform_roster(platform).await;
    let users: Vec<ConnectionDto> = roster.iter().map(ConnectionDto::from).collect();
    let frame = ServerFrame::new(ServerEvent::PlatformRoster(platform.as_str()), users);
    let Some(json) = encode(&frame) else {
        return;
    };
    if let Err(e) = state.broadcast_usecase.to_platform(platform, &json).await {
        tracing::warn!("Failed to broadcast '{}': {}", frame.event, e);
    }
}

async fn emit_room_updated(state: &AppState, room: &Room) {
    emit_to_channel(
        state,
        room.room_id(),
        ServerEvent::RoomUpdated(room.platform().as_str()),
        RoomSnapshot::from(room),
    )
    .await;
}

async fn emit_room_closed(state: &AppState, room: &Room) {
    emit_to_channel(
        state,
        room.room_id(),
        ServerEvent::RoomClosed(room.platform().as_str()),
        RoomClosedPayload {
            room_id: room.room_id().to_string(),
        },
    )
    .await;
}
