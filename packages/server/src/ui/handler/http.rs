//! HTTP side-channel handlers.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde_json::Value;

use crate::{
    domain::{Platform, RoomId, RoomKey, UserId},
    infrastructure::dto::{
        http::{
            AlertResponse, ClientsResponse, ErrorResponse, NotificationRequest,
            NotificationResponse, RoomDetailDto, RoomSummaryDto, RoomsResponse,
        },
        websocket::{ConnectionDto, ServerEvent, ServerFrame},
    },
    ui::state::AppState,
};

type HttpError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> HttpError {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message)))
}

fn internal_error(message: impl Into<String>) -> HttpError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
}

/// Malformed bodies get the same `{ok:false, message}` shape as the other failures.
fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, HttpError> {
    body.map(|Json(value)| value).map_err(|rejection| {
        (
            rejection.status(),
            Json(ErrorResponse::new(rejection.body_text())),
        )
    })
}

fn parse_platform(value: String) -> Result<Platform, HttpError> {
    Platform::new(value).map_err(|e| bad_request(e.to_string()))
}

/// Health check endpoint
pub async fn health_check() -> Json<Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// `POST /alert`: broadcast the whole body to every connection of `body.platform`
pub async fn post_alert(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<AlertResponse>, HttpError> {
    let body = json_body(body)?;
    let platform = body
        .get("platform")
        .and_then(Value::as_str)
        .ok_or_else(|| bad_request("platform is required"))?;
    let platform = parse_platform(platform.to_string())?;

    let frame = ServerFrame::new(ServerEvent::Alert(platform.as_str()), &body);
    let json = frame
        .to_json()
        .map_err(|e| internal_error(e.to_string()))?;

    {
        let _turn = state.event_turn.lock().await;
        if let Err(e) = state.send_alert_usecase.execute(&platform, &json).await {
            tracing::warn!("Failed to broadcast alert: {}", e);
        }
    }

    Ok(Json(AlertResponse { ok: true, body }))
}

/// `POST /notification`: deliver `notifications` to the connections of the given users
pub async fn post_notification(
    State(state): State<Arc<AppState>>,
    request: Result<Json<NotificationRequest>, JsonRejection>,
) -> Result<Json<NotificationResponse>, HttpError> {
    let request = json_body(request)?;
    let platform = parse_platform(request.platform)?;
    let user_ids: Vec<UserId> = request
        .user_ids
        .into_iter()
        .filter_map(|id| UserId::try_from(id).ok())
        .collect();

    let frame = ServerFrame::new(ServerEvent::Notifications, &request.notification);
    let json = frame
        .to_json()
        .map_err(|e| internal_error(e.to_string()))?;

    let recipients = {
        let _turn = state.event_turn.lock().await;
        state
            .notify_users_usecase
            .execute(&user_ids, &platform, &json)
            .await
    }
    .map_err(|e| (StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string()))))?;

    Ok(Json(NotificationResponse {
        ok: true,
        notification: request.notification,
        senders: recipients
            .connections
            .iter()
            .map(ConnectionDto::from)
            .collect(),
    }))
}

/// `GET /users`
pub async fn get_users(State(state): State<Arc<AppState>>) -> Json<ClientsResponse> {
    let connections = state.list_connections_usecase.all().await;

    Json(ClientsResponse {
        ok: true,
        clients: connections.iter().map(ConnectionDto::from).collect(),
    })
}

/// `GET /users/{platform}`
pub async fn get_users_by_platform(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
) -> Result<Json<ClientsResponse>, HttpError> {
    let platform = parse_platform(platform)?;
    let connections = state.list_connections_usecase.by_platform(&platform).await;

    Ok(Json(ClientsResponse {
        ok: true,
        clients: connections.iter().map(ConnectionDto::from).collect(),
    }))
}

/// `GET /rooms`
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<RoomsResponse> {
    let rooms = state.list_rooms_usecase.all().await;

    Json(RoomsResponse {
        ok: true,
        rooms: rooms.iter().map(RoomSummaryDto::from).collect(),
    })
}

/// `GET /rooms/{platform}`
pub async fn get_rooms_by_platform(
    State(state): State<Arc<AppState>>,
    Path(platform): Path<String>,
) -> Result<Json<RoomsResponse>, HttpError> {
    let platform = parse_platform(platform)?;
    let rooms = state.list_rooms_usecase.by_platform(&platform).await;

    Ok(Json(RoomsResponse {
        ok: true,
        rooms: rooms.iter().map(RoomSummaryDto::from).collect(),
    }))
}

/// `GET /rooms/{platform}/{room_id}`
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path((platform, room_id)): Path<(String, String)>,
) -> Result<Json<RoomDetailDto>, HttpError> {
    let platform = parse_platform(platform)?;
    let room_id = RoomId::new(room_id).map_err(|e| bad_request(e.to_string()))?;
    let key = RoomKey::new(room_id, platform);

    match state.list_rooms_usecase.detail(&key).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(&room))),
        Err(e) => Err((StatusCode::NOT_FOUND, Json(ErrorResponse::new(e.to_string())))),
    }
}
