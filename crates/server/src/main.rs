use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use server_api::{
    add_log_entry, broadcast_status, close_war_room, export_retro, export_timeline, list_events,
    open_war_room, remove_log_entry, run_checklist_action, timer_status, toggle_checklist_item,
    war_room_snapshot, ApiContext, NotifyChannels,
};
use session::{countdown::CountdownTimer, WarRoomStore};
use shared::{
    domain::{ChecklistAction, EventId, LogEvent},
    error::{ApiError, ErrorCode},
    protocol::{
        ActionReceipt, AddLogEntryRequest, OpenWarRoomRequest, OpenWarRoomResponse, SessionEvent,
        StatusBroadcastRequest, TimerStatus, ToggleItemResponse, WarRoomSnapshot,
    },
};
use slack_integration::{ChannelNotifier, MissingNotifier, WebhookNotifier};
use tokio::sync::broadcast;
use tracing::info;

mod config;

use config::load_settings;

#[derive(Clone)]
struct AppState {
    api: ApiContext,
    events: broadcast::Sender<SessionEvent>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();

    let notifier: Arc<dyn ChannelNotifier> = match settings.slack_webhook_url.as_deref() {
        Some(url) => Arc::new(WebhookNotifier::new(url)?),
        None => {
            info!("no slack webhook configured, channel notifications will be dropped");
            Arc::new(MissingNotifier)
        }
    };

    let war_room = WarRoomStore::new();
    let (events, _) = broadcast::channel(256);
    let timer = spawn_status_timer(
        settings.status_update_interval_seconds,
        war_room.clone(),
        events.clone(),
    );

    let api = ApiContext {
        war_room,
        notifier,
        channels: NotifyChannels {
            war_room: settings.war_room_channel,
            team: settings.team_channel,
        },
        timer,
    };

    let state = AppState { api, events };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "war room server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

/// On expiry the open room gets a `Broadcast status update` audit entry;
/// subscribers get a `StatusReminderDue` whether or not a room is open.
fn spawn_status_timer(
    interval_seconds: u32,
    war_room: WarRoomStore,
    events: broadcast::Sender<SessionEvent>,
) -> Arc<CountdownTimer> {
    Arc::new(CountdownTimer::spawn(interval_seconds, move || {
        let war_room = war_room.clone();
        let events = events.clone();
        tokio::spawn(async move {
            if war_room.is_open().await {
                let event = war_room.log_event("Broadcast status update").await;
                let _ = events.send(SessionEvent::EventAppended { event });
            }
            let _ = events.send(SessionEvent::StatusReminderDue);
        });
    }))
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/warroom", post(http_open_war_room))
        .route("/warroom", get(http_snapshot))
        .route("/warroom/close", post(http_close_war_room))
        .route("/checklist/:item_id/toggle", post(http_toggle_item))
        .route("/checklist/actions", post(http_run_action))
        .route("/status/broadcast", post(http_broadcast_status))
        .route("/status/timer", get(http_timer_status))
        .route("/events", get(http_list_events))
        .route("/events", post(http_add_event))
        .route("/events/:event_id", delete(http_remove_event))
        .route("/export/timeline", get(http_export_timeline))
        .route("/export/retro", get(http_export_retro))
        .route("/ws", get(ws_handler))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

fn error_response(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

async fn http_open_war_room(
    State(state): State<Arc<AppState>>,
    Json(req): Json<OpenWarRoomRequest>,
) -> Result<Json<OpenWarRoomResponse>, (StatusCode, Json<ApiError>)> {
    let response = open_war_room(&state.api, req).await.map_err(error_response)?;
    let _ = state.events.send(SessionEvent::RoomOpened {
        snapshot: response.snapshot.clone(),
    });
    Ok(Json(response))
}

async fn http_snapshot(
    State(state): State<Arc<AppState>>,
) -> Result<Json<WarRoomSnapshot>, (StatusCode, Json<ApiError>)> {
    let snapshot = war_room_snapshot(&state.api).await.map_err(error_response)?;
    Ok(Json(snapshot))
}

async fn http_close_war_room(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ActionReceipt>, (StatusCode, Json<ApiError>)> {
    let receipt = close_war_room(&state.api).await.map_err(error_response)?;
    let _ = state.events.send(SessionEvent::RoomClosed {
        event: receipt.event.clone(),
    });
    Ok(Json(receipt))
}

async fn http_toggle_item(
    State(state): State<Arc<AppState>>,
    Path(item_id): Path<String>,
) -> Result<Json<ToggleItemResponse>, (StatusCode, Json<ApiError>)> {
    let response = toggle_checklist_item(&state.api, &item_id)
        .await
        .map_err(error_response)?;
    let _ = state.events.send(SessionEvent::ChecklistUpdated {
        item: response.item.clone(),
        can_close: response.can_close,
    });
    Ok(Json(response))
}

async fn http_run_action(
    State(state): State<Arc<AppState>>,
    Json(action): Json<ChecklistAction>,
) -> Result<Json<ActionReceipt>, (StatusCode, Json<ApiError>)> {
    let receipt = run_checklist_action(&state.api, action)
        .await
        .map_err(error_response)?;
    let _ = state.events.send(SessionEvent::EventAppended {
        event: receipt.event.clone(),
    });
    Ok(Json(receipt))
}

async fn http_broadcast_status(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StatusBroadcastRequest>,
) -> Result<Json<ActionReceipt>, (StatusCode, Json<ApiError>)> {
    let receipt = broadcast_status(&state.api, req)
        .await
        .map_err(error_response)?;
    let _ = state.events.send(SessionEvent::EventAppended {
        event: receipt.event.clone(),
    });
    Ok(Json(receipt))
}

async fn http_timer_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TimerStatus>, (StatusCode, Json<ApiError>)> {
    let status = timer_status(&state.api).await.map_err(error_response)?;
    Ok(Json(status))
}

async fn http_list_events(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<LogEvent>>, (StatusCode, Json<ApiError>)> {
    let events = list_events(&state.api).await.map_err(error_response)?;
    Ok(Json(events))
}

async fn http_add_event(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AddLogEntryRequest>,
) -> Result<Json<LogEvent>, (StatusCode, Json<ApiError>)> {
    let event = add_log_entry(&state.api, req).await.map_err(error_response)?;
    let _ = state.events.send(SessionEvent::EventAppended {
        event: event.clone(),
    });
    Ok(Json(event))
}

async fn http_remove_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<u64>,
) -> Result<Json<LogEvent>, (StatusCode, Json<ApiError>)> {
    let removed = remove_log_entry(&state.api, EventId(event_id))
        .await
        .map_err(error_response)?;
    let _ = state.events.send(SessionEvent::EventRemoved {
        event_id: removed.id,
    });
    Ok(Json(removed))
}

async fn http_export_timeline(
    State(state): State<Arc<AppState>>,
) -> Result<String, (StatusCode, Json<ApiError>)> {
    export_timeline(&state.api).await.map_err(error_response)
}

async fn http_export_retro(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, (StatusCode, Json<ApiError>)> {
    let retro = export_retro(&state.api).await.map_err(error_response)?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/markdown; charset=utf-8"),
        )],
        retro,
    ))
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| ws_connection(state, socket))
}

async fn ws_connection(state: Arc<AppState>, socket: axum::extract::ws::WebSocket) {
    use axum::extract::ws::Message;
    use futures::{SinkExt, StreamExt};

    let (mut sender, mut receiver) = socket.split();
    let mut events_rx = state.events.subscribe();

    let send_task = tokio::spawn(async move {
        while let Ok(event) = events_rx.recv().await {
            let text = match serde_json::to_string(&event) {
                Ok(v) => v,
                Err(_) => continue,
            };
            if sender.send(Message::Text(text)).await.is_err() {
                break;
            }
        }
    });

    while let Some(Ok(_msg)) = receiver.next().await {}

    send_task.abort();
}
