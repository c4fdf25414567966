use std::sync::Arc;

use chrono::Utc;
use session::{catalog::default_checklist, countdown::CountdownTimer, RemoveOutcome, WarRoomStore};
use shared::{
    domain::{ChecklistAction, ChecklistItem, EventId, EventOrigin, LogEvent},
    error::{ApiError, ErrorCode},
    protocol::{
        ActionReceipt, AddLogEntryRequest, OpenWarRoomRequest, OpenWarRoomResponse,
        StatusBroadcastRequest, TimerStatus, ToggleItemResponse, WarRoomSnapshot,
    },
};
use slack_integration::ChannelNotifier;
use tracing::warn;

pub mod report;

#[derive(Clone)]
pub struct ApiContext {
    pub war_room: WarRoomStore,
    pub notifier: Arc<dyn ChannelNotifier>,
    pub channels: NotifyChannels,
    pub timer: Arc<CountdownTimer>,
}

#[derive(Debug, Clone)]
pub struct NotifyChannels {
    pub war_room: String,
    pub team: String,
}

impl Default for NotifyChannels {
    fn default() -> Self {
        Self {
            war_room: "war-room-channel".into(),
            team: "a-team".into(),
        }
    }
}

pub async fn open_war_room(
    ctx: &ApiContext,
    request: OpenWarRoomRequest,
) -> Result<OpenWarRoomResponse, ApiError> {
    let title = request.title.trim();
    let description = request.description.trim();
    if title.is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "title must not be empty"));
    }
    if description.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "description must not be empty",
        ));
    }
    if ctx.war_room.is_open().await {
        return Err(ApiError::new(
            ErrorCode::Conflict,
            "a war room is already open",
        ));
    }

    ctx.war_room
        .start_session(title, description, default_checklist())
        .await;
    ctx.timer.reset();
    ctx.war_room
        .log_event(format!("Opened war room: {title}"))
        .await;

    let notice = notify(
        ctx,
        &ctx.channels.war_room,
        &format!("New war room opened:\nTitle: {title}\nDescription: {description}"),
    )
    .await;

    Ok(OpenWarRoomResponse {
        snapshot: ctx.war_room.snapshot().await,
        notice,
    })
}

pub async fn war_room_snapshot(ctx: &ApiContext) -> Result<WarRoomSnapshot, ApiError> {
    Ok(ctx.war_room.snapshot().await)
}

pub async fn toggle_checklist_item(
    ctx: &ApiContext,
    item_id: &str,
) -> Result<ToggleItemResponse, ApiError> {
    ensure_open_room(ctx).await?;

    let mut toggled: Option<ChecklistItem> = None;
    ctx.war_room
        .update_checklist(|items| {
            items
                .into_iter()
                .map(|mut item| {
                    if item.id == item_id {
                        item.checked = !item.checked;
                        toggled = Some(item.clone());
                    }
                    item
                })
                .collect()
        })
        .await;

    let Some(item) = toggled else {
        return Err(ApiError::new(
            ErrorCode::NotFound,
            "checklist item not found",
        ));
    };

    let verb = if item.checked { "Checked" } else { "Unchecked" };
    let event = ctx
        .war_room
        .log_event(format!("{verb} item: {}", item.title))
        .await;
    let can_close = ctx.war_room.snapshot().await.can_close;

    Ok(ToggleItemResponse {
        item,
        event,
        can_close,
    })
}

pub async fn run_checklist_action(
    ctx: &ApiContext,
    action: ChecklistAction,
) -> Result<ActionReceipt, ApiError> {
    ensure_open_room(ctx).await?;

    let (description, outbound) = resolve_action(ctx, action).await?;
    let event = ctx.war_room.log_event(description).await;
    let notice = match outbound {
        Some((channel, text)) => notify(ctx, &channel, &text).await,
        None => None,
    };

    Ok(ActionReceipt { event, notice })
}

/// Maps an action to its audit description and optional outbound message.
async fn resolve_action(
    ctx: &ApiContext,
    action: ChecklistAction,
) -> Result<(String, Option<(String, String)>), ApiError> {
    use shared::domain::UpdateChannel;

    let resolved = match action {
        ChecklistAction::ConfirmCritical => ("Confirmed critical issue status".to_string(), None),
        ChecklistAction::NotifyTeamLead => {
            ("Notified Team Lead for low-severity issue".to_string(), None)
        }
        ChecklistAction::PageGroupLead => {
            ("Initiated PagerDuty call to Group Lead".to_string(), None)
        }
        ChecklistAction::SmsGroupLead => ("Sent SMS to Group Lead PagerDuty".to_string(), None),
        ChecklistAction::AlertAllChannels => (
            "Sent emergency alert to all channels".to_string(),
            Some((
                ctx.channels.war_room.clone(),
                "Critical incident declared".to_string(),
            )),
        ),
        ChecklistAction::StartMeeting => ("Started new Zoom meeting".to_string(), None),
        ChecklistAction::JoinMeeting { meeting_id } => {
            let meeting_id = meeting_id.trim();
            if meeting_id.is_empty() {
                return Err(ApiError::new(
                    ErrorCode::Validation,
                    "meeting id must not be empty",
                ));
            }
            (format!("Joined Zoom meeting: {meeting_id}"), None)
        }
        ChecklistAction::AlertTeamChannel => {
            let room_description = ctx.war_room.description().await;
            (
                format!("Notified Issue In Prod Room: {room_description}"),
                Some((ctx.channels.team.clone(), room_description)),
            )
        }
        ChecklistAction::TriggerDeploy => {
            ("Triggered emergency deployment pipeline".to_string(), None)
        }
        ChecklistAction::PublishUpdate { channel, text } => {
            let text = text.trim().to_string();
            if text.is_empty() {
                return Err(ApiError::new(
                    ErrorCode::Validation,
                    "update text must not be empty",
                ));
            }
            match channel {
                UpdateChannel::WarRoom => (
                    "Published update to War Room".to_string(),
                    Some((ctx.channels.war_room.clone(), text)),
                ),
                UpdateChannel::Team => (
                    "Updated A-Team Channel".to_string(),
                    Some((ctx.channels.team.clone(), text)),
                ),
            }
        }
    };

    Ok(resolved)
}

pub async fn close_war_room(ctx: &ApiContext) -> Result<ActionReceipt, ApiError> {
    if !ctx.war_room.is_open().await {
        return Err(ApiError::new(ErrorCode::Conflict, "no war room is open"));
    }
    if !ctx.war_room.close_when_complete().await {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "all checklist items must be checked before closing",
        ));
    }

    let event = ctx.war_room.log_event("War room closed").await;
    let notice = notify(ctx, &ctx.channels.war_room, "War room closed").await;

    Ok(ActionReceipt { event, notice })
}

pub async fn broadcast_status(
    ctx: &ApiContext,
    request: StatusBroadcastRequest,
) -> Result<ActionReceipt, ApiError> {
    ensure_open_room(ctx).await?;
    let text = request.text.trim();
    if text.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "status text must not be empty",
        ));
    }

    let event = ctx.war_room.log_event("Broadcast status update").await;
    ctx.timer.reset();

    let mut failures = Vec::new();
    for channel in [&ctx.channels.war_room, &ctx.channels.team] {
        if let Some(failure) = notify(ctx, channel, text).await {
            failures.push(failure);
        }
    }
    let notice = if failures.is_empty() {
        None
    } else {
        Some(failures.join("; "))
    };

    Ok(ActionReceipt { event, notice })
}

pub async fn list_events(ctx: &ApiContext) -> Result<Vec<LogEvent>, ApiError> {
    Ok(ctx.war_room.events().await)
}

pub async fn add_log_entry(
    ctx: &ApiContext,
    request: AddLogEntryRequest,
) -> Result<LogEvent, ApiError> {
    let description = request.description.trim();
    if description.is_empty() {
        return Err(ApiError::new(
            ErrorCode::Validation,
            "description must not be empty",
        ));
    }
    let at = request.at.unwrap_or_else(Utc::now);
    Ok(ctx
        .war_room
        .add_event(at, description, EventOrigin::User)
        .await)
}

pub async fn remove_log_entry(ctx: &ApiContext, id: EventId) -> Result<LogEvent, ApiError> {
    match ctx.war_room.remove_event(id).await {
        RemoveOutcome::Removed(event) => Ok(event),
        RemoveOutcome::RejectedSystemEvent => Err(ApiError::new(
            ErrorCode::Forbidden,
            "system events cannot be removed",
        )),
        RemoveOutcome::NotFound => Err(ApiError::new(ErrorCode::NotFound, "event not found")),
    }
}

pub async fn timer_status(ctx: &ApiContext) -> Result<TimerStatus, ApiError> {
    Ok(TimerStatus {
        seconds_left: ctx.timer.seconds_left(),
        formatted: ctx.timer.formatted_time(),
    })
}

pub async fn export_timeline(ctx: &ApiContext) -> Result<String, ApiError> {
    Ok(report::render_timeline(&ctx.war_room.events().await))
}

pub async fn export_retro(ctx: &ApiContext) -> Result<String, ApiError> {
    let title = ctx.war_room.title().await;
    let events = ctx.war_room.events().await;
    Ok(report::render_retro(&title, &events))
}

async fn ensure_open_room(ctx: &ApiContext) -> Result<(), ApiError> {
    if ctx.war_room.is_open().await {
        Ok(())
    } else {
        Err(ApiError::new(ErrorCode::Conflict, "no war room is open"))
    }
}

/// Delivery failure folds into a notice; the logged event is never rolled back.
async fn notify(ctx: &ApiContext, channel: &str, text: &str) -> Option<String> {
    match ctx.notifier.send(channel, text).await {
        Ok(()) => None,
        Err(err) => {
            warn!(channel, error = %err, "channel notification failed");
            Some(format!("could not notify #{channel}: {err}"))
        }
    }
}
