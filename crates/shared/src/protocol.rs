use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{ChecklistItem, EventId, LogEvent};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWarRoomRequest {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarRoomSnapshot {
    pub title: String,
    pub description: String,
    pub formatted_description: String,
    pub is_open: bool,
    pub checklist: Vec<ChecklistItem>,
    pub can_close: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenWarRoomResponse {
    pub snapshot: WarRoomSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToggleItemResponse {
    pub item: ChecklistItem,
    pub event: LogEvent,
    pub can_close: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionReceipt {
    pub event: LogEvent,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddLogEntryRequest {
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusBroadcastRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerStatus {
    pub seconds_left: u32,
    pub formatted: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SessionEvent {
    RoomOpened {
        snapshot: WarRoomSnapshot,
    },
    RoomClosed {
        event: LogEvent,
    },
    ChecklistUpdated {
        item: ChecklistItem,
        can_close: bool,
    },
    EventAppended {
        event: LogEvent,
    },
    EventRemoved {
        event_id: EventId,
    },
    StatusReminderDue,
}
