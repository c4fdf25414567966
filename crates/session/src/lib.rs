use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use shared::{
    domain::{ChecklistItem, EventId, EventOrigin, LogEvent},
    protocol::WarRoomSnapshot,
};

pub mod catalog;
pub mod countdown;

#[derive(Default)]
struct WarRoomState {
    title: String,
    description: String,
    is_open: bool,
    checklist: Vec<ChecklistItem>,
    events: Vec<LogEvent>,
    next_event_id: u64,
}

impl WarRoomState {
    fn push_event(
        &mut self,
        at: DateTime<Utc>,
        description: String,
        origin: EventOrigin,
    ) -> LogEvent {
        self.next_event_id += 1;
        let event = LogEvent {
            id: EventId(self.next_event_id),
            at,
            description,
            origin,
        };
        self.events.push(event.clone());
        event
    }

    fn all_checked(&self) -> bool {
        self.checklist.iter().all(|item| item.checked)
    }
}

/// A system-created match is a soft rejection, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed(LogEvent),
    RejectedSystemEvent,
    NotFound,
}

#[derive(Clone)]
pub struct WarRoomStore {
    state: Arc<RwLock<WarRoomState>>,
}

impl WarRoomStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(WarRoomState::default())),
        }
    }

    pub async fn set_title(&self, new_title: impl Into<String>) {
        self.state.write().await.title = new_title.into();
    }

    pub async fn title(&self) -> String {
        self.state.read().await.title.clone()
    }

    pub async fn description(&self) -> String {
        self.state.read().await.description.clone()
    }

    pub async fn formatted_description(&self) -> String {
        let state = self.state.read().await;
        urlencoding::encode(&state.title).into_owned()
    }

    pub async fn set_open(&self, open: bool) {
        self.state.write().await.is_open = open;
    }

    pub async fn is_open(&self) -> bool {
        self.state.read().await.is_open
    }

    pub async fn set_checklist(&self, items: Vec<ChecklistItem>) {
        self.state.write().await.checklist = items;
    }

    pub async fn update_checklist<F>(&self, transform: F)
    where
        F: FnOnce(Vec<ChecklistItem>) -> Vec<ChecklistItem>,
    {
        let mut state = self.state.write().await;
        let items = std::mem::take(&mut state.checklist);
        state.checklist = transform(items);
    }

    pub async fn checklist(&self) -> Vec<ChecklistItem> {
        self.state.read().await.checklist.clone()
    }

    pub async fn log_event(&self, description: impl Into<String>) -> LogEvent {
        self.log_event_with_origin(EventOrigin::System, description)
            .await
    }

    pub async fn log_event_with_origin(
        &self,
        origin: EventOrigin,
        description: impl Into<String>,
    ) -> LogEvent {
        let mut state = self.state.write().await;
        state.push_event(Utc::now(), description.into(), origin)
    }

    /// Caller-timestamped insert; re-sorts the whole log ascending, unlike
    /// `log_event` which only appends.
    pub async fn add_event(
        &self,
        at: DateTime<Utc>,
        description: impl Into<String>,
        origin: EventOrigin,
    ) -> LogEvent {
        let mut state = self.state.write().await;
        let event = state.push_event(at, description.into(), origin);
        // stable sort, equal timestamps keep insertion order
        state.events.sort_by_key(|event| event.at);
        event
    }

    pub async fn remove_event(&self, id: EventId) -> RemoveOutcome {
        let mut state = self.state.write().await;
        let Some(index) = state.events.iter().position(|event| event.id == id) else {
            return RemoveOutcome::NotFound;
        };
        if state.events[index].origin == EventOrigin::System {
            return RemoveOutcome::RejectedSystemEvent;
        }
        RemoveOutcome::Removed(state.events.remove(index))
    }

    pub async fn events(&self) -> Vec<LogEvent> {
        self.state.read().await.events.clone()
    }

    /// The previous log stays readable until this call, which keeps exports
    /// available after a close. Event ids keep counting up across sessions.
    pub async fn start_session(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        checklist: Vec<ChecklistItem>,
    ) {
        let mut state = self.state.write().await;
        state.title = title.into();
        state.description = description.into();
        state.checklist = checklist;
        state.events.clear();
        state.is_open = true;
    }

    pub async fn close_when_complete(&self) -> bool {
        let mut state = self.state.write().await;
        if !state.is_open || !state.all_checked() {
            return false;
        }
        state.is_open = false;
        true
    }

    pub async fn snapshot(&self) -> WarRoomSnapshot {
        let state = self.state.read().await;
        WarRoomSnapshot {
            title: state.title.clone(),
            description: state.description.clone(),
            formatted_description: urlencoding::encode(&state.title).into_owned(),
            is_open: state.is_open,
            checklist: state.checklist.clone(),
            can_close: state.is_open && state.all_checked(),
        }
    }
}

impl Default for WarRoomStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
