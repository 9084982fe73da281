use serde::Serialize;
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

const CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTable {
    Persons,
    Teams,
    ScoreLogs,
    GeneralLogbook,
    StaffLogbook,
    ScoreboardSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// Minimal payload describing one committed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ChangeEvent {
    pub table: ChangeTable,
    pub kind: ChangeKind,
    pub id: Option<Uuid>,
}

impl ChangeEvent {
    pub fn new(table: ChangeTable, kind: ChangeKind, id: Option<Uuid>) -> Self {
        Self { table, kind, id }
    }
}

/// Fan-out of committed changes to any number of subscribers.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, table: ChangeTable, kind: ChangeKind, id: Option<Uuid>) {
        // Having no subscribers is the normal idle case.
        let _ = self.sender.send(ChangeEvent::new(table, kind, id));
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}
