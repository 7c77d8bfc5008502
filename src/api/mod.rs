mod firebase;
#[cfg(test)]
pub(crate) mod memory;
pub(crate) mod stream;

pub(crate) use firebase::FirebaseStore;

use crate::models::{TaskPatch, TaskRecord};
use serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
pub(crate) enum StoreErrorKind {
    Network,
    Http,
    Parse,
    Stream,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub(crate) struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub(crate) fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    fn network(e: reqwest::Error) -> Self {
        Self::new(StoreErrorKind::Network, e.to_string())
    }

    pub(crate) fn parse(e: impl std::fmt::Display) -> Self {
        Self::new(StoreErrorKind::Parse, e.to_string())
    }

    fn http(status: reqwest::StatusCode, body: String, ctx: &str) -> Self {
        Self::new(StoreErrorKind::Http, format!("{ctx} ({status}): {body}"))
    }

    pub(crate) fn stream(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Stream, message)
    }
}

pub(crate) type StoreResult<T> = Result<T, StoreError>;

/// A mutation the list view asks the store to perform.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum StoreCommand {
    Create(TaskRecord),
    Update { task_id: String, patch: TaskPatch },
    Remove { task_id: String },
}

impl StoreCommand {
    /// Short verb phrase for logs and the error banner.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create(_) => "add task",
            Self::Update { patch, .. } if patch.text.is_none() => "update task completion",
            Self::Update { .. } => "update task",
            Self::Remove { .. } => "delete task",
        }
    }
}

/// Keyed task collection living in a realtime database.
///
/// Mutations resolve once the store acknowledges them. The resulting state is
/// never returned directly: it arrives later as a snapshot on every live
/// subscription, including the caller's own.
pub(crate) trait TaskStore: Clone + 'static {
    /// Guard for a live subscription. Dropping it stops delivery.
    type Subscription;

    /// Deliver the full collection on every change. `None` means the
    /// collection is empty or absent.
    fn subscribe<F>(&self, on_snapshot: F) -> StoreResult<Self::Subscription>
    where
        F: Fn(Option<&Value>) + 'static;

    /// Append a record under a store-assigned key and return that key.
    async fn create(&self, record: TaskRecord) -> StoreResult<String>;

    /// Merge the present fields of `patch` into an existing record.
    async fn update(&self, task_id: &str, patch: TaskPatch) -> StoreResult<()>;

    async fn remove(&self, task_id: &str) -> StoreResult<()>;

    async fn execute(&self, command: StoreCommand) -> StoreResult<()> {
        match command {
            StoreCommand::Create(record) => {
                let key = self.create(record).await?;
                tracing::debug!(task_id = %key, "task created");
                Ok(())
            }
            StoreCommand::Update { task_id, patch } => self.update(&task_id, patch).await,
            StoreCommand::Remove { task_id } => self.remove(&task_id).await,
        }
    }
}
