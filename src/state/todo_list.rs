use super::edit_session::{EditSession, EditTransition};
use crate::api::{StoreCommand, StoreError};
use crate::models::{tasks_from_snapshot, Task, TaskPatch, TaskRecord};
use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ValidationError {
    #[error("Task cannot be empty!")]
    EmptyText,
}

/// Local state behind the list view.
///
/// The task list is only ever replaced from a store snapshot. User actions
/// return the `StoreCommand` to send and never touch the list directly; the
/// change shows up once the store pushes the next snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TodoList {
    tasks: Vec<Task>,
    compose: String,
    edit: EditSession,
    last_error: Option<String>,
    preview_chars: usize,
}

impl TodoList {
    pub fn new(preview_chars: usize) -> Self {
        Self {
            tasks: vec![],
            compose: String::new(),
            edit: EditSession::Closed,
            last_error: None,
            preview_chars,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn compose_text(&self) -> &str {
        &self.compose
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn preview_chars(&self) -> usize {
        self.preview_chars
    }

    /// Rebuild the list wholesale from a snapshot.
    pub fn apply_snapshot(&mut self, snapshot: Option<&Value>) {
        self.tasks = tasks_from_snapshot(snapshot);
        let tasks = &self.tasks;
        self.edit
            .reindex(|id| tasks.iter().position(|t| t.id == id));
        tracing::debug!(count = self.tasks.len(), "task snapshot applied");
    }

    pub fn set_compose_text(&mut self, text: &str) {
        self.compose = text.to_string();
    }

    /// Create a task from the compose box.
    ///
    /// Blank text is a no-op that keeps the box as typed. Otherwise the box is
    /// cleared right away, before the store confirms; a failed create loses
    /// the text.
    pub fn add_task(&mut self, now_ms: i64) -> Option<StoreCommand> {
        let text = self.compose.trim();
        if text.is_empty() {
            return None;
        }

        let command = StoreCommand::Create(TaskRecord::new(text, now_ms));
        self.compose.clear();
        Some(command)
    }

    pub fn toggle_completion(&self, task_id: &str, current: bool) -> StoreCommand {
        StoreCommand::Update {
            task_id: task_id.to_string(),
            patch: TaskPatch::completed(!current),
        }
    }

    /// Open the edit popover for a row, seeded with the task's full text.
    ///
    /// Rows outside the list are ignored.
    pub fn open_edit_for(&mut self, index: usize) -> Option<EditTransition> {
        let task = self.tasks.get(index)?;
        Some(self.edit.open(index, &task.id, &task.text))
    }

    /// `open_edit_for` by task id, for rows that do not track their position.
    pub fn open_edit_for_task(&mut self, task_id: &str) -> Option<EditTransition> {
        let index = self.tasks.iter().position(|t| t.id == task_id)?;
        self.open_edit_for(index)
    }

    pub fn is_editing(&self, task_id: &str) -> bool {
        self.edit.task_id() == Some(task_id)
    }

    pub fn task(&self, task_id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == task_id)
    }

    pub fn edit_draft(&mut self, text: &str) {
        self.edit.edit(text);
    }

    /// Cancel or outside click. Nothing is sent.
    pub fn close_edit(&mut self) {
        self.edit.close();
    }

    /// Send the edited text and close the popover.
    ///
    /// Blank drafts are refused and the popover stays open.
    pub fn commit_edit(
        &mut self,
        task_id: &str,
        draft: &str,
    ) -> Result<StoreCommand, ValidationError> {
        let text = draft.trim();
        if text.is_empty() {
            return Err(ValidationError::EmptyText);
        }

        let command = StoreCommand::Update {
            task_id: task_id.to_string(),
            patch: TaskPatch::text(text),
        };
        self.edit.close();
        Ok(command)
    }

    /// `commit_edit` for whatever the open popover holds.
    pub fn commit_open_edit(&mut self) -> Option<Result<StoreCommand, ValidationError>> {
        let (task_id, draft) = match &self.edit {
            EditSession::Open { task_id, draft, .. } => (task_id.clone(), draft.clone()),
            EditSession::Closed => return None,
        };
        Some(self.commit_edit(&task_id, &draft))
    }

    /// No confirmation step.
    pub fn delete_task(&self, task_id: &str) -> StoreCommand {
        StoreCommand::Remove {
            task_id: task_id.to_string(),
        }
    }

    /// Remember a failed store call for the error banner.
    pub fn record_failure(&mut self, command: &StoreCommand, error: &StoreError) {
        self.last_error = Some(format!("Could not {}: {}", command.label(), error));
    }

    pub fn record_subscribe_failure(&mut self, error: &StoreError) {
        self.last_error = Some(format!("Could not load tasks: {error}"));
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }
}
