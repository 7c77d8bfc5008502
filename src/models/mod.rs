use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Number of characters shown for a task in the list before it is cut off.
/// The full text stays in the store and in the edit box.
pub(crate) const DEFAULT_PREVIEW_CHARS: usize = 63;

/// Persisted layout of one task under its push key.
///
/// Field names are the database contract; the Rust names follow `Task`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct TaskRecord {
    #[serde(rename = "taskText")]
    pub text: String,

    #[serde(rename = "complete", default)]
    pub completed: bool,

    /// Milliseconds since epoch. Only used for ordering.
    #[serde(rename = "addedOn", deserialize_with = "millis_from_number")]
    pub created_at: i64,
}

impl TaskRecord {
    pub fn new(text: &str, created_at: i64) -> Self {
        Self {
            text: text.to_string(),
            completed: false,
            created_at,
        }
    }
}

/// `addedOn` is a plain JS number, so other writers may store it with a
/// fraction. Round it instead of rejecting the record.
fn millis_from_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = serde_json::Number::deserialize(deserializer)?;
    n.as_i64()
        .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f.round() as i64))
        .ok_or_else(|| serde::de::Error::custom(format!("addedOn out of range: {n}")))
}

/// Partial update merged into an existing record.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TaskPatch {
    #[serde(rename = "taskText", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(rename = "complete", skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }
}

/// A task as the list view sees it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Task {
    pub id: String,
    pub text: String,
    pub completed: bool,
    pub created_at: i64,
}

impl Task {
    pub fn from_record(id: &str, record: TaskRecord) -> Self {
        Self {
            id: id.to_string(),
            text: record.text,
            completed: record.completed,
            created_at: record.created_at,
        }
    }

    /// Text for the list row, cut to `max_chars` characters.
    pub fn preview(&self, max_chars: usize) -> &str {
        preview_text(&self.text, max_chars)
    }
}

pub(crate) fn preview_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

/// Rebuild the full task list from a collection snapshot, newest first.
///
/// `None`, `null` and non-object snapshots yield an empty list. Entries that do
/// not decode as a `TaskRecord` are skipped. Equal timestamps keep the
/// snapshot's iteration order.
pub(crate) fn tasks_from_snapshot(snapshot: Option<&Value>) -> Vec<Task> {
    let Some(entries) = snapshot.and_then(|v| v.as_object()) else {
        return vec![];
    };

    let mut out: Vec<Task> = Vec::with_capacity(entries.len());
    for (key, value) in entries {
        match serde_json::from_value::<TaskRecord>(value.clone()) {
            Ok(record) => out.push(Task::from_record(key, record)),
            Err(e) => {
                tracing::warn!(task_id = %key, error = %e, "skipping malformed task record");
            }
        }
    }

    // Stable sort: ties stay in snapshot order.
    out.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    out
}
