//! Server-sent event handling for the realtime database REST stream.
//!
//! The server describes every change as a `put` (replace the node at `path`)
//! or a `patch` (merge the children of `data` under `path`). We keep our own
//! copy of the collection and hand the whole of it to the subscriber after
//! each event.

use super::{StoreError, StoreResult};
use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum StreamEventKind {
    Put,
    Patch,
}

impl StreamEventKind {
    /// `EventSource` event name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Put => "put",
            Self::Patch => "patch",
        }
    }
}

/// Event names that end or degrade the stream; logged, never applied.
pub(crate) const TERMINAL_EVENTS: [&str; 2] = ["cancel", "auth_revoked"];

#[derive(Deserialize)]
struct EventBody {
    path: String,
    #[serde(default)]
    data: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StreamEvent {
    pub kind: StreamEventKind,
    pub path: Vec<String>,
    pub data: Value,
}

impl StreamEvent {
    /// Decode the `data:` payload of a `put`/`patch` event.
    pub fn parse(kind: StreamEventKind, raw: &str) -> StoreResult<Self> {
        let body: EventBody = serde_json::from_str(raw).map_err(StoreError::parse)?;
        Ok(Self {
            kind,
            path: split_path(&body.path),
            data: body.data,
        })
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

/// Local copy of the subscribed collection. `Null` stands for "no data".
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct SnapshotTree {
    root: Value,
}

impl SnapshotTree {
    pub fn apply(&mut self, event: &StreamEvent) {
        match event.kind {
            StreamEventKind::Put => set_at(&mut self.root, &event.path, event.data.clone()),
            StreamEventKind::Patch => {
                let Some(children) = event.data.as_object() else {
                    return;
                };
                for (key, value) in children {
                    let mut path = event.path.clone();
                    path.extend(split_path(key));
                    set_at(&mut self.root, &path, value.clone());
                }
            }
        }
    }

    pub fn snapshot(&self) -> Option<&Value> {
        if self.root.is_null() {
            None
        } else {
            Some(&self.root)
        }
    }
}

fn is_empty_node(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::Object(m) => m.is_empty(),
        _ => false,
    }
}

fn set_at(node: &mut Value, path: &[String], data: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = if is_empty_node(&data) { Value::Null } else { data };
        return;
    };

    if is_empty_node(&data) {
        remove_at(node, path);
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        set_at(child, rest, data);
    }
}

/// Delete the node at `path`, pruning parents left without children.
fn remove_at(node: &mut Value, path: &[String]) {
    let Some((head, rest)) = path.split_first() else {
        *node = Value::Null;
        return;
    };

    let Value::Object(map) = node else {
        return;
    };

    if rest.is_empty() {
        map.remove(head);
    } else if let Some(child) = map.get_mut(head) {
        remove_at(child, rest);
        if is_empty_node(child) {
            map.remove(head);
        }
    }

    if map.is_empty() {
        *node = Value::Null;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StoreErrorKind;
    use serde_json::json;

    fn put(path: &str, data: Value) -> StreamEvent {
        let raw = json!({ "path": path, "data": data }).to_string();
        StreamEvent::parse(StreamEventKind::Put, &raw).expect("put should parse")
    }

    fn patch(path: &str, data: Value) -> StreamEvent {
        let raw = json!({ "path": path, "data": data }).to_string();
        StreamEvent::parse(StreamEventKind::Patch, &raw).expect("patch should parse")
    }

    #[test]
    fn test_parse_splits_path() {
        let ev = put("/-abc/taskText", json!("hi"));
        assert_eq!(ev.path, vec!["-abc".to_string(), "taskText".to_string()]);
        assert!(put("/", Value::Null).path.is_empty());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        let err = StreamEvent::parse(StreamEventKind::Put, "not json").expect_err("should fail");
        assert_eq!(err.kind, StoreErrorKind::Parse);
    }

    #[test]
    fn test_initial_put_replaces_root() {
        let mut tree = SnapshotTree::default();
        assert!(tree.snapshot().is_none());

        tree.apply(&put("/", json!({"-a": {"taskText": "a", "complete": false, "addedOn": 1}})));
        assert!(tree.snapshot().and_then(|v| v.get("-a")).is_some());

        tree.apply(&put("/", Value::Null));
        assert!(tree.snapshot().is_none());
    }

    #[test]
    fn test_put_child_adds_and_null_deletes() {
        let mut tree = SnapshotTree::default();
        tree.apply(&put("/-a", json!({"taskText": "a", "complete": false, "addedOn": 1})));
        tree.apply(&put("/-b", json!({"taskText": "b", "complete": false, "addedOn": 2})));
        assert_eq!(tree.snapshot().and_then(|v| v.as_object()).map(|m| m.len()), Some(2));

        tree.apply(&put("/-a", Value::Null));
        let snap = tree.snapshot().expect("one task left");
        assert!(snap.get("-a").is_none());
        assert!(snap.get("-b").is_some());

        tree.apply(&put("/-b", Value::Null));
        assert!(tree.snapshot().is_none());
    }

    #[test]
    fn test_put_nested_field() {
        let mut tree = SnapshotTree::default();
        tree.apply(&put("/-a", json!({"taskText": "a", "complete": false, "addedOn": 1})));
        tree.apply(&put("/-a/complete", json!(true)));
        assert_eq!(
            tree.snapshot().and_then(|v| v.pointer("/-a/complete")),
            Some(&json!(true))
        );
        assert_eq!(
            tree.snapshot().and_then(|v| v.pointer("/-a/taskText")),
            Some(&json!("a"))
        );
    }

    #[test]
    fn test_patch_merges_children() {
        let mut tree = SnapshotTree::default();
        tree.apply(&put("/-a", json!({"taskText": "a", "complete": false, "addedOn": 1})));
        tree.apply(&patch("/-a", json!({"taskText": "edited", "complete": true})));

        let a = tree.snapshot().and_then(|v| v.get("-a")).expect("task -a");
        assert_eq!(a["taskText"], "edited");
        assert_eq!(a["complete"], true);
        assert_eq!(a["addedOn"], 1);
    }

    #[test]
    fn test_patch_multi_segment_keys() {
        let mut tree = SnapshotTree::default();
        tree.apply(&put("/", json!({"-a": {"taskText": "a", "complete": false, "addedOn": 1}})));
        tree.apply(&patch("/", json!({"-a/complete": true, "-b": {"taskText": "b", "addedOn": 2}})));

        let snap = tree.snapshot().expect("snapshot");
        assert_eq!(snap.pointer("/-a/complete"), Some(&json!(true)));
        assert_eq!(snap.pointer("/-b/taskText"), Some(&json!("b")));
    }

    #[test]
    fn test_deleting_last_field_prunes_record() {
        let mut tree = SnapshotTree::default();
        tree.apply(&put("/-a", json!({"taskText": "a"})));
        tree.apply(&put("/-a/taskText", Value::Null));
        assert!(tree.snapshot().is_none());
    }

    #[test]
    fn test_put_empty_object_counts_as_delete() {
        let mut tree = SnapshotTree::default();
        tree.apply(&put("/-a", json!({"taskText": "a"})));
        tree.apply(&put("/-a", json!({})));
        assert!(tree.snapshot().is_none());
    }
}
