//! In-memory `TaskStore` used by the unit tests.
//!
//! Behaves like the realtime database as far as the list view can tell:
//! push keys sort in creation order, every successful mutation is followed by
//! a snapshot to all subscribers, and failures leave the data untouched.

use super::{StoreCommand, StoreError, StoreErrorKind, StoreResult, TaskStore};
use crate::models::{TaskPatch, TaskRecord};
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

type Listener = Rc<dyn Fn(Option<&Value>)>;

#[derive(Default)]
struct Inner {
    records: BTreeMap<String, TaskRecord>,
    calls: Vec<StoreCommand>,
    fail_with: Option<StoreErrorKind>,
    listeners: BTreeMap<u64, Listener>,
    next_listener: u64,
    next_key: u64,
    released: usize,
}

#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    inner: Rc<RefCell<Inner>>,
}

impl MemoryStore {
    /// Insert a record without recording a call or notifying subscribers.
    pub fn seed(&self, key: &str, record: TaskRecord) {
        self.inner.borrow_mut().records.insert(key.to_string(), record);
    }

    /// Make every following mutation fail with `kind`.
    pub fn fail_with(&self, kind: StoreErrorKind) {
        self.inner.borrow_mut().fail_with = Some(kind);
    }

    pub fn recover(&self) {
        self.inner.borrow_mut().fail_with = None;
    }

    pub fn calls(&self) -> Vec<StoreCommand> {
        self.inner.borrow().calls.clone()
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.borrow().records.keys().cloned().collect()
    }

    pub fn record(&self, key: &str) -> Option<TaskRecord> {
        self.inner.borrow().records.get(key).cloned()
    }

    pub fn active_subscriptions(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    pub fn released_subscriptions(&self) -> usize {
        self.inner.borrow().released
    }

    pub fn snapshot(&self) -> Option<Value> {
        let inner = self.inner.borrow();
        if inner.records.is_empty() {
            return None;
        }
        let mut map = Map::new();
        for (key, record) in &inner.records {
            if let Ok(v) = serde_json::to_value(record) {
                map.insert(key.clone(), v);
            }
        }
        Some(Value::Object(map))
    }

    /// Push the current state to every subscriber.
    pub fn emit(&self) {
        let listeners: Vec<Listener> = self.inner.borrow().listeners.values().cloned().collect();
        let snapshot = self.snapshot();
        for listener in listeners {
            listener(snapshot.as_ref());
        }
    }

    /// Record the call and fail it if a failure is armed.
    fn begin(&self, command: StoreCommand) -> StoreResult<()> {
        let mut inner = self.inner.borrow_mut();
        inner.calls.push(command);
        match inner.fail_with {
            Some(kind) => Err(StoreError::new(kind, "injected failure")),
            None => Ok(()),
        }
    }
}

impl TaskStore for MemoryStore {
    type Subscription = MemorySubscription;

    fn subscribe<F>(&self, on_snapshot: F) -> StoreResult<MemorySubscription>
    where
        F: Fn(Option<&Value>) + 'static,
    {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let id = inner.next_listener;
            inner.next_listener += 1;
            inner.listeners.insert(id, Rc::new(on_snapshot));
            id
        };

        // The database sends the current value right after subscribing.
        let listener = self.inner.borrow().listeners.get(&id).cloned();
        if let Some(listener) = listener {
            listener(self.snapshot().as_ref());
        }

        Ok(MemorySubscription {
            store: self.clone(),
            id,
        })
    }

    async fn create(&self, record: TaskRecord) -> StoreResult<String> {
        self.begin(StoreCommand::Create(record.clone()))?;
        let key = {
            let mut inner = self.inner.borrow_mut();
            inner.next_key += 1;
            let key = format!("-k{:06}", inner.next_key);
            inner.records.insert(key.clone(), record);
            key
        };
        self.emit();
        Ok(key)
    }

    async fn update(&self, task_id: &str, patch: TaskPatch) -> StoreResult<()> {
        self.begin(StoreCommand::Update {
            task_id: task_id.to_string(),
            patch: patch.clone(),
        })?;
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(record) = inner.records.get_mut(task_id) {
                if let Some(text) = patch.text {
                    record.text = text;
                }
                if let Some(completed) = patch.completed {
                    record.completed = completed;
                }
            }
        }
        self.emit();
        Ok(())
    }

    async fn remove(&self, task_id: &str) -> StoreResult<()> {
        self.begin(StoreCommand::Remove {
            task_id: task_id.to_string(),
        })?;
        self.inner.borrow_mut().records.remove(task_id);
        self.emit();
        Ok(())
    }
}

pub(crate) struct MemorySubscription {
    store: MemoryStore,
    id: u64,
}

impl Drop for MemorySubscription {
    fn drop(&mut self) {
        let mut inner = self.store.inner.borrow_mut();
        if inner.listeners.remove(&self.id).is_some() {
            inner.released += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use std::cell::Cell;

    #[test]
    fn test_subscription_delivers_initial_and_later_snapshots() {
        let store = MemoryStore::default();
        store.seed("-a", TaskRecord::new("seeded", 1));

        let seen = Rc::new(Cell::new(0usize));
        let sizes = Rc::new(RefCell::new(Vec::new()));
        let (seen2, sizes2) = (seen.clone(), sizes.clone());
        let _sub = store
            .subscribe(move |snap| {
                seen2.set(seen2.get() + 1);
                let n = snap.and_then(|v| v.as_object()).map_or(0, |m| m.len());
                sizes2.borrow_mut().push(n);
            })
            .expect("subscribe should succeed");

        block_on(store.create(TaskRecord::new("second", 2))).expect("create should succeed");
        assert_eq!(seen.get(), 2);
        assert_eq!(*sizes.borrow(), vec![1, 2]);
    }

    #[test]
    fn test_dropping_subscription_releases_once() {
        let store = MemoryStore::default();
        let sub = store.subscribe(|_| {}).expect("subscribe should succeed");
        assert_eq!(store.active_subscriptions(), 1);

        drop(sub);
        assert_eq!(store.active_subscriptions(), 0);
        assert_eq!(store.released_subscriptions(), 1);
    }

    #[test]
    fn test_failed_mutation_leaves_data_untouched() {
        let store = MemoryStore::default();
        store.seed("-a", TaskRecord::new("keep", 1));
        store.fail_with(StoreErrorKind::Http);

        assert!(block_on(store.remove("-a")).is_err());
        assert!(store.record("-a").is_some());
        assert_eq!(store.calls().len(), 1);

        store.recover();
        assert!(block_on(store.remove("-a")).is_ok());
        assert!(store.record("-a").is_none());
    }
}
