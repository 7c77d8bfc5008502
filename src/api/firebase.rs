use super::stream::{SnapshotTree, StreamEvent, StreamEventKind, TERMINAL_EVENTS};
use super::{StoreError, StoreResult, TaskStore};
use crate::config::AppConfig;
use crate::models::{TaskPatch, TaskRecord};
use serde::Deserialize;
use serde_json::Value;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

/// Body returned by a `POST` to a collection.
#[derive(Deserialize, Clone, Debug)]
struct PushResponse {
    name: String,
}

/// Realtime Database binding over its REST surface.
///
/// Mutations go through `reqwest`; the live subscription is a browser
/// `EventSource` on the same collection URL.
#[derive(Clone)]
pub(crate) struct FirebaseStore {
    pub(crate) database_url: String,
    pub(crate) tasks_path: String,
}

impl FirebaseStore {
    pub fn new(database_url: &str, tasks_path: &str) -> Self {
        Self {
            database_url: database_url.trim_end_matches('/').to_string(),
            tasks_path: tasks_path.trim_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.database_url, &config.tasks_path)
    }

    pub(crate) fn collection_url(&self) -> String {
        format!("{}/{}.json", self.database_url, self.tasks_path)
    }

    pub(crate) fn record_url(&self, task_id: &str) -> String {
        format!(
            "{}/{}/{}.json",
            self.database_url,
            self.tasks_path,
            urlencoding::encode(task_id)
        )
    }

    async fn send(&self, req: reqwest::RequestBuilder, ctx: &str) -> StoreResult<reqwest::Response> {
        let res = req.send().await.map_err(StoreError::network)?;

        if res.status().is_success() {
            Ok(res)
        } else {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            Err(StoreError::http(status, body, ctx))
        }
    }
}

impl TaskStore for FirebaseStore {
    type Subscription = StreamSubscription;

    fn subscribe<F>(&self, on_snapshot: F) -> StoreResult<StreamSubscription>
    where
        F: Fn(Option<&Value>) + 'static,
    {
        let url = self.collection_url();
        let source = web_sys::EventSource::new(&url)
            .map_err(|e| StoreError::stream(format!("cannot open stream {url}: {e:?}")))?;

        // Built first so an early return still closes the source.
        let mut sub = StreamSubscription {
            source,
            listeners: Vec::new(),
            _on_error: None,
        };

        let tree = Rc::new(RefCell::new(SnapshotTree::default()));
        let on_snapshot = Rc::new(on_snapshot);

        for kind in [StreamEventKind::Put, StreamEventKind::Patch] {
            let tree = tree.clone();
            let on_snapshot = on_snapshot.clone();
            let cb = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
                move |ev: web_sys::MessageEvent| {
                    let Some(raw) = ev.data().as_string() else {
                        return;
                    };
                    let event = match StreamEvent::parse(kind, &raw) {
                        Ok(event) => event,
                        Err(e) => {
                            tracing::warn!(event = kind.as_str(), error = %e, "dropping unreadable stream event");
                            return;
                        }
                    };

                    let snapshot = {
                        let mut tree = tree.borrow_mut();
                        tree.apply(&event);
                        tree.snapshot().cloned()
                    };
                    on_snapshot(snapshot.as_ref());
                },
            );
            sub.listen(kind.as_str(), cb)?;
        }

        for name in TERMINAL_EVENTS {
            let cb = Closure::<dyn FnMut(web_sys::MessageEvent)>::new(
                move |ev: web_sys::MessageEvent| {
                    let detail = ev.data().as_string().unwrap_or_default();
                    tracing::warn!(event = name, %detail, "task stream closed by server");
                },
            );
            sub.listen(name, cb)?;
        }

        // EventSource reconnects by itself; only record the hiccup.
        let on_error = Closure::<dyn FnMut(web_sys::Event)>::new(move |_ev: web_sys::Event| {
            tracing::warn!("task stream connection error, browser will retry");
        });
        sub.source
            .set_onerror(Some(on_error.as_ref().unchecked_ref()));
        sub._on_error = Some(on_error);

        tracing::info!(%url, "subscribed to task stream");
        Ok(sub)
    }

    async fn create(&self, record: TaskRecord) -> StoreResult<String> {
        let req = reqwest::Client::new().post(self.collection_url()).json(&record);
        let res = self.send(req, "Create task failed").await?;
        let body: PushResponse = res.json().await.map_err(StoreError::parse)?;
        Ok(body.name)
    }

    async fn update(&self, task_id: &str, patch: TaskPatch) -> StoreResult<()> {
        let req = reqwest::Client::new().patch(self.record_url(task_id)).json(&patch);
        self.send(req, "Update task failed").await?;
        Ok(())
    }

    async fn remove(&self, task_id: &str) -> StoreResult<()> {
        let req = reqwest::Client::new().delete(self.record_url(task_id));
        self.send(req, "Delete task failed").await?;
        Ok(())
    }
}

/// Live stream handle. Dropping it detaches every listener and closes the
/// connection.
pub(crate) struct StreamSubscription {
    source: web_sys::EventSource,
    listeners: Vec<(&'static str, Closure<dyn FnMut(web_sys::MessageEvent)>)>,
    _on_error: Option<Closure<dyn FnMut(web_sys::Event)>>,
}

impl StreamSubscription {
    fn listen(
        &mut self,
        name: &'static str,
        cb: Closure<dyn FnMut(web_sys::MessageEvent)>,
    ) -> StoreResult<()> {
        self.source
            .add_event_listener_with_callback(name, cb.as_ref().unchecked_ref())
            .map_err(|e| StoreError::stream(format!("cannot listen for {name}: {e:?}")))?;
        self.listeners.push((name, cb));
        Ok(())
    }
}

impl Drop for StreamSubscription {
    fn drop(&mut self) {
        for (name, cb) in &self.listeners {
            let _ = self
                .source
                .remove_event_listener_with_callback(name, cb.as_ref().unchecked_ref());
        }
        self.source.set_onerror(None);
        self.source.close();
        tracing::info!(url = %self.source.url(), "unsubscribed from task stream");
    }
}
