use crate::models::DEFAULT_PREVIEW_CHARS;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const DEFAULT_DATABASE_URL: &str = "http://localhost:9000";
const DEFAULT_TASKS_PATH: &str = "tasks";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime configuration, injected by the hosting page as `window.ENV`.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    /// Realtime database root, e.g. `https://<project>-default-rtdb.firebaseio.com`.
    pub database_url: String,
    /// Collection holding the task records, relative to the database root.
    pub tasks_path: String,
    pub preview_chars: usize,
    /// `EnvFilter` directive for the console logger.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            tasks_path: DEFAULT_TASKS_PATH.to_string(),
            preview_chars: DEFAULT_PREVIEW_CHARS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Read `window.ENV`, falling back to defaults for anything missing.
    pub fn load() -> Self {
        let Some(window) = web_sys::window() else {
            return Self::default();
        };
        let Some(env) = window.get("ENV") else {
            return Self::default();
        };
        if env.is_undefined() || !env.is_object() {
            return Self::default();
        }

        let json = js_sys::JSON::stringify(&env)
            .ok()
            .and_then(|s| s.as_string())
            .unwrap_or_default();

        match serde_json::from_str::<Value>(&json) {
            Ok(v) => Self::from_env_value(&v),
            Err(_) => Self::default(),
        }
    }

    /// Build a config from the `ENV` object.
    ///
    /// Both `DATABASE_URL` (documented) and `database_url` spellings are accepted;
    /// the upper-case key wins when both are present.
    pub fn from_env_value(env: &Value) -> Self {
        let mut cfg = Self::default();

        let get_s = |upper: &str, lower: &str| {
            env.get(upper)
                .or_else(|| env.get(lower))
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        };

        if let Some(url) = get_s("DATABASE_URL", "database_url") {
            cfg.database_url = url.trim_end_matches('/').to_string();
        }

        if let Some(path) = get_s("TASKS_PATH", "tasks_path") {
            let path = path.trim_matches('/');
            if !path.is_empty() {
                cfg.tasks_path = path.to_string();
            }
        }

        // Accept both a number and a numeric string.
        let preview = env
            .get("PREVIEW_CHARS")
            .or_else(|| env.get("preview_chars"))
            .and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_str().and_then(|s| s.trim().parse::<u64>().ok()))
            })
            .and_then(|n| usize::try_from(n).ok())
            .filter(|n| *n > 0);
        if let Some(n) = preview {
            cfg.preview_chars = n;
        }

        if let Some(level) = get_s("LOG_LEVEL", "log_level") {
            cfg.log_level = level;
        }

        cfg
    }
}
