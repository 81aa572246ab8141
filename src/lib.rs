//! Drivedeck: a file-manager engine over a real-time document store.
//!
//! Drivedeck keeps a Drive-style file list in sync with a document collection
//! and the user's selections:
//! - Case-insensitive search across file names
//! - My Drive, Starred, Recent and Bin views with list or grid layout
//! - Local starring and a local bin with restore and permanent delete
//! - Sequential uploads with base64 data-URL payloads and per-file progress
//! - Downloads that decode the stored payload back to a file

#![allow(clippy::multiple_crate_versions)]

//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │  Command shim (main.rs)                             │  ← Entry point
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Session runtime (runtime.rs)                       │  ← Event loop
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Application Layer (app/)                           │  ← State machine
//! │  - Event handling                                   │
//! │  - View-state derivation                            │
//! │  - Upload batch state machine                       │
//! └─────────────────────────────────────────────────────┘
//!         │                    │                    │
//! ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//! │ UI Layer      │   │ Store Layer   │   │ Worker Layer  │
//! │ (ui/)         │   │ (store/)      │   │ (worker/)     │
//! │ - View models │   │ - Store trait │   │ - Encoding    │
//! │ - List / grid │   │ - JSON store  │   │ - Store writes│
//! └───────────────┘   └───────────────┘   └───────────────┘
//!         │                    │                    │
//! ┌─────────────────────────────────────────────────────┐
//! │  Infrastructure & Domain Layers                     │
//! │  - Data directory, MIME types (infrastructure/)     │
//! │  - File record, payload codec, errors (domain/)     │
//! └─────────────────────────────────────────────────────┘
//!                        │
//! ┌─────────────────────────────────────────────────────┐
//! │  Observability (observability/)                     │
//! │  - tracing + stderr output                          │
//! │  - File-based OTLP span export                      │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Configuration
//!
//! The store connection is described by six keys, all required:
//! `project_id`, `api_key`, `auth_domain`, `storage_bucket`,
//! `messaging_sender_id` and `app_id` (camelCase spellings are accepted).
//! Optional keys: `collection` (default `myFiles`), `data_dir`,
//! `trace_level` (default `info`) and `export_spans` (default `false`).
//!
//! ```toml
//! project_id = "demo-drive"
//! api_key = "key"
//! auth_domain = "demo-drive.example.com"
//! storage_bucket = "demo-drive.appspot.com"
//! messaging_sender_id = "1234"
//! app_id = "1:1234:web:abcd"
//! trace_level = "debug"
//! ```
//!
//! # Examples
//!
//! ```rust
//! use drivedeck::{handle_event, DriveState, Event, View};
//!
//! let mut state = DriveState::new();
//! handle_event(&mut state, &Event::SetSearchQuery("report".to_string()))?;
//! handle_event(&mut state, &Event::SetView(View::Recent))?;
//! assert!(state.filtered_files.is_empty());
//! # Ok::<(), drivedeck::DriveError>(())
//! ```

pub mod app;
pub mod domain;
pub mod infrastructure;
pub mod observability;
pub mod runtime;
pub mod store;
pub mod ui;
pub mod worker;

pub use app::{handle_event, Action, DriveState, Event, Layout, View};
pub use domain::{DriveError, FileRecord, Result};
pub use runtime::Session;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Collection used when none is configured.
pub const DEFAULT_COLLECTION: &str = "myFiles";

/// Prefix of the environment variables read by [`Config::from_env`].
pub const ENV_PREFIX: &str = "DRIVEDECK_";

/// File name of the local document store inside the data directory.
pub const STORE_FILE_NAME: &str = "drive.json";

/// Connection keys that must be present.
pub const REQUIRED_KEYS: [&str; 6] = [
    "project_id",
    "api_key",
    "auth_domain",
    "storage_bucket",
    "messaging_sender_id",
    "app_id",
];

/// Connection settings for the document store. Values are opaque.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub project_id: String,
    pub api_key: String,
    pub auth_domain: String,
    pub storage_bucket: String,
    pub messaging_sender_id: String,
    pub app_id: String,
}

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionConfig,

    /// Document collection holding the files.
    pub collection: String,

    /// Directory for the local store and the trace file.
    pub data_dir: PathBuf,

    /// Filter directive for tracing (`error` .. `trace`). `RUST_LOG` wins.
    pub trace_level: String,

    /// Export spans as OTLP JSON to the data directory.
    pub export_spans: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            connection: ConnectionConfig::default(),
            collection: DEFAULT_COLLECTION.to_string(),
            data_dir: infrastructure::get_data_dir(),
            trace_level: "info".to_string(),
            export_spans: false,
        }
    }
}

impl Config {
    /// Parses configuration from a key/value map.
    ///
    /// Keys may be snake_case or camelCase (`apiKey`). Blank values count as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Config`] naming every missing connection key, or
    /// describing an unparseable optional value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use drivedeck::Config;
    /// use std::collections::BTreeMap;
    ///
    /// let mut map = BTreeMap::new();
    /// for key in drivedeck::REQUIRED_KEYS {
    ///     map.insert(key.to_string(), "x".to_string());
    /// }
    /// map.insert("collection".to_string(), "team".to_string());
    ///
    /// let config = Config::from_map(&map)?;
    /// assert_eq!(config.collection, "team");
    ///
    /// map.remove("api_key");
    /// let err = Config::from_map(&map).unwrap_err();
    /// assert!(err.to_string().contains("api_key"));
    /// # Ok::<(), drivedeck::DriveError>(())
    /// ```
    pub fn from_map(map: &BTreeMap<String, String>) -> Result<Self> {
        let values: BTreeMap<String, &str> = map
            .iter()
            .map(|(key, value)| (normalize_key(key), value.trim()))
            .filter(|(_, value)| !value.is_empty())
            .collect();

        let missing: Vec<&str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| !values.contains_key(*key))
            .collect();
        if !missing.is_empty() {
            return Err(DriveError::Config(format!(
                "missing configuration keys: {}",
                missing.join(", ")
            )));
        }

        let required = |key: &str| values.get(key).map(|v| (*v).to_string()).unwrap_or_default();
        let connection = ConnectionConfig {
            project_id: required("project_id"),
            api_key: required("api_key"),
            auth_domain: required("auth_domain"),
            storage_bucket: required("storage_bucket"),
            messaging_sender_id: required("messaging_sender_id"),
            app_id: required("app_id"),
        };

        let defaults = Self::default();
        let export_spans = values
            .get("export_spans")
            .map(|value| parse_bool(value))
            .transpose()?
            .unwrap_or(defaults.export_spans);

        Ok(Self {
            connection,
            collection: values
                .get("collection")
                .map_or(defaults.collection, |v| (*v).to_string()),
            data_dir: values
                .get("data_dir")
                .map_or(defaults.data_dir, |v| infrastructure::expand_tilde(v)),
            trace_level: values
                .get("trace_level")
                .map_or(defaults.trace_level, |v| (*v).to_string()),
            export_spans,
        })
    }

    /// Parses configuration from `DRIVEDECK_*` environment variables
    /// (`DRIVEDECK_API_KEY`, `DRIVEDECK_COLLECTION`, ...).
    ///
    /// # Errors
    ///
    /// Same as [`from_map`](Self::from_map).
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Parses configuration from `(name, value)` pairs, keeping only names
    /// with the `DRIVEDECK_` prefix.
    ///
    /// # Errors
    ///
    /// Same as [`from_map`](Self::from_map).
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let map = vars
            .into_iter()
            .filter_map(|(name, value)| {
                name.strip_prefix(ENV_PREFIX)
                    .map(|key| (key.to_lowercase(), value))
            })
            .collect();
        Self::from_map(&map)
    }

    /// Parses configuration from a flat TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Io`] if the file cannot be read,
    /// [`DriveError::Config`] if it is not valid TOML or fails
    /// [`from_map`](Self::from_map).
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Same as [`from_file`](Self::from_file), minus I/O.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let table: toml::Table = contents
            .parse()
            .map_err(|e| DriveError::Config(format!("invalid TOML: {e}")))?;

        let map = table
            .into_iter()
            .map(|(key, value)| {
                let text = match value {
                    toml::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, text)
            })
            .collect();
        Self::from_map(&map)
    }

    /// Path of the local document store file.
    #[must_use]
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join(STORE_FILE_NAME)
    }
}

/// `apiKey` → `api_key`; snake_case keys pass through.
fn normalize_key(key: &str) -> String {
    let mut normalized = String::with_capacity(key.len() + 4);
    for c in key.trim().chars() {
        if c.is_ascii_uppercase() {
            if !normalized.is_empty() {
                normalized.push('_');
            }
            normalized.push(c.to_ascii_lowercase());
        } else {
            normalized.push(c);
        }
    }
    normalized
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => Err(DriveError::Config(format!("expected a boolean, got {other}"))),
    }
}

/// Initializes tracing, opens the local document store and starts a session.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the session threads
/// cannot be started.
///
/// # Example
///
/// ```no_run
/// use drivedeck::{initialize, Config};
///
/// let config = Config::from_env()?;
/// let mut session = initialize(&config)?;
/// let views = session.watch();
/// # Ok::<(), drivedeck::DriveError>(())
/// ```
pub fn initialize(config: &Config) -> Result<Session> {
    if let Err(e) = observability::init_tracing(config) {
        eprintln!("drivedeck: tracing disabled: {e}");
    }

    tracing::debug!(
        project_id = %config.connection.project_id,
        collection = %config.collection,
        data_dir = %config.data_dir.display(),
        "initializing drivedeck"
    );

    let store = store::JsonDocumentStore::new(config.store_path())?;
    Session::start(Box::new(store), &config.collection)
}
