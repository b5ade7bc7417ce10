use crate::config::Config;
use crate::consts::MAX_STATUS_DETAIL;
use crate::store::{DocumentStore, MongoStore, StoreError};
use crate::utils::clip;

use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;
use tracing::{error, warn};

/// State shared by every request. The store handle is set up once before the
/// server starts and stays unset if that fails.
pub struct AppState {
    pub config: Config,
    store: Option<Arc<dyn DocumentStore>>,
}

impl AppState {
    pub fn new(config: Config, store: Option<Arc<dyn DocumentStore>>) -> Self {
        Self { config, store }
    }

    /// Open the MongoDB store named by `config`. Missing settings or a bad
    /// connection string are logged and leave the store unset.
    pub async fn connect(config: Config) -> Self {
        let store: Option<Arc<dyn DocumentStore>> = match config.database() {
            Ok((url, name)) => match MongoStore::connect(url, name).await {
                Ok(store) => Some(Arc::new(store)),
                Err(e) => {
                    error!(error=%e, "failed to initialise document store");
                    None
                }
            },
            Err(e) => {
                warn!(error=%e, "document store disabled");
                None
            }
        };
        Self::new(config, store)
    }

    pub fn is_store_available(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Result<&dyn DocumentStore, StoreError> {
        self.store.as_deref().ok_or(StoreError::Unavailable)
    }
}

/// Health of the document store as seen by `GET /test`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseStatus {
    NotAvailable,
    /// No store handle: settings missing or initialisation failed.
    NotInitialized,
    Working,
    /// Handle present but the probe query failed.
    Degraded(String),
    /// The probe itself blew up.
    Error(String),
}

impl DatabaseStatus {
    pub fn degraded(detail: &str) -> Self {
        DatabaseStatus::Degraded(clip(detail, MAX_STATUS_DETAIL))
    }

    pub fn error(detail: &str) -> Self {
        DatabaseStatus::Error(clip(detail, MAX_STATUS_DETAIL))
    }
}

impl fmt::Display for DatabaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DatabaseStatus::NotAvailable => write!(f, "❌ Not Available"),
            DatabaseStatus::NotInitialized => write!(f, "⚠️  Available but not initialized"),
            DatabaseStatus::Working => write!(f, "✅ Connected & Working"),
            DatabaseStatus::Degraded(e) => write!(f, "⚠️  Connected but Error: {e}"),
            DatabaseStatus::Error(e) => write!(f, "❌ Error: {e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    NotConnected,
}

impl fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::NotConnected => write!(f, "Not Connected"),
        }
    }
}

/// Whether a configuration value is present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Setting(pub bool);

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 {
            write!(f, "✅ Set")
        } else {
            write!(f, "❌ Not Set")
        }
    }
}

fn as_text<T: fmt::Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

/// Body of `GET /test`. Each field is filled by its own check; none of them
/// can fail the request.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticReport {
    pub backend: &'static str,
    #[serde(serialize_with = "as_text")]
    pub database: DatabaseStatus,
    #[serde(serialize_with = "as_text")]
    pub database_url: Setting,
    #[serde(serialize_with = "as_text")]
    pub database_name: Setting,
    #[serde(serialize_with = "as_text")]
    pub connection_status: ConnectionStatus,
    pub collections: Vec<String>,
}

impl DiagnosticReport {
    pub fn new(config: &Config) -> Self {
        Self {
            backend: "✅ Running",
            database: DatabaseStatus::NotAvailable,
            database_url: Setting(config.is_database_url_set()),
            database_name: Setting(config.is_database_name_set()),
            connection_status: ConnectionStatus::NotConnected,
            collections: Vec::new(),
        }
    }
}
