//! URL store implementations.
//!
//! Concrete implementations of [`UrlStore`]:
//!
//! - [`MemoryStore`] - Process-local maps, lost on restart
//! - [`FileStore`] - JSON snapshot rewritten atomically on every mutation
//! - [`SqliteStore`] - Single-table SQLite database via SQLx
//!
//! [`open`] picks one based on [`StorageBackend`].

pub mod file_store;
pub mod index;
pub mod memory_store;
pub mod sqlite_store;

pub use file_store::{FileStore, read_snapshot};
pub use index::UrlIndex;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use crate::domain::error::StoreError;
use crate::domain::repositories::UrlStore;

/// Which store implementation to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageBackend {
    Memory,
    File,
    #[default]
    Sqlite,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "file" | "json" => Ok(Self::File),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!(
                "unknown storage backend '{other}', expected memory, file or sqlite"
            )),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::File => write!(f, "file"),
            Self::Sqlite => write!(f, "sqlite"),
        }
    }
}

/// Where each backend keeps its data.
#[derive(Debug, Clone)]
pub struct StorageOptions {
    pub backend: StorageBackend,
    pub db_path: PathBuf,
    pub data_path: PathBuf,
    pub db_max_connections: u32,
}

/// An opened store.
///
/// `sqlite` is kept separately so the pool can be closed on shutdown.
pub struct OpenedStore {
    pub store: Arc<dyn UrlStore>,
    pub sqlite: Option<Arc<SqliteStore>>,
}

impl OpenedStore {
    /// Releases backend resources. Only SQLite holds any.
    pub async fn close(&self) {
        if let Some(sqlite) = &self.sqlite {
            sqlite.close().await;
            tracing::info!("Database pool closed");
        }
    }
}

/// Opens the store selected by `options.backend`.
///
/// # Errors
///
/// Returns an error if the snapshot or database cannot be opened.
pub async fn open(options: &StorageOptions) -> Result<OpenedStore, StoreError> {
    let opened = match options.backend {
        StorageBackend::Memory => OpenedStore {
            store: Arc::new(MemoryStore::new()),
            sqlite: None,
        },
        StorageBackend::File => OpenedStore {
            store: Arc::new(FileStore::open(options.data_path.clone()).await?),
            sqlite: None,
        },
        StorageBackend::Sqlite => {
            let sqlite =
                Arc::new(SqliteStore::connect(&options.db_path, options.db_max_connections).await?);
            OpenedStore {
                store: sqlite.clone(),
                sqlite: Some(sqlite),
            }
        }
    };

    tracing::info!(backend = %options.backend, "Storage opened");
    Ok(opened)
}
