pub mod memory;
pub mod sqlite;

use crate::binding::{ChatId, UserBinding};
use crate::error::BindingError;
use crate::store::BindingStore;

use memory::MemoryBindingStore;
use sqlite::SqliteBindingStore;

/// Binding store chosen at startup from configuration.
#[derive(Clone)]
pub enum Backend {
    Memory(MemoryBindingStore),
    Sqlite(SqliteBindingStore),
}

impl Backend {
    /// SQLite at `path` when given, otherwise an in-memory store.
    pub fn from_path(path: Option<&str>) -> Result<Self, BindingError> {
        match path {
            Some(path) => Ok(Self::Sqlite(SqliteBindingStore::open(path)?)),
            None => Ok(Self::Memory(MemoryBindingStore::new())),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Memory(_) => "memory",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl BindingStore for Backend {
    async fn upsert(&self, binding: UserBinding) -> Result<(), BindingError> {
        match self {
            Self::Memory(store) => store.upsert(binding).await,
            Self::Sqlite(store) => store.upsert(binding).await,
        }
    }

    async fn get_by_chat(&self, chat_id: ChatId) -> Result<UserBinding, BindingError> {
        match self {
            Self::Memory(store) => store.get_by_chat(chat_id).await,
            Self::Sqlite(store) => store.get_by_chat(chat_id).await,
        }
    }

    async fn get_by_login(&self, login: &str) -> Result<Vec<UserBinding>, BindingError> {
        match self {
            Self::Memory(store) => store.get_by_login(login).await,
            Self::Sqlite(store) => store.get_by_login(login).await,
        }
    }
}
