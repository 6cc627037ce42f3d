//! SQLite [`BindingStore`] backend.
//!
//! One table keyed by chat:
//!
//! ```sql
//! CREATE TABLE user_bindings (
//!     chat_id      INTEGER PRIMARY KEY,
//!     github_login TEXT NOT NULL
//! );
//! ```
//!
//! Upserts use `ON CONFLICT(chat_id) DO UPDATE`, so the login index (a plain
//! SQL index on `github_login`) can never disagree with the primary key.
//!
//! The database runs in WAL mode. Upserts go through a single writer
//! connection behind a mutex; lookups check out read-only connections from an
//! r2d2 pool, so readers run side by side and never wait on the writer.
//! Synchronous rusqlite calls run on `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params};
use tracing::{debug, info};

use crate::binding::{ChatId, GithubLogin, UserBinding, normalize_login};
use crate::error::BindingError;
use crate::store::BindingStore;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS user_bindings (
    chat_id      INTEGER PRIMARY KEY,
    github_login TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_user_bindings_github_login ON user_bindings (github_login);
";

const READER_CONNECTIONS: u32 = 4;
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-backed binding store.
///
/// `Clone` shares the writer connection and the reader pool.
#[derive(Clone)]
pub struct SqliteBindingStore {
    writer: Arc<Mutex<Connection>>,
    readers: Pool<SqliteConnectionManager>,
}

impl SqliteBindingStore {
    /// Open (or create) the database at `path`, switch it to WAL and ensure
    /// the schema exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, BindingError> {
        let path = path.as_ref();

        let writer = Connection::open(path).map_err(|e| BindingError::storage("open database", e))?;
        writer
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(|e| BindingError::storage("configure writer", e))?;
        let mode: String = writer
            .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
            .map_err(|e| BindingError::storage("enable WAL", e))?;
        writer
            .execute_batch(SCHEMA)
            .map_err(|e| BindingError::storage("create schema", e))?;

        let manager = SqliteConnectionManager::file(path)
            .with_flags(
                OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_URI | OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_init(|conn| conn.busy_timeout(BUSY_TIMEOUT));
        let readers = Pool::builder()
            .max_size(READER_CONNECTIONS)
            .build(manager)
            .map_err(|e| BindingError::storage("open reader pool", e))?;

        info!(path = %path.display(), journal_mode = %mode, readers = READER_CONNECTIONS, "SQLite binding store ready");
        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            readers,
        })
    }

    async fn with_writer<T, F>(&self, op: &'static str, f: F) -> Result<T, BindingError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let writer = Arc::clone(&self.writer);
        tokio::task::spawn_blocking(move || {
            let guard = writer
                .lock()
                .map_err(|_| BindingError::storage(op, "writer lock poisoned"))?;
            f(&*guard).map_err(|e| BindingError::storage(op, e))
        })
        .await
        .map_err(|e| BindingError::storage(op, e))?
    }

    async fn with_reader<T, F>(&self, op: &'static str, f: F) -> Result<T, BindingError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let readers = self.readers.clone();
        tokio::task::spawn_blocking(move || {
            let conn = readers.get().map_err(|e| BindingError::storage(op, e))?;
            f(&*conn).map_err(|e| BindingError::storage(op, e))
        })
        .await
        .map_err(|e| BindingError::storage(op, e))?
    }
}

fn row_to_binding(chat_id: ChatId, login: String) -> Result<UserBinding, BindingError> {
    let github_login = GithubLogin::new(&login)
        .map_err(|_| BindingError::storage("read binding", format!("blank login stored for chat {chat_id}")))?;
    Ok(UserBinding {
        chat_id,
        github_login,
    })
}

impl BindingStore for SqliteBindingStore {
    async fn upsert(&self, binding: UserBinding) -> Result<(), BindingError> {
        let chat_id = binding.chat_id;
        let login = String::from(binding.github_login);
        self.with_writer("upsert binding", move |conn| {
            conn.execute(
                "INSERT INTO user_bindings (chat_id, github_login)
                 VALUES (?1, ?2)
                 ON CONFLICT (chat_id) DO UPDATE SET github_login = excluded.github_login",
                params![chat_id, login],
            )
        })
        .await?;
        debug!(chat_id, "Binding upserted");
        Ok(())
    }

    async fn get_by_chat(&self, chat_id: ChatId) -> Result<UserBinding, BindingError> {
        let login = self
            .with_reader("get binding by chat", move |conn| {
                conn.query_row(
                    "SELECT github_login FROM user_bindings WHERE chat_id = ?1",
                    params![chat_id],
                    |row| row.get::<_, String>(0),
                )
                .optional()
            })
            .await?;

        match login {
            Some(login) => row_to_binding(chat_id, login),
            None => Err(BindingError::NotFound(chat_id)),
        }
    }

    async fn get_by_login(&self, login: &str) -> Result<Vec<UserBinding>, BindingError> {
        let login = normalize_login(login);
        if login.is_empty() {
            return Ok(Vec::new());
        }

        let rows = self
            .with_reader("get bindings by login", move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT chat_id, github_login FROM user_bindings
                     WHERE github_login = ?1
                     ORDER BY chat_id",
                )?;
                let rows = stmt
                    .query_map(params![login], |row| {
                        Ok((row.get::<_, ChatId>(0)?, row.get::<_, String>(1)?))
                    })?
                    .collect::<rusqlite::Result<Vec<_>>>()?;
                Ok(rows)
            })
            .await?;

        rows.into_iter()
            .map(|(chat_id, login)| row_to_binding(chat_id, login))
            .collect()
    }
}
