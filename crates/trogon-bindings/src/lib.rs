//! Bindings between Telegram chats and GitHub logins.
//!
//! A chat binds itself to exactly one GitHub login; many chats may share the
//! same login. Stores keep two views of the data (by chat, by login) and keep
//! them consistent on every upsert.
//!
//! # Quick Start
//!
//! ```rust
//! use trogon_bindings::{BindingStore, MemoryBindingStore, get_login, set_login};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryBindingStore::new();
//!
//! set_login(&store, 42, "  Octocat ").await.unwrap();
//!
//! assert_eq!(get_login(&store, 42).await.unwrap(), "octocat");
//! assert_eq!(store.get_by_login("OCTOCAT").await.unwrap().len(), 1);
//! # }
//! ```
//!
//! # Backends
//!
//! | Backend | Durability | Use |
//! |---------|------------|-----|
//! | [`MemoryBindingStore`] | process lifetime | tests, local runs |
//! | [`SqliteBindingStore`] | SQLite file | production |
//! | [`Backend`] | either | selected at startup |

pub mod accounts;
pub mod backends;
pub mod binding;
pub mod error;
pub mod store;

pub use accounts::{get_login, set_login};
pub use backends::Backend;
pub use backends::memory::MemoryBindingStore;
pub use backends::sqlite::SqliteBindingStore;
pub use binding::{ChatId, GithubLogin, UserBinding, normalize_login};
pub use error::BindingError;
pub use store::BindingStore;
