//! # trogon-pr-notify
//!
//! Relays GitHub pull-request webhooks to the Telegram chats bound to the
//! affected GitHub user.
//!
//! ## How it works
//!
//! 1. GitHub sends `POST /api/v1/github/webhook` with `X-Hub-Signature-256`,
//!    `X-GitHub-Event` and `X-GitHub-Delivery` headers plus a JSON payload.
//! 2. The server validates the HMAC-SHA256 signature against
//!    `GITHUB_WEBHOOK_SECRET` before reading the body as JSON.
//! 3. The event router turns `pull_request` (assigned), `pull_request_review`
//!    (submitted) and `pull_request_review_comment` (created) events into a
//!    notification for one GitHub login. Everything else is acknowledged and
//!    dropped.
//! 4. The notifier looks up every chat bound to that login and sends each one
//!    the message, carrying on past individual failures.
//!
//! Chats bind themselves with `/setgithub <login>` and check with `/me`.
//!
//! ## HTTP responses
//!
//! | Outcome | Status |
//! |---|---|
//! | bad, missing or unverifiable signature | `401` |
//! | malformed JSON for a pull-request event | `400` |
//! | anything else, including failed deliveries | `200` |
//!
//! ## Configuration (env vars)
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `GITHUB_WEBHOOK_SECRET` | unset | HMAC-SHA256 secret (unset rejects every webhook) |
//! | `GITHUB_WEBHOOK_PORT` | `8080` | HTTP listening port |
//! | `GITHUB_WEBHOOK_PATH` | `/api/v1/github/webhook` | Webhook route |
//! | `TELEGRAM_BOT_TOKEN` | unset | Bot token (required) |
//! | `BINDINGS_DB_PATH` | unset | SQLite file for bindings (unset keeps them in memory) |
//! | `NOTIFY_TIMEOUT_SECS` | `10` | Delivery deadline per webhook |

pub mod config;
pub mod env;
pub mod events;
#[cfg(test)]
pub mod mocks;
pub mod notifier;
pub mod sender;
pub mod server;
pub mod signature;
pub mod telegram;
pub mod text;

pub use config::NotifyConfig;
pub use events::{NotificationIntent, RouteError, route};
pub use notifier::{DeliveryFailure, DispatchError, DispatchReport, Notifier};
pub use sender::OutboundSender;
pub use server::{AppState, router, serve};
pub use signature::SignatureError;
pub use telegram::TelegramSender;
