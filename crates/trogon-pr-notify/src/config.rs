use std::time::Duration;

use crate::env::ReadEnv;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_WEBHOOK_PATH: &str = "/api/v1/github/webhook";
const DEFAULT_NOTIFY_TIMEOUT_SECS: u64 = 10;

/// Configuration for the pull-request notifier.
///
/// Resolved from environment variables:
/// - `GITHUB_WEBHOOK_SECRET`: HMAC-SHA256 secret configured in GitHub. Unset or
///   empty means every webhook is rejected.
/// - `GITHUB_WEBHOOK_PORT`: HTTP listening port (default: 8080)
/// - `GITHUB_WEBHOOK_PATH`: route of the webhook endpoint (default: `/api/v1/github/webhook`)
/// - `TELEGRAM_BOT_TOKEN`: bot token from BotFather
/// - `BINDINGS_DB_PATH`: SQLite file for bindings (default: in-memory)
/// - `NOTIFY_TIMEOUT_SECS`: deadline for delivering one webhook's notifications (default: 10)
#[derive(Debug, Clone)]
pub struct NotifyConfig {
    pub webhook_secret: String,
    pub port: u16,
    pub webhook_path: String,
    pub telegram_bot_token: String,
    pub bindings_db_path: Option<String>,
    pub notify_timeout: Duration,
}

impl NotifyConfig {
    pub fn from_env<E: ReadEnv>(env: &E) -> Self {
        Self {
            webhook_secret: env.var("GITHUB_WEBHOOK_SECRET").unwrap_or_default(),
            port: env
                .var("GITHUB_WEBHOOK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            webhook_path: env
                .var("GITHUB_WEBHOOK_PATH")
                .ok()
                .filter(|p| p.starts_with('/'))
                .unwrap_or_else(|| DEFAULT_WEBHOOK_PATH.to_string()),
            telegram_bot_token: env.var("TELEGRAM_BOT_TOKEN").unwrap_or_default(),
            bindings_db_path: env
                .var("BINDINGS_DB_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty()),
            notify_timeout: Duration::from_secs(
                env.var("NOTIFY_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|secs| *secs > 0)
                    .unwrap_or(DEFAULT_NOTIFY_TIMEOUT_SECS),
            ),
        }
    }
}
