use anyhow::{Context, Result, bail};
use teloxide::dispatching::{Dispatcher, UpdateFilterExt};
use teloxide::dptree;
use teloxide::types::Update;
use teloxide::Bot;
use tracing::{error, info};
use trogon_bindings::Backend;
use trogon_pr_notify::env::SystemEnv;
use trogon_pr_notify::telegram::handle_message;
use trogon_pr_notify::{NotifyConfig, TelegramSender, serve};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = NotifyConfig::from_env(&SystemEnv);
    if config.telegram_bot_token.is_empty() {
        bail!("TELEGRAM_BOT_TOKEN is not set");
    }

    let store = Backend::from_path(config.bindings_db_path.as_deref())
        .context("Failed to open binding store")?;
    info!(backend = store.kind(), "Binding store ready");

    let bot = Bot::new(&config.telegram_bot_token);
    let sender = TelegramSender::new(bot.clone());

    let handler = Update::filter_message().endpoint(handle_message::<Backend>);
    let mut commands = Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![store.clone()])
        .enable_ctrlc_handler()
        .build();

    info!("Starting Telegram command dispatcher and webhook server");
    tokio::select! {
        result = serve(&config, store, sender) => {
            if let Err(e) = result {
                error!(error = %e, "Webhook server failed");
                return Err(anyhow::anyhow!(e));
            }
        }
        () = commands.dispatch() => {
            info!("Telegram dispatcher stopped");
        }
    }

    Ok(())
}
