//! Telegram side of the notifier: outbound delivery and the `/start`,
//! `/setgithub` and `/me` commands.

use teloxide::requests::{Requester, ResponseResult};
use teloxide::types::{ChatId, Message};
use teloxide::{Bot, RequestError};
use tracing::{debug, error};
use trogon_bindings::{BindingError, BindingStore, ChatId as BindingChatId, get_login, normalize_login, set_login};

use crate::sender::OutboundSender;

const HELP_TEXT: &str = "Hi! I forward GitHub pull-request notifications.\n\
Commands:\n\
/setgithub <login> - bind your GitHub login to this chat\n\
/me - show the bound GitHub login";
const SET_USAGE_TEXT: &str = "Usage: /setgithub <github_login>";
const LOGIN_REQUIRED_TEXT: &str = "A GitHub login is required. Usage: /setgithub <github_login>";
const NOT_BOUND_TEXT: &str = "No GitHub login bound yet. Use /setgithub <login>.";
const STORAGE_FAILURE_TEXT: &str = "Something went wrong, please try again later.";

/// [`OutboundSender`] backed by the Telegram Bot API. One attempt per message.
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl OutboundSender for TelegramSender {
    type Error = RequestError;

    async fn send_message(&self, chat_id: BindingChatId, text: &str) -> Result<(), Self::Error> {
        self.bot.send_message(ChatId(chat_id), text.to_string()).await?;
        debug!(chat_id, "Telegram message sent");
        Ok(())
    }
}

/// Bot commands understood in a chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    /// `/setgithub` with exactly one argument.
    SetGithub(String),
    /// `/setgithub` with no or too many arguments.
    SetGithubUsage,
    Me,
}

impl Command {
    /// Parses a message text. `None` for anything that is not a known command.
    ///
    /// Accepts the `/command@bot_name` form Telegram uses in groups.
    pub fn parse(text: &str) -> Option<Self> {
        let mut parts = text.split_whitespace();
        let head = parts.next()?;
        let name = head.split('@').next().unwrap_or(head);
        let args: Vec<&str> = parts.collect();

        match name {
            "/start" | "/help" => Some(Self::Start),
            "/setgithub" => match args.as_slice() {
                [login] => Some(Self::SetGithub((*login).to_string())),
                _ => Some(Self::SetGithubUsage),
            },
            "/me" => Some(Self::Me),
            _ => None,
        }
    }
}

/// Runs `command` for `chat_id` against the binding store and returns the reply text.
pub async fn reply_for<S: BindingStore>(store: &S, chat_id: BindingChatId, command: Command) -> String {
    match command {
        Command::Start => HELP_TEXT.to_string(),
        Command::SetGithubUsage => SET_USAGE_TEXT.to_string(),
        Command::SetGithub(login) => match set_login(store, chat_id, &login).await {
            Ok(()) => format!(
                "Saved. Pull-request notifications for {} will arrive here.",
                normalize_login(&login)
            ),
            Err(BindingError::InvalidLogin) => LOGIN_REQUIRED_TEXT.to_string(),
            Err(e) => {
                error!(chat_id, error = %e, "Failed to bind GitHub login");
                STORAGE_FAILURE_TEXT.to_string()
            }
        },
        Command::Me => match get_login(store, chat_id).await {
            Ok(login) => format!("Your GitHub login: {login}"),
            Err(BindingError::NotFound(_)) => NOT_BOUND_TEXT.to_string(),
            Err(e) => {
                error!(chat_id, error = %e, "Failed to read GitHub login");
                STORAGE_FAILURE_TEXT.to_string()
            }
        },
    }
}

/// teloxide endpoint for text messages. Non-command text is ignored.
pub async fn handle_message<S: BindingStore>(bot: Bot, msg: Message, store: S) -> ResponseResult<()> {
    let Some(command) = msg.text().and_then(Command::parse) else {
        return Ok(());
    };

    debug!(chat_id = msg.chat.id.0, ?command, "Received command");
    let reply = reply_for(&store, msg.chat.id.0, command).await;
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}
