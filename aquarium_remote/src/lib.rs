//! Outbound integrations: the GitHub contents API used for status
//! publishing and the Telegram Bot API used by the chat bot.
#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod error;
pub mod github;
pub mod telegram;

pub use error::RemoteError;
pub use github::{GithubConfig, GithubStore, UpsertPayload, contents_url};
pub use telegram::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, TelegramClient,
    Update,
};
