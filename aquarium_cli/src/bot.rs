//! Telegram long-polling thread that drives the dialog state machine.

use aquarium_core::Aquarium;
use aquarium_remote::{InlineKeyboardButton, InlineKeyboardMarkup, TelegramClient, Update};
use aquarium_ui::{Button, Conversations, Incoming, Keyboard, Reply};
use crossbeam_channel as xch;
use std::time::Duration;

pub fn markup(kb: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup {
        inline_keyboard: kb
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|b| match b {
                        Button::Callback { label, action } => {
                            InlineKeyboardButton::callback(label.as_str(), action.as_str())
                        }
                        Button::Link { label, url } => {
                            InlineKeyboardButton::link(label.as_str(), url.as_str())
                        }
                    })
                    .collect()
            })
            .collect(),
    }
}

#[derive(Debug, Clone)]
pub struct BotSettings {
    pub api_base: String,
    pub token: String,
    pub website_url: Option<String>,
    pub poll_timeout: Duration,
    pub retry_backoff: Duration,
}

pub struct BotRunner {
    shutdown: Option<xch::Sender<()>>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl BotRunner {
    pub fn spawn(aquarium: Aquarium, settings: BotSettings) -> Self {
        let (shutdown_tx, shutdown_rx) = xch::bounded::<()>(0);
        let join_handle = std::thread::Builder::new()
            .name("aquarium-bot".into())
            .spawn(move || poll_loop(aquarium, &settings, &shutdown_rx));
        let join_handle = match join_handle {
            Ok(h) => Some(h),
            Err(e) => {
                tracing::error!(error = %e, "failed to spawn bot thread");
                None
            }
        };
        Self {
            shutdown: Some(shutdown_tx),
            join_handle,
        }
    }
}

impl Drop for BotRunner {
    fn drop(&mut self) {
        // Returns after the in-flight long poll completes.
        drop(self.shutdown.take());
        if let Some(h) = self.join_handle.take() {
            let _ = h.join();
        }
    }
}

fn poll_loop(aquarium: Aquarium, settings: &BotSettings, shutdown: &xch::Receiver<()>) {
    let client = TelegramClient::new(&*settings.api_base, &*settings.token, settings.poll_timeout);
    let mut dialogs = Conversations::new(aquarium, settings.website_url.clone());
    let mut offset: Option<i64> = None;
    tracing::info!("chat bot polling started");

    loop {
        if !matches!(shutdown.try_recv(), Err(xch::TryRecvError::Empty)) {
            break;
        }
        match client.get_updates(offset, settings.poll_timeout) {
            Ok(updates) => {
                for update in updates {
                    offset = Some(update.update_id + 1);
                    dispatch(&client, &mut dialogs, update);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, backoff_ms = settings.retry_backoff.as_millis() as u64, "bot poll failed");
                if !matches!(
                    shutdown.recv_timeout(settings.retry_backoff),
                    Err(xch::RecvTimeoutError::Timeout)
                ) {
                    break;
                }
            }
        }
    }
    tracing::trace!("Bot thread exiting cleanly");
}

fn dispatch(client: &TelegramClient, dialogs: &mut Conversations, update: Update) {
    if let Some(cb) = update.callback_query {
        if let Err(e) = client.answer_callback_query(&cb.id) {
            tracing::debug!(error = %e, "answerCallbackQuery failed");
        }
        let (Some(msg), Some(data)) = (cb.message, cb.data) else {
            return;
        };
        let chat_id = msg.chat.id;
        tracing::debug!(chat_id, data = %data, "button pressed");
        let reply = dialogs.handle(chat_id, Incoming::Button(data));
        send(client, chat_id, Some(msg.message_id), &reply);
        return;
    }
    if let Some(msg) = update.message {
        let Some(text) = msg.text else { return };
        let chat_id = msg.chat.id;
        tracing::debug!(chat_id, "message received");
        let reply = dialogs.handle(chat_id, Incoming::from_message(&text));
        send(client, chat_id, None, &reply);
    }
}

fn send(client: &TelegramClient, chat_id: i64, message_id: Option<i64>, reply: &Reply) {
    let kb = reply.keyboard.as_ref().map(markup);
    let result = match message_id.filter(|_| reply.edit) {
        Some(id) => client.edit_message_text(chat_id, id, &reply.text, kb.as_ref()),
        None => client.send_message(chat_id, &reply.text, kb.as_ref()),
    };
    if let Err(e) = result {
        tracing::warn!(chat_id, error = %e, "bot reply failed");
    }
}
