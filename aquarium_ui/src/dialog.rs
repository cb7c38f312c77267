//! Per-chat conversation state machine.
//!
//! Each chat starts in [`DialogState::Idle`]. Pressing a value button moves
//! it into an awaiting state; the next plain-text message is parsed for that
//! value. Any command or non-value button returns the chat to `Idle`.

use crate::keyboard::{Action, Keyboard};
use crate::render::status_text;
use aquarium_core::Aquarium;
use aquarium_core::config::limits;
use std::collections::HashMap;
use std::ops::RangeInclusive;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogState {
    #[default]
    Idle,
    AwaitingWaterTemp,
    AwaitingAirTemp,
    AwaitingLeak,
}

/// One inbound chat event, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Incoming {
    /// `/name`, lowercased, without the slash or a `@botname` suffix.
    Command(String),
    /// A callback payload. Unknown payloads are kept as raw strings.
    Button(String),
    Text(String),
}

impl Incoming {
    /// Classify a plain message body.
    pub fn from_message(text: &str) -> Self {
        let t = text.trim();
        match t.strip_prefix('/') {
            Some(rest) => {
                let name = rest.split_whitespace().next().unwrap_or_default();
                let name = name.split('@').next().unwrap_or_default();
                Self::Command(name.to_ascii_lowercase())
            }
            None => Self::Text(t.to_string()),
        }
    }
}

/// What to show the user in response to one event.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
    /// Replace the message the button was attached to instead of sending a new one.
    pub edit: bool,
}

impl Reply {
    fn send(text: impl Into<String>, keyboard: Option<Keyboard>) -> Self {
        Self {
            text: text.into(),
            keyboard,
            edit: false,
        }
    }

    fn edit(text: impl Into<String>, keyboard: Option<Keyboard>) -> Self {
        Self {
            text: text.into(),
            keyboard,
            edit: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Parsed<T> {
    Ok(T),
    NotANumber,
    OutOfRange,
}

fn parse_temp(text: &str, range: &RangeInclusive<f64>) -> Parsed<f64> {
    match text.trim().replace(',', ".").parse::<f64>() {
        Ok(v) if !v.is_finite() => Parsed::NotANumber,
        Ok(v) if range.contains(&v) => Parsed::Ok(v),
        Ok(_) => Parsed::OutOfRange,
        Err(_) => Parsed::NotANumber,
    }
}

fn parse_leak(text: &str) -> Parsed<bool> {
    match text.trim().parse::<i64>() {
        Ok(0) => Parsed::Ok(false),
        Ok(1) => Parsed::Ok(true),
        Ok(_) => Parsed::OutOfRange,
        Err(_) => Parsed::NotANumber,
    }
}

fn range_text(range: &RangeInclusive<f64>) -> String {
    format!("{}–{}°C", range.start(), range.end())
}

pub struct Conversations {
    aquarium: Aquarium,
    website_url: Option<String>,
    chats: HashMap<i64, DialogState>,
}

impl Conversations {
    pub fn new(aquarium: Aquarium, website_url: Option<String>) -> Self {
        Self {
            aquarium,
            website_url,
            chats: HashMap::new(),
        }
    }

    pub fn state(&self, chat_id: i64) -> DialogState {
        self.chats.get(&chat_id).copied().unwrap_or_default()
    }

    fn set_state(&mut self, chat_id: i64, state: DialogState) {
        if state == DialogState::Idle {
            self.chats.remove(&chat_id);
        } else {
            self.chats.insert(chat_id, state);
        }
    }

    fn main_keyboard(&self) -> Keyboard {
        Keyboard::main(self.website_url.as_deref())
    }

    pub fn handle(&mut self, chat_id: i64, incoming: Incoming) -> Reply {
        let before = self.state(chat_id);
        let (next, reply) = match incoming {
            Incoming::Command(name) => (DialogState::Idle, self.on_command(&name)),
            Incoming::Button(data) => self.on_button(&data),
            Incoming::Text(text) => self.on_text(before, &text),
        };
        if next != before {
            tracing::debug!(chat_id, from = ?before, to = ?next, "dialog transition");
        }
        self.set_state(chat_id, next);
        reply
    }

    fn on_command(&self, name: &str) -> Reply {
        match name {
            "start" => Reply::send("Welcome to the smart aquarium!", Some(self.main_keyboard())),
            "status" => Reply::send(status_text(&self.aquarium.status()), Some(self.main_keyboard())),
            "cancel" => Reply::send("Operation cancelled.", Some(self.main_keyboard())),
            "auto" => {
                self.aquarium.clear_manual_overrides();
                Reply::send(
                    "Manual values cleared, readings follow the simulation again.",
                    Some(self.main_keyboard()),
                )
            }
            _ => Reply::send(
                "Unknown command. Try /start, /status, /auto or /cancel.",
                Some(self.main_keyboard()),
            ),
        }
    }

    fn on_button(&self, data: &str) -> (DialogState, Reply) {
        let Ok(action) = data.parse::<Action>() else {
            tracing::warn!(data, "ignoring unknown button");
            return (DialogState::Idle, Reply::edit("Main menu:", Some(self.main_keyboard())));
        };
        match action {
            Action::TempWater => (
                DialogState::AwaitingWaterTemp,
                Reply::edit(
                    format!("Enter the water temperature ({}):", range_text(&limits::WATER_TEMP)),
                    None,
                ),
            ),
            Action::TempAir => (
                DialogState::AwaitingAirTemp,
                Reply::edit(
                    format!("Enter the air temperature ({}):", range_text(&limits::AIR_TEMP)),
                    None,
                ),
            ),
            Action::WaterLeak => (
                DialogState::AwaitingLeak,
                Reply::edit("Enter the leak state (0 or 1):", None),
            ),
            Action::Light => (
                DialogState::Idle,
                Reply::edit("Lighting control:", Some(Keyboard::light())),
            ),
            Action::LightOn | Action::LightOff => {
                let on = action == Action::LightOn;
                self.aquarium.set_light(on);
                let text = if on { "Lighting switched on" } else { "Lighting switched off" };
                (DialogState::Idle, Reply::edit(text, Some(Keyboard::light())))
            }
            Action::Status => (
                DialogState::Idle,
                Reply::edit(status_text(&self.aquarium.status()), Some(self.main_keyboard())),
            ),
            Action::Refresh => {
                self.aquarium.request_sync();
                let text = format!("🔄 Data refreshed\n\n{}", status_text(&self.aquarium.status()));
                (DialogState::Idle, Reply::edit(text, Some(self.main_keyboard())))
            }
            Action::Back => (
                DialogState::Idle,
                Reply::edit("Main menu:", Some(self.main_keyboard())),
            ),
        }
    }

    fn on_text(&self, state: DialogState, text: &str) -> (DialogState, Reply) {
        match state {
            DialogState::Idle => (
                DialogState::Idle,
                Reply::send("Use the menu below or /status.", Some(self.main_keyboard())),
            ),
            DialogState::AwaitingWaterTemp => self.on_temp(state, text, &limits::WATER_TEMP, "25.0"),
            DialogState::AwaitingAirTemp => self.on_temp(state, text, &limits::AIR_TEMP, "22.5"),
            DialogState::AwaitingLeak => match parse_leak(text) {
                Parsed::Ok(leak) => {
                    self.aquarium.set_manual_leak(leak);
                    let shown = if leak { "Yes" } else { "No" };
                    (
                        DialogState::Idle,
                        Reply::send(format!("Water leak set: {shown}"), Some(self.main_keyboard())),
                    )
                }
                Parsed::OutOfRange => (state, Reply::send("Enter 0 (no) or 1 (yes):", None)),
                Parsed::NotANumber => (state, Reply::send("Enter 0 or 1:", None)),
            },
        }
    }

    fn on_temp(
        &self,
        state: DialogState,
        text: &str,
        range: &RangeInclusive<f64>,
        example: &str,
    ) -> (DialogState, Reply) {
        let (label, result) = match parse_temp(text, range) {
            Parsed::NotANumber => {
                return (state, Reply::send(format!("Enter a number, for example {example}:"), None));
            }
            Parsed::OutOfRange => {
                return (
                    state,
                    Reply::send(format!("Temperature must be {}:", range_text(range)), None),
                );
            }
            Parsed::Ok(v) if state == DialogState::AwaitingWaterTemp => {
                ("Water", self.aquarium.set_manual_temp_water(v).map(|()| v))
            }
            Parsed::Ok(v) => ("Air", self.aquarium.set_manual_temp_air(v).map(|()| v)),
        };
        match result {
            Ok(v) => (
                DialogState::Idle,
                Reply::send(
                    format!("{label} temperature set to {v}°C"),
                    Some(self.main_keyboard()),
                ),
            ),
            Err(e) => (state, Reply::send(format!("{e}. Try again:"), None)),
        }
    }
}
