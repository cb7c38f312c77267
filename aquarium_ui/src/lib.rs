//! Chat-bot front end for the aquarium: a per-chat conversation state
//! machine, status rendering and transport-agnostic keyboards.
//!
//! Nothing here talks to the network. The binary feeds [`Incoming`] events
//! into [`Conversations::handle`] and maps the returned [`Reply`] onto
//! whatever chat transport it runs.
#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod dialog;
pub mod keyboard;
pub mod render;

pub use dialog::{Conversations, DialogState, Incoming, Reply};
pub use keyboard::{Action, Button, Keyboard};
pub use render::status_text;
