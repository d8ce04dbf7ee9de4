//! Polls the homework review API and relays status changes to a Telegram chat.

pub mod config;
pub mod error;
pub mod homework;
pub mod poller;
pub mod practicum;
pub mod telegram;

pub use error::{BotError, Result};
