//! chorus: a pool of chat accounts replying in one shared channel.

pub mod channel;
pub mod config;
pub mod console;
pub mod dispatch;
pub mod error;
pub mod llm;
pub mod sanitize;
