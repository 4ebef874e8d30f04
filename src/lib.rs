//! Forest Guardian Bear: an eco-themed chat companion wrapped around a
//! generative text model.

pub mod bot;
pub mod cli;
pub mod config;
pub mod error;
pub mod gateway;
pub mod lang;
pub mod metrics;
pub mod personality;
pub mod sessions;
pub mod template;
pub mod vendors;

pub use bot::{BotReply, ForestBot, ReplyKind};
pub use config::Config;
pub use error::{BotError, Result};
pub use lang::Lang;
