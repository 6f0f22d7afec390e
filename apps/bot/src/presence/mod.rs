mod discord;

use async_trait::async_trait;
use thiserror::Error;

use crate::display::RoleColor;

pub use discord::DiscordPublisher;

#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("discord error: {0}")]
    Discord(#[from] serenity::Error),

    #[error("gateway session is not ready")]
    NotReady,

    #[error("gateway client stopped")]
    Disconnected,

    #[error("no managed bot role in guild {0}")]
    RoleNotFound(u64),
}

/// The bot's visible identity in every guild it has joined.
#[async_trait]
pub trait PresencePublisher: Send + Sync {
    /// Resolves once updates can be delivered.
    async fn ready(&self) -> Result<(), PlatformError> {
        Ok(())
    }

    async fn set_nickname(&self, text: &str) -> Result<(), PlatformError>;

    async fn set_color(&self, color: RoleColor) -> Result<(), PlatformError>;

    async fn set_activity(&self, text: &str) -> Result<(), PlatformError>;
}
