pub mod bootstrap;
pub mod config;
pub mod context;
pub mod display;
pub mod presence;
pub mod registry;
pub mod tracker;

#[cfg(test)]
pub(crate) mod testkit;

pub use config::{Config, ConfigError, DisplayConfig};
pub use context::AppContext;
pub use presence::{DiscordPublisher, PlatformError, PresencePublisher};
pub use registry::{Registry, RegistryError};
pub use tracker::{TickOutcome, Tracker, TrackerState};
