use std::sync::Arc;

use anyhow::{Context, Result};
use price::{PriceClient, PriceSource};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::{
    config::Config,
    context::AppContext,
    presence::{DiscordPublisher, PresencePublisher},
    tracker::Tracker,
};

/// `RUST_LOG` wins; otherwise `info`.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn initial_tracker(
    config: &Config,
    source: Arc<dyn PriceSource>,
    publisher: Arc<dyn PresencePublisher>,
) -> Tracker {
    Tracker::new(
        config.symbol(),
        Some(config.display_name()),
        config.display,
        source,
        publisher,
    )
}

/// Connect to the price API and Discord, then register the configured
/// tracker. Fails if the gateway session never comes up, e.g. on a rejected
/// token.
pub async fn start(ctx: &AppContext, config: &Config) -> Result<Arc<Tracker>> {
    let source = Arc::new(PriceClient::new(
        &config.coingecko_api,
        config.alpaca.as_ref(),
    )?);
    let publisher = Arc::new(DiscordPublisher::connect(&config.discord_token).await?);

    register(ctx, config, source, publisher).await
}

/// Register the configured tracker once `publisher` is ready.
pub async fn register(
    ctx: &AppContext,
    config: &Config,
    source: Arc<dyn PriceSource>,
    publisher: Arc<dyn PresencePublisher>,
) -> Result<Arc<Tracker>> {
    publisher
        .ready()
        .await
        .context("presence platform did not become ready")?;

    let tracker = initial_tracker(config, source, publisher);
    info!(
        parent: ctx.span(),
        symbol = %tracker.symbol(),
        name = tracker.display_name(),
        "starting tracker"
    );

    Ok(ctx.registry().add(&config.ticker, tracker))
}
