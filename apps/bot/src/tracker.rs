use std::{sync::Arc, time::Duration};

use price::{PriceSnapshot, PriceSource, Symbol};
use tokio::{
    sync::watch,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, error, info, warn};

use crate::{
    config::{DEFAULT_FREQUENCY, DisplayConfig},
    display::{Direction, Label, RoleColor},
    presence::PresencePublisher,
};

/// How long the flash color stays up before the direction color replaces it.
pub const FLASH_HOLD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Published(Direction),
    Skipped,
}

/// State owned by a running loop; nothing else touches it.
#[derive(Debug, Default)]
pub struct TrackerState {
    pub last: Option<PriceSnapshot>,
}

#[derive(Debug, Clone, Copy)]
struct Changes {
    price: bool,
    direction: bool,
}

pub struct Tracker {
    symbol: Symbol,
    display_name: String,
    config: DisplayConfig,
    source: Arc<dyn PriceSource>,
    publisher: Arc<dyn PresencePublisher>,
}

impl Tracker {
    pub fn new(
        symbol: Symbol,
        display_name: Option<String>,
        config: DisplayConfig,
        source: Arc<dyn PriceSource>,
        publisher: Arc<dyn PresencePublisher>,
    ) -> Self {
        let display_name = display_name.unwrap_or_else(|| symbol.ticker().to_string());

        let mut config = config;
        if config.frequency.is_zero() {
            warn!(symbol = %symbol, "zero poll frequency, using default");
            config.frequency = DEFAULT_FREQUENCY;
        }

        Self {
            symbol,
            display_name,
            config,
            source,
            publisher,
        }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Polls until `shutdown` flips to true or its sender goes away.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        tokio::select! {
            biased;
            _ = stopped(&mut shutdown) => {
                info!("stopped before platform was ready");
                return;
            }
            ready = self.publisher.ready() => {
                if let Err(e) = ready {
                    error!(error = %e, "presence platform unavailable, tracker not started");
                    return;
                }
            }
        }

        info!(
            frequency_secs = self.config.frequency.as_secs(),
            "tracker started"
        );

        let mut interval = time::interval(self.config.frequency);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut state = TrackerState::default();

        loop {
            tokio::select! {
                biased;
                _ = stopped(&mut shutdown) => break,
                _ = interval.tick() => {}
            }

            self.tick(&mut state).await;
        }

        info!("tracker stopped");
    }

    /// One poll-and-publish cycle. Failures end the cycle early and never
    /// propagate.
    pub async fn tick(&self, state: &mut TrackerState) -> TickOutcome {
        let snapshot = match self.source.fetch(&self.symbol).await {
            Ok(snapshot) => snapshot,
            Err(e) if e.is_transient() => {
                warn!(symbol = %self.symbol, error = %e, "price fetch failed, skipping tick");
                return TickOutcome::Skipped;
            }
            Err(e) => {
                error!(symbol = %self.symbol, error = %e, "price fetch failed, skipping tick");
                return TickOutcome::Skipped;
            }
        };

        let direction = Direction::of(snapshot.change);
        let previous = state.last.as_ref();
        let flipped =
            previous.is_some_and(|prev| direction.flipped_from(Direction::of(prev.change)));
        let changes = Changes {
            price: previous.is_none_or(|prev| prev.current != snapshot.current),
            direction: previous.is_none_or(|prev| Direction::of(prev.change) != direction),
        };

        debug!(
            symbol = %self.symbol,
            current = %snapshot.current,
            change = %snapshot.change,
            ?direction,
            flipped,
            "price fetched"
        );

        let label = Label::render(&self.display_name, &snapshot, self.config.show_nickname);
        self.publish(&label, direction, flipped, changes).await;

        state.last = Some(snapshot);
        TickOutcome::Published(direction)
    }

    /// Status is refreshed every tick. Nickname and color only go out when the
    /// price or direction they show has changed.
    async fn publish(
        &self,
        label: &Label,
        direction: Direction,
        flipped: bool,
        changes: Changes,
    ) {
        if let Err(e) = self.publisher.set_activity(&label.activity).await {
            warn!(error = %e, "activity update failed");
        }

        if self.config.show_color && changes.direction {
            if flipped && self.config.flash_on_change {
                self.flash().await;
            }
            if let Err(e) = self.publisher.set_color(direction.color()).await {
                warn!(error = %e, "color update failed");
            }
        }

        if self.config.show_nickname && changes.price {
            if let Err(e) = self.publisher.set_nickname(&label.nickname).await {
                warn!(error = %e, "nickname update failed");
            }
        }
    }

    async fn flash(&self) {
        match self.publisher.set_color(RoleColor::FLASH).await {
            Ok(()) => time::sleep(FLASH_HOLD).await,
            Err(e) => debug!(error = %e, "flash skipped"),
        }
    }
}

async fn stopped(shutdown: &mut watch::Receiver<bool>) {
    let _ = shutdown.wait_for(|stop| *stop).await;
}
