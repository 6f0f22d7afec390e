use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use parking_lot::Mutex;
use price::{PriceError, PriceSnapshot, PriceSource, Symbol};
use rust_decimal::Decimal;
use tokio::time::Instant;

use crate::{
    config::DisplayConfig,
    display::RoleColor,
    presence::{PlatformError, PresencePublisher},
    tracker::Tracker,
};

enum Step {
    Price(Decimal, Decimal),
    NotFound(String),
    Network,
}

/// Replays queued results, then repeats the last successful snapshot.
#[derive(Default)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Step>>,
    fallback: Mutex<Option<(Decimal, Decimal)>>,
    pub fetched_at: Mutex<Vec<Instant>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_price(self, current: Decimal, change: Decimal) -> Self {
        self.script.lock().push_back(Step::Price(current, change));
        self
    }

    pub fn push_not_found(self, id: &str) -> Self {
        self.script.lock().push_back(Step::NotFound(id.to_string()));
        self
    }

    pub fn push_network_error(self) -> Self {
        self.script.lock().push_back(Step::Network);
        self
    }

    pub fn fetch_count(&self) -> usize {
        self.fetched_at.lock().len()
    }
}

#[async_trait]
impl PriceSource for ScriptedSource {
    async fn fetch(&self, _symbol: &Symbol) -> Result<PriceSnapshot, PriceError> {
        self.fetched_at.lock().push(Instant::now());

        let next = self.script.lock().pop_front();
        match next {
            Some(Step::Price(current, change)) => {
                *self.fallback.lock() = Some((current, change));
                Ok(PriceSnapshot::new(current, change))
            }
            Some(Step::NotFound(id)) => Err(PriceError::NotFound(id)),
            Some(Step::Network) => Err(network_error()),
            None => match *self.fallback.lock() {
                Some((current, change)) => Ok(PriceSnapshot::new(current, change)),
                None => Err(PriceError::NotFound("unscripted".to_string())),
            },
        }
    }
}

/// A transport-level reqwest error, built without touching the network.
fn network_error() -> PriceError {
    let err = reqwest::Client::new()
        .get("not a url")
        .build()
        .expect_err("relative url is rejected");
    PriceError::Network(err)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Nickname(String),
    Color(RoleColor),
    Activity(String),
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub calls: Mutex<Vec<Call>>,
    pub fail: bool,
    pub disconnected: bool,
}

impl RecordingPublisher {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn never_ready() -> Self {
        Self {
            disconnected: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn colors(&self) -> Vec<RoleColor> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Color(color) => Some(color),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) -> Result<(), PlatformError> {
        self.calls.lock().push(call);
        if self.fail {
            Err(PlatformError::NotReady)
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl PresencePublisher for RecordingPublisher {
    async fn ready(&self) -> Result<(), PlatformError> {
        if self.disconnected {
            Err(PlatformError::Disconnected)
        } else {
            Ok(())
        }
    }

    async fn set_nickname(&self, text: &str) -> Result<(), PlatformError> {
        self.record(Call::Nickname(text.to_string()))
    }

    async fn set_color(&self, color: RoleColor) -> Result<(), PlatformError> {
        self.record(Call::Color(color))
    }

    async fn set_activity(&self, text: &str) -> Result<(), PlatformError> {
        self.record(Call::Activity(text.to_string()))
    }
}

pub fn tracker(
    source: Arc<ScriptedSource>,
    publisher: Arc<RecordingPublisher>,
    config: DisplayConfig,
) -> Tracker {
    Tracker::new(Symbol::stock("AAPL"), None, config, source, publisher)
}
