use std::{collections::HashMap, sync::Arc};

use parking_lot::RwLock;
use thiserror::Error;
use tokio::{sync::watch, task::JoinHandle};
use tracing::{Span, error, info, info_span, warn};
use tracing_futures::Instrument;

use crate::tracker::Tracker;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("no tracker registered for `{0}`")]
    NotFound(String),
}

struct Entry {
    tracker: Arc<Tracker>,
    task: Option<JoinHandle<()>>,
}

/// Running trackers keyed by ticker. Each entry owns the task polling for it.
pub struct Registry {
    entries: RwLock<HashMap<String, Entry>>,
    shutdown: watch::Receiver<bool>,
    span: Span,
}

impl Registry {
    pub fn new(shutdown: watch::Receiver<bool>, span: Span) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            shutdown,
            span,
        }
    }

    fn normalize(ticker: &str) -> String {
        ticker.trim().to_uppercase()
    }

    /// Start `tracker` and store it under `ticker`.
    /// A tracker already stored under the same key is stopped and replaced.
    pub fn add(&self, ticker: &str, tracker: Tracker) -> Arc<Tracker> {
        let key = Self::normalize(ticker);
        let tracker = Arc::new(tracker);

        let span = info_span!(parent: &self.span, "tracker", ticker = %key, symbol = %tracker.symbol());
        let task = tokio::spawn(
            Arc::clone(&tracker)
                .run(self.shutdown.clone())
                .instrument(span),
        );

        let replaced = self.entries.write().insert(
            key.clone(),
            Entry {
                tracker: Arc::clone(&tracker),
                task: Some(task),
            },
        );

        match replaced {
            Some(old) => {
                warn!(ticker = %key, "replaced existing tracker");
                if let Some(task) = old.task {
                    task.abort();
                }
            }
            None => info!(ticker = %key, "tracker registered"),
        }

        tracker
    }

    pub fn get(&self, ticker: &str) -> Result<Arc<Tracker>, RegistryError> {
        let key = Self::normalize(ticker);
        self.entries
            .read()
            .get(&key)
            .map(|entry| Arc::clone(&entry.tracker))
            .ok_or(RegistryError::NotFound(key))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn tickers(&self) -> Vec<String> {
        let mut tickers: Vec<String> = self.entries.read().keys().cloned().collect();
        tickers.sort();
        tickers
    }

    /// Wait for every tracker task to finish. Only returns once shutdown has
    /// been signalled.
    pub async fn join(&self) {
        let tasks: Vec<(String, JoinHandle<()>)> = self
            .entries
            .write()
            .iter_mut()
            .filter_map(|(key, entry)| entry.task.take().map(|task| (key.clone(), task)))
            .collect();

        for (ticker, task) in tasks {
            if let Err(e) = task.await
                && !e.is_cancelled()
            {
                error!(%ticker, error = %e, "tracker task failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::{
        config::DisplayConfig,
        testkit::{self, RecordingPublisher, ScriptedSource},
    };

    fn tracker() -> Tracker {
        let source = Arc::new(ScriptedSource::new().push_price(dec!(1), dec!(0)));
        testkit::tracker(
            source,
            Arc::new(RecordingPublisher::default()),
            DisplayConfig::default(),
        )
    }

    fn registry() -> (Registry, watch::Sender<bool>) {
        let (tx, rx) = watch::channel(false);
        (Registry::new(rx, Span::none()), tx)
    }

    #[tokio::test(start_paused = true)]
    async fn same_ticker_keeps_one_entry() {
        let (registry, tx) = registry();

        let first = registry.add("AAPL", tracker());
        let second = registry.add(" aapl ", tracker());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.tickers(), vec!["AAPL".to_string()]);
        assert!(Arc::ptr_eq(&registry.get("AAPL").unwrap(), &second));

        for _ in 0..10 {
            if Arc::strong_count(&first) == 1 {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(Arc::strong_count(&first), 1);

        tx.send(true).unwrap();
        registry.join().await;
    }

    #[tokio::test(start_paused = true)]
    async fn distinct_tickers_coexist() {
        let (registry, tx) = registry();

        registry.add("msft", tracker());
        registry.add("AAPL", tracker());

        assert_eq!(registry.tickers(), vec!["AAPL", "MSFT"]);
        assert!(registry.get("Msft").is_ok());

        tx.send(true).unwrap();
        registry.join().await;
    }

    #[tokio::test]
    async fn unknown_ticker_is_not_found() {
        let (registry, _tx) = registry();

        assert!(registry.is_empty());
        assert_eq!(
            registry.get("tsla").err(),
            Some(RegistryError::NotFound("TSLA".to_string()))
        );
    }
}
