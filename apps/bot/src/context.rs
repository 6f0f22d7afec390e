use tokio::sync::watch;
use tracing::{Span, info_span};

use crate::registry::Registry;

/// Everything the process shares: trackers, the stop signal and the root
/// span their tasks log under.
pub struct AppContext {
    registry: Registry,
    shutdown: watch::Sender<bool>,
    span: Span,
}

impl AppContext {
    pub fn new() -> Self {
        let (shutdown, rx) = watch::channel(false);
        let span = info_span!("ticker_bot");

        Self {
            registry: Registry::new(rx, span.clone()),
            shutdown,
            span,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn span(&self) -> &Span {
        &self.span
    }

    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown.borrow()
    }

    /// Ask every tracker to stop at the top of its next tick.
    pub fn shutdown(&self) {
        self.shutdown.send_replace(true);
    }

    pub async fn shutdown_and_join(&self) {
        self.shutdown();
        self.registry.join().await;
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}
