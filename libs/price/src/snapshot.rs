use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// One poll result. Trackers keep only the latest one.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSnapshot {
    pub current: Decimal,
    pub change: Decimal,
    pub fetched_at: DateTime<Utc>,
}

impl PriceSnapshot {
    pub fn new(current: Decimal, change: Decimal) -> Self {
        Self {
            current,
            change,
            fetched_at: Utc::now(),
        }
    }
}
