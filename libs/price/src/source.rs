use async_trait::async_trait;

use crate::{PriceError, PriceSnapshot, Symbol};

#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, symbol: &Symbol) -> Result<PriceSnapshot, PriceError>;
}
