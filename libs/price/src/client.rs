use async_trait::async_trait;

use crate::{
    AlpacaClient, AlpacaConfig, CoinGeckoClient, PriceError, PriceSnapshot, PriceSource, Symbol,
    SymbolKind,
};

/// Routes each symbol to the upstream that prices its kind.
#[derive(Clone)]
pub struct PriceClient {
    crypto: CoinGeckoClient,
    stock: Option<AlpacaClient>,
}

impl PriceClient {
    pub fn new(coingecko_api: &str, alpaca: Option<&AlpacaConfig>) -> Result<Self, PriceError> {
        let crypto = CoinGeckoClient::new(coingecko_api)?;
        let stock = alpaca.map(AlpacaClient::new).transpose()?;
        Ok(Self { crypto, stock })
    }
}

#[async_trait]
impl PriceSource for PriceClient {
    async fn fetch(&self, symbol: &Symbol) -> Result<PriceSnapshot, PriceError> {
        match symbol.kind() {
            SymbolKind::Crypto => self.crypto.fetch(symbol).await,
            SymbolKind::Stock => match &self.stock {
                Some(stock) => stock.fetch(symbol).await,
                None => Err(PriceError::StockSourceMissing),
            },
        }
    }
}
