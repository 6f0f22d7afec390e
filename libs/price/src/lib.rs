mod alpaca;
mod client;
mod coingecko;
mod error;
mod snapshot;
mod source;
mod symbol;

#[cfg(test)]
mod test_server;

pub use alpaca::{ALPACA_DATA_URL, AlpacaClient, AlpacaConfig};
pub use client::PriceClient;
pub use coingecko::{COINGECKO_API_URL, CoinGeckoClient};
pub use error::PriceError;
pub use snapshot::PriceSnapshot;
pub use source::PriceSource;
pub use symbol::{Symbol, SymbolKind};
