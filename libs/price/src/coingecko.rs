use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::{PriceError, PriceSnapshot, PriceSource, Symbol};

pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3/coins";

#[derive(Clone)]
pub struct CoinGeckoClient {
    client: Client,
    base_api: String,
}

impl CoinGeckoClient {
    pub fn new(base_api: impl Into<String>) -> Result<Self, PriceError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_api: base_api.into(),
        })
    }

    pub fn url_for(&self, slug: &str) -> String {
        format!("{}/{}", self.base_api.trim_end_matches('/'), slug)
    }

    pub async fn fetch_coin(&self, slug: &str) -> Result<Coin, PriceError> {
        let url = self.url_for(slug);
        debug!(%url, "requesting coin");

        let res = self.client.get(url).send().await?;
        if res.status() == StatusCode::NOT_FOUND {
            return Err(PriceError::NotFound(slug.to_string()));
        }

        let body = res.error_for_status()?.bytes().await?;
        Coin::decode(&body)
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch(&self, symbol: &Symbol) -> Result<PriceSnapshot, PriceError> {
        let coin = self.fetch_coin(symbol.id()).await?;
        Ok(coin.snapshot())
    }
}

//
// Match CoinGecko /coins/{id} JSON
// https://docs.coingecko.com/reference/coins-id
//
#[derive(Debug, Deserialize, Clone)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub market_data: MarketData,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MarketData {
    pub current_price: CurrentPrice,

    #[serde(default)]
    pub price_change_24h: Option<Decimal>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CurrentPrice {
    pub usd: Decimal,
}

impl Coin {
    pub fn decode(body: &[u8]) -> Result<Self, PriceError> {
        Ok(serde_json::from_slice(body)?)
    }

    pub fn snapshot(&self) -> PriceSnapshot {
        PriceSnapshot::new(
            self.market_data.current_price.usd,
            self.market_data.price_change_24h.unwrap_or_default(),
        )
    }
}
