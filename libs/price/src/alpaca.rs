use async_trait::async_trait;
use reqwest::{
    Client, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::{PriceError, PriceSnapshot, PriceSource, Symbol};

pub const ALPACA_DATA_URL: &str = "https://data.alpaca.markets";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlpacaConfig {
    pub base_api: String,
    pub key_id: String,
    pub secret: String,
}

impl AlpacaConfig {
    pub fn new(key_id: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_api: ALPACA_DATA_URL.to_string(),
            key_id: key_id.into(),
            secret: secret.into(),
        }
    }

    pub fn with_base_api(mut self, base_api: impl Into<String>) -> Self {
        self.base_api = base_api.into();
        self
    }
}

#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    base_api: String,
}

impl AlpacaClient {
    pub fn new(config: &AlpacaConfig) -> Result<Self, PriceError> {
        let mut headers = HeaderMap::new();
        headers.insert("APCA-API-KEY-ID", HeaderValue::from_str(&config.key_id)?);
        headers.insert("APCA-API-SECRET-KEY", HeaderValue::from_str(&config.secret)?);
        headers.insert("Accept", HeaderValue::from_static("application/json"));

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_api: config.base_api.clone(),
        })
    }

    pub async fn fetch_snapshot(&self, symbol: &str) -> Result<Snapshot, PriceError> {
        let url = format!(
            "{}/v2/stocks/{}/snapshot",
            self.base_api.trim_end_matches('/'),
            symbol
        );
        debug!(%url, "requesting stock snapshot");

        let res = self.client.get(url).query(&[("feed", "iex")]).send().await?;
        if matches!(
            res.status(),
            StatusCode::NOT_FOUND | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            return Err(PriceError::NotFound(symbol.to_string()));
        }

        let body = res.error_for_status()?.bytes().await?;
        Snapshot::decode(&body)
    }
}

#[async_trait]
impl PriceSource for AlpacaClient {
    async fn fetch(&self, symbol: &Symbol) -> Result<PriceSnapshot, PriceError> {
        let snapshot = self.fetch_snapshot(symbol.id()).await?;
        snapshot
            .to_price()
            .ok_or_else(|| PriceError::NotFound(symbol.ticker().to_string()))
    }
}

//
// Match Alpaca API JSON
// https://docs.alpaca.markets/reference/stocksnapshotsingle
//
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub latest_trade: Option<Trade>,
    pub daily_bar: Option<Bar>,
    pub prev_daily_bar: Option<Bar>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Trade {
    #[serde(rename = "p")]
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Bar {
    #[serde(rename = "c")]
    pub close: Decimal,
}

impl Snapshot {
    pub fn decode(body: &[u8]) -> Result<Self, PriceError> {
        Ok(serde_json::from_slice(body)?)
    }

    /// Latest trade against the previous session's close. `None` when the
    /// snapshot carries no usable price.
    pub fn to_price(&self) -> Option<PriceSnapshot> {
        let current = self
            .latest_trade
            .as_ref()
            .map(|t| t.price)
            .or_else(|| self.daily_bar.as_ref().map(|b| b.close))?;

        let change = self
            .prev_daily_bar
            .as_ref()
            .map(|b| current - b.close)
            .unwrap_or_default();

        Some(PriceSnapshot::new(current, change))
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::test_server::{closed_port, respond_once};

    const AAPL: &str = r#"{
        "symbol": "AAPL",
        "latestTrade": {"t": "2024-05-01T19:59:59Z", "x": "V", "p": 169.3, "s": 100, "c": ["@"], "i": 1, "z": "C"},
        "dailyBar": {"t": "2024-05-01T04:00:00Z", "o": 169.58, "h": 172.71, "l": 169.11, "c": 169.2, "v": 1040000, "n": 12000, "vw": 170.1},
        "prevDailyBar": {"t": "2024-04-30T04:00:00Z", "o": 173.33, "h": 174.99, "l": 170.0, "c": 170.33, "v": 980000, "n": 11000, "vw": 172.4}
    }"#;

    #[test]
    fn change_is_against_previous_close() {
        let price = Snapshot::decode(AAPL.as_bytes()).unwrap().to_price().unwrap();
        assert_eq!(price.current, dec!(169.3));
        assert_eq!(price.change, dec!(-1.03));
    }

    #[test]
    fn falls_back_to_daily_close_without_trade() {
        let body = r#"{"dailyBar": {"t": "2024-05-01T04:00:00Z", "o": 1, "h": 2, "l": 1, "c": 2, "v": 10}}"#;
        let price = Snapshot::decode(body.as_bytes()).unwrap().to_price().unwrap();
        assert_eq!(price.current, dec!(2));
        assert_eq!(price.change, Decimal::ZERO);
    }

    #[test]
    fn empty_snapshot_has_no_price() {
        let snapshot = Snapshot::decode(b"{}").unwrap();
        assert!(snapshot.to_price().is_none());
    }

    #[test]
    fn rejects_bad_credentials_header() {
        let config = AlpacaConfig::new("key\nid", "secret");
        assert!(matches!(
            AlpacaClient::new(&config),
            Err(PriceError::Header(_))
        ));
    }

    async fn client_for(
        status: &str,
        body: &str,
    ) -> (AlpacaClient, tokio::sync::oneshot::Receiver<String>) {
        let (base, request) = respond_once(status, body).await;
        let config = AlpacaConfig::new("key", "secret").with_base_api(base);
        (AlpacaClient::new(&config).unwrap(), request)
    }

    #[tokio::test]
    async fn fetch_sends_credentials_and_prices() {
        let (client, request) = client_for("200 OK", AAPL).await;

        let price = client.fetch(&Symbol::stock("aapl")).await.unwrap();
        assert_eq!(price.current, dec!(169.3));
        assert_eq!(price.change, dec!(-1.03));

        let request = request.await.unwrap();
        assert!(request.starts_with("get /v2/stocks/aapl/snapshot?feed=iex http/1.1"));
        assert!(request.contains("apca-api-key-id: key"));
        assert!(request.contains("apca-api-secret-key: secret"));
    }

    #[tokio::test]
    async fn unknown_and_invalid_symbols_are_not_found() {
        for status in ["404 Not Found", "422 Unprocessable Entity"] {
            let (client, _request) =
                client_for(status, r#"{"message":"invalid symbol"}"#).await;
            let err = client.fetch(&Symbol::stock("zzzz")).await.unwrap_err();
            assert!(matches!(err, PriceError::NotFound(ref s) if s == "ZZZZ"), "{status}");
        }
    }

    #[tokio::test]
    async fn priceless_snapshot_is_not_found() {
        let (client, _request) = client_for("200 OK", "{}").await;
        let err = client.fetch(&Symbol::stock("aapl")).await.unwrap_err();
        assert!(matches!(err, PriceError::NotFound(ref s) if s == "AAPL"));
    }

    #[tokio::test]
    async fn other_failures_are_network_errors() {
        let (client, _request) = client_for("503 Service Unavailable", "").await;
        let err = client.fetch(&Symbol::stock("aapl")).await.unwrap_err();
        assert!(matches!(err, PriceError::Network(_)));

        let config = AlpacaConfig::new("key", "secret").with_base_api(closed_port().await);
        let client = AlpacaClient::new(&config).unwrap();
        let err = client.fetch(&Symbol::stock("aapl")).await.unwrap_err();
        assert!(err.is_transient());
    }
}
