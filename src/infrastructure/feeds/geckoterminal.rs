//! GeckoTerminal OHLCV feed (no auth required).
//!
//! Fetches pool candles by network + pool address. Transport failures
//! map to `Transient` so the retry wrapper backs off; an unknown pool is
//! `NotFound` and is never retried.

use crate::domain::entities::snapshot::Candle;
use crate::domain::error::DomainError;
use crate::domain::ports::candle_provider::CandleProvider;
use crate::domain::values::timeframe::Timeframe;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

const DEFAULT_BASE_URL: &str = "https://api.geckoterminal.com/api/v2";

pub struct GeckoTerminalFeed {
    client: reqwest::Client,
    base_url: String,
}

impl GeckoTerminalFeed {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    /// GeckoTerminal splits the interval into a path segment plus an
    /// aggregate query parameter.
    fn ohlcv_path(timeframe: Timeframe) -> (&'static str, u32) {
        match timeframe {
            Timeframe::M5 => ("minute", 5),
            Timeframe::M15 => ("minute", 15),
            Timeframe::H1 => ("hour", 1),
            Timeframe::H4 => ("hour", 4),
            Timeframe::D1 => ("day", 1),
        }
    }
}

impl Default for GeckoTerminalFeed {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, serde::Deserialize)]
struct OhlcvResponse {
    data: OhlcvData,
}

#[derive(Debug, serde::Deserialize)]
struct OhlcvData {
    attributes: OhlcvAttributes,
}

#[derive(Debug, serde::Deserialize)]
struct OhlcvAttributes {
    /// Rows of `[timestamp, open, high, low, close, volume]`, newest first.
    ohlcv_list: Vec<Vec<f64>>,
}

#[async_trait]
impl CandleProvider for GeckoTerminalFeed {
    fn name(&self) -> &str {
        "geckoterminal"
    }

    async fn get_candles(
        &self,
        address: &str,
        chain: &str,
        timeframe: Timeframe,
        limit: usize,
    ) -> Result<Vec<Candle>, DomainError> {
        let (segment, aggregate) = Self::ohlcv_path(timeframe);
        let url = format!(
            "{}/networks/{chain}/pools/{address}/ohlcv/{segment}?aggregate={aggregate}&limit={limit}",
            self.base_url
        );

        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::Transient(format!("GeckoTerminal request failed: {e}")))?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(DomainError::NotFound(format!(
                "No pool {address} on {chain}"
            )));
        }
        if !resp.status().is_success() {
            return Err(DomainError::Transient(format!(
                "GeckoTerminal returned {} for {address}",
                resp.status()
            )));
        }

        let body: OhlcvResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Parse(format!("GeckoTerminal response: {e}")))?;

        let mut candles: Vec<Candle> = body
            .data
            .attributes
            .ohlcv_list
            .iter()
            .filter_map(|row| {
                if row.len() < 6 {
                    return None;
                }
                let t = DateTime::<Utc>::from_timestamp(row[0] as i64, 0)?;
                Some(Candle {
                    t,
                    o: row[1],
                    h: row[2],
                    l: row[3],
                    c: row[4],
                    v: Some(row[5]),
                })
            })
            .collect();

        candles.sort_by_key(|c| c.t);
        Ok(candles)
    }
}
