use crate::domain::values::timeframe::Timeframe;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single OHLC candle. Volume is optional — some venues don't report it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub t: DateTime<Utc>,
    pub o: f64,
    pub h: f64,
    pub l: f64,
    pub c: f64,
    pub v: Option<f64>,
}

impl Candle {
    /// True range against the previous close.
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.h - self.l;
        let hc = (self.h - prev_close).abs();
        let lc = (self.l - prev_close).abs();
        hl.max(hc).max(lc)
    }

    pub fn body(&self) -> f64 {
        (self.c - self.o).abs()
    }

    pub fn is_bullish(&self) -> bool {
        self.c > self.o
    }
}

/// One evaluation's view of the market: an ordered candle series for a
/// single (address, timeframe). Immutable once built — every downstream
/// component is a pure function of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub address: String,
    pub chain: String,
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
    pub fetched_at: DateTime<Utc>,
}

impl MarketSnapshot {
    pub fn new(
        address: String,
        chain: String,
        timeframe: Timeframe,
        candles: Vec<Candle>,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        Self {
            address,
            chain,
            timeframe,
            candles,
            fetched_at,
        }
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.candles.last().map(|c| c.c)
    }

    /// The evaluation tick: timestamp of the newest candle, falling back
    /// to fetch time for an empty series.
    pub fn as_of(&self) -> DateTime<Utc> {
        self.candles.last().map(|c| c.t).unwrap_or(self.fetched_at)
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }
}
