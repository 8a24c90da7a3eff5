//! Shared test helpers: candle builders and fake collaborators.
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use tradetrail::application::evaluate::EvaluationRequest;
use tradetrail::domain::entities::snapshot::{Candle, MarketSnapshot};
use tradetrail::domain::error::DomainError;
use tradetrail::domain::ports::candle_provider::CandleProvider;
use tradetrail::domain::ports::commentary::CommentaryProvider;
use tradetrail::domain::values::timeframe::Timeframe;
use tradetrail::infrastructure::retry::RetryPolicy;
use tradetrail::TradeTrail;

pub const POOL: &str = "0xPOOL";
pub const CHAIN: &str = "solana";

/// Fixed series start so candle timestamps (and therefore signal ids)
/// are reproducible within a test.
pub fn series_start() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 2, 0, 0, 0).unwrap()
}

pub fn candle(i: usize, o: f64, h: f64, l: f64, c: f64, v: f64) -> Candle {
    Candle {
        t: series_start() + Duration::hours(i as i64),
        o,
        h,
        l,
        c,
        v: Some(v),
    }
}

/// A quiet series with no setups: doji candles in a tight range.
pub fn flat_candles(n: usize, price: f64) -> Vec<Candle> {
    (0..n)
        .map(|i| candle(i, price, price + 0.1, price - 0.1, price, 1000.0))
        .collect()
}

/// 25 flat candles around 100 then a close at 103, well above the prior
/// 20-bar high of 101 — fires the breakout rule.
pub fn breakout_candles() -> Vec<Candle> {
    let mut candles: Vec<Candle> = (0..25)
        .map(|i| candle(i, 100.0, 101.0, 99.0, 100.0, 1000.0))
        .collect();
    candles.push(candle(25, 100.0, 103.5, 99.5, 103.0, 1500.0));
    candles
}

pub fn snapshot(candles: Vec<Candle>) -> MarketSnapshot {
    MarketSnapshot::new(
        POOL.to_string(),
        CHAIN.to_string(),
        Timeframe::H1,
        candles,
        Utc::now(),
    )
}

pub fn request(equity: f64) -> EvaluationRequest {
    EvaluationRequest {
        address: POOL.to_string(),
        chain: CHAIN.to_string(),
        timeframe: Timeframe::H1,
        account_equity: equity,
        risk_percent: None,
    }
}

// ── Fake collaborators ───────────────────────────────────────────────

pub struct FakeCandles {
    pub candles: Vec<Candle>,
    pub calls: AtomicU32,
}

impl FakeCandles {
    pub fn new(candles: Vec<Candle>) -> Arc<Self> {
        Arc::new(Self {
            candles,
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl CandleProvider for FakeCandles {
    fn name(&self) -> &str {
        "fake"
    }

    async fn get_candles(
        &self,
        _address: &str,
        _chain: &str,
        _timeframe: Timeframe,
        _limit: usize,
    ) -> Result<Vec<Candle>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.candles.clone())
    }
}

/// Fails with a transient error `failures` times, then succeeds.
pub struct FlakyCandles {
    pub candles: Vec<Candle>,
    pub failures: AtomicU32,
    pub calls: AtomicU32,
}

impl FlakyCandles {
    pub fn new(candles: Vec<Candle>, failures: u32) -> Arc<Self> {
        Arc::new(Self {
            candles,
            failures: AtomicU32::new(failures),
            calls: AtomicU32::new(0),
        })
    }
}

#[async_trait]
impl CandleProvider for FlakyCandles {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn get_candles(
        &self,
        _address: &str,
        _chain: &str,
        _timeframe: Timeframe,
        _limit: usize,
    ) -> Result<Vec<Candle>, DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failures.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |f| {
            if f > 0 {
                Some(f - 1)
            } else {
                None
            }
        }).is_ok()
        {
            return Err(DomainError::Transient("feed hiccup".into()));
        }
        Ok(self.candles.clone())
    }
}

pub struct MissingCandles;

#[async_trait]
impl CandleProvider for MissingCandles {
    fn name(&self) -> &str {
        "missing"
    }

    async fn get_candles(
        &self,
        address: &str,
        chain: &str,
        _timeframe: Timeframe,
        _limit: usize,
    ) -> Result<Vec<Candle>, DomainError> {
        Err(DomainError::NotFound(format!("No pool {address} on {chain}")))
    }
}

pub struct FakeCommentary(pub String);

#[async_trait]
impl CommentaryProvider for FakeCommentary {
    fn name(&self) -> &str {
        "fake"
    }

    async fn assist(
        &self,
        _prompt: &str,
        _vars: &serde_json::Value,
    ) -> Result<String, DomainError> {
        Ok(self.0.clone())
    }
}

pub struct FailingCommentary;

#[async_trait]
impl CommentaryProvider for FailingCommentary {
    fn name(&self) -> &str {
        "failing"
    }

    async fn assist(
        &self,
        _prompt: &str,
        _vars: &serde_json::Value,
    ) -> Result<String, DomainError> {
        Err(DomainError::Transient("commentary down".into()))
    }
}

// ── Setup ────────────────────────────────────────────────────────────

pub fn setup(candles: Arc<dyn CandleProvider>) -> TradeTrail {
    TradeTrail::with_providers(
        ":memory:",
        candles,
        Arc::new(FakeCommentary("Solid structural setup with trend support.".into())),
        RetryPolicy::none(),
    )
    .unwrap()
}

pub fn setup_with_commentary(
    candles: Arc<dyn CandleProvider>,
    commentary: Arc<dyn CommentaryProvider>,
) -> TradeTrail {
    TradeTrail::with_providers(":memory:", candles, commentary, RetryPolicy::none()).unwrap()
}
