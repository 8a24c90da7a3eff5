//! End-to-end evaluation cycle against fake collaborators.

mod common;

use common::*;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tradetrail::domain::entities::action_node::NodeKind;
use tradetrail::domain::error::DomainError;
use tradetrail::domain::values::direction::TradeDirection;
use tradetrail::domain::values::pattern::PatternId;
use tradetrail::infrastructure::retry::RetryPolicy;
use tradetrail::TradeTrail;

#[tokio::test]
async fn test_breakout_produces_signal_plan_and_nodes() {
    let tt = setup(FakeCandles::new(breakout_candles()));

    let report = tt.evaluate(&request(10_000.0)).await.unwrap();

    let signal = report.signal.expect("breakout window should yield a signal");
    assert_eq!(signal.pattern, PatternId::Breakout);
    assert_eq!(signal.direction, TradeDirection::Long);
    assert!((signal.entry_price - 103.0).abs() < 1e-9);
    assert!((signal.structural_stop - 101.0).abs() < 1e-9);
    assert!(signal.confidence.value() > 0.0 && signal.confidence.value() <= 1.0);

    let plan = report.trade_plan.expect("risk check should pass");
    // size = 10000 × 1 / 2
    assert!((plan.size_usd - 5_000.0).abs() < 1e-9);
    assert_eq!(plan.take_profits, vec![105.0, 107.0]);
    assert_eq!(plan.signal_id, signal.id);

    let kinds: Vec<NodeKind> = report.action_nodes.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Detect, NodeKind::RiskCheck, NodeKind::Plan]);
    assert!(report.action_nodes[0].is_root());
    assert!(report.skipped_reason.is_none());
}

#[tokio::test]
async fn test_quiet_market_is_a_valid_no_signal_result() {
    let tt = setup(FakeCandles::new(flat_candles(40, 100.0)));

    let report = tt.evaluate(&request(10_000.0)).await.unwrap();

    assert!(report.signal.is_none());
    assert!(report.trade_plan.is_none());
    assert!(report.action_nodes.is_empty());
    assert_eq!(report.candles_used, 40);
}

#[tokio::test]
async fn test_short_window_degrades_to_neutral_not_error() {
    let tt = setup(FakeCandles::new(flat_candles(5, 100.0)));

    let report = tt.evaluate(&request(10_000.0)).await.unwrap();

    assert!(report.regime.is_neutral());
    assert!(report.signal.is_none());
}

#[tokio::test]
async fn test_commentary_text_becomes_the_thesis() {
    let tt = setup_with_commentary(
        FakeCandles::new(breakout_candles()),
        Arc::new(FakeCommentary("Momentum continuation above range.".into())),
    );

    let report = tt.evaluate(&request(10_000.0)).await.unwrap();
    let signal = report.signal.unwrap();
    assert_eq!(signal.thesis, "Momentum continuation above range.");
}

#[tokio::test]
async fn test_commentary_failure_falls_back_to_template() {
    let tt = setup_with_commentary(
        FakeCandles::new(breakout_candles()),
        Arc::new(FailingCommentary),
    );

    let report = tt.evaluate(&request(10_000.0)).await.unwrap();

    // Plan creation is never blocked by commentary.
    let signal = report.signal.unwrap();
    assert!(report.trade_plan.is_some());
    assert!(signal.thesis.starts_with("long breakout"));
    assert!(signal.thesis.contains("Regime"));
}

#[tokio::test]
async fn test_invalid_equity_reports_signal_without_plan() {
    let tt = setup(FakeCandles::new(breakout_candles()));

    let report = tt.evaluate(&request(0.0)).await.unwrap();

    assert!(report.signal.is_some());
    assert!(report.trade_plan.is_none());
    assert!(report.skipped_reason.is_some());

    // The aborted lifecycle still leaves an audit trail.
    let kinds: Vec<NodeKind> = report.action_nodes.iter().map(|n| n.kind).collect();
    assert_eq!(kinds, vec![NodeKind::Detect, NodeKind::RiskCheck]);
}

#[tokio::test]
async fn test_transient_feed_failure_is_retried() {
    let flaky = FlakyCandles::new(breakout_candles(), 1);
    let tt = TradeTrail::with_providers(
        ":memory:",
        flaky.clone(),
        Arc::new(FakeCommentary("ok".into())),
        RetryPolicy {
            retries: 2,
            base_delay_ms: 10,
            max_delay_ms: None,
            jitter: None,
        },
    )
    .unwrap();

    let report = tt.evaluate(&request(10_000.0)).await.unwrap();
    assert!(report.signal.is_some());
    assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unknown_pool_is_not_retried() {
    let tt = setup(Arc::new(MissingCandles));

    let err = tt.evaluate(&request(10_000.0)).await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound(_)));
}

#[tokio::test]
async fn test_reevaluating_a_tick_dedupes_the_signal() {
    let tt = setup(FakeCandles::new(breakout_candles()));

    let first = tt.evaluate(&request(10_000.0)).await.unwrap();
    let second = tt.evaluate(&request(10_000.0)).await.unwrap();

    let a = first.signal.unwrap();
    let b = second.signal.unwrap();
    assert_eq!(a.id, b.id);

    // One signal per (address, timeframe, tick) survives in storage.
    let stored = tt.signals_for_pattern(PatternId::Breakout, 10).unwrap();
    assert_eq!(stored.len(), 1);
}
