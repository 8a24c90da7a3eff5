//! Plan state machine through the public facade.

mod common;

use common::*;
use tradetrail::domain::entities::action_node::NodeKind;
use tradetrail::domain::entities::trade_plan::PlanStatus;
use tradetrail::domain::error::DomainError;
use tradetrail::domain::ports::plan_repository::PlanFilter;
use tradetrail::domain::values::close_reason::ClosedReason;
use tradetrail::TradeTrail;

async fn proposed_plan(tt: &TradeTrail) -> String {
    let report = tt.evaluate(&request(10_000.0)).await.unwrap();
    report.trade_plan.expect("plan").id
}

#[tokio::test]
async fn test_full_lifecycle_records_every_transition() {
    let tt = setup(FakeCandles::new(breakout_candles()));
    let id = proposed_plan(&tt).await;

    let plan = tt.activate_plan(&id).unwrap();
    assert_eq!(plan.status, PlanStatus::Active);
    assert!(plan.activated_at.is_some());

    // Entry 103, stop 101 — exit at 105 is +1R on 5000 USD.
    let (plan, outcome) = tt.close_plan(&id, 105.0, ClosedReason::Target).unwrap();
    assert_eq!(plan.status, PlanStatus::Closed);
    assert!((outcome.realized_r - 1.0).abs() < 1e-9);
    assert!(outcome.is_win());

    let kinds: Vec<NodeKind> = tt.plan_nodes(&id).unwrap().iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Detect,
            NodeKind::RiskCheck,
            NodeKind::Plan,
            NodeKind::Execute,
            NodeKind::Close,
        ]
    );

    let summary = tt.replay(&id).unwrap();
    assert_eq!(summary.terminal, Some(NodeKind::Close));
}

#[tokio::test]
async fn test_double_close_is_rejected() {
    let tt = setup(FakeCandles::new(breakout_candles()));
    let id = proposed_plan(&tt).await;

    tt.activate_plan(&id).unwrap();
    tt.close_plan(&id, 105.0, ClosedReason::Target).unwrap();

    let err = tt.close_plan(&id, 99.0, ClosedReason::Stop).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));

    // The stored plan is untouched by the rejected attempt.
    let plan = tt.plan(&id).unwrap().unwrap();
    assert_eq!(plan.status, PlanStatus::Closed);
    let kinds: Vec<NodeKind> = tt.plan_nodes(&id).unwrap().iter().map(|n| n.kind).collect();
    assert_eq!(kinds.iter().filter(|k| **k == NodeKind::Close).count(), 1);
}

#[tokio::test]
async fn test_close_requires_activation_first() {
    let tt = setup(FakeCandles::new(breakout_candles()));
    let id = proposed_plan(&tt).await;

    let err = tt.close_plan(&id, 105.0, ClosedReason::Target).unwrap_err();
    assert!(matches!(err, DomainError::InvalidInput(_)));
    assert_eq!(tt.plan(&id).unwrap().unwrap().status, PlanStatus::Proposed);
}

#[tokio::test]
async fn test_cancelled_plan_emits_no_outcome() {
    let tt = setup(FakeCandles::new(breakout_candles()));
    let id = proposed_plan(&tt).await;

    let plan = tt.cancel_plan(&id).unwrap();
    assert_eq!(plan.status, PlanStatus::Cancelled);

    // No outcome recorded, so lesson extraction finds nothing.
    assert!(tt.extract_lessons().unwrap().is_empty());

    let kinds: Vec<NodeKind> = tt.plan_nodes(&id).unwrap().iter().map(|n| n.kind).collect();
    assert_eq!(kinds.last(), Some(&NodeKind::Cancel));

    // Cancelled is terminal.
    assert!(tt.activate_plan(&id).is_err());
}

#[tokio::test]
async fn test_unknown_plan_is_not_found() {
    let tt = setup(FakeCandles::new(breakout_candles()));
    assert!(matches!(
        tt.activate_plan("nope").unwrap_err(),
        DomainError::NotFound(_)
    ));
}

#[tokio::test]
async fn test_state_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("trail.db");
    let db_path = db_path.to_str().unwrap();

    let id = {
        let tt = tradetrail::TradeTrail::with_providers(
            db_path,
            FakeCandles::new(breakout_candles()),
            std::sync::Arc::new(FakeCommentary("ok".into())),
            tradetrail::infrastructure::retry::RetryPolicy::none(),
        )
        .unwrap();
        let id = proposed_plan(&tt).await;
        tt.activate_plan(&id).unwrap();
        id
    };

    // A fresh handle over the same file sees the committed state.
    let tt = tradetrail::TradeTrail::with_providers(
        db_path,
        FakeCandles::new(breakout_candles()),
        std::sync::Arc::new(FakeCommentary("ok".into())),
        tradetrail::infrastructure::retry::RetryPolicy::none(),
    )
    .unwrap();
    let plan = tt.plan(&id).unwrap().expect("plan persisted");
    assert_eq!(plan.status, PlanStatus::Active);
    assert_eq!(tt.plan_nodes(&id).unwrap().len(), 4);
}

#[tokio::test]
async fn test_plans_filter_by_status() {
    let tt = setup(FakeCandles::new(breakout_candles()));
    let a = proposed_plan(&tt).await;
    let b = proposed_plan(&tt).await;
    tt.activate_plan(&a).unwrap();

    let active = tt
        .plans(&PlanFilter { status: Some(PlanStatus::Active), ..Default::default() })
        .unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, a);

    let proposed = tt
        .plans(&PlanFilter { status: Some(PlanStatus::Proposed), ..Default::default() })
        .unwrap();
    assert_eq!(proposed.len(), 1);
    assert_eq!(proposed[0].id, b);
}
