mod common;

use common::{admin, cashier, chips, engine, outstanding};
use credit_engine::domain::chips::{ChipBreakdown, validate};
use credit_engine::domain::money::Balance;
use credit_engine::domain::request::{ApprovalType, Decision, RequestStatus};
use credit_engine::error::{CreditError, PolicyError, SettlementError, ValidationError, WorkflowError};
use rust_decimal_macros::dec;

#[tokio::test]
async fn test_instant_request_within_both_limits() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();

    let request = engine
        .create_request(&cashier(dec!(5000)), 7, dec!(3000), chips("1000x3"), "")
        .await
        .unwrap();

    assert_eq!(request.approval_type, ApprovalType::Instant);
    assert_eq!(request.status, RequestStatus::Approved);
    assert_eq!(outstanding(&engine, 7).await, Balance::new(dec!(3000)));
}

#[tokio::test]
async fn test_request_beyond_cashier_allowance_waits_for_admin() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();

    let request = engine
        .create_request(&cashier(dec!(5000)), 7, dec!(8000), chips("5000x1 1000x3"), "")
        .await
        .unwrap();

    assert_eq!(request.approval_type, ApprovalType::AdminRequired);
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(outstanding(&engine, 7).await, Balance::ZERO);
}

#[tokio::test]
async fn test_approve_once_then_not_pending() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    let request = engine
        .create_request(&cashier(dec!(5000)), 7, dec!(8000), chips("1000x8"), "")
        .await
        .unwrap();

    let approved = engine
        .decide(&admin(), request.id, Decision::Approve, "ok")
        .await
        .unwrap();
    assert_eq!(approved.status, RequestStatus::Approved);
    assert_eq!(approved.approval_type, ApprovalType::AdminApproved);
    assert_eq!(approved.approver_id, Some(admin().id));
    assert_eq!(outstanding(&engine, 7).await, Balance::new(dec!(8000)));

    for decision in [Decision::Approve, Decision::Reject] {
        let again = engine.decide(&admin(), request.id, decision, "ok").await;
        assert!(matches!(
            again,
            Err(CreditError::Workflow(WorkflowError::NotPending {
                status: RequestStatus::Approved,
                ..
            }))
        ));
    }
    assert_eq!(outstanding(&engine, 7).await, Balance::new(dec!(8000)));
}

#[tokio::test]
async fn test_reject_needs_notes_and_never_credits() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    let request = engine
        .create_request(&cashier(dec!(1000)), 7, dec!(2000), chips("1000x2"), "")
        .await
        .unwrap();

    assert!(matches!(
        engine.decide(&admin(), request.id, Decision::Reject, "  ").await,
        Err(CreditError::Workflow(WorkflowError::NotesRequired { .. }))
    ));

    let rejected = engine
        .decide(&admin(), request.id, Decision::Reject, "no history")
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.decision_notes.as_deref(), Some("no history"));
    assert_eq!(outstanding(&engine, 7).await, Balance::ZERO);
    assert!(engine.pending_requests(&admin()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_may_approve_past_the_limit() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(5000)).await.unwrap();
    let request = engine
        .create_request(&admin(), 7, dec!(6000), chips("1000x6"), "")
        .await
        .unwrap();
    assert_eq!(request.approval_type, ApprovalType::AdminRequired);

    engine
        .decide(&admin(), request.id, Decision::Approve, "vip, approved excess")
        .await
        .unwrap();
    let status = engine.get_credit_status(&admin(), 7).await.unwrap();
    assert_eq!(status.total_outstanding, Balance::new(dec!(6000)));
    assert_eq!(status.available_credit, Balance::new(dec!(-1000)));
}

#[tokio::test]
async fn test_cash_settlement_fully_settles() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    let request = engine
        .create_request(&cashier(dec!(5000)), 7, dec!(8000), chips("1000x8"), "")
        .await
        .unwrap();
    engine
        .decide(&admin(), request.id, Decision::Approve, "ok")
        .await
        .unwrap();

    let receipt = engine
        .settle(&cashier(dec!(5000)), 7, dec!(8000), "cash", None, "")
        .await
        .unwrap();
    assert_eq!(receipt.remaining_credit, Balance::ZERO);
    assert!(receipt.fully_settled);

    let history = engine.settlement_history(&admin(), 7).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].amount.value(), dec!(8000));
}

#[tokio::test]
async fn test_online_settlement_without_evidence() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    engine
        .create_request(&admin(), 7, dec!(3000), chips("1000x3"), "")
        .await
        .unwrap();

    let result = engine
        .settle(&cashier(dec!(5000)), 7, dec!(2000), "online_sbi", None, "")
        .await;
    assert!(matches!(
        result,
        Err(CreditError::Settlement(SettlementError::EvidenceRequired { .. }))
    ));
    assert_eq!(outstanding(&engine, 7).await, Balance::new(dec!(3000)));
}

#[tokio::test]
async fn test_settlement_arithmetic_is_exact() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(1000)).await.unwrap();
    engine
        .create_request(&admin(), 7, dec!(0.30), chips("0.10x3"), "")
        .await
        .unwrap();

    for _ in 0..3 {
        engine
            .settle(&admin(), 7, dec!(0.10), "cash", None, "")
            .await
            .unwrap();
    }
    assert_eq!(outstanding(&engine, 7).await, Balance::ZERO);

    let over = engine.settle(&admin(), 7, dec!(0.01), "cash", None, "").await;
    assert!(matches!(over, Err(CreditError::Ledger(_))));
    assert_eq!(outstanding(&engine, 7).await, Balance::ZERO);
}

#[tokio::test]
async fn test_available_credit_tracks_every_change() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    engine
        .create_request(&admin(), 7, dec!(2500), chips("500x5"), "")
        .await
        .unwrap();
    engine
        .settle(&admin(), 7, dec!(1000), "online_hdfc", Some("ev-1"), "")
        .await
        .unwrap();
    engine.set_credit_limit(&admin(), 7, dec!(1000)).await.unwrap();

    let status = engine.get_credit_status(&admin(), 7).await.unwrap();
    assert_eq!(status.credit_limit, Balance::new(dec!(1000)));
    assert_eq!(status.total_outstanding, Balance::new(dec!(1500)));
    assert_eq!(
        status.available_credit,
        status.credit_limit - status.total_outstanding
    );

    // Lowered below outstanding: further requests must go to an admin.
    let queued = engine
        .create_request(&admin(), 7, dec!(100), chips("100x1"), "")
        .await
        .unwrap();
    assert_eq!(queued.approval_type, ApprovalType::AdminRequired);
}

#[tokio::test]
async fn test_rejections_before_any_mutation() {
    let engine = engine();

    assert!(matches!(
        engine
            .create_request(&admin(), 7, dec!(1000), chips("1000x1"), "")
            .await,
        Err(CreditError::Policy(PolicyError::UnknownPlayer { player_id: 7 }))
    ));

    engine.set_credit_limit(&admin(), 7, dec!(0)).await.unwrap();
    assert!(matches!(
        engine
            .create_request(&admin(), 7, dec!(1000), chips("1000x1"), "")
            .await,
        Err(CreditError::Policy(PolicyError::NoCreditLimitSet { player_id: 7 }))
    ));

    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    assert!(matches!(
        engine
            .create_request(&admin(), 7, dec!(1000), chips("500x1"), "")
            .await,
        Err(CreditError::Validation(ValidationError::MismatchedTotal { .. }))
    ));
    assert!(matches!(
        engine
            .create_request(&admin(), 7, dec!(1000), ChipBreakdown::new(), "")
            .await,
        Err(CreditError::Validation(ValidationError::NoChipsSelected { .. }))
    ));
    assert_eq!(outstanding(&engine, 7).await, Balance::ZERO);
}

#[tokio::test]
async fn test_oversized_breakdown_is_a_validation_error() {
    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();

    let result = engine
        .create_request(
            &cashier(dec!(5000)),
            7,
            dec!(3000),
            chips("79228162514264337593543950335x2"),
            "",
        )
        .await;
    assert!(matches!(
        result,
        Err(CreditError::Validation(ValidationError::BreakdownOverflow { count: 2, .. }))
    ));
    assert_eq!(outstanding(&engine, 7).await, Balance::ZERO);
}

#[test]
fn test_validator_accepts_exactly_matching_breakdowns() {
    let cases = [
        ("1000x3", dec!(3000), true),
        ("1000x3", dec!(2999.99), false),
        ("500x2 100x5", dec!(1500), true),
        ("25x4 5x1", dec!(105), true),
        ("25x4 5x1", dec!(100), false),
        ("0.50x3", dec!(1.50), true),
    ];
    for (breakdown, requested, ok) in cases {
        assert_eq!(
            validate(&chips(breakdown), requested).is_ok(),
            ok,
            "{} against {}",
            breakdown,
            requested
        );
    }
}

#[tokio::test]
async fn test_random_walk_keeps_ledger_consistent() {
    use rand::Rng;

    let engine = engine();
    engine.set_credit_limit(&admin(), 7, dec!(10000)).await.unwrap();
    let mut rng = rand::thread_rng();
    let mut expected = rust_decimal::Decimal::ZERO;

    for _ in 0..200 {
        let hundreds: u32 = rng.gen_range(1..=30);
        let amount = rust_decimal::Decimal::from(hundreds * 100);
        if rng.gen_bool(0.5) {
            let request = engine
                .create_request(
                    &cashier(dec!(2000)),
                    7,
                    amount,
                    chips(&format!("100x{}", hundreds)),
                    "",
                )
                .await
                .unwrap();
            if request.approval_type == ApprovalType::Instant {
                expected += amount;
            } else if rng.gen_bool(0.5) {
                engine
                    .decide(&admin(), request.id, Decision::Approve, "walk")
                    .await
                    .unwrap();
                expected += amount;
            } else {
                engine
                    .decide(&admin(), request.id, Decision::Reject, "walk")
                    .await
                    .unwrap();
            }
        } else {
            match engine.settle(&admin(), 7, amount, "cash", None, "").await {
                Ok(receipt) => {
                    expected -= amount;
                    assert_eq!(receipt.remaining_credit, Balance::new(expected));
                    assert_eq!(receipt.fully_settled, expected.is_zero());
                }
                Err(CreditError::Ledger(_)) => assert!(amount > expected),
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        let status = engine.get_credit_status(&admin(), 7).await.unwrap();
        assert_eq!(status.total_outstanding, Balance::new(expected));
        assert!(status.total_outstanding >= Balance::ZERO);
        assert_eq!(
            status.available_credit,
            status.credit_limit - status.total_outstanding
        );
    }
}
