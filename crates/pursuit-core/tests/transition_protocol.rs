//! End-to-end checks for the optimistic transition protocol: exact rollback,
//! notice emission, and the out-of-order resolution race on a single item.

use pursuit_core::lifecycle::TransitionPolicy;
use pursuit_core::model::item::{Priority, Stage, WorkItem};
use pursuit_core::store::{Notice, WorkItemStore};
use pursuit_core::transition::{
    Begun, GatewayError, Outcome, StageGateway, TransitionCoordinator,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn fixture_item() -> WorkItem {
    let mut item = WorkItem {
        id: "rfp-204".into(),
        title: "Rail corridor feasibility".into(),
        stage: Stage::Assigned,
        priority: Priority::High,
        owner: Some("imani".into()),
        client: Some("Metro Authority".into()),
        due_date: chrono::NaiveDate::from_ymd_opt(2026, 9, 30),
        notes: "Waiting on site survey".into(),
        budget: Some(480_000.0),
        estimated_hours: Some(120.0),
        actual_hours: Some(35.5),
        created_at_us: 1_000,
        updated_at_us: 2_000,
        ..WorkItem::default()
    };
    item.set_progress(40);
    item.extra
        .insert("region".into(), serde_json::Value::String("east".into()));
    item
}

struct FailingGateway;

impl StageGateway for FailingGateway {
    fn request_stage_change(
        &mut self,
        _item_id: &str,
        _to: Stage,
        _actor: &str,
    ) -> Result<(), GatewayError> {
        Err(GatewayError::Network("connection reset".into()))
    }
}

struct OkGateway;

impl StageGateway for OkGateway {
    fn request_stage_change(
        &mut self,
        _item_id: &str,
        _to: Stage,
        _actor: &str,
    ) -> Result<(), GatewayError> {
        Ok(())
    }
}

fn pending(begun: Begun) -> pursuit_core::transition::PendingTransition {
    match begun {
        Begun::Pending(p) => p,
        Begun::Unchanged => panic!("expected a pending transition"),
    }
}

// ---------------------------------------------------------------------------
// Rollback exactness
// ---------------------------------------------------------------------------

/// A rejected confirmation must restore the item bit-for-bit, every field
/// included, not just the stage.
#[test]
fn rollback_restores_every_field_exactly() {
    let original = fixture_item();
    let mut store = WorkItemStore::new(vec![original.clone()]);
    let mut coordinator = TransitionCoordinator::new(TransitionPolicy::SealedTerminal);

    let outcome = coordinator
        .transition(
            &mut store,
            &mut FailingGateway,
            "rfp-204",
            Stage::Submitted,
            "imani",
            9_999,
        )
        .expect("structurally valid request");

    assert!(matches!(outcome, Outcome::RolledBack { .. }));
    assert_eq!(store.get("rfp-204").expect("item present"), &original);
}

#[test]
fn rollback_emits_failure_notice_with_reason() {
    let mut store = WorkItemStore::new(vec![fixture_item()]);
    let mut coordinator = TransitionCoordinator::new(TransitionPolicy::SealedTerminal);

    coordinator
        .transition(
            &mut store,
            &mut FailingGateway,
            "rfp-204",
            Stage::Reviewed,
            "imani",
            9_999,
        )
        .expect("valid request");

    let notices = store.drain_notices();
    assert_eq!(notices.len(), 1);
    match &notices[0] {
        Notice::StageRolledBack {
            item_id,
            restored,
            attempted,
            reason,
        } => {
            assert_eq!(item_id, "rfp-204");
            assert_eq!(*restored, Stage::Assigned);
            assert_eq!(*attempted, Stage::Reviewed);
            assert!(reason.contains("connection reset"));
        }
        other => panic!("unexpected notice {other:?}"),
    }
}

#[test]
fn commit_bumps_updated_timestamp_and_notifies() {
    let mut store = WorkItemStore::new(vec![fixture_item()]);
    let mut coordinator = TransitionCoordinator::new(TransitionPolicy::SealedTerminal);

    let outcome = coordinator
        .transition(
            &mut store,
            &mut OkGateway,
            "rfp-204",
            Stage::Submitted,
            "imani",
            42_000,
        )
        .expect("valid request");

    assert_eq!(
        outcome,
        Outcome::Committed {
            item_id: "rfp-204".into(),
            from: Stage::Assigned,
            to: Stage::Submitted,
        }
    );
    let item = store.get("rfp-204").expect("item present");
    assert_eq!(item.stage, Stage::Submitted);
    assert_eq!(item.updated_at_us, 42_000);
    assert!(matches!(
        store.drain_notices().as_slice(),
        [Notice::StageCommitted { .. }]
    ));
}

// ---------------------------------------------------------------------------
// The single-item race
// ---------------------------------------------------------------------------

/// Two rapid transitions on one item, resolved out of order: the earlier
/// call's failure restores its own snapshot (the documented flicker), and
/// the later call's success is what the final confirmation reflects.
#[test]
fn out_of_order_resolution_each_call_keeps_its_own_snapshot() {
    let mut store = WorkItemStore::new(vec![fixture_item()]);
    let mut coordinator = TransitionCoordinator::new(TransitionPolicy::ReopenAllowed);

    // First gesture: assigned -> reviewed. Applied immediately.
    let first = pending(
        coordinator
            .begin(&mut store, "rfp-204", Stage::Reviewed, "imani")
            .expect("first begin"),
    );
    assert_eq!(store.get("rfp-204").expect("present").stage, Stage::Reviewed);

    // Second gesture before the first confirms: reviewed -> submitted.
    let second = pending(
        coordinator
            .begin(&mut store, "rfp-204", Stage::Submitted, "imani")
            .expect("second begin"),
    );
    assert_eq!(
        store.get("rfp-204").expect("present").stage,
        Stage::Submitted
    );
    assert_eq!(second.from(), Stage::Reviewed);

    // The second call confirms first.
    let second_outcome = TransitionCoordinator::resolve(&mut store, second, Ok(()), 50_000);
    assert!(matches!(second_outcome, Outcome::Committed { .. }));

    // Now the first call fails: it restores its own snapshot (stage
    // assigned), momentarily clobbering the committed submitted stage.
    let first_outcome = TransitionCoordinator::resolve(
        &mut store,
        first,
        Err(GatewayError::Timeout),
        51_000,
    );
    assert!(matches!(first_outcome, Outcome::RolledBack { .. }));
    assert_eq!(store.get("rfp-204").expect("present").stage, Stage::Assigned);

    // Last write to local state wins; both outcomes were surfaced.
    let notices = store.drain_notices();
    assert_eq!(notices.len(), 2);
    assert!(matches!(notices[0], Notice::StageCommitted { .. }));
    assert!(matches!(notices[1], Notice::StageRolledBack { .. }));
}

/// Transitions on different items are fully independent.
#[test]
fn cross_item_transitions_do_not_interfere() {
    let mut second_item = fixture_item();
    second_item.id = "rfp-205".into();
    second_item.stage = Stage::Reviewed;
    let mut store = WorkItemStore::new(vec![fixture_item(), second_item]);
    let mut coordinator = TransitionCoordinator::new(TransitionPolicy::SealedTerminal);

    let a = pending(
        coordinator
            .begin(&mut store, "rfp-204", Stage::Reviewed, "imani")
            .expect("begin a"),
    );
    let b = pending(
        coordinator
            .begin(&mut store, "rfp-205", Stage::Submitted, "noor")
            .expect("begin b"),
    );

    // b fails, a succeeds; a's commit is untouched by b's rollback.
    TransitionCoordinator::resolve(&mut store, b, Err(GatewayError::Timeout), 60_000);
    TransitionCoordinator::resolve(&mut store, a, Ok(()), 61_000);

    assert_eq!(store.get("rfp-204").expect("present").stage, Stage::Reviewed);
    assert_eq!(store.get("rfp-205").expect("present").stage, Stage::Reviewed);
}

/// A rollback whose item disappeared in a refresh is surfaced, not a panic.
#[test]
fn rollback_after_refresh_is_graceful() {
    let mut store = WorkItemStore::new(vec![fixture_item()]);
    let mut coordinator = TransitionCoordinator::new(TransitionPolicy::SealedTerminal);

    let p = pending(
        coordinator
            .begin(&mut store, "rfp-204", Stage::Reviewed, "imani")
            .expect("begin"),
    );
    store.replace_all(vec![]);

    let outcome = TransitionCoordinator::resolve(
        &mut store,
        p,
        Err(GatewayError::Rejected("gone".into())),
        70_000,
    );
    assert!(matches!(outcome, Outcome::RolledBack { .. }));
    assert!(store.items().is_empty());
}
