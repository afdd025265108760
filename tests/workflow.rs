use pushkind_dispatch::domain::storage::RollKey;
use pushkind_dispatch::domain::types::{DispatchOrderId, LotNo, MachineName, RollNo};
use pushkind_dispatch::domain::variant::WorkflowVariant;
use pushkind_dispatch::repository::{
    DieselRepository, DispatchPlanReader, StorageReader, StoredRollQuery,
};
use pushkind_dispatch::services::registry::{SessionRegistry, WorkstationKey};
use pushkind_dispatch::services::{WorkflowError, dispatch_history, workflow};

mod common;

fn stored_order(repo: &DieselRepository, lot_no: &str, roll_no: &str) -> Option<DispatchOrderId> {
    let key = RollKey {
        lot_no: LotNo::new(lot_no).unwrap(),
        machine_name: MachineName::new("M1").unwrap(),
        roll_no: RollNo::new(roll_no).unwrap(),
    };
    repo.find_stored_roll(&StoredRollQuery::new(key))
        .unwrap()
        .unwrap()
        .dispatch_order_id
}

#[test]
fn test_pick_then_load_an_order() {
    let test_db = common::TestDb::new("test_pick_then_load_an_order.db");
    test_db.add_lot("DO1", "L1", 1, 2);
    test_db.add_lot("DO1", "L2", 2, 1);
    for (lot_no, roll_no) in [("L1", "R1"), ("L1", "R2"), ("L2", "R3")] {
        test_db.add_stored_roll(lot_no, roll_no, None);
        test_db.add_weight(lot_no, roll_no, 20.0, 19.0);
    }
    let repo = DieselRepository::new(test_db.pool());
    let registry = SessionRegistry::new();

    let pick = WorkstationKey::new("picker", WorkflowVariant::Pick);
    workflow::validate_dispatch_order(&repo, &registry, &pick, "DO1").unwrap();
    workflow::scan_roll(&repo, &registry, &pick, "L1#M1#R1").unwrap();
    assert!(matches!(
        workflow::scan_roll(&repo, &registry, &pick, "L2#M1#R3"),
        Err(WorkflowError::LotMismatch { .. })
    ));
    let filled = workflow::scan_roll(&repo, &registry, &pick, "L1#M1#R2").unwrap();
    assert_eq!(
        filled.completion.unwrap().next_lot_no,
        Some(LotNo::new("L2").unwrap())
    );
    workflow::scan_roll(&repo, &registry, &pick, "L2#M1#R3").unwrap();

    let report = workflow::submit_scans(&repo, &registry, &pick).unwrap();
    assert!(report.is_complete());
    assert_eq!(report.submitted, 3);
    assert_eq!(stored_order(&repo, "L2", "R3"), Some(DispatchOrderId::new("DO1").unwrap()));

    let load = WorkstationKey::new("loader", WorkflowVariant::Load);
    workflow::validate_dispatch_order(&repo, &registry, &load, "DO1").unwrap();
    for label in ["L1#M1#R1", "L1#M1#R2", "L2#M1#R3"] {
        workflow::scan_roll(&repo, &registry, &load, label).unwrap();
    }
    let report = workflow::submit_scans(&repo, &registry, &load).unwrap();
    assert_eq!(report.submitted, 3);

    let history = dispatch_history::load_dispatch_history(&repo, "DO1").unwrap();
    assert_eq!(history.total_rolls, 3);
    assert_eq!(history.lots.len(), 2);
    assert_eq!(history.gross_weight.get(), 60.0);
}

#[test]
fn test_pick_load_persists_lot_weights() {
    let test_db = common::TestDb::new("test_pick_load_persists_lot_weights.db");
    test_db.add_lot("DO7", "L1", 1, 2);
    test_db.add_stored_roll("L1", "R1", None);
    test_db.add_stored_roll("L1", "R2", Some("DO8"));
    test_db.add_stored_roll("L1", "R3", None);
    test_db.add_weight("L1", "R1", 30.0, 28.5);
    test_db.add_weight("L1", "R3", 31.0, 29.5);
    let repo = DieselRepository::new(test_db.pool());
    let registry = SessionRegistry::new();
    let key = WorkstationKey::new("operator", WorkflowVariant::PickLoad);

    workflow::validate_dispatch_order(&repo, &registry, &key, "DO7").unwrap();
    assert!(matches!(
        workflow::scan_roll(&repo, &registry, &key, "L1#M1#R1"),
        Err(WorkflowError::MalformedInput(_))
    ));
    workflow::scan_roll(&repo, &registry, &key, "L1#M1#R1#R1").unwrap();
    assert!(matches!(
        workflow::scan_roll(&repo, &registry, &key, "L1#M1#R2#R2"),
        Err(WorkflowError::WrongDispatchOrder { .. })
    ));
    workflow::scan_roll(&repo, &registry, &key, "L1#M1#R3#R3").unwrap();

    let report = workflow::submit_scans(&repo, &registry, &key).unwrap();
    assert!(report.is_complete());

    let lots = repo
        .list_lots_by_dispatch_order(&DispatchOrderId::new("DO7").unwrap())
        .unwrap();
    assert_eq!(lots[0].total_gross_weight.get(), 61.0);
    assert_eq!(lots[0].total_net_weight.get(), 58.0);
}

#[test]
fn test_dispatched_rolls_are_refused_in_the_next_round() {
    let test_db = common::TestDb::new("test_dispatched_rolls_are_refused_in_the_next_round.db");
    test_db.add_lot("DO1", "L1", 1, 1);
    test_db.add_stored_roll("L1", "R1", Some("DO1"));
    test_db.add_weight("L1", "R1", 20.0, 19.0);
    let repo = DieselRepository::new(test_db.pool());
    let registry = SessionRegistry::new();
    let key = WorkstationKey::new("loader", WorkflowVariant::Load);

    workflow::validate_dispatch_order(&repo, &registry, &key, "DO1").unwrap();
    workflow::scan_roll(&repo, &registry, &key, "L1#M1#R1").unwrap();
    assert!(workflow::submit_scans(&repo, &registry, &key).unwrap().is_complete());

    assert!(matches!(
        workflow::scan_roll(&repo, &registry, &key, "L1#M1#R1"),
        Err(WorkflowError::AlreadyLoaded { .. })
    ));
    let history = dispatch_history::load_dispatch_history(&repo, "DO1").unwrap();
    assert_eq!(history.total_rolls, 1);
}
