//! DTOs rendered by the workflow screens and returned by the JSON API.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::dispatch_roll::DispatchRoll;
use crate::domain::session::{BusyState, DispatchSession, LotCompletion, ScannedUnit};
use crate::domain::types::{DispatchOrderId, LotNo, MachineName, RollNo, UnitId, Weight};
use crate::domain::variant::WorkflowVariant;

/// Progress of one lot of the selected order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LotSummary {
    pub lot_no: LotNo,
    pub tape: String,
    pub sequence_no: i32,
    pub target: usize,
    pub scanned: usize,
    pub remaining: usize,
    pub is_active: bool,
    pub is_finished: bool,
    pub gross_weight: Weight,
    pub net_weight: Weight,
    /// Totals already saved on the plan by earlier submissions.
    pub recorded_gross_weight: Weight,
    pub recorded_net_weight: Weight,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UnitView {
    pub id: UnitId,
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
    pub fg_roll_no: RollNo,
    pub gross_weight: Weight,
    pub net_weight: Weight,
    pub scanned_at: NaiveDateTime,
}

impl From<&ScannedUnit> for UnitView {
    fn from(unit: &ScannedUnit) -> Self {
        Self {
            id: unit.id,
            lot_no: unit.lot_no.clone(),
            machine_name: unit.machine_name.clone(),
            roll_no: unit.roll_no.clone(),
            fg_roll_no: unit.fg_roll_no.clone(),
            gross_weight: unit.weight.gross,
            net_weight: unit.weight.net,
            scanned_at: unit.scanned_at,
        }
    }
}

/// Snapshot of a workstation shown to the operator.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionSummary {
    pub variant: WorkflowVariant,
    pub busy: BusyState,
    pub dispatch_order_id: Option<DispatchOrderId>,
    pub active_lot_no: Option<LotNo>,
    pub remaining_for_active_lot: usize,
    pub lots: Vec<LotSummary>,
    /// Most recent scan first.
    pub units: Vec<UnitView>,
    pub all_lots_finished: bool,
    pub can_submit: bool,
}

impl SessionSummary {
    /// Summary of a workstation without a selected order.
    pub fn empty(variant: WorkflowVariant, busy: BusyState) -> Self {
        Self {
            variant,
            busy,
            dispatch_order_id: None,
            active_lot_no: None,
            remaining_for_active_lot: 0,
            lots: Vec::new(),
            units: Vec::new(),
            all_lots_finished: false,
            can_submit: false,
        }
    }

    pub fn from_session(session: &DispatchSession, busy: BusyState) -> Self {
        let variant = session.variant();
        let lots = session
            .lots()
            .iter()
            .enumerate()
            .map(|(index, lot)| {
                let weight = if variant.tracks_lot_weights() {
                    session.lot_weight(&lot.lot_no)
                } else {
                    session.scanned_weight(&lot.lot_no)
                };
                LotSummary {
                    lot_no: lot.lot_no.clone(),
                    tape: lot.tape.clone(),
                    sequence_no: lot.sequence_no,
                    target: session.target_count(lot),
                    scanned: session.scanned_count(&lot.lot_no),
                    remaining: session.remaining_for(lot),
                    is_active: index == session.active_lot_index(),
                    is_finished: session.is_lot_finished(lot),
                    gross_weight: weight.gross,
                    net_weight: weight.net,
                    recorded_gross_weight: lot.total_gross_weight,
                    recorded_net_weight: lot.total_net_weight,
                }
            })
            .collect();

        Self {
            variant,
            busy,
            dispatch_order_id: Some(session.dispatch_order_id().clone()),
            active_lot_no: session.active_lot().map(|lot| lot.lot_no.clone()),
            remaining_for_active_lot: session.remaining_for_active_lot(),
            lots,
            units: session.scanned_units().iter().rev().map(UnitView::from).collect(),
            all_lots_finished: session.all_lots_finished(),
            can_submit: busy == BusyState::Idle && session.check_submittable().is_ok(),
        }
    }
}

/// Result of a scan accepted by the service.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScanOutcome {
    pub unit: UnitView,
    pub remaining: usize,
    pub completion: Option<LotCompletion>,
    pub summary: SessionSummary,
}

/// A unit or lot that could not be persisted during submission.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmitFailure {
    pub lot_no: LotNo,
    /// `None` when the failure concerns the lot's weight totals.
    pub fg_roll_no: Option<RollNo>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmitReport {
    pub dispatch_order_id: DispatchOrderId,
    pub submitted: usize,
    pub failures: Vec<SubmitFailure>,
}

impl SubmitReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Loaded rolls of one lot.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HistoryLot {
    pub lot_no: LotNo,
    pub rolls: Vec<DispatchRoll>,
    pub gross_weight: Weight,
    pub net_weight: Weight,
}

/// Everything loaded so far against a dispatch order.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DispatchHistory {
    pub dispatch_order_id: DispatchOrderId,
    pub lots: Vec<HistoryLot>,
    pub total_rolls: usize,
    pub gross_weight: Weight,
    pub net_weight: Weight,
}

impl DispatchHistory {
    /// Groups rolls by lot number, lots in ascending order.
    pub fn new(dispatch_order_id: DispatchOrderId, rolls: Vec<DispatchRoll>) -> Self {
        let total_rolls = rolls.len();
        let mut grouped: BTreeMap<LotNo, HistoryLot> = BTreeMap::new();

        for roll in rolls {
            let lot = grouped
                .entry(roll.lot_no.clone())
                .or_insert_with(|| HistoryLot {
                    lot_no: roll.lot_no.clone(),
                    rolls: Vec::new(),
                    gross_weight: Weight::ZERO,
                    net_weight: Weight::ZERO,
                });
            lot.gross_weight = lot.gross_weight.add(roll.gross_weight);
            lot.net_weight = lot.net_weight.add(roll.net_weight);
            lot.rolls.push(roll);
        }

        let lots: Vec<HistoryLot> = grouped.into_values().collect();
        let (gross_weight, net_weight) = lots.iter().fold(
            (Weight::ZERO, Weight::ZERO),
            |(gross, net), lot| (gross.add(lot.gross_weight), net.add(lot.net_weight)),
        );

        Self {
            dispatch_order_id,
            lots,
            total_rolls,
            gross_weight,
            net_weight,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::domain::types::DispatchRollId;

    fn roll(id: i32, lot_no: &str, gross: f64, net: f64) -> DispatchRoll {
        DispatchRoll {
            id: DispatchRollId::new(id).unwrap(),
            dispatch_order_id: DispatchOrderId::new("DO1").unwrap(),
            lot_no: LotNo::new(lot_no).unwrap(),
            machine_name: MachineName::new("M1").unwrap(),
            roll_no: RollNo::new(format!("R{id}")).unwrap(),
            fg_roll_no: RollNo::new(format!("R{id}")).unwrap(),
            gross_weight: Weight::new(gross).unwrap(),
            net_weight: Weight::new(net).unwrap(),
            variant: WorkflowVariant::Load,
            created_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn history_groups_rolls_by_lot() {
        let history = DispatchHistory::new(
            DispatchOrderId::new("DO1").unwrap(),
            vec![
                roll(1, "L2", 10.0, 9.0),
                roll(2, "L1", 5.0, 4.5),
                roll(3, "L2", 11.0, 10.0),
            ],
        );

        assert_eq!(history.total_rolls, 3);
        let lots: Vec<&str> = history.lots.iter().map(|lot| lot.lot_no.as_str()).collect();
        assert_eq!(lots, vec!["L1", "L2"]);
        assert_eq!(history.lots[1].rolls.len(), 2);
        assert_eq!(history.lots[1].gross_weight.get(), 21.0);
        assert_eq!(history.gross_weight.get(), 26.0);
        assert_eq!(history.net_weight.get(), 23.5);
    }

    #[test]
    fn empty_summary_cannot_submit() {
        let summary = SessionSummary::empty(WorkflowVariant::Pick, BusyState::Idle);
        assert!(!summary.can_submit);
        assert!(summary.lots.is_empty());
    }
}
