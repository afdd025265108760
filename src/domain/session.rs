//! In-memory state of one dispatch workflow session.
//!
//! A session is created once a dispatch order has been validated and holds
//! the order's lots, the pointer to the lot currently accepting scans and
//! the rolls scanned so far. Nothing here touches storage: the service layer
//! performs lookups and persistence around these transitions.
//!
//! Invariants kept by every method:
//! * `lots` is never empty and `active_lot_index < lots.len()`;
//! * no two scanned units share the same `(fg_roll_no, lot_no)` pair;
//! * only the active lot accepts scans.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::domain::errors::{WorkflowError, WorkflowResult};
use crate::domain::lot::Lot;
use crate::domain::scan::ScanCode;
use crate::domain::storage::RollWeight;
use crate::domain::types::{DispatchOrderId, LotNo, MachineName, RollNo, UnitId, Weight};
use crate::domain::variant::WorkflowVariant;

/// What a workstation is doing right now.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BusyState {
    #[default]
    Idle,
    Validating,
    Submitting,
}

impl Display for BusyState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BusyState::Idle => write!(f, "idle"),
            BusyState::Validating => write!(f, "validating"),
            BusyState::Submitting => write!(f, "submitting"),
        }
    }
}

/// A roll accepted into the session.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScannedUnit {
    pub id: UnitId,
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
    /// Finished-goods roll number; equals `roll_no` on three-field labels.
    pub fg_roll_no: RollNo,
    pub weight: RollWeight,
    pub scanned_at: NaiveDateTime,
}

impl ScannedUnit {
    fn from_code(code: ScanCode, weight: RollWeight, scanned_at: NaiveDateTime) -> Self {
        let fg_roll_no = code.unit_roll_no().clone();
        Self {
            id: UnitId::new(),
            lot_no: code.lot_no,
            machine_name: code.machine_name,
            roll_no: code.roll_no,
            fg_roll_no,
            weight,
            scanned_at,
        }
    }
}

/// Running gross/net totals of a lot.
#[derive(Clone, Copy, Debug, Default, Serialize, PartialEq)]
pub struct LotWeight {
    pub gross: Weight,
    pub net: Weight,
}

/// Emitted when a scan fills the active lot.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct LotCompletion {
    pub lot_no: LotNo,
    /// Lot that became active, `None` when the completed lot was the last one.
    pub next_lot_no: Option<LotNo>,
}

/// Result of an accepted scan.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ScanAccepted {
    pub unit: ScannedUnit,
    /// Rolls still missing from the lot the unit was scanned into.
    pub remaining: usize,
    pub completion: Option<LotCompletion>,
}

#[derive(Clone, Debug)]
pub struct DispatchSession {
    variant: WorkflowVariant,
    dispatch_order_id: DispatchOrderId,
    lots: Vec<Lot>,
    active_lot_index: usize,
    scanned_units: Vec<ScannedUnit>,
    lot_weights: HashMap<LotNo, LotWeight>,
}

impl DispatchSession {
    /// Starts a session from the lots fetched for `dispatch_order_id`.
    ///
    /// Lots are processed in `sequence_no` order; equal sequence numbers keep
    /// the order they were fetched in.
    pub fn start(
        variant: WorkflowVariant,
        dispatch_order_id: DispatchOrderId,
        mut lots: Vec<Lot>,
    ) -> WorkflowResult<Self> {
        if lots.is_empty() {
            return Err(WorkflowError::NotFound(dispatch_order_id));
        }
        if variant.rejects_dispatched_orders() && lots.iter().any(|lot| lot.is_fully_dispatched) {
            return Err(WorkflowError::AlreadyDispatched(dispatch_order_id));
        }

        lots.sort_by_key(|lot| lot.sequence_no);

        Ok(Self {
            variant,
            dispatch_order_id,
            lots,
            active_lot_index: 0,
            scanned_units: Vec::new(),
            lot_weights: HashMap::new(),
        })
    }

    pub fn variant(&self) -> WorkflowVariant {
        self.variant
    }

    pub fn dispatch_order_id(&self) -> &DispatchOrderId {
        &self.dispatch_order_id
    }

    pub fn lots(&self) -> &[Lot] {
        &self.lots
    }

    pub fn active_lot_index(&self) -> usize {
        self.active_lot_index
    }

    pub fn scanned_units(&self) -> &[ScannedUnit] {
        &self.scanned_units
    }

    pub fn active_lot(&self) -> Option<&Lot> {
        self.lots.get(self.active_lot_index)
    }

    /// Number of units scanned for the given lot.
    pub fn scanned_count(&self, lot_no: &LotNo) -> usize {
        self.scanned_units
            .iter()
            .filter(|unit| &unit.lot_no == lot_no)
            .count()
    }

    pub fn target_count(&self, lot: &Lot) -> usize {
        self.variant.target_count(lot).as_usize()
    }

    pub fn remaining_for(&self, lot: &Lot) -> usize {
        self.target_count(lot)
            .saturating_sub(self.scanned_count(&lot.lot_no))
    }

    pub fn is_lot_finished(&self, lot: &Lot) -> bool {
        self.scanned_count(&lot.lot_no) >= self.target_count(lot)
    }

    /// Rolls still missing from the active lot, zero when there is none.
    pub fn remaining_for_active_lot(&self) -> usize {
        self.active_lot()
            .map_or(0, |lot| self.remaining_for(lot))
    }

    /// Moves to the next lot when there is one. Completion of the current
    /// lot is not checked here.
    pub fn advance_lot(&mut self) -> bool {
        if self.active_lot_index + 1 < self.lots.len() {
            self.active_lot_index += 1;
            true
        } else {
            false
        }
    }

    /// Moves to the first unfinished lot after the active one, if any.
    fn advance_to_unfinished_lot(&mut self) -> bool {
        let next = (self.active_lot_index + 1..self.lots.len())
            .find(|&index| !self.is_lot_finished(&self.lots[index]));
        match next {
            Some(index) => {
                self.active_lot_index = index;
                true
            }
            None => false,
        }
    }

    pub fn all_lots_finished(&self) -> bool {
        self.lots.iter().all(|lot| self.is_lot_finished(lot))
    }

    pub fn unfinished_lots(&self) -> Vec<LotNo> {
        self.lots
            .iter()
            .filter(|lot| !self.is_lot_finished(lot))
            .map(|lot| lot.lot_no.clone())
            .collect()
    }

    /// Checks a parsed label against the active lot without changing state.
    pub fn check_scan(&self, code: &ScanCode) -> WorkflowResult<()> {
        let active = self.active_lot().ok_or(WorkflowError::NoActiveLot)?;

        if code.lot_no != active.lot_no {
            return Err(WorkflowError::LotMismatch {
                scanned: code.lot_no.clone(),
                active: active.lot_no.clone(),
            });
        }

        if self.remaining_for(active) == 0 {
            return Err(WorkflowError::LotSaturated(active.lot_no.clone()));
        }

        let roll_no = code.unit_roll_no();
        if self
            .scanned_units
            .iter()
            .any(|unit| &unit.fg_roll_no == roll_no && unit.lot_no == code.lot_no)
        {
            return Err(WorkflowError::DuplicateUnit {
                roll_no: roll_no.clone(),
                lot_no: code.lot_no.clone(),
            });
        }

        Ok(())
    }

    /// Appends the unit described by `code`.
    ///
    /// The label is checked again so a scan accepted concurrently in between
    /// cannot slip a duplicate in. When the scan fills the active lot and an
    /// unfinished lot follows, the session moves on to it immediately and
    /// reports it through [`ScanAccepted::completion`].
    pub fn accept_scan(
        &mut self,
        code: ScanCode,
        weight: RollWeight,
        scanned_at: NaiveDateTime,
    ) -> WorkflowResult<ScanAccepted> {
        self.check_scan(&code)?;

        let unit = ScannedUnit::from_code(code, weight, scanned_at);
        if self.variant.tracks_lot_weights() {
            let totals = self.lot_weights.entry(unit.lot_no.clone()).or_default();
            totals.gross = totals.gross.add(unit.weight.gross);
            totals.net = totals.net.add(unit.weight.net);
        }
        self.scanned_units.push(unit.clone());

        let remaining = self.remaining_for_active_lot();
        let completion = if remaining == 0 {
            let lot_no = unit.lot_no.clone();
            let next_lot_no = if self.advance_to_unfinished_lot() {
                self.active_lot().map(|lot| lot.lot_no.clone())
            } else {
                None
            };
            Some(LotCompletion {
                lot_no,
                next_lot_no,
            })
        } else {
            None
        };

        Ok(ScanAccepted {
            unit,
            remaining,
            completion,
        })
    }

    /// Removes a unit by id. Unknown ids are ignored.
    ///
    /// Removing a roll from a lot left behind makes that lot active again so
    /// the gap can be refilled.
    pub fn remove_unit(&mut self, id: UnitId) -> Option<ScannedUnit> {
        let position = self.scanned_units.iter().position(|unit| unit.id == id)?;
        let unit = self.scanned_units.remove(position);

        if let Some(index) = self.lots.iter().position(|lot| lot.lot_no == unit.lot_no)
            && index < self.active_lot_index
        {
            self.active_lot_index = index;
        }

        if let Some(totals) = self.lot_weights.get_mut(&unit.lot_no) {
            totals.gross = totals.gross.saturating_sub(unit.weight.gross);
            totals.net = totals.net.saturating_sub(unit.weight.net);
        }

        Some(unit)
    }

    /// Weight accumulated for a lot in variants that track it.
    pub fn lot_weight(&self, lot_no: &LotNo) -> LotWeight {
        self.lot_weights.get(lot_no).copied().unwrap_or_default()
    }

    /// Adds a persisted batch to the lot's recorded totals.
    pub fn record_lot_weight(&mut self, lot_no: &LotNo, weight: LotWeight) {
        if let Some(lot) = self.lots.iter_mut().find(|lot| &lot.lot_no == lot_no) {
            lot.total_gross_weight = lot.total_gross_weight.add(weight.gross);
            lot.total_net_weight = lot.total_net_weight.add(weight.net);
        }
    }

    /// Gross/net totals of the scanned units of a lot, for display.
    pub fn scanned_weight(&self, lot_no: &LotNo) -> LotWeight {
        self.scanned_units
            .iter()
            .filter(|unit| &unit.lot_no == lot_no)
            .fold(LotWeight::default(), |acc, unit| LotWeight {
                gross: acc.gross.add(unit.weight.gross),
                net: acc.net.add(unit.weight.net),
            })
    }

    /// Ensures the scanned set can be submitted.
    pub fn check_submittable(&self) -> WorkflowResult<()> {
        if self.scanned_units.is_empty() {
            return Err(WorkflowError::EmptyScanSet);
        }
        let unfinished = self.unfinished_lots();
        if !unfinished.is_empty() {
            return Err(WorkflowError::IncompleteLots(unfinished));
        }
        Ok(())
    }

    /// Empties the scanned set after submission. The order stays selected and
    /// the next round starts again from the first lot.
    pub fn clear_scans(&mut self) -> Vec<ScannedUnit> {
        self.lot_weights.clear();
        self.active_lot_index = 0;
        std::mem::take(&mut self.scanned_units)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::types::{DispatchPlanId, RollCount};
    use chrono::Utc;

    pub(crate) fn lot(id: i32, lot_no: &str, sequence_no: i32, target: i32) -> Lot {
        Lot {
            id: DispatchPlanId::new(id).unwrap(),
            dispatch_order_id: DispatchOrderId::new("DO1").unwrap(),
            lot_no: LotNo::new(lot_no).unwrap(),
            tape: "Single jersey".to_string(),
            sequence_no,
            total_ready_rolls: RollCount::new(target).unwrap(),
            total_dispatched_rolls: RollCount::new(target).unwrap(),
            is_fully_dispatched: false,
            total_gross_weight: Weight::ZERO,
            total_net_weight: Weight::ZERO,
        }
    }

    fn session(variant: WorkflowVariant) -> DispatchSession {
        DispatchSession::start(
            variant,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L1", 1, 2), lot(2, "L2", 2, 1)],
        )
        .unwrap()
    }

    fn scan(
        session: &mut DispatchSession,
        raw: &str,
        weight: RollWeight,
    ) -> WorkflowResult<ScanAccepted> {
        let code = ScanCode::parse(raw, session.variant())?;
        session.check_scan(&code)?;
        session.accept_scan(code, weight, Utc::now().naive_utc())
    }

    fn weight(gross: f64, net: f64) -> RollWeight {
        RollWeight {
            gross: Weight::new(gross).unwrap(),
            net: Weight::new(net).unwrap(),
        }
    }

    #[test]
    fn empty_lot_list_is_not_found() {
        let order = DispatchOrderId::new("DO404").unwrap();
        let result = DispatchSession::start(WorkflowVariant::Pick, order.clone(), vec![]);
        assert_eq!(result.unwrap_err(), WorkflowError::NotFound(order));
    }

    #[test]
    fn combined_flow_rejects_dispatched_orders() {
        let mut dispatched = lot(1, "L1", 1, 2);
        dispatched.is_fully_dispatched = true;
        let order = DispatchOrderId::new("DO1").unwrap();

        let result =
            DispatchSession::start(WorkflowVariant::PickLoad, order.clone(), vec![dispatched.clone()]);
        assert_eq!(result.unwrap_err(), WorkflowError::AlreadyDispatched(order.clone()));

        assert!(DispatchSession::start(WorkflowVariant::Load, order, vec![dispatched]).is_ok());
    }

    #[test]
    fn lots_follow_sequence_numbers() {
        let session = DispatchSession::start(
            WorkflowVariant::Pick,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L2", 2, 1), lot(2, "L1", 1, 1)],
        )
        .unwrap();
        assert_eq!(session.active_lot().unwrap().lot_no.as_str(), "L1");
    }

    #[test]
    fn sequential_scenario_completes_and_submits() {
        let mut session = session(WorkflowVariant::Pick);

        let first = scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();
        assert_eq!(first.remaining, 1);
        assert_eq!(first.completion, None);

        let mismatch = scan(&mut session, "L2#M1#R9", RollWeight::default()).unwrap_err();
        assert!(matches!(mismatch, WorkflowError::LotMismatch { .. }));
        assert_eq!(session.scanned_units().len(), 1);

        let second = scan(&mut session, "L1#M1#R2", RollWeight::default()).unwrap();
        assert_eq!(second.remaining, 0);
        assert_eq!(
            second.completion,
            Some(LotCompletion {
                lot_no: LotNo::new("L1").unwrap(),
                next_lot_no: Some(LotNo::new("L2").unwrap()),
            })
        );
        assert_eq!(session.active_lot().unwrap().lot_no.as_str(), "L2");

        let last = scan(&mut session, "L2#M1#R9", RollWeight::default()).unwrap();
        assert_eq!(last.completion.unwrap().next_lot_no, None);
        assert!(session.all_lots_finished());
        assert_eq!(session.check_submittable(), Ok(()));

        let submitted = session.clear_scans();
        assert_eq!(submitted.len(), 3);
        assert!(session.scanned_units().is_empty());
        assert_eq!(session.dispatch_order_id().as_str(), "DO1");
    }

    #[test]
    fn next_round_starts_from_the_first_lot() {
        let mut session = DispatchSession::start(
            WorkflowVariant::Pick,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L1", 1, 1), lot(2, "L2", 2, 1)],
        )
        .unwrap();
        scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();
        scan(&mut session, "L2#M1#R9", RollWeight::default()).unwrap();
        session.clear_scans();

        assert_eq!(session.active_lot().unwrap().lot_no.as_str(), "L1");
        scan(&mut session, "L1#M1#R2", RollWeight::default()).unwrap();
        scan(&mut session, "L2#M1#R10", RollWeight::default()).unwrap();
        assert_eq!(session.check_submittable(), Ok(()));
    }

    #[test]
    fn removal_from_an_earlier_lot_makes_it_active_again() {
        let mut session = DispatchSession::start(
            WorkflowVariant::Pick,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L1", 1, 1), lot(2, "L2", 2, 1), lot(3, "L3", 3, 1)],
        )
        .unwrap();
        let first = scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();
        scan(&mut session, "L2#M1#R2", RollWeight::default()).unwrap();
        assert_eq!(session.active_lot().unwrap().lot_no.as_str(), "L3");

        session.remove_unit(first.unit.id).unwrap();
        assert_eq!(session.active_lot().unwrap().lot_no.as_str(), "L1");

        let refill = scan(&mut session, "L1#M1#R5", RollWeight::default()).unwrap();
        assert_eq!(
            refill.completion.unwrap().next_lot_no,
            Some(LotNo::new("L3").unwrap())
        );
        scan(&mut session, "L3#M1#R3", RollWeight::default()).unwrap();
        assert!(session.all_lots_finished());
    }

    #[test]
    fn duplicate_rolls_are_rejected() {
        let mut session = session(WorkflowVariant::Pick);
        scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();

        let err = scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateUnit { .. }));
        assert_eq!(session.scanned_units().len(), 1);
    }

    #[test]
    fn saturated_lot_rejects_more_rolls() {
        let mut session = DispatchSession::start(
            WorkflowVariant::Pick,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L1", 1, 1)],
        )
        .unwrap();
        scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();

        let err = scan(&mut session, "L1#M1#R2", RollWeight::default()).unwrap_err();
        assert_eq!(err, WorkflowError::LotSaturated(LotNo::new("L1").unwrap()));
    }

    #[test]
    fn zero_target_lot_is_saturated_immediately() {
        let session = DispatchSession::start(
            WorkflowVariant::Pick,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L1", 1, 0)],
        )
        .unwrap();
        assert_eq!(session.remaining_for_active_lot(), 0);
        assert!(session.all_lots_finished());
        assert_eq!(session.check_submittable(), Err(WorkflowError::EmptyScanSet));
    }

    #[test]
    fn malformed_scan_changes_nothing() {
        let mut session = session(WorkflowVariant::Pick);
        let err = scan(&mut session, "garbage", RollWeight::default()).unwrap_err();
        assert!(matches!(err, WorkflowError::MalformedInput(_)));
        assert!(session.scanned_units().is_empty());
        assert_eq!(session.active_lot_index(), 0);
    }

    #[test]
    fn incomplete_lots_block_submission() {
        let mut session = session(WorkflowVariant::Pick);
        scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();

        assert_eq!(
            session.check_submittable(),
            Err(WorkflowError::IncompleteLots(vec![
                LotNo::new("L1").unwrap(),
                LotNo::new("L2").unwrap(),
            ]))
        );
    }

    #[test]
    fn advance_lot_stops_at_last_lot() {
        let mut session = session(WorkflowVariant::Pick);
        assert!(session.advance_lot());
        assert!(!session.advance_lot());
        assert_eq!(session.active_lot_index(), 1);
    }

    #[test]
    fn removing_units_adjusts_weights_and_count() {
        let mut session = session(WorkflowVariant::PickLoad);
        let first = scan(&mut session, "L1#M1#R1#FG1", weight(20.0, 18.5)).unwrap();
        scan(&mut session, "L1#M1#R2#FG2", weight(21.0, 19.0)).unwrap();

        let lot_no = LotNo::new("L1").unwrap();
        assert_eq!(session.lot_weight(&lot_no).gross.get(), 41.0);

        let removed = session.remove_unit(first.unit.id).unwrap();
        assert_eq!(removed.fg_roll_no.as_str(), "FG1");
        assert_eq!(session.scanned_units().len(), 1);
        assert_eq!(session.lot_weight(&lot_no).gross.get(), 21.0);
        assert_eq!(session.lot_weight(&lot_no).net.get(), 19.0);

        assert!(session.remove_unit(first.unit.id).is_none());
        assert_eq!(session.scanned_units().len(), 1);
    }

    #[test]
    fn same_roll_number_in_other_lot_is_distinct() {
        let mut session = DispatchSession::start(
            WorkflowVariant::Pick,
            DispatchOrderId::new("DO1").unwrap(),
            vec![lot(1, "L1", 1, 1), lot(2, "L2", 2, 1)],
        )
        .unwrap();
        scan(&mut session, "L1#M1#R1", RollWeight::default()).unwrap();
        scan(&mut session, "L2#M1#R1", RollWeight::default()).unwrap();
        assert!(session.all_lots_finished());
    }
}
