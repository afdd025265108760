//! Pick, load and pick-load operations on a workstation.
//!
//! Every function works on the session kept in [`SessionRegistry`] and
//! reaches storage only through the repository traits, so the same code
//! serves the web screens and the terminal scan station.

use chrono::Utc;

use crate::domain::dispatch_roll::NewDispatchRoll;
use crate::domain::scan::ScanCode;
use crate::domain::session::{BusyState, DispatchSession, LotWeight, ScannedUnit};
use crate::domain::storage::{RollKey, RollWeight};
use crate::domain::types::{DispatchOrderId, LotNo, UnitId, Weight};
use crate::domain::variant::WorkflowVariant;
use crate::dto::workflow::{ScanOutcome, SessionSummary, SubmitFailure, SubmitReport, UnitView};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DispatchPlanReader, DispatchPlanWriter, DispatchRollWriter, RollConfirmationReader,
    StorageReader, StorageWriter, StoredRollQuery,
};
use crate::services::registry::{SessionRegistry, Workstation, WorkstationKey};
use crate::services::{WorkflowError, WorkflowResult};

fn summarize(station: &Workstation, variant: WorkflowVariant) -> SessionSummary {
    match station.session() {
        Some(session) => SessionSummary::from_session(session, station.busy()),
        None => SessionSummary::empty(variant, station.busy()),
    }
}

/// Current state of the operator's workstation.
pub fn load_session_summary(registry: &SessionRegistry, key: &WorkstationKey) -> SessionSummary {
    registry.with_station(key, |station| summarize(station, key.variant))
}

/// Looks up the order's lots and starts a new session for it.
///
/// Any previous session is dropped first, so a failed lookup leaves the
/// workstation without a selected order.
pub fn validate_dispatch_order<R>(
    repo: &R,
    registry: &SessionRegistry,
    key: &WorkstationKey,
    raw_order_id: &str,
) -> WorkflowResult<SessionSummary>
where
    R: DispatchPlanReader + ?Sized,
{
    let dispatch_order_id = DispatchOrderId::new(raw_order_id)?;
    let guard = registry.begin(key, BusyState::Validating)?;

    registry.with_station(key, |station| station.reset());

    let lots = repo
        .list_lots_by_dispatch_order(&dispatch_order_id)
        .map_err(|err| {
            log::error!("Failed to load lots of dispatch order {dispatch_order_id}: {err}");
            err
        })?;

    let session = DispatchSession::start(key.variant, dispatch_order_id, lots).map_err(|err| {
        log::warn!("Dispatch order rejected for {}: {err}", key.operator);
        err
    })?;

    log::info!(
        "Operator {} started {} of dispatch order {} with {} lots",
        key.operator,
        key.variant,
        session.dispatch_order_id(),
        session.lots().len()
    );

    registry.with_station(key, |station| station.replace(session));
    drop(guard);

    Ok(load_session_summary(registry, key))
}

/// Drops the selected order and its scans.
pub fn reset_dispatch_order(registry: &SessionRegistry, key: &WorkstationKey) -> WorkflowResult<()> {
    registry.with_station(key, |station| -> WorkflowResult<()> {
        station.ensure_idle()?;
        if let Some(session) = station.reset() {
            log::info!(
                "Operator {} left dispatch order {} with {} unsubmitted rolls",
                key.operator,
                session.dispatch_order_id(),
                session.scanned_units().len()
            );
        }
        Ok(())
    })
}

/// Validates a raw label and appends it to the active lot.
///
/// Label checks run against the session first so obviously wrong scans
/// never reach storage. Variants that cross-check storage then confirm the
/// roll exists and belongs to the order. Missing weights are recorded as
/// zero.
pub fn scan_roll<R>(
    repo: &R,
    registry: &SessionRegistry,
    key: &WorkstationKey,
    raw: &str,
) -> WorkflowResult<ScanOutcome>
where
    R: StorageReader + RollConfirmationReader + ?Sized,
{
    let (code, dispatch_order_id) = registry.with_station(key, |station| -> WorkflowResult<_> {
        station.ensure_idle()?;
        let session = station.session().ok_or(WorkflowError::NoSession)?;
        if session.active_lot().is_none() {
            return Err(WorkflowError::NoActiveLot);
        }
        let code = ScanCode::parse(raw, session.variant())?;
        session.check_scan(&code)?;
        Ok((code, session.dispatch_order_id().clone()))
    })?;

    if key.variant.cross_checks_storage() {
        verify_stored_roll(repo, key.variant, &code, &dispatch_order_id)?;
    }
    let weight = lookup_weight(repo, &code);

    registry.with_station(key, |station| -> WorkflowResult<ScanOutcome> {
        let busy = station.busy();
        let session = station
            .session_mut()
            .filter(|session| session.dispatch_order_id() == &dispatch_order_id)
            .ok_or(WorkflowError::NoSession)?;

        let accepted = session.accept_scan(code, weight, Utc::now().naive_utc())?;
        log::debug!(
            "Accepted roll {} for lot {}, {} remaining",
            accepted.unit.fg_roll_no,
            accepted.unit.lot_no,
            accepted.remaining
        );
        if let Some(completion) = &accepted.completion {
            log::info!(
                "Lot {} of dispatch order {dispatch_order_id} is complete",
                completion.lot_no
            );
        }

        Ok(ScanOutcome {
            unit: UnitView::from(&accepted.unit),
            remaining: accepted.remaining,
            completion: accepted.completion,
            summary: SessionSummary::from_session(session, busy),
        })
    })
}

fn verify_stored_roll<R>(
    repo: &R,
    variant: WorkflowVariant,
    code: &ScanCode,
    dispatch_order_id: &DispatchOrderId,
) -> WorkflowResult<()>
where
    R: StorageReader + ?Sized,
{
    let stored = repo
        .find_stored_roll(&StoredRollQuery::from(code))
        .map_err(|err| {
            log::error!("Failed to look up roll {} in storage: {err}", code.unit_roll_no());
            err
        })?
        .ok_or_else(|| WorkflowError::UnitNotFound {
            roll_no: code.unit_roll_no().clone(),
            lot_no: code.lot_no.clone(),
        })?;

    if stored.is_dispatched {
        return Err(WorkflowError::AlreadyLoaded {
            roll_no: code.unit_roll_no().clone(),
            lot_no: code.lot_no.clone(),
        });
    }

    let assigned = stored.dispatch_order_id.as_ref();
    let belongs_elsewhere = match variant {
        // Loading only accepts rolls picked for this order.
        WorkflowVariant::Load => assigned != Some(dispatch_order_id),
        _ => assigned.is_some_and(|assigned| assigned != dispatch_order_id),
    };

    if belongs_elsewhere {
        return Err(WorkflowError::WrongDispatchOrder {
            roll_no: code.unit_roll_no().clone(),
            expected: dispatch_order_id.clone(),
        });
    }
    Ok(())
}

fn lookup_weight<R>(repo: &R, code: &ScanCode) -> RollWeight
where
    R: RollConfirmationReader + ?Sized,
{
    match repo.find_roll_weight(&RollKey::from(code)) {
        Ok(Some(weight)) => weight,
        Ok(None) => {
            log::warn!(
                "No confirmed weight for roll {} of lot {}",
                code.roll_no,
                code.lot_no
            );
            RollWeight::default()
        }
        Err(err) => {
            log::warn!("Failed to load weight of roll {}: {err}", code.roll_no);
            RollWeight::default()
        }
    }
}

/// Removes a scanned unit. Unknown ids and a missing session are ignored.
pub fn remove_unit(
    registry: &SessionRegistry,
    key: &WorkstationKey,
    unit_id: UnitId,
) -> Option<ScannedUnit> {
    registry.with_station(key, |station| {
        station
            .session_mut()
            .and_then(|session| session.remove_unit(unit_id))
    })
}

/// Moves to the next lot once the active one has all of its rolls.
pub fn advance_lot(registry: &SessionRegistry, key: &WorkstationKey) -> WorkflowResult<SessionSummary> {
    registry.with_station(key, |station| -> WorkflowResult<SessionSummary> {
        station.ensure_idle()?;
        let session = station.session_mut().ok_or(WorkflowError::NoSession)?;
        let active = session.active_lot().ok_or(WorkflowError::NoActiveLot)?;
        if session.remaining_for(active) > 0 {
            return Err(WorkflowError::IncompleteLots(vec![active.lot_no.clone()]));
        }
        session.advance_lot();
        Ok(summarize(station, key.variant))
    })
}

/// Persists every scanned unit of the session.
///
/// Units are written one after another; a failing unit is reported and the
/// rest are still attempted. The scanned set is cleared afterwards while
/// the order stays selected for the next round.
pub fn submit_scans<R>(
    repo: &R,
    registry: &SessionRegistry,
    key: &WorkstationKey,
) -> WorkflowResult<SubmitReport>
where
    R: StorageWriter + DispatchRollWriter + DispatchPlanWriter + ?Sized,
{
    let guard = registry.begin(key, BusyState::Submitting)?;

    let (dispatch_order_id, units, mut lot_weights) = registry.with_station(key, |station| -> WorkflowResult<_> {
        let session = station.session().ok_or(WorkflowError::NoSession)?;
        session.check_submittable()?;
        let lot_weights: Vec<(LotNo, LotWeight)> = if key.variant.tracks_lot_weights() {
            session
                .lots()
                .iter()
                .map(|lot| (lot.lot_no.clone(), session.lot_weight(&lot.lot_no)))
                .collect()
        } else {
            Vec::new()
        };
        Ok((
            session.dispatch_order_id().clone(),
            session.scanned_units().to_vec(),
            lot_weights,
        ))
    })?;

    let mut failures = Vec::new();
    let mut submitted = 0;

    for unit in &units {
        match submit_unit(repo, key.variant, &dispatch_order_id, unit) {
            Ok(()) => submitted += 1,
            Err(err) => {
                log::error!(
                    "Failed to submit roll {} of lot {} for dispatch order {dispatch_order_id}: {err}",
                    unit.fg_roll_no,
                    unit.lot_no
                );
                if let Some((_, totals)) = lot_weights.iter_mut().find(|(lot_no, _)| lot_no == &unit.lot_no) {
                    totals.gross = totals.gross.saturating_sub(unit.weight.gross);
                    totals.net = totals.net.saturating_sub(unit.weight.net);
                }
                failures.push(SubmitFailure {
                    lot_no: unit.lot_no.clone(),
                    fg_roll_no: Some(unit.fg_roll_no.clone()),
                    message: err.to_string(),
                });
            }
        }
    }

    let mut recorded = Vec::new();
    for (lot_no, totals) in lot_weights {
        if totals.gross == Weight::ZERO && totals.net == Weight::ZERO {
            continue;
        }
        match repo.add_lot_weights(&dispatch_order_id, &lot_no, totals.gross, totals.net) {
            Ok(()) => recorded.push((lot_no, totals)),
            Err(err) => {
                log::error!("Failed to update weights of lot {lot_no}: {err}");
                failures.push(SubmitFailure {
                    lot_no,
                    fg_roll_no: None,
                    message: err.to_string(),
                });
            }
        }
    }

    registry.with_station(key, |station| {
        if let Some(session) = station
            .session_mut()
            .filter(|session| session.dispatch_order_id() == &dispatch_order_id)
        {
            for (lot_no, totals) in &recorded {
                session.record_lot_weight(lot_no, *totals);
            }
            session.clear_scans();
        }
    });
    drop(guard);

    log::info!(
        "Operator {} submitted {submitted} of {} rolls for dispatch order {dispatch_order_id}",
        key.operator,
        units.len()
    );

    Ok(SubmitReport {
        dispatch_order_id,
        submitted,
        failures,
    })
}

fn submit_unit<R>(
    repo: &R,
    variant: WorkflowVariant,
    dispatch_order_id: &DispatchOrderId,
    unit: &ScannedUnit,
) -> RepositoryResult<()>
where
    R: StorageWriter + DispatchRollWriter + ?Sized,
{
    let key = RollKey::from(unit);
    match variant {
        WorkflowVariant::Pick => repo.mark_roll_picked(&key, dispatch_order_id),
        WorkflowVariant::Load | WorkflowVariant::PickLoad => {
            repo.mark_roll_dispatched(&key, dispatch_order_id)?;
            repo.create_dispatch_roll(&NewDispatchRoll::from_unit(dispatch_order_id, variant, unit))?;
            Ok(())
        }
    }
}


#[cfg(all(test, feature = "test-mocks"))]
mod mock_tests {
    use super::*;
    use crate::domain::session::tests::lot;
    use crate::repository::errors::RepositoryError;
    use crate::repository::mock::MockRepository;

    #[test]
    fn storage_outage_surfaces_as_network_failure() {
        let mut repo = MockRepository::new();
        repo.expect_list_lots_by_dispatch_order()
            .returning(|_| Ok(vec![lot(1, "L1", 1, 2)]));
        repo.expect_find_stored_roll()
            .times(1)
            .returning(|_| Err(RepositoryError::ConnectionError("timeout".into())));
        repo.expect_find_roll_weight().never();

        let registry = SessionRegistry::new();
        let key = WorkstationKey::new("operator-1", WorkflowVariant::Load);
        validate_dispatch_order(&repo, &registry, &key, "DO1").unwrap();

        let err = scan_roll(&repo, &registry, &key, "L1#M1#R1").unwrap_err();
        assert!(matches!(err, WorkflowError::NetworkFailure(_)));
        assert!(load_session_summary(&registry, &key).units.is_empty());
    }

    #[test]
    fn weight_lookup_failure_records_zero_weight() {
        let mut repo = MockRepository::new();
        repo.expect_list_lots_by_dispatch_order()
            .returning(|_| Ok(vec![lot(1, "L1", 1, 2)]));
        repo.expect_find_roll_weight()
            .returning(|_| Err(RepositoryError::ConnectionError("timeout".into())));

        let registry = SessionRegistry::new();
        let key = WorkstationKey::new("operator-1", WorkflowVariant::Pick);
        validate_dispatch_order(&repo, &registry, &key, "DO1").unwrap();

        let outcome = scan_roll(&repo, &registry, &key, "L1#M1#R1").unwrap();
        assert_eq!(outcome.unit.gross_weight, Weight::ZERO);
    }
}
