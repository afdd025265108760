//! Per-operator workstation state shared between requests.
//!
//! Every operator gets one workstation per workflow variant. The registry
//! lock is only held while reading or mutating a workstation and never
//! across a repository call.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::errors::{WorkflowError, WorkflowResult};
use crate::domain::session::{BusyState, DispatchSession};
use crate::domain::variant::WorkflowVariant;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct WorkstationKey {
    pub operator: String,
    pub variant: WorkflowVariant,
}

impl WorkstationKey {
    pub fn new(operator: impl Into<String>, variant: WorkflowVariant) -> Self {
        Self {
            operator: operator.into(),
            variant,
        }
    }
}

/// State of one operator's screen.
#[derive(Debug, Default)]
pub struct Workstation {
    session: Option<DispatchSession>,
    busy: BusyState,
}

impl Workstation {
    pub fn session(&self) -> Option<&DispatchSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut DispatchSession> {
        self.session.as_mut()
    }

    pub fn busy(&self) -> BusyState {
        self.busy
    }

    /// Drops the selected order together with any scans.
    pub fn reset(&mut self) -> Option<DispatchSession> {
        self.session.take()
    }

    pub fn replace(&mut self, session: DispatchSession) {
        self.session = Some(session);
    }

    pub fn ensure_idle(&self) -> WorkflowResult<()> {
        match self.busy {
            BusyState::Idle => Ok(()),
            state => Err(WorkflowError::Busy(state)),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct SessionRegistry {
    stations: Arc<Mutex<HashMap<WorkstationKey, Workstation>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<WorkstationKey, Workstation>> {
        // A panic inside a closure leaves the map consistent enough to keep serving.
        self.stations.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the workstation, creating it on first use.
    pub fn with_station<T>(&self, key: &WorkstationKey, f: impl FnOnce(&mut Workstation) -> T) -> T {
        let mut stations = self.lock();
        let station = stations.entry(key.clone()).or_default();
        f(station)
    }

    /// Marks the workstation busy until the returned guard is dropped.
    ///
    /// Fails with [`WorkflowError::Busy`] when another validation or
    /// submission is still running.
    pub fn begin(&self, key: &WorkstationKey, state: BusyState) -> WorkflowResult<BusyGuard<'_>> {
        self.with_station(key, |station| -> WorkflowResult<()> {
            station.ensure_idle()?;
            station.busy = state;
            Ok(())
        })?;
        Ok(BusyGuard {
            registry: self,
            key: key.clone(),
        })
    }
}

/// Returns the workstation to [`BusyState::Idle`] when dropped.
#[derive(Debug)]
pub struct BusyGuard<'a> {
    registry: &'a SessionRegistry,
    key: WorkstationKey,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.registry
            .with_station(&self.key, |station| station.busy = BusyState::Idle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key() -> WorkstationKey {
        WorkstationKey::new("operator-1", WorkflowVariant::Pick)
    }

    #[test]
    fn guard_blocks_a_second_operation_until_dropped() {
        let registry = SessionRegistry::new();

        let guard = registry.begin(&key(), BusyState::Submitting).unwrap();
        assert_eq!(
            registry.with_station(&key(), |s| s.busy()),
            BusyState::Submitting
        );
        assert_eq!(
            registry.begin(&key(), BusyState::Validating).unwrap_err(),
            WorkflowError::Busy(BusyState::Submitting)
        );

        drop(guard);
        assert_eq!(registry.with_station(&key(), |s| s.busy()), BusyState::Idle);
        assert!(registry.begin(&key(), BusyState::Validating).is_ok());
    }

    #[test]
    fn workstations_are_isolated_per_operator_and_variant() {
        let registry = SessionRegistry::new();
        let _guard = registry.begin(&key(), BusyState::Validating).unwrap();

        let other_variant = WorkstationKey::new("operator-1", WorkflowVariant::Load);
        let other_operator = WorkstationKey::new("operator-2", WorkflowVariant::Pick);
        assert!(registry.begin(&other_variant, BusyState::Validating).is_ok());
        assert!(registry.begin(&other_operator, BusyState::Validating).is_ok());
    }
}
