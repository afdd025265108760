//! Storage access for the dispatch workflow.
//!
//! Each concern is split into a reader and a writer trait so services can
//! state exactly what they touch. [`DieselRepository`] implements all of
//! them on top of the SQLite pool.

use crate::db::DbPool;
use crate::domain::dispatch_roll::{DispatchRoll, NewDispatchRoll};
use crate::domain::lot::Lot;
use crate::domain::scan::ScanCode;
use crate::domain::storage::{RollKey, RollWeight, StoredRoll};
use crate::domain::types::{DispatchOrderId, LotNo, RollNo, Weight};
use crate::repository::errors::{RepositoryError, RepositoryResult};

pub mod dispatch_plan;
pub mod dispatch_roll;
pub mod errors;
#[cfg(feature = "test-mocks")]
pub mod mock;
pub mod storage;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<crate::db::DbConnection> {
        self.pool.get().map_err(|e| {
            log::error!("Failed to get connection from pool: {e}");
            RepositoryError::from(e)
        })
    }
}

pub trait DispatchPlanReader {
    /// Lots planned for the order, ordered by their sequence number.
    fn list_lots_by_dispatch_order(
        &self,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<Vec<Lot>>;
}

pub trait DispatchPlanWriter {
    /// Adds a submitted batch's weight to the lot's running totals.
    fn add_lot_weights(
        &self,
        dispatch_order_id: &DispatchOrderId,
        lot_no: &LotNo,
        gross: Weight,
        net: Weight,
    ) -> RepositoryResult<()>;
}

/// Lookup of a storage capture by the fields printed on a roll label.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRollQuery {
    pub key: RollKey,
    /// When set, the capture's finished-goods roll number must match too.
    pub fg_roll_no: Option<RollNo>,
}

impl StoredRollQuery {
    pub fn new(key: RollKey) -> Self {
        Self {
            key,
            fg_roll_no: None,
        }
    }

    pub fn fg_roll_no(mut self, fg_roll_no: RollNo) -> Self {
        self.fg_roll_no = Some(fg_roll_no);
        self
    }
}

impl From<&ScanCode> for StoredRollQuery {
    fn from(code: &ScanCode) -> Self {
        let query = Self::new(RollKey::from(code));
        match &code.fg_roll_no {
            Some(fg_roll_no) => query.fg_roll_no(fg_roll_no.clone()),
            None => query,
        }
    }
}

pub trait StorageReader {
    fn find_stored_roll(&self, query: &StoredRollQuery) -> RepositoryResult<Option<StoredRoll>>;
}

pub trait StorageWriter {
    /// Assigns the roll to the dispatch order.
    fn mark_roll_picked(
        &self,
        key: &RollKey,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<()>;

    /// Assigns the roll to the dispatch order and flags it as dispatched.
    fn mark_roll_dispatched(
        &self,
        key: &RollKey,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<()>;
}

pub trait RollConfirmationReader {
    /// Weights recorded at roll confirmation, latest first.
    fn find_roll_weight(&self, key: &RollKey) -> RepositoryResult<Option<RollWeight>>;
}

pub trait DispatchRollReader {
    fn list_dispatch_rolls(
        &self,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<Vec<DispatchRoll>>;
}

pub trait DispatchRollWriter {
    fn create_dispatch_roll(&self, roll: &NewDispatchRoll) -> RepositoryResult<DispatchRoll>;
}
