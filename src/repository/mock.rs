//! Mock repository implementations for isolating services in tests.

use mockall::mock;

use crate::domain::dispatch_roll::{DispatchRoll, NewDispatchRoll};
use crate::domain::lot::Lot;
use crate::domain::storage::{RollKey, RollWeight, StoredRoll};
use crate::domain::types::{DispatchOrderId, LotNo, Weight};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    DispatchPlanReader, DispatchPlanWriter, DispatchRollReader, DispatchRollWriter,
    RollConfirmationReader, StorageReader, StorageWriter, StoredRollQuery,
};

mock! {
    pub Repository {}

    impl DispatchPlanReader for Repository {
        fn list_lots_by_dispatch_order(
            &self,
            dispatch_order_id: &DispatchOrderId,
        ) -> RepositoryResult<Vec<Lot>>;
    }

    impl DispatchPlanWriter for Repository {
        fn add_lot_weights(
            &self,
            dispatch_order_id: &DispatchOrderId,
            lot_no: &LotNo,
            gross: Weight,
            net: Weight,
        ) -> RepositoryResult<()>;
    }

    impl StorageReader for Repository {
        fn find_stored_roll(&self, query: &StoredRollQuery) -> RepositoryResult<Option<StoredRoll>>;
    }

    impl StorageWriter for Repository {
        fn mark_roll_picked(
            &self,
            key: &RollKey,
            dispatch_order_id: &DispatchOrderId,
        ) -> RepositoryResult<()>;
        fn mark_roll_dispatched(
            &self,
            key: &RollKey,
            dispatch_order_id: &DispatchOrderId,
        ) -> RepositoryResult<()>;
    }

    impl RollConfirmationReader for Repository {
        fn find_roll_weight(&self, key: &RollKey) -> RepositoryResult<Option<RollWeight>>;
    }

    impl DispatchRollReader for Repository {
        fn list_dispatch_rolls(
            &self,
            dispatch_order_id: &DispatchOrderId,
        ) -> RepositoryResult<Vec<DispatchRoll>>;
    }

    impl DispatchRollWriter for Repository {
        fn create_dispatch_roll(&self, roll: &NewDispatchRoll) -> RepositoryResult<DispatchRoll>;
    }
}
