use chrono::Utc;
use diesel::prelude::*;

use crate::domain::storage::{RollKey, RollWeight, StoredRoll};
use crate::domain::types::DispatchOrderId;
use crate::models::storage::{RollConfirmation as DbRollConfirmation, StorageCapture};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    DieselRepository, RollConfirmationReader, StorageReader, StorageWriter, StoredRollQuery,
};

impl StorageReader for DieselRepository {
    fn find_stored_roll(&self, query: &StoredRollQuery) -> RepositoryResult<Option<StoredRoll>> {
        use crate::schema::storage_captures;

        let mut conn = self.conn()?;

        let key = &query.key;
        let mut items = storage_captures::table
            .filter(storage_captures::lot_no.eq(key.lot_no.as_str()))
            .filter(storage_captures::machine_name.eq(key.machine_name.as_str()))
            .filter(storage_captures::roll_no.eq(key.roll_no.as_str()))
            .into_boxed::<diesel::sqlite::Sqlite>();

        if let Some(fg_roll_no) = &query.fg_roll_no {
            // Captures taken before finishing carry no finished-goods number yet.
            items = items.filter(
                storage_captures::fg_roll_no
                    .is_null()
                    .or(storage_captures::fg_roll_no.assume_not_null().eq(fg_roll_no.as_str())),
            );
        }

        let capture = items
            .select(StorageCapture::as_select())
            .first::<StorageCapture>(&mut conn)
            .optional()?;

        capture
            .map(|capture| StoredRoll::try_from(capture).map_err(RepositoryError::from))
            .transpose()
    }
}

impl StorageWriter for DieselRepository {
    fn mark_roll_picked(
        &self,
        key: &RollKey,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<()> {
        use crate::schema::storage_captures;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            storage_captures::table
                .filter(storage_captures::lot_no.eq(key.lot_no.as_str()))
                .filter(storage_captures::machine_name.eq(key.machine_name.as_str()))
                .filter(storage_captures::roll_no.eq(key.roll_no.as_str())),
        )
        .set((
            storage_captures::dispatch_order_id.eq(Some(dispatch_order_id.as_str())),
            storage_captures::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn mark_roll_dispatched(
        &self,
        key: &RollKey,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<()> {
        use crate::schema::storage_captures;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            storage_captures::table
                .filter(storage_captures::lot_no.eq(key.lot_no.as_str()))
                .filter(storage_captures::machine_name.eq(key.machine_name.as_str()))
                .filter(storage_captures::roll_no.eq(key.roll_no.as_str())),
        )
        .set((
            storage_captures::dispatch_order_id.eq(Some(dispatch_order_id.as_str())),
            storage_captures::is_dispatched.eq(true),
            storage_captures::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

impl RollConfirmationReader for DieselRepository {
    fn find_roll_weight(&self, key: &RollKey) -> RepositoryResult<Option<RollWeight>> {
        use crate::schema::roll_confirmations;

        let mut conn = self.conn()?;

        let confirmation = roll_confirmations::table
            .filter(roll_confirmations::lot_no.eq(key.lot_no.as_str()))
            .filter(roll_confirmations::machine_name.eq(key.machine_name.as_str()))
            .filter(roll_confirmations::roll_no.eq(key.roll_no.as_str()))
            .order((
                roll_confirmations::created_at.desc(),
                roll_confirmations::id.desc(),
            ))
            .select(DbRollConfirmation::as_select())
            .first::<DbRollConfirmation>(&mut conn)
            .optional()?;

        confirmation
            .map(|confirmation| RollWeight::try_from(confirmation).map_err(RepositoryError::from))
            .transpose()
    }
}
