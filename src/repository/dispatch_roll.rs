use diesel::prelude::*;

use crate::domain::dispatch_roll::{DispatchRoll, NewDispatchRoll};
use crate::domain::types::DispatchOrderId;
use crate::models::dispatch_roll::{
    DispatchRoll as DbDispatchRoll, NewDispatchRoll as DbNewDispatchRoll,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, DispatchRollReader, DispatchRollWriter};

impl DispatchRollReader for DieselRepository {
    fn list_dispatch_rolls(
        &self,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<Vec<DispatchRoll>> {
        use crate::schema::dispatch_rolls;

        let mut conn = self.conn()?;

        let rolls = dispatch_rolls::table
            .filter(dispatch_rolls::dispatch_order_id.eq(dispatch_order_id.as_str()))
            .order((dispatch_rolls::created_at.asc(), dispatch_rolls::id.asc()))
            .select(DbDispatchRoll::as_select())
            .load::<DbDispatchRoll>(&mut conn)?;

        rolls
            .into_iter()
            .map(|roll| DispatchRoll::try_from(roll).map_err(RepositoryError::from))
            .collect()
    }
}

impl DispatchRollWriter for DieselRepository {
    fn create_dispatch_roll(&self, roll: &NewDispatchRoll) -> RepositoryResult<DispatchRoll> {
        use crate::schema::dispatch_rolls;

        let mut conn = self.conn()?;

        let insertable: DbNewDispatchRoll = roll.into();

        let created = diesel::insert_into(dispatch_rolls::table)
            .values(&insertable)
            .returning(DbDispatchRoll::as_returning())
            .get_result::<DbDispatchRoll>(&mut conn)?;

        DispatchRoll::try_from(created).map_err(RepositoryError::from)
    }
}
