use chrono::Utc;
use diesel::prelude::*;

use crate::domain::lot::Lot;
use crate::domain::types::{DispatchOrderId, LotNo, Weight};
use crate::models::dispatch_plan::DispatchPlan as DbDispatchPlan;
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, DispatchPlanReader, DispatchPlanWriter};

impl DispatchPlanReader for DieselRepository {
    fn list_lots_by_dispatch_order(
        &self,
        dispatch_order_id: &DispatchOrderId,
    ) -> RepositoryResult<Vec<Lot>> {
        use crate::schema::dispatch_plans;

        let mut conn = self.conn()?;

        let plans = dispatch_plans::table
            .filter(dispatch_plans::dispatch_order_id.eq(dispatch_order_id.as_str()))
            .order((dispatch_plans::sequence_no.asc(), dispatch_plans::id.asc()))
            .select(DbDispatchPlan::as_select())
            .load::<DbDispatchPlan>(&mut conn)?;

        plans
            .into_iter()
            .map(|plan| Lot::try_from(plan).map_err(RepositoryError::from))
            .collect()
    }
}

impl DispatchPlanWriter for DieselRepository {
    fn add_lot_weights(
        &self,
        dispatch_order_id: &DispatchOrderId,
        lot_no: &LotNo,
        gross: Weight,
        net: Weight,
    ) -> RepositoryResult<()> {
        use crate::schema::dispatch_plans;

        let mut conn = self.conn()?;

        let updated = diesel::update(
            dispatch_plans::table
                .filter(dispatch_plans::dispatch_order_id.eq(dispatch_order_id.as_str()))
                .filter(dispatch_plans::lot_no.eq(lot_no.as_str())),
        )
        .set((
            dispatch_plans::total_gross_weight.eq(dispatch_plans::total_gross_weight + gross.get()),
            dispatch_plans::total_net_weight.eq(dispatch_plans::total_net_weight + net.get()),
            dispatch_plans::updated_at.eq(Utc::now().naive_utc()),
        ))
        .execute(&mut conn)?;

        if updated == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
