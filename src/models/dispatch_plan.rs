//! Diesel models for the dispatch planning table.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::lot::Lot as DomainLot;
use crate::domain::types::{
    DispatchOrderId, DispatchPlanId, LotNo, RollCount, TypeConstraintError, Weight,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::dispatch_plans)]
/// Diesel model for [`crate::domain::lot::Lot`].
pub struct DispatchPlan {
    pub id: i32,
    pub dispatch_order_id: String,
    pub lot_no: String,
    pub tape: String,
    pub sequence_no: i32,
    pub total_ready_rolls: i32,
    pub total_dispatched_rolls: i32,
    pub is_fully_dispatched: bool,
    pub total_gross_weight: f64,
    pub total_net_weight: f64,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::dispatch_plans)]
/// Insertable form of [`DispatchPlan`], used by seeding and tests.
pub struct NewDispatchPlan<'a> {
    pub dispatch_order_id: &'a str,
    pub lot_no: &'a str,
    pub tape: &'a str,
    pub sequence_no: i32,
    pub total_ready_rolls: i32,
    pub total_dispatched_rolls: i32,
    pub is_fully_dispatched: bool,
}

impl TryFrom<DispatchPlan> for DomainLot {
    type Error = TypeConstraintError;

    fn try_from(plan: DispatchPlan) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DispatchPlanId::try_from(plan.id)?,
            dispatch_order_id: DispatchOrderId::new(plan.dispatch_order_id)?,
            lot_no: LotNo::new(plan.lot_no)?,
            tape: plan.tape,
            sequence_no: plan.sequence_no,
            total_ready_rolls: RollCount::new(plan.total_ready_rolls)?,
            total_dispatched_rolls: RollCount::new(plan.total_dispatched_rolls)?,
            is_fully_dispatched: plan.is_fully_dispatched,
            total_gross_weight: Weight::new(plan.total_gross_weight)?,
            total_net_weight: Weight::new(plan.total_net_weight)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn plan() -> DispatchPlan {
        DispatchPlan {
            id: 3,
            dispatch_order_id: "DO2501001".to_string(),
            lot_no: "L1".to_string(),
            tape: "Rib".to_string(),
            sequence_no: 2,
            total_ready_rolls: 4,
            total_dispatched_rolls: 1,
            is_fully_dispatched: false,
            total_gross_weight: 10.5,
            total_net_weight: 9.75,
            updated_at: Utc::now().naive_utc(),
        }
    }

    #[test]
    fn plan_into_domain() {
        let lot: DomainLot = plan().try_into().unwrap();
        assert_eq!(lot.id.get(), 3);
        assert_eq!(lot.dispatch_order_id.as_str(), "DO2501001");
        assert_eq!(lot.total_ready_rolls.get(), 4);
        assert_eq!(lot.total_net_weight.get(), 9.75);
    }

    #[test]
    fn negative_counts_are_rejected() {
        let mut plan = plan();
        plan.total_ready_rolls = -1;
        assert_eq!(
            DomainLot::try_from(plan).unwrap_err(),
            TypeConstraintError::NegativeCount
        );
    }
}
