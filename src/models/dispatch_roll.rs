//! Diesel models for rolls loaded against a dispatch order.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::dispatch_roll::{
    DispatchRoll as DomainDispatchRoll, NewDispatchRoll as DomainNewDispatchRoll,
};
use crate::domain::types::{
    DispatchOrderId, DispatchRollId, LotNo, MachineName, RollNo, TypeConstraintError, Weight,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::dispatch_rolls)]
/// Diesel model for [`crate::domain::dispatch_roll::DispatchRoll`].
pub struct DispatchRoll {
    pub id: i32,
    pub dispatch_order_id: String,
    pub lot_no: String,
    pub machine_name: String,
    pub roll_no: String,
    pub fg_roll_no: String,
    pub gross_weight: f64,
    pub net_weight: f64,
    pub variant: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::dispatch_rolls)]
/// Insertable form of [`DispatchRoll`].
pub struct NewDispatchRoll<'a> {
    pub dispatch_order_id: &'a str,
    pub lot_no: &'a str,
    pub machine_name: &'a str,
    pub roll_no: &'a str,
    pub fg_roll_no: &'a str,
    pub gross_weight: f64,
    pub net_weight: f64,
    pub variant: &'a str,
    pub created_at: NaiveDateTime,
}

impl TryFrom<DispatchRoll> for DomainDispatchRoll {
    type Error = TypeConstraintError;

    fn try_from(roll: DispatchRoll) -> Result<Self, Self::Error> {
        Ok(Self {
            id: DispatchRollId::try_from(roll.id)?,
            dispatch_order_id: DispatchOrderId::new(roll.dispatch_order_id)?,
            lot_no: LotNo::new(roll.lot_no)?,
            machine_name: MachineName::new(roll.machine_name)?,
            roll_no: RollNo::new(roll.roll_no)?,
            fg_roll_no: RollNo::new(roll.fg_roll_no)?,
            gross_weight: Weight::new(roll.gross_weight)?,
            net_weight: Weight::new(roll.net_weight)?,
            variant: roll.variant.parse()?,
            created_at: roll.created_at,
        })
    }
}

impl<'a> From<&'a DomainNewDispatchRoll> for NewDispatchRoll<'a> {
    fn from(roll: &'a DomainNewDispatchRoll) -> Self {
        Self {
            dispatch_order_id: roll.dispatch_order_id.as_str(),
            lot_no: roll.lot_no.as_str(),
            machine_name: roll.machine_name.as_str(),
            roll_no: roll.roll_no.as_str(),
            fg_roll_no: roll.fg_roll_no.as_str(),
            gross_weight: roll.gross_weight.get(),
            net_weight: roll.net_weight.get(),
            variant: roll.variant.as_str(),
            created_at: roll.created_at,
        }
    }
}
