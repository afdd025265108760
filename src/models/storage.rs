//! Diesel models for storage captures and roll confirmations.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::storage::{RollWeight, StoredRoll};
use crate::domain::types::{
    DispatchOrderId, LotNo, MachineName, RollNo, StorageCaptureId, TypeConstraintError, Weight,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::storage_captures)]
/// Diesel model for [`StoredRoll`].
pub struct StorageCapture {
    pub id: i32,
    pub lot_no: String,
    pub machine_name: String,
    pub roll_no: String,
    pub fg_roll_no: Option<String>,
    pub dispatch_order_id: Option<String>,
    pub is_dispatched: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::storage_captures)]
pub struct NewStorageCapture<'a> {
    pub lot_no: &'a str,
    pub machine_name: &'a str,
    pub roll_no: &'a str,
    pub fg_roll_no: Option<&'a str>,
    pub dispatch_order_id: Option<&'a str>,
    pub is_dispatched: bool,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::roll_confirmations)]
pub struct RollConfirmation {
    pub id: i32,
    pub lot_no: String,
    pub machine_name: String,
    pub roll_no: String,
    pub gross_weight: f64,
    pub net_weight: f64,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::roll_confirmations)]
pub struct NewRollConfirmation<'a> {
    pub lot_no: &'a str,
    pub machine_name: &'a str,
    pub roll_no: &'a str,
    pub gross_weight: f64,
    pub net_weight: f64,
}

impl TryFrom<StorageCapture> for StoredRoll {
    type Error = TypeConstraintError;

    fn try_from(capture: StorageCapture) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StorageCaptureId::try_from(capture.id)?,
            lot_no: LotNo::new(capture.lot_no)?,
            machine_name: MachineName::new(capture.machine_name)?,
            roll_no: RollNo::new(capture.roll_no)?,
            fg_roll_no: capture.fg_roll_no.map(RollNo::new).transpose()?,
            dispatch_order_id: capture
                .dispatch_order_id
                .filter(|id| !id.trim().is_empty())
                .map(DispatchOrderId::new)
                .transpose()?,
            is_dispatched: capture.is_dispatched,
        })
    }
}

impl TryFrom<RollConfirmation> for RollWeight {
    type Error = TypeConstraintError;

    fn try_from(confirmation: RollConfirmation) -> Result<Self, Self::Error> {
        Ok(Self {
            gross: Weight::new(confirmation.gross_weight)?,
            net: Weight::new(confirmation.net_weight)?,
        })
    }
}
