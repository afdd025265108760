use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::session::ScannedUnit;
use crate::domain::types::{DispatchOrderId, DispatchRollId, LotNo, MachineName, RollNo, Weight};
use crate::domain::variant::WorkflowVariant;

/// A roll loaded against a dispatch order.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DispatchRoll {
    pub id: DispatchRollId,
    pub dispatch_order_id: DispatchOrderId,
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
    pub fg_roll_no: RollNo,
    pub gross_weight: Weight,
    pub net_weight: Weight,
    pub variant: WorkflowVariant,
    pub created_at: NaiveDateTime,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NewDispatchRoll {
    pub dispatch_order_id: DispatchOrderId,
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
    pub fg_roll_no: RollNo,
    pub gross_weight: Weight,
    pub net_weight: Weight,
    pub variant: WorkflowVariant,
    pub created_at: NaiveDateTime,
}

impl NewDispatchRoll {
    /// Builds the record for a scanned unit being submitted now.
    #[must_use]
    pub fn from_unit(
        dispatch_order_id: &DispatchOrderId,
        variant: WorkflowVariant,
        unit: &ScannedUnit,
    ) -> Self {
        Self {
            dispatch_order_id: dispatch_order_id.clone(),
            lot_no: unit.lot_no.clone(),
            machine_name: unit.machine_name.clone(),
            roll_no: unit.roll_no.clone(),
            fg_roll_no: unit.fg_roll_no.clone(),
            gross_weight: unit.weight.gross,
            net_weight: unit.weight.net,
            variant,
            created_at: Utc::now().naive_utc(),
        }
    }
}
