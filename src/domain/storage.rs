//! Roll records kept by the storage and roll-confirmation desks.

use serde::{Deserialize, Serialize};

use crate::domain::scan::ScanCode;
use crate::domain::session::ScannedUnit;
use crate::domain::types::{DispatchOrderId, LotNo, MachineName, RollNo, StorageCaptureId, Weight};

/// A roll captured into storage after inspection.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct StoredRoll {
    pub id: StorageCaptureId,
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
    pub fg_roll_no: Option<RollNo>,
    /// Dispatch order the roll was picked for, if any.
    pub dispatch_order_id: Option<DispatchOrderId>,
    pub is_dispatched: bool,
}

/// Gross and net weight recorded when the roll was confirmed.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct RollWeight {
    pub gross: Weight,
    pub net: Weight,
}

/// Identifies a physical roll across the storage tables.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RollKey {
    pub lot_no: LotNo,
    pub machine_name: MachineName,
    pub roll_no: RollNo,
}

impl From<&ScanCode> for RollKey {
    fn from(code: &ScanCode) -> Self {
        Self {
            lot_no: code.lot_no.clone(),
            machine_name: code.machine_name.clone(),
            roll_no: code.roll_no.clone(),
        }
    }
}

impl From<&ScannedUnit> for RollKey {
    fn from(unit: &ScannedUnit) -> Self {
        Self {
            lot_no: unit.lot_no.clone(),
            machine_name: unit.machine_name.clone(),
            roll_no: unit.roll_no.clone(),
        }
    }
}
