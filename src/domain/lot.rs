use serde::{Deserialize, Serialize};

use crate::domain::types::{DispatchOrderId, DispatchPlanId, LotNo, RollCount, Weight};

/// A lot planned for a dispatch order.
///
/// `sequence_no` is persisted with the plan so the processing order does not
/// depend on the order rows come back from storage.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Lot {
    pub id: DispatchPlanId,
    pub dispatch_order_id: DispatchOrderId,
    pub lot_no: LotNo,
    /// Product label printed on the tape.
    pub tape: String,
    pub sequence_no: i32,
    pub total_ready_rolls: RollCount,
    pub total_dispatched_rolls: RollCount,
    pub is_fully_dispatched: bool,
    pub total_gross_weight: Weight,
    pub total_net_weight: Weight,
}
