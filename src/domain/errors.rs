//! Rejections produced by the dispatch workflow.

use thiserror::Error;

use crate::domain::session::BusyState;
use crate::domain::types::{DispatchOrderId, LotNo, RollNo};

/// Every way a workflow operation can be refused.
///
/// Routes turn each variant into a transient notification for the operator;
/// none of them is retried automatically.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("dispatch order {0} not found")]
    NotFound(DispatchOrderId),

    #[error("dispatch order {0} is already dispatched")]
    AlreadyDispatched(DispatchOrderId),

    #[error("no dispatch order is selected")]
    NoSession,

    #[error("dispatch order has no active lot")]
    NoActiveLot,

    #[error("malformed scan: {0}")]
    MalformedInput(String),

    #[error("roll belongs to lot {scanned}, but lot {active} is active")]
    LotMismatch { scanned: LotNo, active: LotNo },

    #[error("lot {0} already has all of its rolls")]
    LotSaturated(LotNo),

    #[error("roll {roll_no} was already scanned for lot {lot_no}")]
    DuplicateUnit { roll_no: RollNo, lot_no: LotNo },

    #[error("roll {roll_no} of lot {lot_no} is not in storage")]
    UnitNotFound { roll_no: RollNo, lot_no: LotNo },

    #[error("roll {roll_no} of lot {lot_no} has already been dispatched")]
    AlreadyLoaded { roll_no: RollNo, lot_no: LotNo },

    #[error("roll {roll_no} is not assigned to dispatch order {expected}")]
    WrongDispatchOrder {
        roll_no: RollNo,
        expected: DispatchOrderId,
    },

    #[error("no rolls have been scanned")]
    EmptyScanSet,

    #[error("lots not finished: {}", join_lots(.0))]
    IncompleteLots(Vec<LotNo>),

    #[error("workstation is busy ({0})")]
    Busy(BusyState),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("access denied")]
    Unauthorized,

    #[error("backend call failed: {0}")]
    NetworkFailure(String),
}

fn join_lots(lots: &[LotNo]) -> String {
    lots.iter()
        .map(LotNo::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
