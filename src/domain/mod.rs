//! Domain aggregates and the dispatch workflow state machine.

pub mod dispatch_roll;
pub mod errors;
pub mod lot;
pub mod scan;
pub mod scan_buffer;
pub mod session;
pub mod storage;
pub mod types;
pub mod variant;
