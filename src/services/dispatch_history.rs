use crate::domain::types::DispatchOrderId;
use crate::dto::workflow::DispatchHistory;
use crate::repository::DispatchRollReader;
use crate::services::WorkflowResult;

/// Returns the rolls loaded so far against a dispatch order, grouped by lot.
pub fn load_dispatch_history<R>(repo: &R, raw_order_id: &str) -> WorkflowResult<DispatchHistory>
where
    R: DispatchRollReader + ?Sized,
{
    let dispatch_order_id = DispatchOrderId::new(raw_order_id)?;

    let rolls = repo.list_dispatch_rolls(&dispatch_order_id).map_err(|err| {
        log::error!("Failed to list dispatch rolls of {dispatch_order_id}: {err}");
        err
    })?;

    Ok(DispatchHistory::new(dispatch_order_id, rolls))
}
