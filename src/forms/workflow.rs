//! Forms posted by the workflow screens.

use serde::Deserialize;
use validator::Validate;

use crate::domain::types::DispatchOrderId;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Dispatch order number typed or scanned into the order field.
pub struct SelectOrderForm {
    #[validate(length(min = 1, max = 64))]
    pub dispatch_order_id: String,
}

pub struct SelectOrderPayload {
    pub dispatch_order_id: DispatchOrderId,
}

impl TryFrom<SelectOrderForm> for SelectOrderPayload {
    type Error = FormError;

    fn try_from(form: SelectOrderForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let dispatch_order_id = DispatchOrderId::new(form.dispatch_order_id)
            .map_err(|_| FormError::InvalidDispatchOrder)?;
        Ok(Self { dispatch_order_id })
    }
}

#[derive(Debug, Deserialize, Validate)]
/// Raw label captured by the scanner.
pub struct ScanForm {
    #[validate(length(min = 1, max = 256))]
    pub code: String,
}

pub struct ScanPayload {
    pub code: String,
}

impl TryFrom<ScanForm> for ScanPayload {
    type Error = FormError;

    fn try_from(form: ScanForm) -> Result<Self, Self::Error> {
        form.validate()?;
        let code = form.code.trim();
        if code.is_empty() {
            return Err(FormError::EmptyScan);
        }
        Ok(Self {
            code: code.to_string(),
        })
    }
}
