//! Procurement entities and their status rules.

pub mod goods_receipt;
pub mod invoice;
pub mod money;
pub mod purchase_order;
pub mod requisition;
pub mod vendor;

use rust_decimal::Decimal;
use validator::ValidationError;

pub use goods_receipt::GoodsCondition;
pub use invoice::{InvoiceAction, InvoiceStatus, PaymentMethod};
pub use purchase_order::{PurchaseOrderAction, PurchaseOrderStatus};
pub use requisition::{Priority, RequisitionAction, RequisitionStatus};

/// A status change refused by an entity's transition table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot {action} {entity} with status '{status}'")]
pub struct TransitionError {
    pub entity: &'static str,
    pub status: String,
    pub action: String,
}

impl TransitionError {
    pub(crate) fn new(
        entity: &'static str,
        status: impl ToString,
        action: impl ToString,
    ) -> Self {
        Self {
            entity,
            status: status.to_string(),
            action: action.to_string(),
        }
    }
}

/// Rejects negative monetary amounts.
pub fn validate_non_negative(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

/// Vendor ratings live on a 0-5 scale.
pub fn validate_rating(value: &Decimal) -> Result<(), ValidationError> {
    if *value < Decimal::ZERO || *value > vendor::MAX_RATING {
        let mut err = ValidationError::new("rating");
        err.message = Some("rating must be between 0 and 5".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn negative_amounts_are_rejected() {
        assert!(validate_non_negative(&dec!(0)).is_ok());
        assert!(validate_non_negative(&dec!(12.50)).is_ok());
        assert!(validate_non_negative(&dec!(-0.01)).is_err());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(validate_rating(&dec!(0)).is_ok());
        assert!(validate_rating(&dec!(5.0)).is_ok());
        assert!(validate_rating(&dec!(5.1)).is_err());
        assert!(validate_rating(&dec!(-1)).is_err());
    }

    #[test]
    fn transition_error_display() {
        let err = TransitionError::new("invoice", InvoiceStatus::Paid, InvoiceAction::Cancel);
        assert_eq!(err.to_string(), "cannot cancel invoice with status 'Paid'");
    }
}
