pub mod create_invoice_command;
pub mod transition_invoice_command;

pub use create_invoice_command::CreateInvoiceCommand;
pub use transition_invoice_command::{PaymentDetails, TransitionInvoiceCommand};

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::errors::{FieldErrors, ServiceError};

/// Cross-field rules shared by invoice create and update.
pub(crate) fn check_invoice_amounts(
    amount: Decimal,
    tax_amount: Decimal,
    discount_amount: Decimal,
    invoice_date: NaiveDate,
    due_date: Option<NaiveDate>,
) -> Result<(), ServiceError> {
    let mut errors = FieldErrors::new();
    if discount_amount > amount + tax_amount {
        errors.insert(
            "discount_amount".to_string(),
            vec!["discount_amount may not exceed amount plus tax".to_string()],
        );
    }
    if matches!(due_date, Some(due) if due < invoice_date) {
        errors.insert(
            "due_date".to_string(),
            vec!["due_date must not be before invoice_date".to_string()],
        );
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ServiceError::ValidationError(errors))
    }
}
