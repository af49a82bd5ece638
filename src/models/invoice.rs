use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::TransitionError;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Paid")]
    Paid,
    /// Legacy stored value; new rows derive overdue from the due date instead.
    #[sea_orm(string_value = "Overdue")]
    Overdue,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl Default for InvoiceStatus {
    fn default() -> Self {
        Self::Pending
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
    strum::EnumString,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "Bank Transfer")]
    #[serde(rename = "Bank Transfer")]
    #[strum(to_string = "Bank Transfer")]
    BankTransfer,
    #[sea_orm(string_value = "Check")]
    Check,
    #[sea_orm(string_value = "Credit Card")]
    #[serde(rename = "Credit Card")]
    #[strum(to_string = "Credit Card")]
    CreditCard,
    #[sea_orm(string_value = "Cash")]
    Cash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum InvoiceAction {
    Submit,
    Pay,
    Cancel,
}

impl InvoiceStatus {
    pub fn apply(self, action: InvoiceAction) -> Result<Self, TransitionError> {
        use InvoiceAction::*;
        match (self, action) {
            (Self::Draft, Submit) => Ok(Self::Pending),
            (Self::Pending | Self::Overdue, Pay) => Ok(Self::Paid),
            (status, Cancel) if !matches!(status, Self::Paid | Self::Cancelled) => {
                Ok(Self::Cancelled)
            }
            (status, action) => Err(TransitionError::new("invoice", status, action)),
        }
    }

    /// Statuses a new invoice may start in.
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Draft | Self::Pending)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "invoices")]
#[schema(as = Invoice)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub purchase_order_id: i32,
    #[sea_orm(unique)]
    pub invoice_number: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub tax_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub discount_amount: Decimal,
    pub status: InvoiceStatus,
    pub invoice_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    pub payment_method: Option<PaymentMethod>,
    pub reference_number: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_order::Entity",
        from = "Column::PurchaseOrderId",
        to = "super::purchase_order::Column::Id"
    )]
    PurchaseOrder,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrder.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Amount plus tax, less discount.
    pub fn net_amount(&self) -> Decimal {
        self.amount + self.tax_amount - self.discount_amount
    }

    /// Pending invoices become overdue the day after their due date.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match self.status {
            InvoiceStatus::Overdue => true,
            InvoiceStatus::Pending => self.due_date.map(|due| due < today).unwrap_or(false),
            _ => false,
        }
    }

    /// Status as presented to clients: Pending reads as Overdue once past due.
    pub fn effective_status(&self, today: NaiveDate) -> InvoiceStatus {
        if self.is_overdue(today) {
            InvoiceStatus::Overdue
        } else {
            self.status
        }
    }

    /// Days left until the due date; negative once past due.
    pub fn days_until_due(&self, today: NaiveDate) -> Option<i64> {
        self.due_date.map(|due| (due - today).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn invoice(status: InvoiceStatus, due: Option<NaiveDate>) -> Model {
        let now = Utc::now();
        Model {
            id: 1,
            purchase_order_id: 1,
            invoice_number: "INV2024060001".into(),
            amount: dec!(1000.00),
            tax_amount: dec!(80.00),
            discount_amount: dec!(30.00),
            status,
            invoice_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            due_date: due,
            paid_date: None,
            payment_method: None,
            reference_number: None,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    #[test]
    fn net_amount_applies_tax_and_discount() {
        assert_eq!(invoice(InvoiceStatus::Pending, None).net_amount(), dec!(1050.00));
    }

    #[test]
    fn overdue_is_derived_from_due_date() {
        let inv = invoice(InvoiceStatus::Pending, Some(day(10)));
        assert!(!inv.is_overdue(day(10)));
        assert!(inv.is_overdue(day(11)));
        assert_eq!(inv.effective_status(day(11)), InvoiceStatus::Overdue);
        assert_eq!(inv.effective_status(day(9)), InvoiceStatus::Pending);
    }

    #[test]
    fn paid_and_undated_invoices_are_never_overdue() {
        assert!(!invoice(InvoiceStatus::Paid, Some(day(1))).is_overdue(day(20)));
        assert!(!invoice(InvoiceStatus::Pending, None).is_overdue(day(20)));
    }

    #[test]
    fn days_until_due_goes_negative() {
        let inv = invoice(InvoiceStatus::Pending, Some(day(10)));
        assert_eq!(inv.days_until_due(day(7)), Some(3));
        assert_eq!(inv.days_until_due(day(12)), Some(-2));
    }

    #[test]
    fn transitions() {
        use InvoiceAction::*;
        use InvoiceStatus::*;
        assert_eq!(Draft.apply(Submit), Ok(Pending));
        assert_eq!(Pending.apply(Pay), Ok(Paid));
        assert_eq!(Overdue.apply(Pay), Ok(Paid));
        assert!(Draft.apply(Pay).is_err());
        assert!(Paid.apply(Cancel).is_err());
        assert_eq!(Pending.apply(Cancel), Ok(Cancelled));
        assert!(Cancelled.apply(Pay).is_err());
    }

    #[test]
    fn payment_method_uses_display_names() {
        assert_eq!(PaymentMethod::BankTransfer.to_string(), "Bank Transfer");
        assert_eq!(
            serde_json::from_str::<PaymentMethod>("\"Credit Card\"").unwrap(),
            PaymentMethod::CreditCard
        );
    }
}
