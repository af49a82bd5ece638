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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum PurchaseOrderStatus {
    #[sea_orm(string_value = "Draft")]
    Draft,
    #[sea_orm(string_value = "Pending Approval")]
    #[serde(rename = "Pending Approval", alias = "PendingApproval")]
    #[strum(to_string = "Pending Approval", serialize = "PendingApproval")]
    PendingApproval,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Issued")]
    Issued,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl Default for PurchaseOrderStatus {
    fn default() -> Self {
        Self::PendingApproval
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum PurchaseOrderAction {
    Submit,
    Approve,
    Issue,
    Complete,
    Cancel,
}

impl PurchaseOrderStatus {
    /// Linear lifecycle: Draft, Pending Approval, Approved, Issued, Completed.
    /// Cancel is accepted from any non-terminal status.
    pub fn apply(self, action: PurchaseOrderAction) -> Result<Self, TransitionError> {
        use PurchaseOrderAction::*;
        match (self, action) {
            (Self::Draft, Submit) => Ok(Self::PendingApproval),
            (Self::PendingApproval, Approve) => Ok(Self::Approved),
            (Self::Approved, Issue) => Ok(Self::Issued),
            (Self::Issued, Complete) => Ok(Self::Completed),
            (status, Cancel) if !status.is_terminal() => Ok(Self::Cancelled),
            (status, action) => Err(TransitionError::new("purchase order", status, action)),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Goods receipts and invoices may only be recorded against orders sent to the vendor.
    pub fn accepts_fulfilment(self) -> bool {
        matches!(self, Self::Issued | Self::Completed)
    }

    /// Statuses a new order may start in.
    pub fn is_initial(self) -> bool {
        matches!(self, Self::Draft | Self::PendingApproval)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "purchase_orders")]
#[schema(as = PurchaseOrder)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub requisition_id: i32,
    pub vendor_id: i32,
    #[sea_orm(unique)]
    pub order_number: String,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))")]
    #[serde(serialize_with = "crate::models::money::serialize")]
    pub total_amount: Decimal,
    pub status: PurchaseOrderStatus,
    pub order_date: NaiveDate,
    pub expected_delivery_date: Option<NaiveDate>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::requisition::Entity",
        from = "Column::RequisitionId",
        to = "super::requisition::Column::Id"
    )]
    Requisition,
    #[sea_orm(
        belongs_to = "super::vendor::Entity",
        from = "Column::VendorId",
        to = "super::vendor::Column::Id"
    )]
    Vendor,
    #[sea_orm(has_many = "super::goods_receipt::Entity")]
    GoodsReceipts,
    #[sea_orm(has_many = "super::invoice::Entity")]
    Invoices,
}

impl Related<super::requisition::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Requisition.def()
    }
}

impl Related<super::vendor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vendor.def()
    }
}

impl Related<super::goods_receipt::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GoodsReceipts.def()
    }
}

impl Related<super::invoice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invoices.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
