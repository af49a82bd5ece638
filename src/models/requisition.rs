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
pub enum RequisitionStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
}

impl Default for RequisitionStatus {
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
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum Priority {
    #[sea_orm(string_value = "Low")]
    Low,
    #[sea_orm(string_value = "Medium")]
    Medium,
    #[sea_orm(string_value = "High")]
    High,
    #[sea_orm(string_value = "Urgent")]
    Urgent,
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum RequisitionAction {
    Approve,
    Reject,
}

impl RequisitionStatus {
    /// Only pending requisitions can be decided.
    pub fn apply(self, action: RequisitionAction) -> Result<Self, TransitionError> {
        match (self, action) {
            (Self::Pending, RequisitionAction::Approve) => Ok(Self::Approved),
            (Self::Pending, RequisitionAction::Reject) => Ok(Self::Rejected),
            (status, action) => Err(TransitionError::new("requisition", status, action)),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "requisitions")]
#[schema(as = Requisition)]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub item: String,
    pub quantity: i32,
    pub status: RequisitionStatus,
    pub requested_by: String,
    pub date: NaiveDate,
    pub priority: Priority,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    #[serde(serialize_with = "crate::models::money::option::serialize")]
    pub estimated_cost: Option<Decimal>,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_order::Entity")]
    PurchaseOrders,
}

impl Related<super::purchase_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseOrders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert_eq!(
            RequisitionStatus::Pending.apply(RequisitionAction::Approve),
            Ok(RequisitionStatus::Approved)
        );
        assert_eq!(
            RequisitionStatus::Pending.apply(RequisitionAction::Reject),
            Ok(RequisitionStatus::Rejected)
        );
    }

    #[test]
    fn decided_requisitions_are_final() {
        for status in [RequisitionStatus::Approved, RequisitionStatus::Rejected] {
            for action in [RequisitionAction::Approve, RequisitionAction::Reject] {
                assert!(status.apply(action).is_err(), "{status} -> {action}");
            }
        }
    }

    #[test]
    fn defaults_match_new_requisitions() {
        assert_eq!(RequisitionStatus::default(), RequisitionStatus::Pending);
        assert_eq!(Priority::default(), Priority::Medium);
        assert_eq!(Priority::from_str("Urgent").unwrap(), Priority::Urgent);
    }
}
