pub mod create_purchase_order_command;
pub mod transition_purchase_order_command;

pub use create_purchase_order_command::CreatePurchaseOrderCommand;
pub use transition_purchase_order_command::TransitionPurchaseOrderCommand;

use chrono::NaiveDate;
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::{
    errors::ServiceError,
    models::{purchase_order, requisition, vendor, RequisitionStatus},
};

/// Purchase orders may only be raised against approved requisitions.
pub(crate) async fn ensure_orderable_requisition<C: ConnectionTrait>(
    db: &C,
    requisition_id: i32,
) -> Result<requisition::Model, ServiceError> {
    let requisition = requisition::Entity::find_by_id(requisition_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::field("requisition_id", "The selected requisition does not exist"))?;

    if requisition.status != RequisitionStatus::Approved {
        return Err(ServiceError::field(
            "requisition_id",
            format!(
                "Requisition must be Approved before ordering (currently {})",
                requisition.status
            ),
        ));
    }
    Ok(requisition)
}

/// Orders go to active vendors only.
pub(crate) async fn ensure_active_vendor<C: ConnectionTrait>(
    db: &C,
    vendor_id: i32,
) -> Result<vendor::Model, ServiceError> {
    let vendor = vendor::Entity::find_by_id(vendor_id)
        .one(db)
        .await?
        .ok_or_else(|| ServiceError::field("vendor_id", "The selected vendor does not exist"))?;

    if !vendor.is_active {
        return Err(ServiceError::field("vendor_id", "The selected vendor is inactive"));
    }
    Ok(vendor)
}

/// Receipts and invoices attach to orders that have been issued to the vendor.
pub(crate) async fn ensure_fulfillable_order<C: ConnectionTrait>(
    db: &C,
    purchase_order_id: i32,
) -> Result<purchase_order::Model, ServiceError> {
    let order = purchase_order::Entity::find_by_id(purchase_order_id)
        .one(db)
        .await?
        .ok_or_else(|| {
            ServiceError::field("purchase_order_id", "The selected purchase order does not exist")
        })?;

    if !order.status.accepts_fulfilment() {
        return Err(ServiceError::field(
            "purchase_order_id",
            format!(
                "Purchase order must be Issued or Completed (currently {})",
                order.status
            ),
        ));
    }
    Ok(order)
}

pub(crate) fn ensure_delivery_after_order(
    order_date: NaiveDate,
    expected_delivery_date: Option<NaiveDate>,
) -> Result<(), ServiceError> {
    match expected_delivery_date {
        Some(expected) if expected < order_date => Err(ServiceError::field(
            "expected_delivery_date",
            "expected_delivery_date must not be before order_date",
        )),
        _ => Ok(()),
    }
}
