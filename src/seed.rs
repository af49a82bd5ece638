//! Demo data for a fresh database.
//!
//! Loads three vendors, four requisitions in mixed states, purchase orders
//! for the approved requisitions, a delivery and two invoices. Nothing is
//! written when any vendor already exists.

use chrono::{Duration, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{
    ActiveModelTrait, DatabaseTransaction, EntityTrait, NotSet, PaginatorTrait, Set,
    TransactionTrait,
};
use serde::Serialize;
use tracing::info;

use crate::{
    db::DbPool,
    errors::ServiceError,
    models::{
        goods_receipt, invoice, purchase_order, requisition, vendor, GoodsCondition,
        InvoiceStatus, PaymentMethod, Priority, PurchaseOrderStatus, RequisitionStatus,
    },
    numbering::next_number,
};

/// Rows written by one seeding run
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SeedSummary {
    pub vendors: usize,
    pub requisitions: usize,
    pub purchase_orders: usize,
    pub goods_receipts: usize,
    pub invoices: usize,
}

impl SeedSummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

struct VendorSeed {
    name: &'static str,
    contact: &'static str,
    email: &'static str,
    phone: &'static str,
    rating: Decimal,
}

struct RequisitionSeed {
    item: &'static str,
    quantity: i32,
    status: RequisitionStatus,
    requested_by: &'static str,
    days_ago: i64,
    priority: Priority,
    estimated_cost: Decimal,
}

/// Inserts the demo data set unless the database already holds vendors.
pub async fn seed_demo_data(db: &DbPool) -> Result<SeedSummary, ServiceError> {
    let existing = vendor::Entity::find().count(db).await?;
    if existing > 0 {
        info!(existing_vendors = existing, "Database already populated; skipping demo data");
        return Ok(SeedSummary::default());
    }

    let txn = db.begin().await?;
    let summary = insert_demo_data(&txn).await?;
    txn.commit().await?;

    info!(
        vendors = summary.vendors,
        requisitions = summary.requisitions,
        purchase_orders = summary.purchase_orders,
        goods_receipts = summary.goods_receipts,
        invoices = summary.invoices,
        "Demo data loaded"
    );
    Ok(summary)
}

async fn insert_demo_data(txn: &DatabaseTransaction) -> Result<SeedSummary, ServiceError> {
    let today = Utc::now().date_naive();
    let now = Utc::now();
    let mut summary = SeedSummary::default();

    let vendor_seeds = [
        VendorSeed {
            name: "TechSupply Corp",
            contact: "John Doe",
            email: "contact@techsupply.com",
            phone: "+1-555-0123",
            rating: dec!(4.5),
        },
        VendorSeed {
            name: "OfficeMax Solutions",
            contact: "Jane Smith",
            email: "sales@officemax.com",
            phone: "+1-555-0456",
            rating: dec!(4.0),
        },
        VendorSeed {
            name: "Global Suppliers Inc",
            contact: "Mike Johnson",
            email: "info@globalsuppliers.com",
            phone: "+1-555-0789",
            rating: dec!(3.5),
        },
    ];

    let mut vendors = Vec::with_capacity(vendor_seeds.len());
    for seed in vendor_seeds {
        let created = vendor::ActiveModel {
            id: NotSet,
            name: Set(seed.name.to_string()),
            contact: Set(seed.contact.to_string()),
            email: Set(seed.email.to_string()),
            phone: Set(seed.phone.to_string()),
            address: Set(None),
            is_active: Set(true),
            rating: Set(seed.rating),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;
        vendors.push(created);
    }
    summary.vendors = vendors.len();

    let requisition_seeds = [
        RequisitionSeed {
            item: "Laptops Dell XPS 13",
            quantity: 10,
            status: RequisitionStatus::Approved,
            requested_by: "IT Department",
            days_ago: 5,
            priority: Priority::High,
            estimated_cost: dec!(14999.90),
        },
        RequisitionSeed {
            item: "Office Chairs",
            quantity: 25,
            status: RequisitionStatus::Pending,
            requested_by: "HR Department",
            days_ago: 3,
            priority: Priority::Medium,
            estimated_cost: dec!(4875.00),
        },
        RequisitionSeed {
            item: "Printer Paper A4",
            quantity: 100,
            status: RequisitionStatus::Approved,
            requested_by: "Admin Department",
            days_ago: 2,
            priority: Priority::Low,
            estimated_cost: dec!(450.00),
        },
        RequisitionSeed {
            item: "Network Switches",
            quantity: 5,
            status: RequisitionStatus::Rejected,
            requested_by: "IT Department",
            days_ago: 1,
            priority: Priority::Urgent,
            estimated_cost: dec!(2250.00),
        },
    ];

    let mut requisitions = Vec::with_capacity(requisition_seeds.len());
    for seed in requisition_seeds {
        let created = requisition::ActiveModel {
            id: NotSet,
            item: Set(seed.item.to_string()),
            quantity: Set(seed.quantity),
            status: Set(seed.status),
            requested_by: Set(seed.requested_by.to_string()),
            date: Set(today - Duration::days(seed.days_ago)),
            priority: Set(seed.priority),
            estimated_cost: Set(Some(seed.estimated_cost)),
            description: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;
        requisitions.push(created);
    }
    summary.requisitions = requisitions.len();

    // One order per approved requisition; the first is fully delivered and billed.
    let approved: Vec<&requisition::Model> = requisitions
        .iter()
        .filter(|r| r.status == RequisitionStatus::Approved)
        .collect();
    let plans = [
        (PurchaseOrderStatus::Completed, dec!(14250.00), 4),
        (PurchaseOrderStatus::Issued, dec!(425.00), 1),
    ];

    for (index, (req, (status, total, days_ago))) in approved.iter().zip(plans).enumerate() {
        let vendor = &vendors[index % vendors.len()];
        let order_date = today - Duration::days(days_ago);
        let order = insert_order(txn, req, vendor, status, total, order_date, today).await?;
        summary.purchase_orders += 1;

        if status == PurchaseOrderStatus::Completed {
            let receipt_number = next_number::<goods_receipt::Entity, _>(txn, today).await?;
            goods_receipt::ActiveModel {
                id: NotSet,
                purchase_order_id: Set(order.id),
                receipt_number: Set(receipt_number),
                received_date: Set(today - Duration::days(2)),
                quantity_received: Set(req.quantity),
                item: Set(req.item.clone()),
                condition: Set(GoodsCondition::Good),
                received_by: Set(Some("Receiving Dock".to_string())),
                warehouse_location: Set(Some("A-01".to_string())),
                notes: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(txn)
            .await?;
            summary.goods_receipts += 1;

            insert_invoice(
                txn,
                &order,
                InvoiceStatus::Paid,
                today - Duration::days(2),
                Some(today - Duration::days(1)),
                today,
            )
            .await?;
        } else {
            // Past due and unpaid, so it reads as overdue
            insert_invoice(
                txn,
                &order,
                InvoiceStatus::Pending,
                today - Duration::days(1),
                None,
                today,
            )
            .await?;
        }
        summary.invoices += 1;
    }

    Ok(summary)
}

async fn insert_order(
    txn: &DatabaseTransaction,
    req: &requisition::Model,
    vendor: &vendor::Model,
    status: PurchaseOrderStatus,
    total: Decimal,
    order_date: NaiveDate,
    today: NaiveDate,
) -> Result<purchase_order::Model, ServiceError> {
    let now = Utc::now();
    let order_number = next_number::<purchase_order::Entity, _>(txn, today).await?;
    let order = purchase_order::ActiveModel {
        id: NotSet,
        requisition_id: Set(req.id),
        vendor_id: Set(vendor.id),
        order_number: Set(order_number),
        total_amount: Set(total),
        status: Set(status),
        order_date: Set(order_date),
        expected_delivery_date: Set(Some(order_date + Duration::days(7))),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;
    Ok(order)
}

async fn insert_invoice(
    txn: &DatabaseTransaction,
    order: &purchase_order::Model,
    status: InvoiceStatus,
    invoice_date: NaiveDate,
    paid_date: Option<NaiveDate>,
    today: NaiveDate,
) -> Result<invoice::Model, ServiceError> {
    let now = Utc::now();
    let invoice_number = next_number::<invoice::Entity, _>(txn, today).await?;
    let paid = status == InvoiceStatus::Paid;
    let due_date = if paid {
        invoice_date + Duration::days(30)
    } else {
        today - Duration::days(3)
    };
    let tax = (order.total_amount * dec!(0.08)).round_dp(2);

    let created = invoice::ActiveModel {
        id: NotSet,
        purchase_order_id: Set(order.id),
        invoice_number: Set(invoice_number),
        amount: Set(order.total_amount),
        tax_amount: Set(tax),
        discount_amount: Set(Decimal::ZERO),
        status: Set(status),
        invoice_date: Set(invoice_date),
        due_date: Set(Some(due_date)),
        paid_date: Set(paid_date),
        payment_method: Set(paid.then_some(PaymentMethod::BankTransfer)),
        reference_number: Set(paid.then(|| format!("TRX-{:06}", order.id))),
        notes: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(txn)
    .await?;
    Ok(created)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection_with_config, run_migrations, DbConfig};
    use crate::models::invoice::Model as Invoice;

    async fn fresh_db() -> DbPool {
        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .expect("connect");
        run_migrations(&pool).await.expect("migrate");
        pool
    }

    #[tokio::test]
    async fn seeds_once() {
        let db = fresh_db().await;

        let first = seed_demo_data(&db).await.expect("seed");
        assert_eq!(
            first,
            SeedSummary {
                vendors: 3,
                requisitions: 4,
                purchase_orders: 2,
                goods_receipts: 1,
                invoices: 2,
            }
        );

        let second = seed_demo_data(&db).await.expect("reseed");
        assert!(second.is_empty());
        assert_eq!(vendor::Entity::find().count(&db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn seeded_invoices_cover_paid_and_overdue() {
        let db = fresh_db().await;
        seed_demo_data(&db).await.expect("seed");

        let today = Utc::now().date_naive();
        let invoices: Vec<Invoice> = invoice::Entity::find().all(&db).await.unwrap();
        assert!(invoices.iter().any(|inv| inv.status == InvoiceStatus::Paid));
        assert!(invoices.iter().any(|inv| inv.is_overdue(today)));

        let orders = purchase_order::Entity::find().all(&db).await.unwrap();
        assert!(orders.iter().all(|po| po.order_number.starts_with("PO")));
    }
}
