use metrics::counter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

/// Default capacity of the in-process event channel
pub const EVENT_CHANNEL_CAPACITY: usize = 1024;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processor is gone.
    /// Domain writes have already committed by the time events are published.
    pub async fn publish(&self, event: Event) {
        let name = event.name();
        if let Err(e) = self.send(event).await {
            warn!(event = name, error = %e, "Dropping domain event");
        }
    }
}

/// Creates a bounded event channel.
pub fn channel() -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    (EventSender::new(tx), rx)
}

/// Domain events published after successful writes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // Requisition events
    RequisitionCreated(i32),
    RequisitionUpdated(i32),
    RequisitionDeleted(i32),
    RequisitionStatusChanged {
        requisition_id: i32,
        old_status: String,
        new_status: String,
    },

    // Vendor events
    VendorCreated(i32),
    VendorUpdated(i32),
    VendorDeleted(i32),
    VendorActivationChanged {
        vendor_id: i32,
        is_active: bool,
    },
    VendorRated {
        vendor_id: i32,
        rating: Decimal,
    },

    // Purchase order events
    PurchaseOrderCreated {
        purchase_order_id: i32,
        order_number: String,
    },
    PurchaseOrderUpdated(i32),
    PurchaseOrderDeleted(i32),
    PurchaseOrderStatusChanged {
        purchase_order_id: i32,
        old_status: String,
        new_status: String,
    },

    // Goods receipt events
    GoodsReceived {
        goods_receipt_id: i32,
        receipt_number: String,
        purchase_order_id: i32,
        quantity_received: i32,
    },
    GoodsReceiptUpdated(i32),
    GoodsReceiptDeleted(i32),

    // Invoice events
    InvoiceCreated {
        invoice_id: i32,
        invoice_number: String,
        purchase_order_id: i32,
    },
    InvoiceUpdated(i32),
    InvoiceDeleted(i32),
    InvoiceStatusChanged {
        invoice_id: i32,
        old_status: String,
        new_status: String,
    },
}

impl Event {
    /// Stable name used in logs and metrics labels
    pub fn name(&self) -> &'static str {
        match self {
            Event::RequisitionCreated(_) => "requisition_created",
            Event::RequisitionUpdated(_) => "requisition_updated",
            Event::RequisitionDeleted(_) => "requisition_deleted",
            Event::RequisitionStatusChanged { .. } => "requisition_status_changed",
            Event::VendorCreated(_) => "vendor_created",
            Event::VendorUpdated(_) => "vendor_updated",
            Event::VendorDeleted(_) => "vendor_deleted",
            Event::VendorActivationChanged { .. } => "vendor_activation_changed",
            Event::VendorRated { .. } => "vendor_rated",
            Event::PurchaseOrderCreated { .. } => "purchase_order_created",
            Event::PurchaseOrderUpdated(_) => "purchase_order_updated",
            Event::PurchaseOrderDeleted(_) => "purchase_order_deleted",
            Event::PurchaseOrderStatusChanged { .. } => "purchase_order_status_changed",
            Event::GoodsReceived { .. } => "goods_received",
            Event::GoodsReceiptUpdated(_) => "goods_receipt_updated",
            Event::GoodsReceiptDeleted(_) => "goods_receipt_deleted",
            Event::InvoiceCreated { .. } => "invoice_created",
            Event::InvoiceUpdated(_) => "invoice_updated",
            Event::InvoiceDeleted(_) => "invoice_deleted",
            Event::InvoiceStatusChanged { .. } => "invoice_status_changed",
        }
    }
}

/// Consumes events until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        counter!("procure_ease.events", 1, "event" => event.name());

        match &event {
            Event::RequisitionStatusChanged {
                requisition_id,
                old_status,
                new_status,
            } => info!(
                requisition_id,
                old_status = %old_status,
                new_status = %new_status,
                "Requisition status changed"
            ),
            Event::PurchaseOrderCreated {
                purchase_order_id,
                order_number,
            } => info!(purchase_order_id, order_number = %order_number, "Purchase order created"),
            Event::PurchaseOrderStatusChanged {
                purchase_order_id,
                old_status,
                new_status,
            } => info!(
                purchase_order_id,
                old_status = %old_status,
                new_status = %new_status,
                "Purchase order status changed"
            ),
            Event::GoodsReceived {
                goods_receipt_id,
                receipt_number,
                purchase_order_id,
                quantity_received,
            } => info!(
                goods_receipt_id,
                receipt_number = %receipt_number,
                purchase_order_id,
                quantity_received,
                "Goods received"
            ),
            Event::InvoiceCreated {
                invoice_id,
                invoice_number,
                purchase_order_id,
            } => info!(
                invoice_id,
                invoice_number = %invoice_number,
                purchase_order_id,
                "Invoice created"
            ),
            Event::InvoiceStatusChanged {
                invoice_id,
                old_status,
                new_status,
            } => info!(
                invoice_id,
                old_status = %old_status,
                new_status = %new_status,
                "Invoice status changed"
            ),
            Event::VendorActivationChanged {
                vendor_id,
                is_active,
            } => info!(vendor_id, is_active, "Vendor activation changed"),
            Event::VendorRated { vendor_id, rating } => {
                info!(vendor_id, rating = %rating, "Vendor rated")
            }
            other => info!(event = other.name(), "Received event: {:?}", other),
        }
    }

    info!("Event processing loop stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_delivers_to_receiver() {
        let (sender, mut rx) = channel();
        sender
            .send(Event::VendorCreated(4))
            .await
            .expect("channel open");
        assert_eq!(rx.recv().await, Some(Event::VendorCreated(4)));
    }

    #[tokio::test]
    async fn send_fails_once_receiver_dropped() {
        let (sender, rx) = channel();
        drop(rx);
        assert!(sender.send(Event::InvoiceDeleted(1)).await.is_err());
        // publish swallows the failure
        sender.publish(Event::InvoiceDeleted(1)).await;
    }

    #[tokio::test]
    async fn processor_drains_until_senders_drop() {
        let (sender, rx) = channel();
        let handle = tokio::spawn(process_events(rx));
        sender
            .publish(Event::PurchaseOrderStatusChanged {
                purchase_order_id: 1,
                old_status: "Approved".into(),
                new_status: "Issued".into(),
            })
            .await;
        drop(sender);
        handle.await.expect("processor exits cleanly");
    }

    #[test]
    fn event_names_are_snake_case() {
        assert_eq!(
            Event::GoodsReceived {
                goods_receipt_id: 1,
                receipt_number: "GR2024060001".into(),
                purchase_order_id: 2,
                quantity_received: 3,
            }
            .name(),
            "goods_received"
        );
    }
}
