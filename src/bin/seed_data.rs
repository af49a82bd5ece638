//! Seed data script - populates an empty database with procurement demo data
//!
//! Run with: cargo run --bin seed-data
//!
//! Loads vendors, requisitions in each state, purchase orders for the
//! approved requisitions, a goods receipt and invoices. Skips everything
//! when vendors already exist.

use tracing::info;

use procure_ease::{config, db, seed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    info!("=== ProcureEase Seed Data ===");

    let cfg = config::load_config()?;
    info!("Connecting to database: {}", cfg.database_url());
    let pool = db::establish_connection_from_app_config(&cfg).await?;
    db::run_migrations(&pool).await?;

    let summary = seed::seed_demo_data(&pool).await?;
    if summary.is_empty() {
        info!("Nothing to do; the database already has data");
    } else {
        info!("  Created {} vendors", summary.vendors);
        info!("  Created {} requisitions", summary.requisitions);
        info!("  Created {} purchase orders", summary.purchase_orders);
        info!("  Created {} goods receipts", summary.goods_receipts);
        info!("  Created {} invoices", summary.invoices);
        info!("");
        info!("Try these API calls:");
        info!("  curl http://localhost:{}/api/v1/dashboard", cfg.port);
        info!("  curl http://localhost:{}/api/v1/purchase-orders", cfg.port);
    }

    db::close_pool(pool).await?;
    Ok(())
}
