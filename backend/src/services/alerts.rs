//! Low-stock monitoring
//!
//! Periodically reports products whose on-hand quantity is at or below the
//! configured threshold. The monitor only reads; it never touches stock.

use std::time::Duration;

use shared::models::ProductView;
use tokio::task::JoinHandle;

use crate::error::AppResult;
use crate::services::CatalogService;

#[derive(Clone)]
pub struct LowStockMonitor {
    catalog: CatalogService,
    threshold: i64,
}

impl LowStockMonitor {
    pub fn new(catalog: CatalogService, threshold: i64) -> Self {
        Self { catalog, threshold }
    }

    pub fn threshold(&self) -> i64 {
        self.threshold
    }

    /// Current low-stock products, one warning logged per product
    pub async fn scan(&self) -> AppResult<Vec<ProductView>> {
        let low = self.catalog.low_stock_products(self.threshold).await?;

        for view in &low {
            tracing::warn!(
                product_id = %view.product.id,
                name = %view.product.name,
                quantity = view.product.quantity,
                threshold = self.threshold,
                "Low stock"
            );
        }

        Ok(low)
    }

    /// Run [`scan`](Self::scan) every `interval` until the task is aborted.
    /// Scan failures are logged and the loop keeps going.
    pub fn spawn(self, interval: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match self.scan().await {
                    Ok(low) if low.is_empty() => {
                        tracing::debug!("Low-stock scan found nothing");
                    }
                    Ok(low) => {
                        tracing::info!(count = low.len(), "Low-stock scan finished");
                    }
                    Err(err) => {
                        tracing::error!(error = %err, "Low-stock scan failed");
                    }
                }
            }
        })
    }
}
