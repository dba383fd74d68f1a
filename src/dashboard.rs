//! Dashboard landing screen controller.
//!
//! The backend has no counts endpoint; the dashboard derives its aggregate
//! numbers from the product and order collection lengths, fetched
//! concurrently. A failure in either fetch leaves the previous counts on
//! screen.

use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::models::DashboardCounts;
use crate::service::{OrderService, ProductService};

pub struct DashboardController<S> {
    service: S,
    counts: DashboardCounts,
    error: Option<String>,
}

impl<S: ProductService + OrderService> DashboardController<S> {
    pub fn new(service: S) -> Self {
        DashboardController {
            service,
            counts: DashboardCounts::default(),
            error: None,
        }
    }

    pub fn counts(&self) -> DashboardCounts {
        self.counts
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Refresh both counts. The two list fetches run concurrently; if
    /// either fails the previously shown counts are kept.
    pub async fn load_counts(&mut self) -> Result<DashboardCounts, ConsoleError> {
        let (products, orders) = tokio::join!(
            self.service.list_products(None),
            self.service.list_orders(),
        );
        match (products, orders) {
            (Ok(products), Ok(orders)) => {
                self.counts = DashboardCounts {
                    products: products.len(),
                    orders: orders.len(),
                };
                self.error = None;
                info!(
                    products = self.counts.products,
                    orders = self.counts.orders,
                    "dashboard counts refreshed"
                );
                Ok(self.counts)
            }
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "failed to refresh dashboard counts");
                self.error = Some("Failed to load dashboard data.".to_string());
                Err(e)
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
