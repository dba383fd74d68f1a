//! Orders screen controller.
//!
//! Keeps a local mirror of the remote order collection and mediates status
//! transitions and deletions. Every mutation is confirmation-gated, runs to
//! completion before the mirror changes, and reconciles only on success —
//! a failed call leaves the mirror exactly as it was. The in-flight marker
//! set is advisory for row disabling in the UI, not a lock: mutations on
//! different rows may overlap.

use tracing::{info, warn};

use crate::editable::{BusyMap, BusyOp};
use crate::error::ConsoleError;
use crate::models::{Order, OrderStatus};
use crate::service::{ConfirmPrompt, MutationOutcome, OrderService};

pub struct OrderListController<S, C> {
    service: S,
    confirm: C,
    orders: Vec<Order>,
    list_error: Option<String>,
    busy: BusyMap,
}

impl<S: OrderService, C: ConfirmPrompt> OrderListController<S, C> {
    pub fn new(service: S, confirm: C) -> Self {
        OrderListController {
            service,
            confirm,
            orders: Vec::new(),
            list_error: None,
            busy: BusyMap::new(),
        }
    }

    /// The order mirror, in backend order.
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// The last list-load error, cleared by the next successful load.
    pub fn list_error(&self) -> Option<&str> {
        self.list_error.as_deref()
    }

    /// Whether a mutation is in flight for this row.
    pub fn is_busy(&self, order_id: &str) -> bool {
        self.busy.is_busy(order_id)
    }

    /// Fetch the full order collection. Idempotent; safe to call from a
    /// retry button. On failure the previously loaded mirror is kept
    /// untouched — no partial overwrite.
    pub async fn load_orders(&mut self) -> Result<(), ConsoleError> {
        match self.service.list_orders().await {
            Ok(orders) => {
                info!(count = orders.len(), "loaded orders");
                self.orders = orders;
                self.list_error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load orders");
                self.list_error = Some("Failed to load orders. Please try again.".to_string());
                Err(e)
            }
        }
    }

    /// Move one order to a new status. Any status may move to any other;
    /// transition legality is the backend's policy, not the console's.
    /// Confirmation-gated; on success only the `status` field of that row
    /// changes (no re-fetch), on failure the row keeps its prior status.
    pub async fn change_status(
        &mut self,
        order_id: &str,
        new_status: OrderStatus,
    ) -> Result<MutationOutcome, ConsoleError> {
        if !self.orders.iter().any(|o| o.id == order_id) {
            return Err(ConsoleError::validation(format!(
                "Unknown order: {order_id}"
            )));
        }
        if !self
            .confirm
            .confirm(&format!("Change status to \"{new_status}\"?"))
        {
            return Ok(MutationOutcome::Declined);
        }
        if !self.busy.begin(order_id, BusyOp::StatusUpdate) {
            return Err(ConsoleError::validation(
                "Another operation is already running for this order",
            ));
        }

        let result = self.service.update_order_status(order_id, new_status).await;
        self.busy.finish(order_id);

        match result {
            Ok(()) => {
                if let Some(order) = self.orders.iter_mut().find(|o| o.id == order_id) {
                    order.status = new_status;
                }
                info!(order_id, status = %new_status, "order status updated");
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(order_id, error = %e, "order status update failed");
                Err(e)
            }
        }
    }

    /// Delete one order. Confirmation-gated; the row leaves the mirror only
    /// after the backend confirms the deletion.
    pub async fn delete_order(
        &mut self,
        order_id: &str,
    ) -> Result<MutationOutcome, ConsoleError> {
        if !self.orders.iter().any(|o| o.id == order_id) {
            return Err(ConsoleError::validation(format!(
                "Unknown order: {order_id}"
            )));
        }
        if !self
            .confirm
            .confirm("Are you sure you want to delete this order?")
        {
            return Ok(MutationOutcome::Declined);
        }
        if !self.busy.begin(order_id, BusyOp::Delete) {
            return Err(ConsoleError::validation(
                "Another operation is already running for this order",
            ));
        }

        let result = self.service.delete_order(order_id).await;
        self.busy.finish(order_id);

        match result {
            Ok(()) => {
                self.orders.retain(|o| o.id != order_id);
                info!(order_id, "order deleted");
                Ok(MutationOutcome::Applied)
            }
            Err(e) => {
                warn!(order_id, error = %e, "order delete failed");
                Err(e)
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
