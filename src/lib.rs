//! Admin console core for the shop e-commerce platform.
//!
//! This crate is the headless half of the admin console: screen
//! controllers that own local mirrors of the backend's collections and
//! mediate every mutation through the REST API. The presentation layer
//! binds to controller state read-only and calls controller operations;
//! it never mutates a mirror directly.
//!
//! Reconciliation contract: structural mutations (create, delete, batch
//! add) apply the backend's returned object to the mirror, never a local
//! reconstruction, and only after the remote round trip succeeds. Inline
//! title renames are the one local-first path, held in a two-state
//! dirty/clean form that reverts cleanly when the save fails.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub mod api;
pub mod categories;
pub mod chat;
pub mod dashboard;
pub mod editable;
pub mod error;
pub mod models;
pub mod notifications;
pub mod orders;
pub mod products;
pub mod service;
pub mod storage;
pub mod uploads;

pub use api::ApiClient;
pub use categories::CategoryTreeController;
pub use chat::ChatController;
pub use dashboard::DashboardController;
pub use error::ConsoleError;
pub use notifications::BroadcastController;
pub use orders::OrderListController;
pub use products::ProductListController;
pub use service::{AutoConfirm, ConfirmPrompt, MutationOutcome};

/// Initialise tracing for the console process. `RUST_LOG` overrides the
/// default `info` filter. Safe to call once at startup; returns an error
/// string if a global subscriber is already set.
pub fn init_logging() -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| e.to_string())
}
