//! Notification broadcast panel controller.
//!
//! Holds a `{title, message}` draft and sends it to every customer in one
//! backend call. Empty fields are rejected locally; the draft is cleared
//! only after the backend accepts the broadcast.

use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::models::Broadcast;
use crate::service::MessagingService;

pub struct BroadcastController<S> {
    service: S,
    title: String,
    message: String,
    status: Option<String>,
}

impl<S: MessagingService> BroadcastController<S> {
    pub fn new(service: S) -> Self {
        BroadcastController {
            service,
            title: String::new(),
            message: String::new(),
            status: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Outcome line shown under the form, success or failure.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.message = message.into();
    }

    /// Send the draft to all customers. Both fields must be non-empty; the
    /// draft survives a failed send so it can be retried.
    pub async fn send_to_all(&mut self) -> Result<(), ConsoleError> {
        if self.title.trim().is_empty() || self.message.trim().is_empty() {
            let err = ConsoleError::validation("Title and message are both required.");
            self.status = Some(err.to_string());
            return Err(err);
        }

        let broadcast = Broadcast {
            title: self.title.trim().to_string(),
            message: self.message.trim().to_string(),
        };
        match self.service.send_broadcast(&broadcast).await {
            Ok(()) => {
                info!("broadcast notification sent");
                self.title.clear();
                self.message.clear();
                self.status = Some("Notification sent to all users.".to_string());
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "broadcast send failed");
                self.status = Some("Failed to send notification.".to_string());
                Err(e)
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
