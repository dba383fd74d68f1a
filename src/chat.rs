//! Admin-to-customer chat viewer controller.
//!
//! Lists open chats, loads the message history of the selected one, and
//! sends admin replies. After a successful reply the message list is
//! re-fetched so the thread reflects the backend's canonical ordering.

use tracing::{info, warn};

use crate::error::ConsoleError;
use crate::models::{ChatMessage, ChatSummary};
use crate::service::MessagingService;

pub struct ChatController<S> {
    service: S,
    chats: Vec<ChatSummary>,
    selected_chat_id: Option<String>,
    messages: Vec<ChatMessage>,
    error: Option<String>,
}

impl<S: MessagingService> ChatController<S> {
    pub fn new(service: S) -> Self {
        ChatController {
            service,
            chats: Vec::new(),
            selected_chat_id: None,
            messages: Vec::new(),
            error: None,
        }
    }

    pub fn chats(&self) -> &[ChatSummary] {
        &self.chats
    }

    pub fn selected_chat_id(&self) -> Option<&str> {
        self.selected_chat_id.as_deref()
    }

    /// Messages of the selected chat, oldest first (backend order).
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub async fn load_chats(&mut self) -> Result<(), ConsoleError> {
        match self.service.list_chats().await {
            Ok(chats) => {
                info!(count = chats.len(), "loaded chats");
                self.chats = chats;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to load chats");
                self.error = Some("Failed to load chats.".to_string());
                Err(e)
            }
        }
    }

    /// Select a chat and load its message history. On failure the selection
    /// sticks but the previous thread's messages are cleared rather than
    /// shown under the wrong header.
    pub async fn open_chat(&mut self, chat_id: &str) -> Result<(), ConsoleError> {
        self.selected_chat_id = Some(chat_id.to_string());
        match self.service.list_chat_messages(chat_id).await {
            Ok(messages) => {
                self.messages = messages;
                self.error = None;
                Ok(())
            }
            Err(e) => {
                warn!(chat_id, error = %e, "failed to load chat messages");
                self.messages.clear();
                self.error = Some("Failed to load messages.".to_string());
                Err(e)
            }
        }
    }

    /// Send an admin reply to the selected chat, then re-fetch the thread.
    pub async fn send_reply(&mut self, reply: &str) -> Result<(), ConsoleError> {
        let Some(chat_id) = self.selected_chat_id.clone() else {
            return Err(ConsoleError::validation("Select a chat first."));
        };
        let reply = reply.trim();
        if reply.is_empty() {
            return Err(ConsoleError::validation("Message cannot be empty."));
        }

        self.service.send_chat_reply(&chat_id, reply).await?;
        info!(chat_id = %chat_id, "admin reply sent");
        self.open_chat(&chat_id).await
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Broadcast;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct MockMessaging {
        messages: Arc<Mutex<Vec<ChatMessage>>>,
        replies: Arc<Mutex<Vec<(String, String)>>>,
        fail_reply: bool,
    }

    fn message(id: &str, sender: &str, text: &str) -> ChatMessage {
        serde_json::from_value(serde_json::json!({
            "_id": id, "senderId": sender, "message": text
        }))
        .unwrap()
    }

    impl MessagingService for MockMessaging {
        async fn send_broadcast(&self, _broadcast: &Broadcast) -> Result<(), ConsoleError> {
            unimplemented!("not exercised by the chat viewer")
        }

        async fn list_chats(&self) -> Result<Vec<ChatSummary>, ConsoleError> {
            Ok(vec![serde_json::from_value(serde_json::json!({
                "_id": "chat-1", "customerName": "Ada"
            }))
            .unwrap()])
        }

        async fn list_chat_messages(
            &self,
            _chat_id: &str,
        ) -> Result<Vec<ChatMessage>, ConsoleError> {
            Ok(self.messages.lock().unwrap().clone())
        }

        async fn send_chat_reply(
            &self,
            chat_id: &str,
            message_text: &str,
        ) -> Result<(), ConsoleError> {
            if self.fail_reply {
                return Err(ConsoleError::remote("Backend server error (HTTP 500)"));
            }
            self.replies
                .lock()
                .unwrap()
                .push((chat_id.to_string(), message_text.to_string()));
            self.messages
                .lock()
                .unwrap()
                .push(message("m-new", "admin", message_text));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_open_chat_loads_messages() {
        let mock = MockMessaging::default();
        mock.messages
            .lock()
            .unwrap()
            .push(message("m1", "cust-1", "Where is my order?"));
        let mut ctl = ChatController::new(mock);

        ctl.load_chats().await.unwrap();
        assert_eq!(ctl.chats().len(), 1);

        ctl.open_chat("chat-1").await.unwrap();
        assert_eq!(ctl.selected_chat_id(), Some("chat-1"));
        assert_eq!(ctl.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_reply_refreshes_thread() {
        let mock = MockMessaging::default();
        let replies = Arc::clone(&mock.replies);
        let mut ctl = ChatController::new(mock);
        ctl.open_chat("chat-1").await.unwrap();

        ctl.send_reply("  On its way!  ").await.unwrap();
        assert_eq!(
            replies.lock().unwrap().as_slice(),
            &[("chat-1".to_string(), "On its way!".to_string())]
        );
        // The re-fetched thread includes the new message.
        assert_eq!(ctl.messages().len(), 1);
        assert_eq!(ctl.messages()[0].message, "On its way!");
    }

    #[tokio::test]
    async fn test_reply_requires_selection_and_text() {
        let mock = MockMessaging::default();
        let replies = Arc::clone(&mock.replies);
        let mut ctl = ChatController::new(mock);

        assert!(ctl.send_reply("hello").await.unwrap_err().is_validation());

        ctl.open_chat("chat-1").await.unwrap();
        assert!(ctl.send_reply("   ").await.unwrap_err().is_validation());
        assert!(replies.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_reply_surfaces_error() {
        let mut ctl = ChatController::new(MockMessaging {
            fail_reply: true,
            ..MockMessaging::default()
        });
        ctl.open_chat("chat-1").await.unwrap();
        assert!(ctl.send_reply("hi").await.is_err());
    }
}
