//! Coach chat.
//!
//! The backend offers no push channel, so new messages are picked up by
//! polling. [`ChatRelay::watch`] runs the poller and publishes the latest
//! message list through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::api::{ApiClient, ApiError};
use crate::credential::Credential;
use crate::models::ChatMessage;

/// Default polling interval for [`ChatRelay::watch`].
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("Message is empty")]
    Empty,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Chat with the coach on behalf of one session.
pub struct ChatRelay {
    api: ApiClient,
    credential: Credential,
    latest: Arc<watch::Sender<Vec<ChatMessage>>>,
}

impl ChatRelay {
    pub fn new(api: ApiClient, credential: Credential) -> Self {
        let (latest, _) = watch::channel(Vec::new());
        Self {
            api,
            credential,
            latest: Arc::new(latest),
        }
    }

    /// Fetches the conversation and publishes it to any watchers.
    pub async fn messages(&self) -> Result<Vec<ChatMessage>, ChatError> {
        let messages = self.api.chat_messages(&self.credential).await?;
        publish(&self.latest, messages.clone());
        Ok(messages)
    }

    /// Sends a message, then refreshes the conversation.
    pub async fn send(&self, text: &str) -> Result<Vec<ChatMessage>, ChatError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ChatError::Empty);
        }

        self.api.send_chat(&self.credential, text).await?;
        self.messages().await
    }

    /// Starts polling every `interval`. The first poll happens immediately.
    ///
    /// Polling stops when the returned [`ChatWatch`] is dropped. A failed
    /// poll keeps the last published list.
    pub fn watch(&self, interval: Duration) -> ChatWatch {
        let api = self.api.clone();
        let credential = self.credential.clone();
        let latest = Arc::clone(&self.latest);

        let receiver = latest.subscribe();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match api.chat_messages(&credential).await {
                    Ok(messages) => publish(&latest, messages),
                    Err(e) => tracing::debug!(error = %e, "Chat poll failed"),
                }
            }
        });

        ChatWatch { receiver, task }
    }
}

fn publish(latest: &watch::Sender<Vec<ChatMessage>>, messages: Vec<ChatMessage>) {
    latest.send_if_modified(|current| {
        if *current == messages {
            false
        } else {
            *current = messages;
            true
        }
    });
}

/// Handle to a running chat poller.
pub struct ChatWatch {
    receiver: watch::Receiver<Vec<ChatMessage>>,
    task: JoinHandle<()>,
}

impl ChatWatch {
    /// The most recently published message list.
    pub fn latest(&self) -> Vec<ChatMessage> {
        self.receiver.borrow().clone()
    }

    /// Waits for the message list to change and returns it.
    pub async fn changed(&mut self) -> Option<Vec<ChatMessage>> {
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for ChatWatch {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::DEFAULT_TIMEOUT;

    fn message(id: &str, text: &str) -> ChatMessage {
        ChatMessage {
            id: id.to_string(),
            sender_id: "1".to_string(),
            message: text.to_string(),
            created_at: "2025-01-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_publish_skips_identical_lists() {
        let (latest, mut rx) = watch::channel(Vec::new());

        publish(&latest, vec![message("1", "hi")]);
        assert!(rx.has_changed().unwrap());
        rx.borrow_and_update();

        publish(&latest, vec![message("1", "hi")]);
        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_blank_message_is_rejected() {
        let api = ApiClient::new("http://127.0.0.1:9/api", DEFAULT_TIMEOUT).unwrap();
        let relay = ChatRelay::new(api, Credential::new("t"));
        assert!(matches!(relay.send(" \n").await, Err(ChatError::Empty)));
    }

    #[tokio::test]
    async fn test_failed_polls_keep_last_list() {
        let api = ApiClient::new("http://127.0.0.1:9/api", DEFAULT_TIMEOUT).unwrap();
        let relay = ChatRelay::new(api, Credential::new("t"));
        publish(&relay.latest, vec![message("1", "hi")]);

        let watch = relay.watch(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(watch.latest(), vec![message("1", "hi")]);
    }
}
