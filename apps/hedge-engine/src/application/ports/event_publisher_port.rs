//! Event Publisher Port (Driven Port)
//!
//! Interface for announcing hedge activity on a topic-keyed publish channel.
//! Fire-and-forget, at-least-once.

use async_trait::async_trait;

/// Topic for per-account hedge updates.
pub const HEDGE_UPDATE_TOPIC: &str = "customer.account.hedge.update";

/// Event publishing error.
#[derive(Debug, Clone, thiserror::Error)]
pub enum EventPublishError {
    /// Connection error.
    #[error("Event publish connection error: {message}")]
    ConnectionError {
        /// Error details.
        message: String,
    },

    /// Serialization error.
    #[error("Event serialization error: {message}")]
    SerializationError {
        /// Error details.
        message: String,
    },
}

/// Port for publishing engine events.
#[async_trait]
pub trait EventPublisherPort: Send + Sync {
    /// Publish one payload on a topic.
    ///
    /// # Errors
    ///
    /// Returns error if the payload cannot be serialized or sent.
    async fn publish(
        &self,
        topic: &str,
        payload: serde_json::Value,
    ) -> Result<(), EventPublishError>;
}

/// No-op event publisher for testing.
#[derive(Debug, Clone, Default)]
pub struct NoOpEventPublisher;

#[async_trait]
impl EventPublisherPort for NoOpEventPublisher {
    async fn publish(
        &self,
        _topic: &str,
        _payload: serde_json::Value,
    ) -> Result<(), EventPublishError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn no_op_publisher_succeeds() {
        let publisher = NoOpEventPublisher;
        let result = publisher
            .publish(HEDGE_UPDATE_TOPIC, json!({"company": "co-1"}))
            .await;
        assert!(result.is_ok());
    }
}
