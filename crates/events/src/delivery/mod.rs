//! Delivery channels for welcome notifications.

use async_trait::async_trait;

use crate::delivery::email::EmailError;
use crate::notifier::WelcomeNotification;

pub mod email;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error(transparent)]
    Email(#[from] EmailError),
}

/// A channel that can hand a welcome notification to its recipient.
#[async_trait]
pub trait WelcomeDelivery: Send + Sync {
    async fn deliver(&self, notification: &WelcomeNotification) -> Result<(), DeliveryError>;
}
