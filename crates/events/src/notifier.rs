//! Welcome notifications for newly created accounts.
//!
//! Handlers push a [`WelcomeNotification`] onto the [`WelcomeNotifier`]
//! queue; a single [`WelcomeWorker`] drains it in the background and stops
//! once every notifier handle has been dropped.

use std::fmt;
use std::sync::Arc;

use assetdesk_core::types::DbId;
use tokio::sync::mpsc;

use crate::delivery::WelcomeDelivery;

/// A new account and, when one was set by an administrator, its initial
/// plaintext password.
///
/// The password is never persisted and `Debug` output redacts it.
#[derive(Clone)]
pub struct WelcomeNotification {
    pub user_id: DbId,
    pub name: String,
    pub username: String,
    pub email: String,
    password: Option<String>,
}

impl WelcomeNotification {
    pub fn new(
        user_id: DbId,
        name: impl Into<String>,
        username: impl Into<String>,
        email: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            user_id,
            name: name.into(),
            username: username.into(),
            email: email.into(),
            password,
        }
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }
}

impl fmt::Debug for WelcomeNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WelcomeNotification")
            .field("user_id", &self.user_id)
            .field("name", &self.name)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

/// Cloneable handle for enqueueing welcome notifications.
#[derive(Clone)]
pub struct WelcomeNotifier {
    sender: mpsc::UnboundedSender<WelcomeNotification>,
}

impl WelcomeNotifier {
    /// Create a notifier and the receiver its worker should drain.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<WelcomeNotification>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    /// Enqueue a notification. Never blocks; a stopped worker only logs.
    pub fn notify(&self, notification: WelcomeNotification) {
        let user_id = notification.user_id;
        if self.sender.send(notification).is_err() {
            tracing::warn!(user_id, "Welcome worker stopped, notification dropped");
        }
    }
}

/// Background task delivering queued welcome notifications.
pub struct WelcomeWorker;

impl WelcomeWorker {
    /// Run until the queue is closed.
    ///
    /// Without a delivery channel each notification is logged (without its
    /// password) and dropped. Delivery failures are logged and not retried.
    pub async fn run(
        mut receiver: mpsc::UnboundedReceiver<WelcomeNotification>,
        delivery: Option<Arc<dyn WelcomeDelivery>>,
    ) {
        while let Some(notification) = receiver.recv().await {
            match &delivery {
                Some(channel) => {
                    if let Err(e) = channel.deliver(&notification).await {
                        tracing::error!(
                            error = %e,
                            user_id = notification.user_id,
                            "Failed to deliver welcome notification"
                        );
                    }
                }
                None => {
                    tracing::info!(
                        user_id = notification.user_id,
                        email = %notification.email,
                        "Email delivery not configured, welcome notification dropped"
                    );
                }
            }
        }
        tracing::info!("Welcome queue closed, worker shutting down");
    }
}
