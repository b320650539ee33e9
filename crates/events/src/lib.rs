//! Outbound notifications.
//!
//! - [`WelcomeNotifier`] -- queue handle used by request handlers to announce
//!   newly created accounts.
//! - [`WelcomeWorker`] -- background task draining the queue.
//! - [`delivery`] -- delivery channels (SMTP email).

pub mod delivery;
pub mod notifier;

pub use delivery::email::{EmailConfig, EmailDelivery, EmailError};
pub use delivery::{DeliveryError, WelcomeDelivery};
pub use notifier::{WelcomeNotification, WelcomeNotifier, WelcomeWorker};
