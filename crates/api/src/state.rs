use std::sync::Arc;

use assetdesk_core::permissions::PermissionStoreState;
use assetdesk_events::WelcomeNotifier;

use crate::config::ServerConfig;
use crate::storage::DocumentStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: assetdesk_db::DbPool,
    pub config: Arc<ServerConfig>,
    /// Whether the permission tables were present when the server started.
    pub permission_store: PermissionStoreState,
    /// Queue for welcome notifications to new users.
    pub notifier: WelcomeNotifier,
    /// Backend holding uploaded document bytes.
    pub storage: Arc<dyn DocumentStorage>,
}
