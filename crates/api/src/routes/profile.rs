use axum::routing::get;
use axum::Router;

use crate::handlers::profile;
use crate::state::AppState;

/// Routes mounted at `/profile`.
///
/// ```text
/// GET   /    -> show
/// PATCH /    -> update
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(profile::show).patch(profile::update))
}
