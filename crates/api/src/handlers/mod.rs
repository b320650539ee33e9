//! Request handlers.
//!
//! Each submodule provides the async handler functions for one resource.
//! Handlers delegate to the repositories in `assetdesk_db`, apply the rules
//! from `assetdesk_core`, and map errors via [`crate::error::AppError`].

use assetdesk_core::error::{CoreError, FieldErrors};
use assetdesk_core::types::DbId;
use assetdesk_core::validation::to_field_errors;
use validator::Validate;

pub mod asset_items;
pub mod assets;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod documents;
pub mod locations;
pub mod maintenance;
pub mod permissions;
pub mod profile;
pub mod users;

/// Run the derived rules and return the messages instead of failing, so
/// handlers can add checks that need the database before reporting.
pub(crate) fn field_errors<T: Validate>(input: &T) -> FieldErrors {
    match input.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => to_field_errors(&errors),
    }
}

pub(crate) fn not_found(entity: &'static str, id: DbId) -> CoreError {
    CoreError::NotFound { entity, id }
}
