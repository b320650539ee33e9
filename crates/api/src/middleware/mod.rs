//! Authentication and authorization middleware extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT Bearer token.
//! - [`permissions::CurrentSubject`] -- Loads the user's permission set.
//! - [`permissions::RequireUserManage`], [`permissions::RequireAssetView`], ... --
//!   Require one named permission (admins and `manager-system` holders pass).

pub mod auth;
pub mod permissions;
