//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches

pub mod asset;
pub mod asset_category;
pub mod asset_item;
pub mod common;
pub mod dashboard;
pub mod document;
pub mod location;
pub mod maintenance;
pub mod permission;
pub mod user;
