//! Pure domain rules for the asset back office.
//!
//! Nothing in this crate touches the database or the network. Permission
//! evaluation, workflow transition tables, status bucketing, dashboard task
//! ordering and input validation all live here so the `db` and `api` crates
//! can share one definition of each rule.

pub mod asset_workflow;
pub mod dashboard;
pub mod error;
pub mod item_status;
pub mod maintenance;
pub mod pagination;
pub mod permissions;
pub mod types;
pub mod validation;
