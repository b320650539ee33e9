//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Helpers that must join a
//! caller's transaction take `&mut PgConnection` instead.

pub mod asset_category_repo;
pub mod asset_item_repo;
pub mod asset_repo;
pub mod dashboard_repo;
pub mod document_repo;
pub mod location_repo;
pub mod maintenance_repo;
pub mod permission_repo;
pub mod region_repo;
pub mod user_repo;

pub use asset_category_repo::AssetCategoryRepo;
pub use asset_item_repo::AssetItemRepo;
pub use asset_repo::AssetRepo;
pub use dashboard_repo::DashboardRepo;
pub use document_repo::DocumentRepo;
pub use location_repo::LocationRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use permission_repo::PermissionRepo;
pub use region_repo::RegionRepo;
pub use user_repo::UserRepo;

/// Trim a free-text search term and escape `ILIKE` wildcards so `%` and `_`
/// match literally. Blank terms become `None`.
pub(crate) fn search_term(raw: Option<&str>) -> Option<String> {
    let term = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    Some(escaped)
}
