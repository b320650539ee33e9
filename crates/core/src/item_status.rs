//! Asset item status tags and the dashboard bucket mapping.
//!
//! Item status is descriptive. Any string is accepted on write; only the
//! dashboard gives the known values meaning by folding them into four
//! canonical buckets. Unknown values land in no bucket.

use serde::Serialize;

pub const IN_USE: &str = "in_use";
pub const GOOD: &str = "Good";
pub const MAINTENANCE: &str = "maintenance";
pub const DISPOSED: &str = "disposed";
pub const RETIRED: &str = "retired";
pub const NON_FUNCTIONAL: &str = "Non-functional";
pub const PENDING_APPROVAL: &str = "pending_approval";

/// Default status for newly created items.
pub const DEFAULT_ITEM_STATUS: &str = IN_USE;

/// Maximum length of a status tag.
pub const MAX_STATUS_LEN: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum StatusBucket {
    #[serde(rename = "In Use")]
    InUse,
    #[serde(rename = "Maintenance")]
    Maintenance,
    #[serde(rename = "Disposed")]
    Disposed,
    #[serde(rename = "Pending Approval")]
    PendingApproval,
}

impl StatusBucket {
    pub const ALL: [StatusBucket; 4] = [
        StatusBucket::InUse,
        StatusBucket::Maintenance,
        StatusBucket::Disposed,
        StatusBucket::PendingApproval,
    ];

    pub fn label(self) -> &'static str {
        match self {
            StatusBucket::InUse => "In Use",
            StatusBucket::Maintenance => "Maintenance",
            StatusBucket::Disposed => "Disposed",
            StatusBucket::PendingApproval => "Pending Approval",
        }
    }

    /// Map a raw item status onto its bucket. Matching is exact (case-sensitive).
    pub fn classify(raw: &str) -> Option<StatusBucket> {
        match raw {
            IN_USE | GOOD => Some(StatusBucket::InUse),
            MAINTENANCE => Some(StatusBucket::Maintenance),
            DISPOSED | RETIRED | NON_FUNCTIONAL => Some(StatusBucket::Disposed),
            PENDING_APPROVAL => Some(StatusBucket::PendingApproval),
            _ => None,
        }
    }
}
