//! Asset approval workflow.
//!
//! ```text
//! pending_approval --approve--> approved --review--> reviewed
//!        |                                              |
//!        +--reject--> rejected                          |
//!                        |                              |
//!                        +---------restore--------------+--> restored
//! restored --approve--> approved
//! restored --reject---> rejected
//! ```
//!
//! Permissions for each action are enforced by the HTTP layer; this module
//! only knows which transitions are legal.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::permissions::{ASSET_APPROVE, ASSET_REVIEW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetStatus {
    PendingApproval,
    Approved,
    Rejected,
    Reviewed,
    Restored,
}

impl AssetStatus {
    pub const ALL: [AssetStatus; 5] = [
        AssetStatus::PendingApproval,
        AssetStatus::Approved,
        AssetStatus::Rejected,
        AssetStatus::Reviewed,
        AssetStatus::Restored,
    ];

    /// Statuses that sit in the approvals queue.
    pub const AWAITING_DECISION: [AssetStatus; 2] =
        [AssetStatus::PendingApproval, AssetStatus::Restored];

    pub fn as_str(self) -> &'static str {
        match self {
            AssetStatus::PendingApproval => "pending_approval",
            AssetStatus::Approved => "approved",
            AssetStatus::Rejected => "rejected",
            AssetStatus::Reviewed => "reviewed",
            AssetStatus::Restored => "restored",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, AssetStatus::Rejected | AssetStatus::Reviewed)
    }

    pub fn awaits_decision(self) -> bool {
        Self::AWAITING_DECISION.contains(&self)
    }
}

impl fmt::Display for AssetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AssetStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown asset status '{s}'")))
    }
}

/// An explicit workflow action on a single asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    Approve,
    Reject,
    Review,
    Restore,
}

impl WorkflowAction {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkflowAction::Approve => "approve",
            WorkflowAction::Reject => "reject",
            WorkflowAction::Review => "review",
            WorkflowAction::Restore => "restore",
        }
    }

    /// Permission the route for this action is gated on.
    pub fn required_permission(self) -> &'static str {
        match self {
            WorkflowAction::Review => ASSET_REVIEW,
            WorkflowAction::Approve | WorkflowAction::Reject | WorkflowAction::Restore => {
                ASSET_APPROVE
            }
        }
    }

    /// Status reached when the action succeeds.
    pub fn target(self) -> AssetStatus {
        match self {
            WorkflowAction::Approve => AssetStatus::Approved,
            WorkflowAction::Reject => AssetStatus::Rejected,
            WorkflowAction::Review => AssetStatus::Reviewed,
            WorkflowAction::Restore => AssetStatus::Restored,
        }
    }

    pub fn allowed_from(self, from: AssetStatus) -> bool {
        match self {
            WorkflowAction::Approve | WorkflowAction::Reject => from.awaits_decision(),
            WorkflowAction::Review => from == AssetStatus::Approved,
            WorkflowAction::Restore => from.is_terminal(),
        }
    }
}

/// Resolve the next status for `action` applied to an asset in `from`.
///
/// Returns [`CoreError::Conflict`] when the transition is not allowed.
pub fn transition(from: AssetStatus, action: WorkflowAction) -> Result<AssetStatus, CoreError> {
    if action.allowed_from(from) {
        Ok(action.target())
    } else {
        Err(CoreError::Conflict(format!(
            "Cannot {} an asset that is {}",
            action.as_str(),
            from
        )))
    }
}
