//! Maintenance record lifecycle.
//!
//! `scheduled -> in_progress -> completed`, with `cancelled` reachable from
//! either open state. Completed and cancelled records are closed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaintenanceStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl MaintenanceStatus {
    pub const ALL: [MaintenanceStatus; 4] = [
        MaintenanceStatus::Scheduled,
        MaintenanceStatus::InProgress,
        MaintenanceStatus::Completed,
        MaintenanceStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MaintenanceStatus::Scheduled => "scheduled",
            MaintenanceStatus::InProgress => "in_progress",
            MaintenanceStatus::Completed => "completed",
            MaintenanceStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_open(self) -> bool {
        matches!(self, MaintenanceStatus::Scheduled | MaintenanceStatus::InProgress)
    }

    /// Whether an edit may move a record from `self` to `next`.
    pub fn can_move_to(self, next: MaintenanceStatus) -> bool {
        if self == next {
            return true;
        }
        match self {
            MaintenanceStatus::Scheduled => next != MaintenanceStatus::Scheduled,
            MaintenanceStatus::InProgress => {
                matches!(next, MaintenanceStatus::Completed | MaintenanceStatus::Cancelled)
            }
            MaintenanceStatus::Completed | MaintenanceStatus::Cancelled => false,
        }
    }
}

impl fmt::Display for MaintenanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MaintenanceStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaintenanceStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("Unknown maintenance status '{s}'")))
    }
}

/// Check a status change requested by an edit.
pub fn validate_status_change(
    from: MaintenanceStatus,
    to: MaintenanceStatus,
) -> Result<(), CoreError> {
    if from.can_move_to(to) {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Maintenance record cannot move from {from} to {to}"
        )))
    }
}

/// Check that a record may be marked completed.
pub fn ensure_can_complete(current: MaintenanceStatus) -> Result<(), CoreError> {
    if current.is_open() {
        Ok(())
    } else {
        Err(CoreError::Conflict(format!(
            "Maintenance record is already {current}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn open_records_can_complete() {
        assert!(ensure_can_complete(MaintenanceStatus::Scheduled).is_ok());
        assert!(ensure_can_complete(MaintenanceStatus::InProgress).is_ok());
    }

    #[test]
    fn closed_records_cannot_complete() {
        assert_matches!(
            ensure_can_complete(MaintenanceStatus::Completed),
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            ensure_can_complete(MaintenanceStatus::Cancelled),
            Err(CoreError::Conflict(_))
        );
    }

    #[test]
    fn in_progress_cannot_go_back_to_scheduled() {
        assert!(validate_status_change(MaintenanceStatus::InProgress, MaintenanceStatus::Scheduled)
            .is_err());
        assert!(validate_status_change(MaintenanceStatus::Scheduled, MaintenanceStatus::InProgress)
            .is_ok());
    }

    #[test]
    fn unchanged_status_is_always_allowed() {
        for status in MaintenanceStatus::ALL {
            assert!(validate_status_change(status, status).is_ok());
        }
    }

    #[test]
    fn parse_rejects_unknown_values() {
        assert_eq!(
            "in_progress".parse::<MaintenanceStatus>().unwrap(),
            MaintenanceStatus::InProgress
        );
        assert!("done".parse::<MaintenanceStatus>().is_err());
    }
}
