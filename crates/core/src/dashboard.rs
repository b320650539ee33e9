//! Dashboard aggregation rules: status/category breakdowns and the task list.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::Serialize;

use crate::item_status::StatusBucket;

/// Category label used for items without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Trailing window (days) for the "new users" task.
pub const NEW_USER_WINDOW_DAYS: i64 = 7;

/// Number of recent assets / users shown on the dashboard.
pub const RECENT_LIMIT: i64 = 5;

pub const APPROVALS_LINK: &str = "/assets-management/approvals";
pub const MAINTENANCE_ITEMS_LINK: &str = "/assets-management?item_status=maintenance";
pub const USERS_LINK: &str = "/settings/users";

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// The two facts about an asset item the breakdowns need.
#[derive(Debug, Clone)]
pub struct ItemFact {
    pub category_name: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AssetStatistics {
    pub category_counts: BTreeMap<String, i64>,
    /// Always holds all four buckets, zero when empty.
    pub status_counts: BTreeMap<StatusBucket, i64>,
    /// Items whose status maps to no bucket. Not part of `status_counts`.
    pub unclassified: i64,
}

/// Count items per category and per status bucket in a single pass.
pub fn compute_asset_statistics<I>(items: I) -> AssetStatistics
where
    I: IntoIterator<Item = ItemFact>,
{
    let mut stats = AssetStatistics {
        status_counts: StatusBucket::ALL.into_iter().map(|b| (b, 0)).collect(),
        ..AssetStatistics::default()
    };

    for item in items {
        let category = item
            .category_name
            .unwrap_or_else(|| UNCATEGORIZED.to_string());
        *stats.category_counts.entry(category).or_insert(0) += 1;

        match StatusBucket::classify(&item.status) {
            Some(bucket) => *stats.status_counts.entry(bucket).or_insert(0) += 1,
            None => stats.unclassified += 1,
        }
    }

    stats
}

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    High,
    Medium,
    Low,
}

impl TaskPriority {
    pub fn rank(self) -> u8 {
        match self {
            TaskPriority::High => 3,
            TaskPriority::Medium => 2,
            TaskPriority::Low => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub task_type: &'static str,
    pub title: &'static str,
    pub description: String,
    pub count: i64,
    pub priority: TaskPriority,
    pub icon: &'static str,
    pub color: &'static str,
    pub route: &'static str,
    pub category: &'static str,
    pub current_stage: &'static str,
    pub next_stage: &'static str,
}

/// Counts that drive task generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskInputs {
    pub assets_pending_approval: i64,
    pub items_in_maintenance: i64,
    pub new_users: i64,
}

/// Priority rank descending, then count descending.
pub fn compare_tasks(a: &Task, b: &Task) -> Ordering {
    b.priority
        .rank()
        .cmp(&a.priority.rank())
        .then_with(|| b.count.cmp(&a.count))
}

pub fn sort_tasks(tasks: &mut [Task]) {
    tasks.sort_by(compare_tasks);
}

/// Build at most one task per non-zero condition, already sorted.
pub fn generate_tasks(inputs: TaskInputs) -> Vec<Task> {
    let mut tasks = Vec::with_capacity(3);

    if inputs.assets_pending_approval > 0 {
        let n = inputs.assets_pending_approval;
        tasks.push(Task {
            id: "assets_pending_approval",
            task_type: "workflow",
            title: "Assets Awaiting Approval",
            description: format!("{n} assets waiting for approval"),
            count: n,
            priority: TaskPriority::High,
            icon: "cube",
            color: "yellow",
            route: APPROVALS_LINK,
            category: "Assets",
            current_stage: "Pending Approval",
            next_stage: "Review",
        });
    }

    if inputs.items_in_maintenance > 0 {
        let n = inputs.items_in_maintenance;
        tasks.push(Task {
            id: "assets_maintenance",
            task_type: "maintenance",
            title: "Assets in Maintenance",
            description: format!("{n} asset items require maintenance attention"),
            count: n,
            priority: TaskPriority::Medium,
            icon: "wrench",
            color: "orange",
            route: MAINTENANCE_ITEMS_LINK,
            category: "Assets",
            current_stage: "Maintenance",
            next_stage: "Complete",
        });
    }

    if inputs.new_users > 0 {
        let n = inputs.new_users;
        tasks.push(Task {
            id: "new_users",
            task_type: "info",
            title: "New Users This Week",
            description: format!("{n} new users registered in the last {NEW_USER_WINDOW_DAYS} days"),
            count: n,
            priority: TaskPriority::Low,
            icon: "user-plus",
            color: "blue",
            route: USERS_LINK,
            category: "Users",
            current_stage: "New",
            next_stage: "Active",
        });
    }

    sort_tasks(&mut tasks);
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item_status;

    fn fact(category: Option<&str>, status: &str) -> ItemFact {
        ItemFact {
            category_name: category.map(str::to_string),
            status: status.to_string(),
        }
    }

    fn task(priority: TaskPriority, count: i64) -> Task {
        Task {
            id: "t",
            task_type: "info",
            title: "t",
            description: String::new(),
            count,
            priority,
            icon: "",
            color: "",
            route: "",
            category: "",
            current_stage: "",
            next_stage: "",
        }
    }

    #[test]
    fn empty_input_has_four_zero_buckets() {
        let stats = compute_asset_statistics(Vec::new());
        assert_eq!(stats.status_counts.len(), 4);
        assert!(stats.status_counts.values().all(|&n| n == 0));
        assert!(stats.category_counts.is_empty());
        assert_eq!(stats.unclassified, 0);
    }

    #[test]
    fn each_known_status_increments_exactly_its_bucket() {
        let table = [
            (item_status::IN_USE, StatusBucket::InUse),
            (item_status::GOOD, StatusBucket::InUse),
            (item_status::MAINTENANCE, StatusBucket::Maintenance),
            (item_status::DISPOSED, StatusBucket::Disposed),
            (item_status::RETIRED, StatusBucket::Disposed),
            (item_status::NON_FUNCTIONAL, StatusBucket::Disposed),
            (item_status::PENDING_APPROVAL, StatusBucket::PendingApproval),
        ];
        for (raw, expected) in table {
            let stats = compute_asset_statistics(vec![fact(None, raw)]);
            for bucket in StatusBucket::ALL {
                let want = i64::from(bucket == expected);
                assert_eq!(stats.status_counts[&bucket], want, "{raw} -> {bucket:?}");
            }
        }
    }

    #[test]
    fn unknown_status_increments_no_bucket() {
        let stats = compute_asset_statistics(vec![fact(Some("Laptops"), "scrapped")]);
        assert!(stats.status_counts.values().all(|&n| n == 0));
        assert_eq!(stats.unclassified, 1);
        // Still counted under its category.
        assert_eq!(stats.category_counts["Laptops"], 1);
    }

    #[test]
    fn missing_category_is_uncategorized() {
        let stats = compute_asset_statistics(vec![
            fact(None, "in_use"),
            fact(Some("Vehicles"), "in_use"),
            fact(None, "maintenance"),
        ]);
        assert_eq!(stats.category_counts[UNCATEGORIZED], 2);
        assert_eq!(stats.category_counts["Vehicles"], 1);
        assert_eq!(stats.status_counts[&StatusBucket::InUse], 2);
        assert_eq!(stats.status_counts[&StatusBucket::Maintenance], 1);
    }

    #[test]
    fn status_counts_serialize_with_bucket_labels() {
        let stats = compute_asset_statistics(vec![fact(None, "Good")]);
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["status_counts"]["In Use"], 1);
        assert_eq!(json["status_counts"]["Pending Approval"], 0);
    }

    #[test]
    fn tasks_sort_by_priority_then_count() {
        let mut tasks = vec![
            task(TaskPriority::Low, 50),
            task(TaskPriority::High, 1),
            task(TaskPriority::Medium, 5),
        ];
        sort_tasks(&mut tasks);
        let order: Vec<(TaskPriority, i64)> = tasks.iter().map(|t| (t.priority, t.count)).collect();
        assert_eq!(
            order,
            vec![
                (TaskPriority::High, 1),
                (TaskPriority::Medium, 5),
                (TaskPriority::Low, 50)
            ]
        );
    }

    #[test]
    fn equal_priority_breaks_ties_by_count() {
        let mut tasks = vec![task(TaskPriority::Medium, 2), task(TaskPriority::Medium, 9)];
        sort_tasks(&mut tasks);
        assert_eq!(tasks[0].count, 9);
    }

    #[test]
    fn zero_counts_produce_no_tasks() {
        assert!(generate_tasks(TaskInputs::default()).is_empty());
    }

    #[test]
    fn generated_tasks_are_ordered_and_linked() {
        let tasks = generate_tasks(TaskInputs {
            assets_pending_approval: 1,
            items_in_maintenance: 5,
            new_users: 50,
        });
        let ids: Vec<&str> = tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["assets_pending_approval", "assets_maintenance", "new_users"]);
        assert_eq!(tasks[0].route, APPROVALS_LINK);
        assert_eq!(tasks[2].description, "50 new users registered in the last 7 days");
    }

    #[test]
    fn only_nonzero_conditions_yield_tasks() {
        let tasks = generate_tasks(TaskInputs {
            assets_pending_approval: 0,
            items_in_maintenance: 3,
            new_users: 0,
        });
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].priority, TaskPriority::Medium);
    }
}
