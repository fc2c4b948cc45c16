use niramay::db::AppDbHandle;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{
    Area, Complaint, ComplaintStatus, EcoPoints, EcoStoreItem,
    PointTransaction, RedemptionWithItem, Role, Task, TaskStatus,
    TaskWithComplaint, User, UserRole, WorkerAvailability, WorkerStatus,
    format_national_id,
};

pub struct AwardCommand {
    pub user_id: Uuid,
    pub points: i32,
    pub complaint_id: Uuid,
    pub task_id: Uuid,
}

// Points ledger. Every balance change is paired with one transaction row.
#[async_trait::async_trait]
pub trait LedgerServiceTx: Sync + Send {
    async fn award_completion(
        &self,
        h: &mut AppDbHandle<'_>,
        command: AwardCommand,
    ) -> niramay::Result<EcoPoints>;

    async fn spend(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        item: &EcoStoreItem,
    ) -> niramay::Result<EcoPoints>;
}

#[async_trait::async_trait]
pub trait RoleServiceTx: Sync + Send {
    /// One-time role creation plus the per-role bootstrap rows.
    async fn setup_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        role: Role,
        area: Area,
    ) -> niramay::Result<UserRole>;

    /// Loads the caller's role and rejects anything but `role`.
    async fn require_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        role: Role,
    ) -> niramay::Result<UserRole>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub user: Option<User>,
    pub role: Option<UserRole>,
    pub national_id_display: Option<String>,
}

impl Profile {
    pub fn new(user: Option<User>, role: Option<UserRole>) -> Self {
        let national_id_display =
            user.as_ref().map(|u| format_national_id(&u.national_id));
        Profile {
            user,
            role,
            national_id_display,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CitizenDashboard {
    pub complaints: Vec<Complaint>,
    pub points: EcoPoints,
    pub completed_complaints: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCounters {
    pub pending_complaints: usize,
    pub completed_tasks: usize,
    pub available_workers: usize,
}

impl AdminCounters {
    pub fn tally(
        complaints: &[Complaint],
        tasks: &[Task],
        workers: &[WorkerStatus],
    ) -> Self {
        Self {
            pending_complaints: complaints
                .iter()
                .filter(|c| c.status == ComplaintStatus::Submitted)
                .count(),
            completed_tasks: tasks
                .iter()
                .filter(|t| t.status == TaskStatus::Completed)
                .count(),
            available_workers: workers
                .iter()
                .filter(|w| w.status == WorkerAvailability::Available)
                .count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminDashboard {
    pub area: Area,
    pub complaints: Vec<Complaint>,
    pub workers: Vec<WorkerStatus>,
    pub tasks: Vec<Task>,
    pub counters: AdminCounters,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerCounters {
    pub assigned: usize,
    pub in_progress: usize,
    pub completed: usize,
}

impl WorkerCounters {
    pub fn tally(tasks: &[TaskWithComplaint]) -> Self {
        let count = |status: TaskStatus| {
            tasks.iter().filter(|t| t.task.status == status).count()
        };
        Self {
            assigned: count(TaskStatus::Assigned),
            in_progress: count(TaskStatus::InProgress),
            completed: count(TaskStatus::Completed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerDashboard {
    pub status: Option<WorkerStatus>,
    pub tasks: Vec<TaskWithComplaint>,
    pub counters: WorkerCounters,
}

// Read side, runs straight on the pool.
#[async_trait::async_trait]
pub trait DashboardService: Sync + Send {
    async fn profile(&self, user_id: Uuid) -> niramay::Result<Profile>;

    async fn citizen_dashboard(
        &self,
        user_id: Uuid,
    ) -> niramay::Result<CitizenDashboard>;

    async fn admin_dashboard(
        &self,
        admin_id: Uuid,
    ) -> niramay::Result<AdminDashboard>;

    async fn worker_dashboard(
        &self,
        worker_id: Uuid,
    ) -> niramay::Result<WorkerDashboard>;

    async fn store_items(&self) -> niramay::Result<Vec<EcoStoreItem>>;

    async fn redemptions(
        &self,
        user_id: Uuid,
    ) -> niramay::Result<Vec<RedemptionWithItem>>;

    async fn transactions(
        &self,
        user_id: Uuid,
    ) -> niramay::Result<Vec<PointTransaction>>;
}

mod dashboard_service_impl;
mod ledger_service_impl;
mod role_service_impl;

pub use dashboard_service_impl::*;
pub use ledger_service_impl::*;
pub use role_service_impl::*;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Priority;
    use chrono::Utc;

    fn complaint(status: ComplaintStatus) -> Complaint {
        Complaint {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Dumped debris".into(),
            description: None,
            photo_url: "https://img.example.com/1.jpg".into(),
            latitude: 0.0,
            longitude: 0.0,
            address: "Kothrud, Pune".into(),
            priority: Priority::Medium,
            locality: "Kothrud".into(),
            city: "Pune".into(),
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(status: TaskStatus) -> Task {
        Task {
            id: Uuid::new_v4(),
            complaint_id: Uuid::new_v4(),
            admin_id: Uuid::new_v4(),
            worker_id: Uuid::new_v4(),
            title: "Cleanup: Dumped debris".into(),
            description: None,
            status,
            assigned_at: Utc::now(),
            started_at: None,
            completed_at: None,
            notes: None,
        }
    }

    fn worker(status: WorkerAvailability) -> WorkerStatus {
        WorkerStatus {
            worker_id: Uuid::new_v4(),
            status,
            current_task_id: None,
            locality: "Kothrud".into(),
            city: "Pune".into(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_profile_carries_display_national_id() {
        let user = User {
            id: Uuid::new_v4(),
            full_name: "Asha Patil".into(),
            email: "asha@example.com".into(),
            national_id: "123456789012".into(),
            created_at: Utc::now(),
        };
        let profile = Profile::new(Some(user), None);
        assert_eq!(
            profile.national_id_display.as_deref(),
            Some("1234-5678-9012")
        );
        assert!(Profile::new(None, None).national_id_display.is_none());
    }

    #[test]
    fn test_admin_counters() {
        let counters = AdminCounters::tally(
            &[
                complaint(ComplaintStatus::Submitted),
                complaint(ComplaintStatus::Submitted),
                complaint(ComplaintStatus::Assigned),
                complaint(ComplaintStatus::Rejected),
            ],
            &[task(TaskStatus::Completed), task(TaskStatus::Cancelled)],
            &[
                worker(WorkerAvailability::Available),
                worker(WorkerAvailability::Busy),
                worker(WorkerAvailability::Offline),
            ],
        );
        assert_eq!(
            counters,
            AdminCounters {
                pending_complaints: 2,
                completed_tasks: 1,
                available_workers: 1,
            }
        );
    }

    #[test]
    fn test_worker_counters() {
        let with_complaint = |status| TaskWithComplaint {
            task: task(status),
            reporter_id: Uuid::new_v4(),
            address: "Kothrud, Pune".into(),
            latitude: 0.0,
            longitude: 0.0,
            photo_url: "https://img.example.com/1.jpg".into(),
            priority: Priority::Low,
        };
        let counters = WorkerCounters::tally(&[
            with_complaint(TaskStatus::Assigned),
            with_complaint(TaskStatus::InProgress),
            with_complaint(TaskStatus::Completed),
            with_complaint(TaskStatus::Completed),
            with_complaint(TaskStatus::Cancelled),
        ]);
        assert_eq!(
            counters,
            WorkerCounters {
                assigned: 1,
                in_progress: 1,
                completed: 2,
            }
        );
    }
}
