use std::sync::Arc;

use chrono::{DateTime, Utc};
use niramay::db::{AppDbDriver, AppDbHandle, BaseRepository};
use uuid::Uuid;

use crate::entity::{
    Complaint, ComplaintStatus, EcoPoints, EcoStoreItem, PointTransaction,
    Priority, Redemption, RedemptionWithItem, Role, Task, TaskStatus,
    TaskWithComplaint, TransactionKind, User, UserRole, WorkerAvailability,
    WorkerStatus,
};

pub struct NewComplaint {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub priority: Priority,
    pub city: String,
    pub locality: String,
}

pub struct NewTask {
    pub complaint_id: Uuid,
    pub admin_id: Uuid,
    pub worker_id: Uuid,
    pub title: String,
    pub description: Option<String>,
}

pub struct NewPointTransaction {
    pub user_id: Uuid,
    pub kind: TransactionKind,
    pub points: i32,
    pub description: String,
    pub complaint_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
}

pub struct NewRedemption {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub points_used: i32,
    pub delivery_address: String,
    pub notes: Option<String>,
}

#[async_trait::async_trait]
pub trait UserRepository: Sync + Send {
    async fn insert_user(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        full_name: &str,
        email: &str,
        national_id: &str,
    ) -> niramay::Result<User>;

    async fn find_user(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<User>>;

    async fn national_id_exists(
        &self,
        h: &mut AppDbHandle<'_>,
        national_id: &str,
    ) -> niramay::Result<bool>;
}

#[async_trait::async_trait]
pub trait UserRoleRepository: Sync + Send {
    async fn insert_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        role: Role,
        city: &str,
        locality: &str,
    ) -> niramay::Result<UserRole>;

    async fn find_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Option<UserRole>>;
}

/// Status writes are compare-and-swap: they return `None` when the row is
/// not in one of the `from` states, and never touch it in that case.
#[async_trait::async_trait]
pub trait ComplaintRepository: Sync + Send {
    async fn insert_complaint(
        &self,
        h: &mut AppDbHandle<'_>,
        complaint: NewComplaint,
    ) -> niramay::Result<Complaint>;

    async fn find_complaint(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<Complaint>>;

    async fn list_by_reporter(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Vec<Complaint>>;

    async fn list_by_area(
        &self,
        h: &mut AppDbHandle<'_>,
        city: &str,
        locality: &str,
    ) -> niramay::Result<Vec<Complaint>>;

    async fn transition(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        from: &[ComplaintStatus],
        to: ComplaintStatus,
    ) -> niramay::Result<Option<Complaint>>;
}

#[async_trait::async_trait]
pub trait TaskRepository: Sync + Send {
    async fn insert_task(
        &self,
        h: &mut AppDbHandle<'_>,
        task: NewTask,
    ) -> niramay::Result<Task>;

    async fn find_task(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<Task>>;

    async fn find_open_by_complaint(
        &self,
        h: &mut AppDbHandle<'_>,
        complaint_id: Uuid,
    ) -> niramay::Result<Option<Task>>;

    async fn list_by_worker(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
    ) -> niramay::Result<Vec<TaskWithComplaint>>;

    async fn list_by_admin(
        &self,
        h: &mut AppDbHandle<'_>,
        admin_id: Uuid,
    ) -> niramay::Result<Vec<Task>>;

    /// `assigned -> in_progress` for the owning worker.
    async fn start(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        worker_id: Uuid,
        from: &[TaskStatus],
        at: DateTime<Utc>,
    ) -> niramay::Result<Option<Task>>;

    /// `in_progress -> completed` for the owning worker.
    async fn complete(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        worker_id: Uuid,
        from: &[TaskStatus],
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> niramay::Result<Option<Task>>;

    /// `assigned -> cancelled`.
    async fn cancel(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        from: &[TaskStatus],
        notes: Option<&str>,
    ) -> niramay::Result<Option<Task>>;
}

#[async_trait::async_trait]
pub trait WorkerStatusRepository: Sync + Send {
    async fn insert_status(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
        city: &str,
        locality: &str,
    ) -> niramay::Result<WorkerStatus>;

    async fn find_status(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
    ) -> niramay::Result<Option<WorkerStatus>>;

    async fn list_by_area(
        &self,
        h: &mut AppDbHandle<'_>,
        city: &str,
        locality: &str,
    ) -> niramay::Result<Vec<WorkerStatus>>;

    /// Marks the worker busy on `task_id` if currently in `from`.
    async fn occupy(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
        from: &[WorkerAvailability],
        task_id: Uuid,
    ) -> niramay::Result<Option<WorkerStatus>>;

    /// Returns the worker to `available` and clears the current task.
    async fn release(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
    ) -> niramay::Result<Option<WorkerStatus>>;

    /// Switches between `available` and `offline`; busy workers are left
    /// untouched.
    async fn set_availability(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
        to: WorkerAvailability,
    ) -> niramay::Result<Option<WorkerStatus>>;
}

#[async_trait::async_trait]
pub trait PointsRepository: Sync + Send {
    async fn open_account(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<EcoPoints>;

    async fn find_account(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Option<EcoPoints>>;

    /// Adds to `points` and `total_earned`, creating the row when missing.
    async fn credit(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        points: i32,
    ) -> niramay::Result<EcoPoints>;

    /// Moves `points` to `total_redeemed`. `None` when the balance is short.
    async fn debit(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        points: i32,
    ) -> niramay::Result<Option<EcoPoints>>;

    async fn insert_transaction(
        &self,
        h: &mut AppDbHandle<'_>,
        tx: NewPointTransaction,
    ) -> niramay::Result<PointTransaction>;

    async fn list_transactions(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Vec<PointTransaction>>;
}

#[async_trait::async_trait]
pub trait StoreItemRepository:
    BaseRepository<EcoStoreItem, Uuid, AppDbDriver> + Sync + Send
{
    async fn list_active(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> niramay::Result<Vec<EcoStoreItem>>;

    /// Decrements stock by one unit. `None` when out of stock or inactive.
    async fn take_one(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<EcoStoreItem>>;
}

#[async_trait::async_trait]
pub trait RedemptionRepository: Sync + Send {
    async fn insert_redemption(
        &self,
        h: &mut AppDbHandle<'_>,
        redemption: NewRedemption,
    ) -> niramay::Result<Redemption>;

    async fn list_by_user(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Vec<RedemptionWithItem>>;
}

/// Every repository the usecases and services depend on.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn UserRoleRepository>,
    pub complaints: Arc<dyn ComplaintRepository>,
    pub tasks: Arc<dyn TaskRepository>,
    pub workers: Arc<dyn WorkerStatusRepository>,
    pub points: Arc<dyn PointsRepository>,
    pub items: Arc<dyn StoreItemRepository>,
    pub redemptions: Arc<dyn RedemptionRepository>,
}
