use std::sync::Arc;

use chrono::Utc;
use niramay::{
    config::RewardsConfig,
    db::{AppDbHandle, AppDbPool, Handle},
};
use uuid::Uuid;

use crate::{
    entity::{
        ComplaintStatus, Role, Task, TaskStatus, WorkerAvailability,
        WorkerStatus,
    },
    repository::Repositories,
    service::{AwardCommand, LedgerServiceTx, RoleServiceTx},
    usecase::{
        CompleteTaskCommand, CompleteTaskUsecase, SetAvailabilityCommand,
        SetAvailabilityUsecase, StartTaskCommand, StartTaskUsecase,
    },
};

pub struct TaskUsecaseImpl {
    pub pool: AppDbPool,
    pub repos: Repositories,
    pub roles: Arc<dyn RoleServiceTx>,
    pub ledger: Arc<dyn LedgerServiceTx>,
    pub rewards: RewardsConfig,
}

impl TaskUsecaseImpl {
    pub fn new(
        pool: AppDbPool,
        repos: Repositories,
        roles: Arc<dyn RoleServiceTx>,
        ledger: Arc<dyn LedgerServiceTx>,
        rewards: RewardsConfig,
    ) -> Self {
        Self {
            pool,
            repos,
            roles,
            ledger,
            rewards,
        }
    }

    /// Loads a task and checks it belongs to `worker_id`.
    async fn owned_task(
        &self,
        h: &mut AppDbHandle<'_>,
        task_id: Uuid,
        worker_id: Uuid,
    ) -> niramay::Result<Task> {
        let task = self
            .repos
            .tasks
            .find_task(h, task_id)
            .await?
            .ok_or_else(|| {
                niramay::Error::NotFound(format!("task {}", task_id))
            })?;
        if task.worker_id != worker_id {
            return Err(niramay::Error::Forbidden(
                "task is assigned to another worker".to_string(),
            ));
        }
        Ok(task)
    }
}

fn complaint_moved() -> niramay::Error {
    niramay::Error::Conflict("complaint was updated concurrently".to_string())
}

#[async_trait::async_trait]
impl StartTaskUsecase for TaskUsecaseImpl {
    async fn execute(&self, command: StartTaskCommand) -> niramay::Result<Task> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        self.roles
            .require_role(&mut tx, command.worker_id, Role::Worker)
            .await?;
        let task =
            self.owned_task(&mut tx, command.task_id, command.worker_id).await?;
        let started = self
            .repos
            .tasks
            .start(
                &mut tx,
                task.id,
                command.worker_id,
                &TaskStatus::predecessors(TaskStatus::InProgress),
                Utc::now(),
            )
            .await?
            .ok_or_else(|| {
                niramay::Error::Conflict(format!(
                    "task is {}, expected assigned",
                    task.status.as_str()
                ))
            })?;
        self.repos
            .complaints
            .transition(
                &mut tx,
                task.complaint_id,
                &[ComplaintStatus::Assigned],
                ComplaintStatus::InProgress,
            )
            .await?
            .ok_or_else(complaint_moved)?;
        // already busy on this task in the normal flow
        self.repos
            .workers
            .occupy(
                &mut tx,
                command.worker_id,
                &[
                    WorkerAvailability::Available,
                    WorkerAvailability::Busy,
                    WorkerAvailability::Offline,
                ],
                task.id,
            )
            .await?
            .ok_or_else(|| {
                niramay::Error::NotFound(format!(
                    "worker status {}",
                    command.worker_id
                ))
            })?;
        tx.commit().await?;

        tracing::info!(task_id = %started.id, "task started");
        Ok(started)
    }
}

#[async_trait::async_trait]
impl CompleteTaskUsecase for TaskUsecaseImpl {
    async fn execute(
        &self,
        command: CompleteTaskCommand,
    ) -> niramay::Result<Task> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        self.roles
            .require_role(&mut tx, command.worker_id, Role::Worker)
            .await?;
        let task =
            self.owned_task(&mut tx, command.task_id, command.worker_id).await?;
        let notes = command
            .notes
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty());
        let completed = self
            .repos
            .tasks
            .complete(
                &mut tx,
                task.id,
                command.worker_id,
                &TaskStatus::predecessors(TaskStatus::Completed),
                notes,
                Utc::now(),
            )
            .await?
            .ok_or_else(|| {
                niramay::Error::Conflict(format!(
                    "task is {}, expected in_progress",
                    task.status.as_str()
                ))
            })?;
        let complaint = self
            .repos
            .complaints
            .transition(
                &mut tx,
                task.complaint_id,
                &[ComplaintStatus::InProgress],
                ComplaintStatus::Completed,
            )
            .await?
            .ok_or_else(complaint_moved)?;

        self.ledger
            .award_completion(
                &mut tx,
                AwardCommand {
                    user_id: complaint.user_id,
                    points: self.rewards.completion_points,
                    complaint_id: complaint.id,
                    task_id: completed.id,
                },
            )
            .await?;
        self.repos.workers.release(&mut tx, command.worker_id).await?;
        tx.commit().await?;

        tracing::info!(
            task_id = %completed.id,
            complaint_id = %complaint.id,
            "task completed"
        );
        Ok(completed)
    }
}

#[async_trait::async_trait]
impl SetAvailabilityUsecase for TaskUsecaseImpl {
    async fn execute(
        &self,
        command: SetAvailabilityCommand,
    ) -> niramay::Result<WorkerStatus> {
        command.validate()?;
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        self.roles
            .require_role(&mut tx, command.worker_id, Role::Worker)
            .await?;
        let current = self
            .repos
            .workers
            .find_status(&mut tx, command.worker_id)
            .await?
            .ok_or_else(|| {
                niramay::Error::NotFound(format!(
                    "worker status {}",
                    command.worker_id
                ))
            })?;
        if current.status == WorkerAvailability::Busy {
            return Err(niramay::Error::Conflict(
                "busy workers cannot change availability".to_string(),
            ));
        }
        let status = self
            .repos
            .workers
            .set_availability(&mut tx, command.worker_id, command.availability)
            .await?
            .ok_or_else(|| {
                niramay::Error::Conflict(
                    "busy workers cannot change availability".to_string(),
                )
            })?;
        tx.commit().await?;
        Ok(status)
    }
}
