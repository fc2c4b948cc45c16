use std::sync::Arc;

use niramay::db::{AppDbPool, Handle};

use crate::{
    entity::{
        Complaint, ComplaintStatus, Role, Task, TaskStatus, WorkerAvailability,
    },
    geo::Geocoder,
    repository::{NewComplaint, NewTask, Repositories},
    service::RoleServiceTx,
    usecase::{
        AssignComplaintCommand, AssignComplaintUsecase, RejectComplaintCommand,
        RejectComplaintUsecase, SubmitComplaintCommand, SubmitComplaintUsecase,
    },
};

pub struct ComplaintUsecaseImpl {
    pub pool: AppDbPool,
    pub repos: Repositories,
    pub roles: Arc<dyn RoleServiceTx>,
    pub geocoder: Arc<dyn Geocoder>,
}

impl ComplaintUsecaseImpl {
    pub fn new(
        pool: AppDbPool,
        repos: Repositories,
        roles: Arc<dyn RoleServiceTx>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            pool,
            repos,
            roles,
            geocoder,
        }
    }
}

fn transition_conflict(
    complaint: &Complaint,
    to: ComplaintStatus,
) -> niramay::Error {
    niramay::Error::Conflict(format!(
        "complaint cannot move from {} to {}",
        complaint.status.as_str(),
        to.as_str()
    ))
}

#[async_trait::async_trait]
impl SubmitComplaintUsecase for ComplaintUsecaseImpl {
    async fn execute(
        &self,
        command: SubmitComplaintCommand,
    ) -> niramay::Result<Complaint> {
        command.validate()?;
        // resolved before the transaction opens
        let address = match command.given_address() {
            Some(address) => address.to_string(),
            None => {
                self.geocoder
                    .reverse(command.latitude, command.longitude)
                    .await
            }
        };

        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;
        let reporter = self
            .roles
            .require_role(&mut tx, command.user_id, Role::Citizen)
            .await?;
        let complaint = self
            .repos
            .complaints
            .insert_complaint(
                &mut tx,
                NewComplaint {
                    user_id: command.user_id,
                    title: command.title.trim().to_string(),
                    description: command.description,
                    photo_url: command.photo_url,
                    latitude: command.latitude,
                    longitude: command.longitude,
                    address,
                    priority: command.priority.unwrap_or_default(),
                    city: reporter.city,
                    locality: reporter.locality,
                },
            )
            .await?;
        tx.commit().await?;

        tracing::info!(complaint_id = %complaint.id, "complaint submitted");
        Ok(complaint)
    }
}

#[async_trait::async_trait]
impl AssignComplaintUsecase for ComplaintUsecaseImpl {
    async fn execute(
        &self,
        command: AssignComplaintCommand,
    ) -> niramay::Result<Task> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        let admin = self
            .roles
            .require_role(&mut tx, command.admin_id, Role::Admin)
            .await?;
        let complaint = self
            .repos
            .complaints
            .find_complaint(&mut tx, command.complaint_id)
            .await?
            .ok_or_else(|| {
                niramay::Error::NotFound(format!(
                    "complaint {}",
                    command.complaint_id
                ))
            })?;
        if !admin.covers(&complaint.city, &complaint.locality) {
            return Err(niramay::Error::Forbidden(
                "complaint is outside your area".to_string(),
            ));
        }
        if !complaint.status.can_transition_to(ComplaintStatus::Assigned) {
            return Err(transition_conflict(
                &complaint,
                ComplaintStatus::Assigned,
            ));
        }

        let worker_role = self
            .repos
            .roles
            .find_role(&mut tx, command.worker_id)
            .await?;
        if worker_role.is_none_or(|r| r.role != Role::Worker) {
            return Err(niramay::Error::Validation(format!(
                "{} is not a worker",
                command.worker_id
            )));
        }
        let worker = self
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
        if worker.city != complaint.city || worker.locality != complaint.locality
        {
            return Err(niramay::Error::Validation(
                "worker is outside the complaint's area".to_string(),
            ));
        }
        if worker.status != WorkerAvailability::Available {
            return Err(niramay::Error::Conflict(
                "worker is not available".to_string(),
            ));
        }

        self.repos
            .complaints
            .transition(
                &mut tx,
                complaint.id,
                &[ComplaintStatus::Submitted],
                ComplaintStatus::Assigned,
            )
            .await?
            .ok_or_else(|| {
                niramay::Error::Conflict(
                    "complaint was updated concurrently".to_string(),
                )
            })?;
        let task = self
            .repos
            .tasks
            .insert_task(
                &mut tx,
                NewTask {
                    complaint_id: complaint.id,
                    admin_id: admin.user_id,
                    worker_id: worker.worker_id,
                    title: Task::title_for(&complaint),
                    description: complaint.description.clone(),
                },
            )
            .await?;
        self.repos
            .workers
            .occupy(
                &mut tx,
                worker.worker_id,
                &[WorkerAvailability::Available],
                task.id,
            )
            .await?
            .ok_or_else(|| {
                niramay::Error::Conflict("worker is not available".to_string())
            })?;
        tx.commit().await?;

        tracing::info!(
            complaint_id = %complaint.id,
            task_id = %task.id,
            worker_id = %task.worker_id,
            "complaint assigned"
        );
        Ok(task)
    }
}

#[async_trait::async_trait]
impl RejectComplaintUsecase for ComplaintUsecaseImpl {
    async fn execute(
        &self,
        command: RejectComplaintCommand,
    ) -> niramay::Result<Complaint> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        let admin = self
            .roles
            .require_role(&mut tx, command.admin_id, Role::Admin)
            .await?;
        let complaint = self
            .repos
            .complaints
            .find_complaint(&mut tx, command.complaint_id)
            .await?
            .ok_or_else(|| {
                niramay::Error::NotFound(format!(
                    "complaint {}",
                    command.complaint_id
                ))
            })?;
        if !admin.covers(&complaint.city, &complaint.locality) {
            return Err(niramay::Error::Forbidden(
                "complaint is outside your area".to_string(),
            ));
        }

        let rejected = self
            .repos
            .complaints
            .transition(
                &mut tx,
                complaint.id,
                &ComplaintStatus::predecessors(ComplaintStatus::Rejected),
                ComplaintStatus::Rejected,
            )
            .await?
            .ok_or_else(|| {
                transition_conflict(&complaint, ComplaintStatus::Rejected)
            })?;

        let reason = command
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty());
        if let Some(task) = self
            .repos
            .tasks
            .find_open_by_complaint(&mut tx, complaint.id)
            .await?
        {
            let cancelled = self
                .repos
                .tasks
                .cancel(
                    &mut tx,
                    task.id,
                    &TaskStatus::predecessors(TaskStatus::Cancelled),
                    reason,
                )
                .await?
                .ok_or_else(|| {
                    niramay::Error::Conflict(
                        "task was started concurrently".to_string(),
                    )
                })?;
            self.repos.workers.release(&mut tx, cancelled.worker_id).await?;
        }
        tx.commit().await?;

        tracing::info!(complaint_id = %rejected.id, "complaint rejected");
        Ok(rejected)
    }
}
