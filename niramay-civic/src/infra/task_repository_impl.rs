use chrono::{DateTime, Utc};
use niramay::db::{AppDbHandle, AsExecutor};
use uuid::Uuid;

use crate::{
    entity::{Task, TaskStatus, TaskWithComplaint},
    repository::{NewTask, TaskRepository},
};

pub struct PostgresTaskRepository;

#[async_trait::async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert_task(
        &self,
        h: &mut AppDbHandle<'_>,
        task: NewTask,
    ) -> niramay::Result<Task> {
        sqlx::query_as(
            "INSERT INTO tasks \
             (complaint_id, admin_id, worker_id, title, description, status) \
             VALUES ($1, $2, $3, $4, $5, 'assigned') RETURNING *",
        )
        .bind(task.complaint_id)
        .bind(task.admin_id)
        .bind(task.worker_id)
        .bind(task.title)
        .bind(task.description)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_task(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<Task>> {
        sqlx::query_as("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn find_open_by_complaint(
        &self,
        h: &mut AppDbHandle<'_>,
        complaint_id: Uuid,
    ) -> niramay::Result<Option<Task>> {
        let open: Vec<&str> =
            TaskStatus::open().into_iter().map(|s| s.as_str()).collect();
        sqlx::query_as(
            "SELECT * FROM tasks WHERE complaint_id = $1 AND status = ANY($2)",
        )
        .bind(complaint_id)
        .bind(open)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn list_by_worker(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
    ) -> niramay::Result<Vec<TaskWithComplaint>> {
        sqlx::query_as(
            "SELECT t.*, c.user_id AS reporter_id, c.address, c.latitude, \
                    c.longitude, c.photo_url, c.priority \
             FROM tasks t JOIN complaints c ON c.id = t.complaint_id \
             WHERE t.worker_id = $1 ORDER BY t.assigned_at DESC",
        )
        .bind(worker_id)
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn list_by_admin(
        &self,
        h: &mut AppDbHandle<'_>,
        admin_id: Uuid,
    ) -> niramay::Result<Vec<Task>> {
        sqlx::query_as(
            "SELECT * FROM tasks WHERE admin_id = $1 \
             ORDER BY assigned_at DESC",
        )
        .bind(admin_id)
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn start(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        worker_id: Uuid,
        from: &[TaskStatus],
        at: DateTime<Utc>,
    ) -> niramay::Result<Option<Task>> {
        let from: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        sqlx::query_as(
            "UPDATE tasks SET status = $1, started_at = $4 \
             WHERE id = $2 AND worker_id = $3 AND status = ANY($5) \
             RETURNING *",
        )
        .bind(TaskStatus::InProgress)
        .bind(id)
        .bind(worker_id)
        .bind(at)
        .bind(from)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn complete(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        worker_id: Uuid,
        from: &[TaskStatus],
        notes: Option<&str>,
        at: DateTime<Utc>,
    ) -> niramay::Result<Option<Task>> {
        let from: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        sqlx::query_as(
            "UPDATE tasks SET status = $1, completed_at = $5, \
                    notes = COALESCE($4, notes) \
             WHERE id = $2 AND worker_id = $3 AND status = ANY($6) \
             RETURNING *",
        )
        .bind(TaskStatus::Completed)
        .bind(id)
        .bind(worker_id)
        .bind(notes)
        .bind(at)
        .bind(from)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn cancel(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        from: &[TaskStatus],
        notes: Option<&str>,
    ) -> niramay::Result<Option<Task>> {
        let from: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        sqlx::query_as(
            "UPDATE tasks SET status = $1, notes = COALESCE($3, notes) \
             WHERE id = $2 AND status = ANY($4) RETURNING *",
        )
        .bind(TaskStatus::Cancelled)
        .bind(id)
        .bind(notes)
        .bind(from)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::Priority,
        infra::{PostgresComplaintRepository, testing::setup_db},
        repository::{ComplaintRepository, NewComplaint},
    };
    use niramay::db::Handle;

    #[tokio::test]
    #[ignore]
    async fn test_task_moves_only_from_listed_states() -> niramay::Result<()> {
        let pool = setup_db().await;
        let mut handle = Handle::Pool(pool);
        let repo = PostgresTaskRepository;

        let complaint = PostgresComplaintRepository
            .insert_complaint(
                &mut handle,
                NewComplaint {
                    user_id: Uuid::new_v4(),
                    title: "Blocked drain".into(),
                    description: None,
                    photo_url: "https://img.example.com/drain.jpg".into(),
                    latitude: 18.5204,
                    longitude: 73.8567,
                    address: "Shivajinagar, Pune".into(),
                    priority: Priority::Medium,
                    city: "Pune".into(),
                    locality: "Shivajinagar".into(),
                },
            )
            .await?;
        let worker_id = Uuid::new_v4();
        let task = repo
            .insert_task(
                &mut handle,
                NewTask {
                    complaint_id: complaint.id,
                    admin_id: Uuid::new_v4(),
                    worker_id,
                    title: complaint.title.clone(),
                    description: None,
                },
            )
            .await?;
        assert_eq!(task.status, TaskStatus::Assigned);

        // completing straight from assigned is not a listed transition
        let skipped = repo
            .complete(
                &mut handle,
                task.id,
                worker_id,
                &TaskStatus::predecessors(TaskStatus::Completed),
                None,
                Utc::now(),
            )
            .await?;
        assert!(skipped.is_none());

        let started = repo
            .start(
                &mut handle,
                task.id,
                worker_id,
                &TaskStatus::predecessors(TaskStatus::InProgress),
                Utc::now(),
            )
            .await?;
        assert_eq!(started.unwrap().status, TaskStatus::InProgress);

        let open = repo.find_open_by_complaint(&mut handle, complaint.id).await?;
        assert_eq!(open.map(|t| t.id), Some(task.id));

        let cancelled = repo
            .cancel(
                &mut handle,
                task.id,
                &TaskStatus::predecessors(TaskStatus::Cancelled),
                Some("duplicate"),
            )
            .await?;
        assert!(cancelled.is_none());

        let completed = repo
            .complete(
                &mut handle,
                task.id,
                worker_id,
                &TaskStatus::predecessors(TaskStatus::Completed),
                Some("cleared"),
                Utc::now(),
            )
            .await?
            .unwrap();
        assert_eq!(completed.status, TaskStatus::Completed);
        assert_eq!(completed.notes.as_deref(), Some("cleared"));
        assert!(
            repo.find_open_by_complaint(&mut handle, complaint.id)
                .await?
                .is_none()
        );
        Ok(())
    }
}
