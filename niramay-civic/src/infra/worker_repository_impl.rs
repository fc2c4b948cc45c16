use niramay::db::{AppDbHandle, AsExecutor};
use uuid::Uuid;

use crate::{
    entity::{WorkerAvailability, WorkerStatus},
    repository::WorkerStatusRepository,
};

pub struct PostgresWorkerStatusRepository;

#[async_trait::async_trait]
impl WorkerStatusRepository for PostgresWorkerStatusRepository {
    async fn insert_status(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
        city: &str,
        locality: &str,
    ) -> niramay::Result<WorkerStatus> {
        sqlx::query_as(
            "INSERT INTO worker_status (worker_id, status, city, locality) \
             VALUES ($1, 'available', $2, $3) RETURNING *",
        )
        .bind(worker_id)
        .bind(city)
        .bind(locality)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_status(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
    ) -> niramay::Result<Option<WorkerStatus>> {
        sqlx::query_as("SELECT * FROM worker_status WHERE worker_id = $1")
            .bind(worker_id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn list_by_area(
        &self,
        h: &mut AppDbHandle<'_>,
        city: &str,
        locality: &str,
    ) -> niramay::Result<Vec<WorkerStatus>> {
        sqlx::query_as(
            "SELECT * FROM worker_status WHERE city = $1 AND locality = $2 \
             ORDER BY updated_at DESC",
        )
        .bind(city)
        .bind(locality)
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn occupy(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
        from: &[WorkerAvailability],
        task_id: Uuid,
    ) -> niramay::Result<Option<WorkerStatus>> {
        let from: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        sqlx::query_as(
            "UPDATE worker_status \
             SET status = 'busy', current_task_id = $2, updated_at = now() \
             WHERE worker_id = $1 AND status = ANY($3) RETURNING *",
        )
        .bind(worker_id)
        .bind(task_id)
        .bind(from)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn release(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
    ) -> niramay::Result<Option<WorkerStatus>> {
        sqlx::query_as(
            "UPDATE worker_status \
             SET status = 'available', current_task_id = NULL, \
                 updated_at = now() \
             WHERE worker_id = $1 RETURNING *",
        )
        .bind(worker_id)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn set_availability(
        &self,
        h: &mut AppDbHandle<'_>,
        worker_id: Uuid,
        to: WorkerAvailability,
    ) -> niramay::Result<Option<WorkerStatus>> {
        sqlx::query_as(
            "UPDATE worker_status SET status = $2, updated_at = now() \
             WHERE worker_id = $1 AND status <> 'busy' RETURNING *",
        )
        .bind(worker_id)
        .bind(to)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }
}
