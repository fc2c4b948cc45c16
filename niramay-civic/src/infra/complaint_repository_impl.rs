use niramay::db::{AppDbHandle, AsExecutor};
use uuid::Uuid;

use crate::{
    entity::{Complaint, ComplaintStatus},
    repository::{ComplaintRepository, NewComplaint},
};

pub struct PostgresComplaintRepository;

#[async_trait::async_trait]
impl ComplaintRepository for PostgresComplaintRepository {
    async fn insert_complaint(
        &self,
        h: &mut AppDbHandle<'_>,
        complaint: NewComplaint,
    ) -> niramay::Result<Complaint> {
        sqlx::query_as(
            "INSERT INTO complaints \
             (user_id, title, description, photo_url, latitude, longitude, \
              address, priority, city, locality, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'submitted') \
             RETURNING *",
        )
        .bind(complaint.user_id)
        .bind(complaint.title)
        .bind(complaint.description)
        .bind(complaint.photo_url)
        .bind(complaint.latitude)
        .bind(complaint.longitude)
        .bind(complaint.address)
        .bind(complaint.priority)
        .bind(complaint.city)
        .bind(complaint.locality)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_complaint(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<Complaint>> {
        sqlx::query_as("SELECT * FROM complaints WHERE id = $1")
            .bind(id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn list_by_reporter(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Vec<Complaint>> {
        sqlx::query_as(
            "SELECT * FROM complaints WHERE user_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn list_by_area(
        &self,
        h: &mut AppDbHandle<'_>,
        city: &str,
        locality: &str,
    ) -> niramay::Result<Vec<Complaint>> {
        sqlx::query_as(
            "SELECT * FROM complaints WHERE city = $1 AND locality = $2 \
             ORDER BY created_at DESC",
        )
        .bind(city)
        .bind(locality)
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn transition(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        from: &[ComplaintStatus],
        to: ComplaintStatus,
    ) -> niramay::Result<Option<Complaint>> {
        let from: Vec<&str> = from.iter().map(|s| s.as_str()).collect();
        sqlx::query_as(
            "UPDATE complaints SET status = $1, updated_at = now() \
             WHERE id = $2 AND status = ANY($3) RETURNING *",
        )
        .bind(to)
        .bind(id)
        .bind(from)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity::Priority, infra::testing::setup_db};
    use niramay::db::Handle;

    fn new_complaint(user_id: Uuid) -> NewComplaint {
        NewComplaint {
            user_id,
            title: "Overflowing bin".into(),
            description: Some("Near the bus stop".into()),
            photo_url: "https://img.example.com/bin.jpg".into(),
            latitude: 18.5074,
            longitude: 73.8077,
            address: "Kothrud, Pune".into(),
            priority: Priority::High,
            city: "Pune".into(),
            locality: "Kothrud".into(),
        }
    }

    #[tokio::test]
    #[ignore]
    async fn test_transition_is_compare_and_swap() -> niramay::Result<()> {
        let pool = setup_db().await;
        let mut handle = Handle::Pool(pool);
        let repo = PostgresComplaintRepository;

        let created = repo
            .insert_complaint(&mut handle, new_complaint(Uuid::new_v4()))
            .await?;
        assert_eq!(created.status, ComplaintStatus::Submitted);
        assert_eq!(created.priority, Priority::High);

        let assigned = repo
            .transition(
                &mut handle,
                created.id,
                &[ComplaintStatus::Submitted],
                ComplaintStatus::Assigned,
            )
            .await?;
        assert_eq!(assigned.unwrap().status, ComplaintStatus::Assigned);

        // second swap from the stale state matches nothing
        let again = repo
            .transition(
                &mut handle,
                created.id,
                &[ComplaintStatus::Submitted],
                ComplaintStatus::Assigned,
            )
            .await?;
        assert!(again.is_none());

        let listed = repo.list_by_area(&mut handle, "Pune", "Kothrud").await?;
        assert!(listed.iter().any(|c| c.id == created.id));
        Ok(())
    }
}
