use niramay::db::{AppDbHandle, AsExecutor};
use uuid::Uuid;

use crate::{
    entity::{EcoPoints, PointTransaction},
    repository::{NewPointTransaction, PointsRepository},
};

pub struct PostgresPointsRepository;

#[async_trait::async_trait]
impl PointsRepository for PostgresPointsRepository {
    async fn open_account(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<EcoPoints> {
        // idempotent: an existing row is returned unchanged
        sqlx::query_as(
            "INSERT INTO eco_points \
             (user_id, points, total_earned, total_redeemed) \
             VALUES ($1, 0, 0, 0) \
             ON CONFLICT (user_id) DO UPDATE SET user_id = EXCLUDED.user_id \
             RETURNING *",
        )
        .bind(user_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_account(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Option<EcoPoints>> {
        sqlx::query_as("SELECT * FROM eco_points WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn credit(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        points: i32,
    ) -> niramay::Result<EcoPoints> {
        sqlx::query_as(
            "INSERT INTO eco_points \
             (user_id, points, total_earned, total_redeemed) \
             VALUES ($1, $2, $2, 0) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 points = eco_points.points + EXCLUDED.points, \
                 total_earned = eco_points.total_earned + EXCLUDED.points, \
                 updated_at = now() \
             RETURNING *",
        )
        .bind(user_id)
        .bind(points)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn debit(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        points: i32,
    ) -> niramay::Result<Option<EcoPoints>> {
        sqlx::query_as(
            "UPDATE eco_points SET \
                 points = points - $2, \
                 total_redeemed = total_redeemed + $2, \
                 updated_at = now() \
             WHERE user_id = $1 AND points >= $2 RETURNING *",
        )
        .bind(user_id)
        .bind(points)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn insert_transaction(
        &self,
        h: &mut AppDbHandle<'_>,
        tx: NewPointTransaction,
    ) -> niramay::Result<PointTransaction> {
        sqlx::query_as(
            "INSERT INTO point_transactions \
             (user_id, type, points, description, complaint_id, task_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(tx.user_id)
        .bind(tx.kind)
        .bind(tx.points)
        .bind(tx.description)
        .bind(tx.complaint_id)
        .bind(tx.task_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn list_transactions(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Vec<PointTransaction>> {
        sqlx::query_as(
            "SELECT * FROM point_transactions WHERE user_id = $1 \
             ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{entity::TransactionKind, infra::testing::setup_db};
    use niramay::db::Handle;

    #[tokio::test]
    #[ignore]
    async fn test_credit_and_guarded_debit() -> niramay::Result<()> {
        let pool = setup_db().await;
        let mut handle = Handle::Pool(pool);
        let repo = PostgresPointsRepository;
        let user_id = Uuid::new_v4();

        let opened = repo.open_account(&mut handle, user_id).await?;
        assert_eq!(opened.points, 0);
        // opening twice keeps the row
        repo.open_account(&mut handle, user_id).await?;

        let credited = repo.credit(&mut handle, user_id, 10).await?;
        assert_eq!(credited.points, 10);
        assert_eq!(credited.total_earned, 10);

        assert!(repo.debit(&mut handle, user_id, 11).await?.is_none());
        let debited = repo.debit(&mut handle, user_id, 4).await?.unwrap();
        assert_eq!(debited.points, 6);
        assert_eq!(debited.total_redeemed, 4);
        assert!(debited.is_consistent());

        repo.insert_transaction(
            &mut handle,
            NewPointTransaction {
                user_id,
                kind: TransactionKind::Earned,
                points: 10,
                description: "Cleanup completed".into(),
                complaint_id: None,
                task_id: None,
            },
        )
        .await?;
        let history = repo.list_transactions(&mut handle, user_id).await?;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Earned);
        Ok(())
    }
}
