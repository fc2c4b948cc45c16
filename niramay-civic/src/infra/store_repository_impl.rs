use niramay::db::{AppDbHandle, AsExecutor, BaseRepository, Handle};
use uuid::Uuid;

use crate::{
    entity::{EcoStoreItem, Redemption, RedemptionWithItem},
    repository::{NewRedemption, RedemptionRepository, StoreItemRepository},
};

pub struct PostgresStoreItemRepository;

#[async_trait::async_trait]
impl BaseRepository<EcoStoreItem, Uuid, sqlx::Postgres>
    for PostgresStoreItemRepository
{
    async fn create(
        &self,
        h: &mut Handle<'_, sqlx::Postgres>,
        item: EcoStoreItem,
    ) -> niramay::Result<EcoStoreItem> {
        sqlx::query_as(
            "INSERT INTO eco_store_items \
             (name, description, category, image_url, points_cost, \
              stock_quantity, is_active) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.category)
        .bind(item.image_url)
        .bind(item.points_cost)
        .bind(item.stock_quantity)
        .bind(item.is_active)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_by_id(
        &self,
        h: &mut Handle<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> niramay::Result<Option<EcoStoreItem>> {
        sqlx::query_as("SELECT * FROM eco_store_items WHERE id = $1")
            .bind(id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn find_all(
        &self,
        h: &mut Handle<'_, sqlx::Postgres>,
    ) -> niramay::Result<Vec<EcoStoreItem>> {
        sqlx::query_as("SELECT * FROM eco_store_items ORDER BY name")
            .fetch_all(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn update(
        &self,
        h: &mut Handle<'_, sqlx::Postgres>,
        item: EcoStoreItem,
    ) -> niramay::Result<EcoStoreItem> {
        sqlx::query_as(
            "UPDATE eco_store_items SET name = $1, description = $2, \
                 category = $3, image_url = $4, points_cost = $5, \
                 stock_quantity = $6, is_active = $7, updated_at = now() \
             WHERE id = $8 RETURNING *",
        )
        .bind(item.name)
        .bind(item.description)
        .bind(item.category)
        .bind(item.image_url)
        .bind(item.points_cost)
        .bind(item.stock_quantity)
        .bind(item.is_active)
        .bind(item.id)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn delete(
        &self,
        h: &mut Handle<'_, sqlx::Postgres>,
        id: Uuid,
    ) -> niramay::Result<()> {
        let result = sqlx::query("DELETE FROM eco_store_items WHERE id = $1")
            .bind(id)
            .execute(h.as_executor())
            .await
            .map_err(niramay::db::map_err)?;
        if result.rows_affected() == 0 {
            return Err(niramay::Error::NotFound(format!("store item {}", id)));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl StoreItemRepository for PostgresStoreItemRepository {
    async fn list_active(
        &self,
        h: &mut AppDbHandle<'_>,
    ) -> niramay::Result<Vec<EcoStoreItem>> {
        sqlx::query_as(
            "SELECT * FROM eco_store_items WHERE is_active \
             ORDER BY points_cost ASC",
        )
        .fetch_all(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn take_one(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<EcoStoreItem>> {
        sqlx::query_as(
            "UPDATE eco_store_items \
             SET stock_quantity = stock_quantity - 1, updated_at = now() \
             WHERE id = $1 AND is_active AND stock_quantity > 0 \
             RETURNING *",
        )
        .bind(id)
        .fetch_optional(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }
}

pub struct PostgresRedemptionRepository;

#[async_trait::async_trait]
impl RedemptionRepository for PostgresRedemptionRepository {
    async fn insert_redemption(
        &self,
        h: &mut AppDbHandle<'_>,
        redemption: NewRedemption,
    ) -> niramay::Result<Redemption> {
        sqlx::query_as(
            "INSERT INTO redemptions \
             (user_id, item_id, points_used, delivery_address, status, notes) \
             VALUES ($1, $2, $3, $4, 'pending', $5) RETURNING *",
        )
        .bind(redemption.user_id)
        .bind(redemption.item_id)
        .bind(redemption.points_used)
        .bind(redemption.delivery_address)
        .bind(redemption.notes)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn list_by_user(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Vec<RedemptionWithItem>> {
        sqlx::query_as(
            "SELECT r.*, i.name AS item_name, i.image_url AS item_image_url \
             FROM redemptions r JOIN eco_store_items i ON i.id = r.item_id \
             WHERE r.user_id = $1 ORDER BY r.created_at DESC",
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
    use crate::infra::testing::{sample_item, setup_db};

    #[tokio::test]
    #[ignore]
    async fn test_store_item_crud_and_stock() -> niramay::Result<()> {
        let pool = setup_db().await;
        let mut handle = Handle::Pool(pool);
        let repo = PostgresStoreItemRepository;

        let created = repo.create(&mut handle, sample_item(50, 1)).await?;
        assert_ne!(created.id, Uuid::nil());

        let active = repo.list_active(&mut handle).await?;
        assert!(
            active.windows(2).all(|w| w[0].points_cost <= w[1].points_cost)
        );

        let taken = repo.take_one(&mut handle, created.id).await?.unwrap();
        assert_eq!(taken.stock_quantity, 0);
        assert!(repo.take_one(&mut handle, created.id).await?.is_none());

        let mut edited = taken;
        edited.is_active = false;
        let updated = repo.update(&mut handle, edited).await?;
        assert!(!updated.is_active);

        repo.delete(&mut handle, created.id).await?;
        assert!(repo.find_by_id(&mut handle, created.id).await?.is_none());
        assert!(matches!(
            repo.delete(&mut handle, created.id).await,
            Err(niramay::Error::NotFound(_))
        ));
        Ok(())
    }
}
