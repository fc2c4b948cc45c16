use std::sync::Arc;

use niramay::db::{AppDbPool, Handle};
use uuid::Uuid;

use crate::{
    entity::{EcoPoints, EcoStoreItem, Redemption, Role},
    repository::{NewRedemption, Repositories},
    service::{LedgerServiceTx, RoleServiceTx},
    usecase::{
        CatalogUsecase, RedeemItemCommand, RedeemItemUsecase, StoreItemDraft,
    },
};

pub struct StoreUsecaseImpl {
    pub pool: AppDbPool,
    pub repos: Repositories,
    pub roles: Arc<dyn RoleServiceTx>,
    pub ledger: Arc<dyn LedgerServiceTx>,
}

impl StoreUsecaseImpl {
    pub fn new(
        pool: AppDbPool,
        repos: Repositories,
        roles: Arc<dyn RoleServiceTx>,
        ledger: Arc<dyn LedgerServiceTx>,
    ) -> Self {
        Self {
            pool,
            repos,
            roles,
            ledger,
        }
    }
}

#[async_trait::async_trait]
impl RedeemItemUsecase for StoreUsecaseImpl {
    async fn execute(
        &self,
        command: RedeemItemCommand,
    ) -> niramay::Result<Redemption> {
        command.validate()?;
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        self.roles
            .require_role(&mut tx, command.user_id, Role::Citizen)
            .await?;
        let item = self
            .repos
            .items
            .find_by_id(&mut tx, command.item_id)
            .await?
            .ok_or_else(|| {
                niramay::Error::NotFound(format!(
                    "store item {}",
                    command.item_id
                ))
            })?;
        let balance = self
            .repos
            .points
            .find_account(&mut tx, command.user_id)
            .await?
            .unwrap_or_else(|| EcoPoints::empty(command.user_id));
        // every rejection happens before the first write
        item.check_redeemable(balance.points)?;

        let redemption = self
            .repos
            .redemptions
            .insert_redemption(
                &mut tx,
                NewRedemption {
                    user_id: command.user_id,
                    item_id: item.id,
                    points_used: item.points_cost,
                    delivery_address: command.delivery_address.trim().to_string(),
                    notes: command.notes,
                },
            )
            .await?;
        self.ledger.spend(&mut tx, command.user_id, &item).await?;
        self.repos
            .items
            .take_one(&mut tx, item.id)
            .await?
            .ok_or_else(|| {
                niramay::Error::Conflict(format!("{} is out of stock", item.name))
            })?;
        tx.commit().await?;

        tracing::info!(
            redemption_id = %redemption.id,
            item_id = %item.id,
            points = item.points_cost,
            "item redeemed"
        );
        Ok(redemption)
    }
}

#[async_trait::async_trait]
impl CatalogUsecase for StoreUsecaseImpl {
    async fn list_items(
        &self,
        admin_id: Uuid,
    ) -> niramay::Result<Vec<EcoStoreItem>> {
        let mut h = Handle::Pool(self.pool.clone());
        self.roles.require_role(&mut h, admin_id, Role::Admin).await?;
        self.repos.items.find_all(&mut h).await
    }

    async fn create_item(
        &self,
        admin_id: Uuid,
        draft: StoreItemDraft,
    ) -> niramay::Result<EcoStoreItem> {
        draft.validate()?;
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;
        self.roles.require_role(&mut tx, admin_id, Role::Admin).await?;
        let item = self
            .repos
            .items
            .create(&mut tx, draft.into_item(Uuid::nil()))
            .await?;
        tx.commit().await?;
        tracing::info!(item_id = %item.id, "store item created");
        Ok(item)
    }

    async fn update_item(
        &self,
        admin_id: Uuid,
        item_id: Uuid,
        draft: StoreItemDraft,
    ) -> niramay::Result<EcoStoreItem> {
        draft.validate()?;
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;
        self.roles.require_role(&mut tx, admin_id, Role::Admin).await?;
        let item = self
            .repos
            .items
            .update(&mut tx, draft.into_item(item_id))
            .await
            .map_err(|e| match e {
                niramay::Error::NotFound(_) => {
                    niramay::Error::NotFound(format!("store item {}", item_id))
                }
                e => e,
            })?;
        tx.commit().await?;
        Ok(item)
    }

    async fn delete_item(
        &self,
        admin_id: Uuid,
        item_id: Uuid,
    ) -> niramay::Result<()> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;
        self.roles.require_role(&mut tx, admin_id, Role::Admin).await?;
        self.repos.items.delete(&mut tx, item_id).await?;
        tx.commit().await?;
        tracing::info!(%item_id, "store item deleted");
        Ok(())
    }
}
