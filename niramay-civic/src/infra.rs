use std::sync::Arc;

use niramay::db::AppDbPool;

use crate::repository::Repositories;

mod complaint_repository_impl;
mod points_repository_impl;
mod store_repository_impl;
mod task_repository_impl;
mod user_repository_impl;
mod worker_repository_impl;

pub use complaint_repository_impl::*;
pub use points_repository_impl::*;
pub use store_repository_impl::*;
pub use task_repository_impl::*;
pub use user_repository_impl::*;
pub use worker_repository_impl::*;

pub fn postgres_repositories() -> Repositories {
    Repositories {
        users: Arc::new(PostgresUserRepository),
        roles: Arc::new(PostgresUserRoleRepository),
        complaints: Arc::new(PostgresComplaintRepository),
        tasks: Arc::new(PostgresTaskRepository),
        workers: Arc::new(PostgresWorkerStatusRepository),
        points: Arc::new(PostgresPointsRepository),
        items: Arc::new(PostgresStoreItemRepository),
        redemptions: Arc::new(PostgresRedemptionRepository),
    }
}

/// Applies the embedded schema migrations.
pub async fn migrate(pool: &AppDbPool) -> niramay::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await.map_err(|e| {
        niramay::Error::Database(
            anyhow::Error::new(e).context("failed to run migrations"),
        )
    })?;
    tracing::info!("database migrations applied");
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use niramay::db::AppDbPool;

    /// Connects to `DATABASE_URL` and brings the schema up to date.
    pub async fn setup_db() -> AppDbPool {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for postgres tests");
        let pool = sqlx::PgPool::connect(&url)
            .await
            .expect("Failed to connect to Postgres");
        super::migrate(&pool).await.expect("Failed to migrate");
        pool
    }

    pub fn sample_item(
        points_cost: i32,
        stock_quantity: i32,
    ) -> crate::entity::EcoStoreItem {
        crate::entity::EcoStoreItem {
            id: uuid::Uuid::nil(),
            name: format!("Compost kit {}", uuid::Uuid::new_v4().simple()),
            description: Some("Home compost starter".into()),
            category: Some("garden".into()),
            image_url: None,
            points_cost,
            stock_quantity,
            is_active: true,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    /// A national id unlikely to collide across test runs.
    pub fn unique_national_id() -> String {
        let n = uuid::Uuid::new_v4().as_u128() % 1_000_000_000_000;
        format!("{:012}", n)
    }
}
