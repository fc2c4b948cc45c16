mod handle;
mod repository;

pub use handle::*;
pub use repository::*;

pub type SqliteHandle<'c> = Handle<'c, sqlx::Sqlite>;

pub type AppDbDriver = sqlx::Postgres;
pub type AppDbHandle<'c> = Handle<'c, AppDbDriver>;
pub type AppDbPool = sqlx::Pool<AppDbDriver>;

pub async fn connect(
    config: &crate::config::DatabaseConfig,
) -> crate::Result<AppDbPool> {
    sqlx::pool::PoolOptions::<AppDbDriver>::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| {
            crate::Error::Database(
                anyhow::Error::new(e).context("failed to connect database"),
            )
        })
}

/// Unique and foreign-key violations surface as `Conflict`.
pub fn map_err(e: sqlx::Error) -> crate::Error {
    match e {
        sqlx::Error::RowNotFound => crate::Error::NotFound("row".into()),
        sqlx::Error::Database(ref db)
            if db.is_unique_violation() || db.is_foreign_key_violation() =>
        {
            crate::Error::Conflict(db.message().to_string())
        }
        e => crate::Error::Database(anyhow::Error::new(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn run_generic_handle_test<DB>(
        pool: sqlx::Pool<DB>,
        dummy_query: &str,
    ) where
        DB: sqlx::Database,
        for<'e> &'e mut <DB as sqlx::Database>::Connection:
            sqlx::Executor<'e, Database = DB>,
        for<'q> <DB as sqlx::Database>::Arguments<'q>:
            sqlx::IntoArguments<'q, DB>,
    {
        {
            let mut handle = Handle::Pool(pool.clone());
            sqlx::query(dummy_query)
                .execute(handle.as_executor())
                .await
                .expect("Failed to execute query via Pool handle");
        }

        {
            let mut pool_handle = Handle::Pool(pool.clone());
            let mut tx_handle =
                pool_handle.begin().await.expect("Failed to begin transaction");
            sqlx::query(dummy_query)
                .execute(tx_handle.as_executor())
                .await
                .expect("Failed to execute query via Transaction handle");
            tx_handle.commit().await.expect("Failed to commit transaction");
        }

        {
            let conn =
                pool.acquire().await.expect("Failed to acquire connection");
            let mut handle = Handle::Connection(conn);
            sqlx::query(dummy_query)
                .execute(handle.as_executor())
                .await
                .expect("Failed to execute query via Connection handle");
        }
    }

    #[tokio::test]
    async fn test_sqlite_handle() {
        let pool = sqlx::SqlitePool::connect("sqlite::memory:").await.unwrap();
        run_generic_handle_test(pool, "SELECT 1").await;
    }

    #[tokio::test]
    async fn test_sqlite_rollback_discards_writes() {
        let pool = sqlx::pool::PoolOptions::<sqlx::Sqlite>::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        let mut handle: SqliteHandle<'_> = Handle::Pool(pool.clone());
        sqlx::query("CREATE TABLE ledger (points INTEGER NOT NULL)")
            .execute(handle.as_executor())
            .await
            .unwrap();

        let mut tx = handle.begin().await.unwrap();
        sqlx::query("INSERT INTO ledger (points) VALUES (10)")
            .execute(tx.as_executor())
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ledger")
            .fetch_one(handle.as_executor())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn test_map_err_row_not_found() {
        assert!(matches!(
            map_err(sqlx::Error::RowNotFound),
            crate::Error::NotFound(_)
        ));
        assert!(matches!(
            map_err(sqlx::Error::PoolTimedOut),
            crate::Error::Database(_)
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn test_postgres_handle() {
        let url = std::env::var("DATABASE_URL")
            .expect("DATABASE_URL must be set for postgres test");
        let pool = sqlx::PgPool::connect(&url).await.unwrap();
        run_generic_handle_test(pool, "SELECT 1").await;
    }
}
