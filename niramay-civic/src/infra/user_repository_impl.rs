use niramay::db::{AppDbHandle, AsExecutor};
use uuid::Uuid;

use crate::{
    entity::{Role, User, UserRole},
    repository::{UserRepository, UserRoleRepository},
};

pub struct PostgresUserRepository;

#[async_trait::async_trait]
impl UserRepository for PostgresUserRepository {
    async fn insert_user(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
        full_name: &str,
        email: &str,
        national_id: &str,
    ) -> niramay::Result<User> {
        sqlx::query_as(
            "INSERT INTO users (id, full_name, email, national_id) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(id)
        .bind(full_name)
        .bind(email)
        .bind(national_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_user(
        &self,
        h: &mut AppDbHandle<'_>,
        id: Uuid,
    ) -> niramay::Result<Option<User>> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }

    async fn national_id_exists(
        &self,
        h: &mut AppDbHandle<'_>,
        national_id: &str,
    ) -> niramay::Result<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM users WHERE national_id = $1)",
        )
        .bind(national_id)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)?;
        Ok(exists)
    }
}

pub struct PostgresUserRoleRepository;

#[async_trait::async_trait]
impl UserRoleRepository for PostgresUserRoleRepository {
    async fn insert_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        role: Role,
        city: &str,
        locality: &str,
    ) -> niramay::Result<UserRole> {
        sqlx::query_as(
            "INSERT INTO user_roles (user_id, role, city, locality) \
             VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(user_id)
        .bind(role)
        .bind(city)
        .bind(locality)
        .fetch_one(h.as_executor())
        .await
        .map_err(niramay::db::map_err)
    }

    async fn find_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
    ) -> niramay::Result<Option<UserRole>> {
        sqlx::query_as("SELECT * FROM user_roles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(h.as_executor())
            .await
            .map_err(niramay::db::map_err)
    }
}
