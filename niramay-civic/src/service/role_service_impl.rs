use niramay::db::AppDbHandle;
use uuid::Uuid;

use crate::{
    entity::{Area, Role, UserRole},
    repository::Repositories,
    service::RoleServiceTx,
};

/// Gate for role restricted operations.
pub fn ensure_role(
    found: Option<UserRole>,
    expected: Role,
) -> niramay::Result<UserRole> {
    match found {
        None => Err(niramay::Error::Forbidden(
            "role setup required".to_string(),
        )),
        Some(role) if role.role != expected => Err(niramay::Error::Forbidden(
            format!("{} role required", expected.as_str()),
        )),
        Some(role) => Ok(role),
    }
}

pub struct RoleServiceImpl {
    pub repos: Repositories,
}

impl RoleServiceImpl {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }
}

#[async_trait::async_trait]
impl RoleServiceTx for RoleServiceImpl {
    async fn setup_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        role: Role,
        area: Area,
    ) -> niramay::Result<UserRole> {
        let city = area.city.trim();
        let locality = area.locality.trim();
        if city.is_empty() || locality.is_empty() {
            return Err(niramay::Error::Validation(
                "city and locality are required".to_string(),
            ));
        }
        if self.repos.roles.find_role(h, user_id).await?.is_some() {
            return Err(niramay::Error::Conflict(
                "role already set up".to_string(),
            ));
        }

        let created = self
            .repos
            .roles
            .insert_role(h, user_id, role, city, locality)
            .await?;
        match role {
            Role::Citizen => {
                self.repos.points.open_account(h, user_id).await?;
            }
            Role::Worker => {
                self.repos
                    .workers
                    .insert_status(h, user_id, city, locality)
                    .await?;
            }
            Role::Admin => {}
        }
        tracing::info!(%user_id, role = role.as_str(), city, locality, "role set up");
        Ok(created)
    }

    async fn require_role(
        &self,
        h: &mut AppDbHandle<'_>,
        user_id: Uuid,
        role: Role,
    ) -> niramay::Result<UserRole> {
        ensure_role(self.repos.roles.find_role(h, user_id).await?, role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        entity::WorkerAvailability,
        infra::{postgres_repositories, testing::setup_db},
    };
    use chrono::Utc;
    use niramay::db::Handle;

    fn role(role: Role) -> UserRole {
        UserRole {
            user_id: Uuid::new_v4(),
            role,
            city: "Pune".into(),
            locality: "Kothrud".into(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_ensure_role() {
        assert!(ensure_role(Some(role(Role::Admin)), Role::Admin).is_ok());
        assert!(matches!(
            ensure_role(Some(role(Role::Citizen)), Role::Admin),
            Err(niramay::Error::Forbidden(msg)) if msg == "admin role required"
        ));
        assert!(matches!(
            ensure_role(None, Role::Worker),
            Err(niramay::Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    #[ignore]
    async fn test_setup_worker_role_seeds_status() -> niramay::Result<()> {
        let pool = setup_db().await;
        let repos = postgres_repositories();
        let service = RoleServiceImpl::new(repos.clone());
        let user_id = Uuid::new_v4();
        let area = Area {
            city: " Pune ".into(),
            locality: "Kothrud".into(),
        };

        let mut pool_handle = Handle::Pool(pool.clone());
        let mut tx = pool_handle.begin().await?;
        let created =
            service.setup_role(&mut tx, user_id, Role::Worker, area.clone()).await?;
        tx.commit().await?;
        assert_eq!(created.city, "Pune");

        let status = repos
            .workers
            .find_status(&mut pool_handle, user_id)
            .await?
            .unwrap();
        assert_eq!(status.status, WorkerAvailability::Available);
        assert_eq!(status.locality, "Kothrud");

        // one-time write
        let again = service
            .setup_role(&mut pool_handle, user_id, Role::Citizen, area)
            .await;
        assert!(matches!(again, Err(niramay::Error::Conflict(_))));
        Ok(())
    }

    #[tokio::test]
    #[ignore]
    async fn test_setup_role_rejects_blank_area() {
        let pool = setup_db().await;
        let service = RoleServiceImpl::new(postgres_repositories());
        let mut handle = Handle::Pool(pool);
        let result = service
            .setup_role(
                &mut handle,
                Uuid::new_v4(),
                Role::Admin,
                Area {
                    city: "Pune".into(),
                    locality: "  ".into(),
                },
            )
            .await;
        assert!(matches!(result, Err(niramay::Error::Validation(_))));
    }
}
