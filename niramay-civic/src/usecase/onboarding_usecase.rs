use std::sync::Arc;

use niramay::db::{AppDbPool, Handle};

use crate::{
    entity::{Area, EcoPoints, Role, UserRole},
    repository::Repositories,
    service::RoleServiceTx,
    usecase::{
        RegisterCitizenCommand, RegisterCitizenUsecase, RegisteredCitizen,
        SetupRoleCommand, SetupRoleUsecase,
    },
};

pub struct OnboardingUsecaseImpl {
    pub pool: AppDbPool,
    pub repos: Repositories,
    pub roles: Arc<dyn RoleServiceTx>,
}

impl OnboardingUsecaseImpl {
    pub fn new(
        pool: AppDbPool,
        repos: Repositories,
        roles: Arc<dyn RoleServiceTx>,
    ) -> Self {
        Self { pool, repos, roles }
    }
}

#[async_trait::async_trait]
impl RegisterCitizenUsecase for OnboardingUsecaseImpl {
    async fn execute(
        &self,
        command: RegisterCitizenCommand,
    ) -> niramay::Result<RegisteredCitizen> {
        let national_id = command.validate()?;

        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;

        if self
            .repos
            .users
            .national_id_exists(&mut tx, national_id.digits())
            .await?
        {
            return Err(niramay::Error::Conflict(
                "national id is already registered".to_string(),
            ));
        }
        if self.repos.users.find_user(&mut tx, command.user_id).await?.is_some()
        {
            return Err(niramay::Error::Conflict(
                "user is already registered".to_string(),
            ));
        }

        let user = self
            .repos
            .users
            .insert_user(
                &mut tx,
                command.user_id,
                command.full_name.trim(),
                command.email.trim(),
                national_id.digits(),
            )
            .await?;
        let area = Area::from_address(command.address.as_deref());
        let role = self
            .roles
            .setup_role(&mut tx, user.id, Role::Citizen, area)
            .await?;
        let points = self
            .repos
            .points
            .find_account(&mut tx, user.id)
            .await?
            .unwrap_or_else(|| EcoPoints::empty(user.id));

        tx.commit().await?;
        tracing::info!(user_id = %user.id, "citizen registered");
        Ok(RegisteredCitizen::new(user, role, points))
    }
}

#[async_trait::async_trait]
impl SetupRoleUsecase for OnboardingUsecaseImpl {
    async fn execute(
        &self,
        command: SetupRoleCommand,
    ) -> niramay::Result<UserRole> {
        let mut pool_handle = Handle::Pool(self.pool.clone());
        let mut tx = pool_handle.begin().await?;
        let role = self
            .roles
            .setup_role(
                &mut tx,
                command.user_id,
                command.role,
                Area {
                    city: command.city,
                    locality: command.locality,
                },
            )
            .await?;
        tx.commit().await?;
        Ok(role)
    }
}
