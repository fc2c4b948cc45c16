use niramay::db::{AppDbPool, Handle};
use uuid::Uuid;

use crate::{
    entity::{
        ComplaintStatus, EcoPoints, EcoStoreItem, PointTransaction,
        RedemptionWithItem, Role,
    },
    repository::Repositories,
    service::{
        AdminCounters, AdminDashboard, CitizenDashboard, DashboardService,
        Profile, WorkerCounters, WorkerDashboard, ensure_role,
    },
};

pub struct DashboardServiceImpl {
    pub pool: AppDbPool,
    pub repos: Repositories,
}

impl DashboardServiceImpl {
    pub fn new(pool: AppDbPool, repos: Repositories) -> Self {
        Self { pool, repos }
    }
}

#[async_trait::async_trait]
impl DashboardService for DashboardServiceImpl {
    async fn profile(&self, user_id: Uuid) -> niramay::Result<Profile> {
        let mut h = Handle::Pool(self.pool.clone());
        let user = self.repos.users.find_user(&mut h, user_id).await?;
        let role = self.repos.roles.find_role(&mut h, user_id).await?;
        Ok(Profile::new(user, role))
    }

    async fn citizen_dashboard(
        &self,
        user_id: Uuid,
    ) -> niramay::Result<CitizenDashboard> {
        let mut h = Handle::Pool(self.pool.clone());
        ensure_role(
            self.repos.roles.find_role(&mut h, user_id).await?,
            Role::Citizen,
        )?;

        let complaints =
            self.repos.complaints.list_by_reporter(&mut h, user_id).await?;
        let points = self
            .repos
            .points
            .find_account(&mut h, user_id)
            .await?
            .unwrap_or_else(|| EcoPoints::empty(user_id));
        let completed_complaints = complaints
            .iter()
            .filter(|c| c.status == ComplaintStatus::Completed)
            .count();
        Ok(CitizenDashboard {
            complaints,
            points,
            completed_complaints,
        })
    }

    async fn admin_dashboard(
        &self,
        admin_id: Uuid,
    ) -> niramay::Result<AdminDashboard> {
        let mut h = Handle::Pool(self.pool.clone());
        let admin = ensure_role(
            self.repos.roles.find_role(&mut h, admin_id).await?,
            Role::Admin,
        )?;

        let complaints = self
            .repos
            .complaints
            .list_by_area(&mut h, &admin.city, &admin.locality)
            .await?;
        let workers = self
            .repos
            .workers
            .list_by_area(&mut h, &admin.city, &admin.locality)
            .await?;
        let tasks = self.repos.tasks.list_by_admin(&mut h, admin_id).await?;
        let counters = AdminCounters::tally(&complaints, &tasks, &workers);
        Ok(AdminDashboard {
            area: admin.area(),
            complaints,
            workers,
            tasks,
            counters,
        })
    }

    async fn worker_dashboard(
        &self,
        worker_id: Uuid,
    ) -> niramay::Result<WorkerDashboard> {
        let mut h = Handle::Pool(self.pool.clone());
        ensure_role(
            self.repos.roles.find_role(&mut h, worker_id).await?,
            Role::Worker,
        )?;

        let status = self.repos.workers.find_status(&mut h, worker_id).await?;
        let tasks = self.repos.tasks.list_by_worker(&mut h, worker_id).await?;
        let counters = WorkerCounters::tally(&tasks);
        Ok(WorkerDashboard {
            status,
            tasks,
            counters,
        })
    }

    async fn store_items(&self) -> niramay::Result<Vec<EcoStoreItem>> {
        let mut h = Handle::Pool(self.pool.clone());
        self.repos.items.list_active(&mut h).await
    }

    async fn redemptions(
        &self,
        user_id: Uuid,
    ) -> niramay::Result<Vec<RedemptionWithItem>> {
        let mut h = Handle::Pool(self.pool.clone());
        self.repos.redemptions.list_by_user(&mut h, user_id).await
    }

    async fn transactions(
        &self,
        user_id: Uuid,
    ) -> niramay::Result<Vec<PointTransaction>> {
        let mut h = Handle::Pool(self.pool.clone());
        self.repos.points.list_transactions(&mut h, user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::{postgres_repositories, testing::setup_db};

    #[tokio::test]
    #[ignore]
    async fn test_citizen_dashboard_defaults() -> niramay::Result<()> {
        let pool = setup_db().await;
        let repos = postgres_repositories();
        let service = DashboardServiceImpl::new(pool.clone(), repos.clone());
        let user_id = Uuid::new_v4();

        // without a role the dashboard is closed
        assert!(matches!(
            service.citizen_dashboard(user_id).await,
            Err(niramay::Error::Forbidden(_))
        ));

        let mut h = Handle::Pool(pool);
        repos
            .roles
            .insert_role(&mut h, user_id, Role::Citizen, "Pune", "Kothrud")
            .await?;
        let dashboard = service.citizen_dashboard(user_id).await?;
        assert!(dashboard.complaints.is_empty());
        assert_eq!(dashboard.points.points, 0);
        assert_eq!(dashboard.completed_complaints, 0);

        assert!(matches!(
            service.admin_dashboard(user_id).await,
            Err(niramay::Error::Forbidden(_))
        ));
        Ok(())
    }
}
