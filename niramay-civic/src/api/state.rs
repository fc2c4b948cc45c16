use std::sync::Arc;

use niramay::{config::AppConfig, db::AppDbPool};

use crate::{
    geo,
    infra::postgres_repositories,
    service::{
        DashboardService, DashboardServiceImpl, LedgerServiceImpl,
        RoleServiceImpl,
    },
    usecase::{
        AssignComplaintUsecase, CatalogUsecase, ComplaintUsecaseImpl,
        CompleteTaskUsecase, OnboardingUsecaseImpl, RedeemItemUsecase,
        RegisterCitizenUsecase, RejectComplaintUsecase, SetAvailabilityUsecase,
        SetupRoleUsecase, StartTaskUsecase, StoreUsecaseImpl,
        SubmitComplaintUsecase, TaskUsecaseImpl,
    },
};

/// Shared handler state. Every field is a trait object so handlers can be
/// exercised against in-memory fakes.
#[derive(Clone)]
pub struct AppState {
    pub register_citizen: Arc<dyn RegisterCitizenUsecase>,
    pub setup_role: Arc<dyn SetupRoleUsecase>,
    pub submit_complaint: Arc<dyn SubmitComplaintUsecase>,
    pub assign_complaint: Arc<dyn AssignComplaintUsecase>,
    pub reject_complaint: Arc<dyn RejectComplaintUsecase>,
    pub start_task: Arc<dyn StartTaskUsecase>,
    pub complete_task: Arc<dyn CompleteTaskUsecase>,
    pub set_availability: Arc<dyn SetAvailabilityUsecase>,
    pub redeem_item: Arc<dyn RedeemItemUsecase>,
    pub catalog: Arc<dyn CatalogUsecase>,
    pub dashboards: Arc<dyn DashboardService>,
    pub version: String,
}

impl AppState {
    /// Wires the Postgres backed services and usecases.
    pub fn new(pool: AppDbPool, config: &AppConfig) -> niramay::Result<Self> {
        let repos = postgres_repositories();
        let roles = Arc::new(RoleServiceImpl::new(repos.clone()));
        let ledger = Arc::new(LedgerServiceImpl::new(repos.clone()));
        let geocoder = geo::from_config(&config.geocoding)?;

        let onboarding = Arc::new(OnboardingUsecaseImpl::new(
            pool.clone(),
            repos.clone(),
            roles.clone(),
        ));
        let complaints = Arc::new(ComplaintUsecaseImpl::new(
            pool.clone(),
            repos.clone(),
            roles.clone(),
            geocoder,
        ));
        let tasks = Arc::new(TaskUsecaseImpl::new(
            pool.clone(),
            repos.clone(),
            roles.clone(),
            ledger.clone(),
            config.rewards.clone(),
        ));
        let store = Arc::new(StoreUsecaseImpl::new(
            pool.clone(),
            repos.clone(),
            roles,
            ledger,
        ));
        let dashboards = Arc::new(DashboardServiceImpl::new(pool, repos));

        Ok(Self {
            register_citizen: onboarding.clone(),
            setup_role: onboarding,
            submit_complaint: complaints.clone(),
            assign_complaint: complaints.clone(),
            reject_complaint: complaints,
            start_task: tasks.clone(),
            complete_task: tasks.clone(),
            set_availability: tasks,
            redeem_item: store.clone(),
            catalog: store,
            dashboards,
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }
}
