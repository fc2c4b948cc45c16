use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{
    Complaint, EcoPoints, EcoStoreItem, NationalId, Priority, Redemption,
    Role, Task, User, UserRole, WorkerAvailability, WorkerStatus,
    format_national_id,
};

fn required(value: &str, field: &str) -> niramay::Result<()> {
    if value.trim().is_empty() {
        return Err(niramay::Error::Validation(format!("{} is required", field)));
    }
    Ok(())
}

pub struct RegisterCitizenCommand {
    pub user_id: Uuid,
    pub full_name: String,
    pub email: String,
    pub national_id: String,
    pub address: Option<String>,
}

impl RegisterCitizenCommand {
    pub fn validate(&self) -> niramay::Result<NationalId> {
        required(&self.full_name, "full name")?;
        required(&self.email, "email")?;
        if !self.email.contains('@') {
            return Err(niramay::Error::Validation(
                "email is not valid".to_string(),
            ));
        }
        NationalId::parse(&self.national_id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisteredCitizen {
    pub user: User,
    pub role: UserRole,
    pub points: EcoPoints,
    /// `XXXX-XXXX-XXXX` form of `user.national_id`.
    pub national_id_display: String,
}

impl RegisteredCitizen {
    pub fn new(user: User, role: UserRole, points: EcoPoints) -> Self {
        let national_id_display = format_national_id(&user.national_id);
        RegisteredCitizen {
            user,
            role,
            points,
            national_id_display,
        }
    }
}

pub struct SetupRoleCommand {
    pub user_id: Uuid,
    pub role: Role,
    pub city: String,
    pub locality: String,
}

pub struct SubmitComplaintCommand {
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
    pub priority: Option<Priority>,
}

impl SubmitComplaintCommand {
    pub fn validate(&self) -> niramay::Result<()> {
        required(&self.title, "title")?;
        required(&self.photo_url, "photo")?;
        let lat_ok =
            self.latitude.is_finite() && (-90.0..=90.0).contains(&self.latitude);
        let lng_ok = self.longitude.is_finite()
            && (-180.0..=180.0).contains(&self.longitude);
        if !lat_ok || !lng_ok {
            return Err(niramay::Error::Validation(
                "location is not a valid coordinate".to_string(),
            ));
        }
        Ok(())
    }

    /// Address supplied by the client, if it carries any text.
    pub fn given_address(&self) -> Option<&str> {
        self.address.as_deref().map(str::trim).filter(|a| !a.is_empty())
    }
}

pub struct AssignComplaintCommand {
    pub admin_id: Uuid,
    pub complaint_id: Uuid,
    pub worker_id: Uuid,
}

pub struct RejectComplaintCommand {
    pub admin_id: Uuid,
    pub complaint_id: Uuid,
    pub reason: Option<String>,
}

pub struct StartTaskCommand {
    pub worker_id: Uuid,
    pub task_id: Uuid,
}

pub struct CompleteTaskCommand {
    pub worker_id: Uuid,
    pub task_id: Uuid,
    pub notes: Option<String>,
}

pub struct SetAvailabilityCommand {
    pub worker_id: Uuid,
    pub availability: WorkerAvailability,
}

impl SetAvailabilityCommand {
    pub fn validate(&self) -> niramay::Result<()> {
        if self.availability == WorkerAvailability::Busy {
            return Err(niramay::Error::Validation(
                "availability must be available or offline".to_string(),
            ));
        }
        Ok(())
    }
}

pub struct RedeemItemCommand {
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub delivery_address: String,
    pub notes: Option<String>,
}

impl RedeemItemCommand {
    pub fn validate(&self) -> niramay::Result<()> {
        required(&self.delivery_address, "delivery address")
    }
}

/// Editable fields of a catalog entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreItemDraft {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub points_cost: i32,
    pub stock_quantity: i32,
    #[serde(default = "StoreItemDraft::active_by_default")]
    pub is_active: bool,
}

impl StoreItemDraft {
    fn active_by_default() -> bool {
        true
    }

    pub fn validate(&self) -> niramay::Result<()> {
        required(&self.name, "name")?;
        if self.points_cost <= 0 {
            return Err(niramay::Error::Validation(
                "points cost must be positive".to_string(),
            ));
        }
        if self.stock_quantity < 0 {
            return Err(niramay::Error::Validation(
                "stock quantity cannot be negative".to_string(),
            ));
        }
        Ok(())
    }

    pub fn into_item(self, id: Uuid) -> EcoStoreItem {
        let now = chrono::Utc::now();
        EcoStoreItem {
            id,
            name: self.name.trim().to_string(),
            description: self.description,
            category: self.category,
            image_url: self.image_url,
            points_cost: self.points_cost,
            stock_quantity: self.stock_quantity,
            is_active: self.is_active,
            created_at: now,
            updated_at: now,
        }
    }
}

// 업무 단위: execute 호출 하나가 트랜잭션 하나
#[async_trait::async_trait]
pub trait RegisterCitizenUsecase: Sync + Send {
    async fn execute(
        &self,
        command: RegisterCitizenCommand,
    ) -> niramay::Result<RegisteredCitizen>;
}

#[async_trait::async_trait]
pub trait SetupRoleUsecase: Sync + Send {
    async fn execute(
        &self,
        command: SetupRoleCommand,
    ) -> niramay::Result<UserRole>;
}

#[async_trait::async_trait]
pub trait SubmitComplaintUsecase: Sync + Send {
    async fn execute(
        &self,
        command: SubmitComplaintCommand,
    ) -> niramay::Result<Complaint>;
}

#[async_trait::async_trait]
pub trait AssignComplaintUsecase: Sync + Send {
    async fn execute(
        &self,
        command: AssignComplaintCommand,
    ) -> niramay::Result<Task>;
}

#[async_trait::async_trait]
pub trait RejectComplaintUsecase: Sync + Send {
    async fn execute(
        &self,
        command: RejectComplaintCommand,
    ) -> niramay::Result<Complaint>;
}

#[async_trait::async_trait]
pub trait StartTaskUsecase: Sync + Send {
    async fn execute(&self, command: StartTaskCommand) -> niramay::Result<Task>;
}

#[async_trait::async_trait]
pub trait CompleteTaskUsecase: Sync + Send {
    async fn execute(
        &self,
        command: CompleteTaskCommand,
    ) -> niramay::Result<Task>;
}

#[async_trait::async_trait]
pub trait SetAvailabilityUsecase: Sync + Send {
    async fn execute(
        &self,
        command: SetAvailabilityCommand,
    ) -> niramay::Result<WorkerStatus>;
}

#[async_trait::async_trait]
pub trait RedeemItemUsecase: Sync + Send {
    async fn execute(
        &self,
        command: RedeemItemCommand,
    ) -> niramay::Result<Redemption>;
}

/// Admin-only catalog maintenance.
#[async_trait::async_trait]
pub trait CatalogUsecase: Sync + Send {
    async fn list_items(
        &self,
        admin_id: Uuid,
    ) -> niramay::Result<Vec<EcoStoreItem>>;

    async fn create_item(
        &self,
        admin_id: Uuid,
        draft: StoreItemDraft,
    ) -> niramay::Result<EcoStoreItem>;

    async fn update_item(
        &self,
        admin_id: Uuid,
        item_id: Uuid,
        draft: StoreItemDraft,
    ) -> niramay::Result<EcoStoreItem>;

    async fn delete_item(
        &self,
        admin_id: Uuid,
        item_id: Uuid,
    ) -> niramay::Result<()>;
}

mod complaint_usecase;
mod onboarding_usecase;
mod store_usecase;
mod task_usecase;

pub use complaint_usecase::*;
pub use onboarding_usecase::*;
pub use store_usecase::*;
pub use task_usecase::*;

#[cfg(test)]
mod tests {
    use super::*;

    fn complaint_command() -> SubmitComplaintCommand {
        SubmitComplaintCommand {
            user_id: Uuid::new_v4(),
            title: "Garbage pile".into(),
            description: None,
            photo_url: "https://img.example.com/p.jpg".into(),
            latitude: 18.52,
            longitude: 73.85,
            address: Some("   ".into()),
            priority: None,
        }
    }

    #[test]
    fn test_register_command_validation() {
        let mut command = RegisterCitizenCommand {
            user_id: Uuid::new_v4(),
            full_name: "Asha Patil".into(),
            email: "asha@example.com".into(),
            national_id: "1234 5678 9012".into(),
            address: None,
        };
        assert_eq!(command.validate().unwrap().digits(), "123456789012");

        command.national_id = "12345".into();
        assert!(matches!(
            command.validate(),
            Err(niramay::Error::Validation(_))
        ));

        command.national_id = "123456789012".into();
        command.email = "not-an-email".into();
        assert!(command.validate().is_err());

        command.email = "asha@example.com".into();
        command.full_name = " ".into();
        assert!(command.validate().is_err());
    }

    #[test]
    fn test_complaint_command_validation() {
        let mut command = complaint_command();
        assert!(command.validate().is_ok());
        assert_eq!(command.given_address(), None);

        command.address = Some(" Kothrud, Pune ".into());
        assert_eq!(command.given_address(), Some("Kothrud, Pune"));

        command.latitude = 91.0;
        assert!(command.validate().is_err());

        command.latitude = 18.52;
        command.longitude = f64::NAN;
        assert!(command.validate().is_err());

        let mut command = complaint_command();
        command.photo_url = String::new();
        assert!(command.validate().is_err());

        let mut command = complaint_command();
        command.title = "\t".into();
        assert!(command.validate().is_err());
    }

    #[test]
    fn test_availability_command_rejects_busy() {
        let command = SetAvailabilityCommand {
            worker_id: Uuid::new_v4(),
            availability: WorkerAvailability::Busy,
        };
        assert!(command.validate().is_err());
        let command = SetAvailabilityCommand {
            availability: WorkerAvailability::Offline,
            ..command
        };
        assert!(command.validate().is_ok());
    }

    #[test]
    fn test_redeem_requires_address() {
        let command = RedeemItemCommand {
            user_id: Uuid::new_v4(),
            item_id: Uuid::new_v4(),
            delivery_address: "  ".into(),
            notes: None,
        };
        assert!(matches!(
            command.validate(),
            Err(niramay::Error::Validation(msg)) if msg == "delivery address is required"
        ));
    }

    #[test]
    fn test_store_item_draft() {
        let draft: StoreItemDraft = serde_json::from_value(serde_json::json!({
            "name": " Cloth bag ",
            "points_cost": 40,
            "stock_quantity": 3
        }))
        .unwrap();
        assert!(draft.is_active);
        assert!(draft.validate().is_ok());

        let id = Uuid::new_v4();
        let item = draft.clone().into_item(id);
        assert_eq!(item.id, id);
        assert_eq!(item.name, "Cloth bag");

        let free = StoreItemDraft {
            points_cost: 0,
            ..draft.clone()
        };
        assert!(free.validate().is_err());
        let negative = StoreItemDraft {
            stock_quantity: -1,
            ..draft
        };
        assert!(negative.validate().is_err());
    }
}
