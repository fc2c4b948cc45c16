//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::{Priority, Role, WorkerAvailability};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterCitizenRequest {
    pub full_name: String,
    pub email: String,
    pub national_id: String,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetupRoleRequest {
    pub role: Role,
    pub city: String,
    pub locality: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitComplaintRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignComplaintRequest {
    pub worker_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectComplaintRequest {
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompleteTaskRequest {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub status: WorkerAvailability,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedeemRequest {
    pub delivery_address: String,
    #[serde(default)]
    pub notes: Option<String>,
}
