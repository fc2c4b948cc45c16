use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Admin,
    Worker,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Admin => "admin",
            Role::Worker => "worker",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    Submitted,
    Assigned,
    InProgress,
    Completed,
    Rejected,
}

impl ComplaintStatus {
    /// Forward-only workflow; `rejected` is reachable before work starts.
    pub fn can_transition_to(self, next: ComplaintStatus) -> bool {
        use ComplaintStatus::*;
        matches!(
            (self, next),
            (Submitted, Assigned)
                | (Assigned, InProgress)
                | (InProgress, Completed)
                | (Submitted, Rejected)
                | (Assigned, Rejected)
        )
    }

    /// States from which `next` may be entered.
    pub fn predecessors(next: ComplaintStatus) -> Vec<ComplaintStatus> {
        use ComplaintStatus::*;
        [Submitted, Assigned, InProgress, Completed, Rejected]
            .into_iter()
            .filter(|s| s.can_transition_to(next))
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Submitted => "submitted",
            ComplaintStatus::Assigned => "assigned",
            ComplaintStatus::InProgress => "in_progress",
            ComplaintStatus::Completed => "completed",
            ComplaintStatus::Rejected => "rejected",
        }
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Emergency,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// States from which `next` may be entered.
    pub fn predecessors(next: TaskStatus) -> Vec<TaskStatus> {
        use TaskStatus::*;
        [Assigned, InProgress, Completed, Cancelled]
            .into_iter()
            .filter(|s| s.can_transition_to(next))
            .collect()
    }

    pub fn open() -> Vec<TaskStatus> {
        use TaskStatus::*;
        [Assigned, InProgress, Completed, Cancelled]
            .into_iter()
            .filter(|s| s.is_open())
            .collect()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Assigned => "assigned",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        matches!(
            (self, next),
            (Assigned, InProgress)
                | (InProgress, Completed)
                | (Assigned, Cancelled)
        )
    }

    pub fn is_open(self) -> bool {
        matches!(self, TaskStatus::Assigned | TaskStatus::InProgress)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum WorkerAvailability {
    Available,
    Busy,
    Offline,
}

impl WorkerAvailability {
    pub fn as_str(self) -> &'static str {
        match self {
            WorkerAvailability::Available => "available",
            WorkerAvailability::Busy => "busy",
            WorkerAvailability::Offline => "offline",
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Earned,
    Redeemed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(type_name = "varchar")]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RedemptionStatus {
    Pending,
    Approved,
    Delivered,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub national_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: Role,
    pub city: String,
    pub locality: String,
    pub created_at: DateTime<Utc>,
}

impl UserRole {
    pub fn area(&self) -> Area {
        Area {
            city: self.city.clone(),
            locality: self.locality.clone(),
        }
    }

    pub fn covers(&self, city: &str, locality: &str) -> bool {
        self.city == city && self.locality == locality
    }
}

/// Geographic scope used to route complaints to admins and workers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub city: String,
    pub locality: String,
}

impl Area {
    pub const UNKNOWN: &'static str = "Unknown";

    /// Derives an area from a free-form address: the first comma separated
    /// segment is the locality, the last one the city.
    pub fn from_address(address: Option<&str>) -> Self {
        let segments: Vec<&str> = address
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();
        Area {
            city: segments.last().unwrap_or(&Self::UNKNOWN).to_string(),
            locality: segments.first().unwrap_or(&Self::UNKNOWN).to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Complaint {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub photo_url: String,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub priority: Priority,
    pub locality: String,
    pub city: String,
    pub status: ComplaintStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Task {
    pub id: Uuid,
    pub complaint_id: Uuid,
    pub admin_id: Uuid,
    pub worker_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub assigned_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

impl Task {
    pub fn title_for(complaint: &Complaint) -> String {
        format!("Cleanup: {}", complaint.title)
    }
}

/// Task joined with the fields of its complaint a worker needs on site.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskWithComplaint {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub task: Task,
    pub reporter_id: Uuid,
    pub address: String,
    pub latitude: f64,
    pub longitude: f64,
    pub photo_url: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkerStatus {
    pub worker_id: Uuid,
    pub status: WorkerAvailability,
    pub current_task_id: Option<Uuid>,
    pub locality: String,
    pub city: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EcoPoints {
    pub user_id: Uuid,
    pub points: i32,
    pub total_earned: i32,
    pub total_redeemed: i32,
    pub updated_at: DateTime<Utc>,
}

impl EcoPoints {
    /// Balance shown for users whose ledger row was never seeded.
    pub fn empty(user_id: Uuid) -> Self {
        Self {
            user_id,
            points: 0,
            total_earned: 0,
            total_redeemed: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.points >= 0
            && self.points == self.total_earned - self.total_redeemed
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PointTransaction {
    pub id: Uuid,
    pub user_id: Uuid,
    #[sqlx(rename = "type")]
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub points: i32,
    pub description: Option<String>,
    pub complaint_id: Option<Uuid>,
    pub task_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EcoStoreItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub points_cost: i32,
    pub stock_quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl EcoStoreItem {
    /// Checks a redemption against the caller's balance before any write.
    pub fn check_redeemable(&self, balance: i32) -> niramay::Result<()> {
        if !self.is_active {
            return Err(niramay::Error::NotFound(format!(
                "store item {}",
                self.id
            )));
        }
        if self.stock_quantity <= 0 {
            return Err(niramay::Error::Conflict(format!(
                "{} is out of stock",
                self.name
            )));
        }
        if balance < self.points_cost {
            return Err(niramay::Error::Validation(format!(
                "insufficient points: {} needed, {} available",
                self.points_cost, balance
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Redemption {
    pub id: Uuid,
    pub user_id: Uuid,
    pub item_id: Uuid,
    pub points_used: i32,
    pub delivery_address: String,
    pub status: RedemptionStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Redemption joined with the catalog entry it refers to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RedemptionWithItem {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub redemption: Redemption,
    pub item_name: String,
    pub item_image_url: Option<String>,
}

/// Twelve digit national identity number, stored without separators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NationalId(String);

impl NationalId {
    pub const DIGITS: usize = 12;

    /// Strips every non-digit; valid when exactly twelve digits remain.
    pub fn parse(input: &str) -> niramay::Result<Self> {
        let digits: String =
            input.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != Self::DIGITS {
            return Err(niramay::Error::Validation(
                "national id must be a 12-digit number".into(),
            ));
        }
        Ok(NationalId(digits))
    }

    pub fn digits(&self) -> &str {
        &self.0
    }
}

/// Progressive `XXXX-XXXX-XXXX` formatting for partially typed input.
/// Non-digits are dropped and input is cut at twelve digits.
pub fn format_national_id(input: &str) -> String {
    let digits: Vec<char> = input
        .chars()
        .filter(|c| c.is_ascii_digit())
        .take(NationalId::DIGITS)
        .collect();
    digits
        .chunks(4)
        .map(|chunk| chunk.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complaint_workflow_is_forward_only() {
        use ComplaintStatus::*;
        assert!(Submitted.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));

        assert!(!Assigned.can_transition_to(Submitted));
        assert!(!Completed.can_transition_to(InProgress));
        assert!(!Submitted.can_transition_to(Completed));
        assert!(!Submitted.can_transition_to(InProgress));
    }

    #[test]
    fn test_rejection_only_before_work_starts() {
        use ComplaintStatus::*;
        assert_eq!(
            ComplaintStatus::predecessors(Rejected),
            vec![Submitted, Assigned]
        );
        assert!(!InProgress.can_transition_to(Rejected));
        assert!(!Completed.can_transition_to(Rejected));
    }

    #[test]
    fn test_task_transitions() {
        use TaskStatus::*;
        assert!(Assigned.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Completed));
        assert!(Assigned.can_transition_to(Cancelled));
        assert!(!InProgress.can_transition_to(Cancelled));
        assert!(!Completed.can_transition_to(Assigned));
        assert!(Assigned.is_open() && InProgress.is_open());
        assert!(!Completed.is_open());
    }

    #[test]
    fn test_task_predecessors_follow_transitions() {
        use TaskStatus::*;
        assert_eq!(TaskStatus::predecessors(InProgress), vec![Assigned]);
        assert_eq!(TaskStatus::predecessors(Completed), vec![InProgress]);
        assert_eq!(TaskStatus::predecessors(Cancelled), vec![Assigned]);
        assert!(TaskStatus::predecessors(Assigned).is_empty());
        assert_eq!(TaskStatus::open(), vec![Assigned, InProgress]);
        assert_eq!(InProgress.as_str(), "in_progress");
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(
            serde_json::to_string(&ComplaintStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(ComplaintStatus::InProgress.as_str(), "in_progress");
        assert_eq!(
            serde_json::from_str::<Priority>("\"emergency\"").unwrap(),
            Priority::Emergency
        );
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_national_id_formats_twelve_digits() {
        let id = NationalId::parse("123456789012").unwrap();
        assert_eq!(id.digits(), "123456789012");
        assert_eq!(format_national_id(id.digits()), "1234-5678-9012");

        let id = NationalId::parse("1234-5678-9012").unwrap();
        assert_eq!(id.digits(), "123456789012");
    }

    #[test]
    fn test_national_id_rejects_other_lengths() {
        for input in ["", "12345678901", "1234567890123", "abcd-efgh-ijkl"] {
            assert!(
                matches!(
                    NationalId::parse(input),
                    Err(niramay::Error::Validation(_))
                ),
                "{input} should be rejected"
            );
        }
        assert!(NationalId::parse("1234a567890").is_err());
    }

    #[test]
    fn test_national_id_ignores_any_separator() {
        for input in ["1234.5678.9012", "1234/5678/9012", "(1234) 5678 9012"] {
            let id = NationalId::parse(input).unwrap();
            assert_eq!(id.digits(), "123456789012");
            assert_eq!(format_national_id(input), "1234-5678-9012");
        }
    }

    #[test]
    fn test_progressive_format() {
        assert_eq!(format_national_id("1234"), "1234");
        assert_eq!(format_national_id("12345678"), "1234-5678");
        assert_eq!(format_national_id("123456789"), "1234-5678-9");
        assert_eq!(format_national_id("1234567890123456"), "1234-5678-9012");
    }

    #[test]
    fn test_area_from_address() {
        let area = Area::from_address(Some("Ward 7, Baner, Pune"));
        assert_eq!(area.locality, "Ward 7");
        assert_eq!(area.city, "Pune");

        let area = Area::from_address(None);
        assert_eq!(area.city, Area::UNKNOWN);
        assert_eq!(area.locality, Area::UNKNOWN);

        let area = Area::from_address(Some("  "));
        assert_eq!(area.city, Area::UNKNOWN);
    }

    fn item(points_cost: i32, stock_quantity: i32) -> EcoStoreItem {
        EcoStoreItem {
            id: Uuid::new_v4(),
            name: "Compost bin".into(),
            description: None,
            category: Some("home".into()),
            image_url: None,
            points_cost,
            stock_quantity,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_redeemable_checks() {
        assert!(item(50, 3).check_redeemable(50).is_ok());
        assert!(matches!(
            item(50, 3).check_redeemable(49),
            Err(niramay::Error::Validation(_))
        ));
        assert!(matches!(
            item(50, 0).check_redeemable(500),
            Err(niramay::Error::Conflict(_))
        ));

        let mut inactive = item(10, 5);
        inactive.is_active = false;
        assert!(matches!(
            inactive.check_redeemable(100),
            Err(niramay::Error::NotFound(_))
        ));
    }

    #[test]
    fn test_eco_points_consistency() {
        let mut points = EcoPoints::empty(Uuid::new_v4());
        assert!(points.is_consistent());
        points.points = 10;
        points.total_earned = 10;
        assert!(points.is_consistent());
        points.total_redeemed = 5;
        assert!(!points.is_consistent());
    }
}
