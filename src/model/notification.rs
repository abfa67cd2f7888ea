use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// In-app notification. A null recipient is a company-wide announcement
/// visible to everyone.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001, nullable = true)]
    pub recipient_employee_id: Option<u64>,
    #[schema(example = "Leave approved")]
    pub title: String,
    #[schema(example = "Your leave for 2026-02-02 to 2026-02-04 was approved.")]
    pub body: String,
    #[schema(example = false)]
    pub is_read: bool,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}
