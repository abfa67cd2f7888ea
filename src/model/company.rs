use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Company settings row. A deployment serves one company; the row carries
/// the attendance policy thresholds every status derivation reads.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Company {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = "Acme Corp")]
    pub name: String,

    /// Nominal start of the working day.
    #[schema(example = "09:00:00", value_type = String, format = "time")]
    pub work_start: NaiveTime,

    /// Minutes after `work_start` before a check-in counts as late.
    #[schema(example = 15)]
    pub grace_minutes: u32,

    /// Minimum worked minutes for a full day; anything shorter with a
    /// checkout is a half day.
    #[schema(example = 480)]
    pub full_day_minutes: u32,

    /// Minutes that must elapse after check-in before checkout is allowed.
    #[schema(example = 240)]
    pub checkout_after_minutes: u32,
}

/// The thresholds attendance derivation needs, detached from the row so
/// the pure logic can be exercised without a database.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttendancePolicy {
    pub work_start: NaiveTime,
    pub grace_minutes: u32,
    pub full_day_minutes: u32,
    pub checkout_after_minutes: u32,
}

impl Company {
    pub fn policy(&self) -> AttendancePolicy {
        AttendancePolicy {
            work_start: self.work_start,
            grace_minutes: self.grace_minutes,
            full_day_minutes: self.full_day_minutes,
            checkout_after_minutes: self.checkout_after_minutes,
        }
    }
}
