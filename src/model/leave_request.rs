use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveType {
    Annual,
    Sick,
    Unpaid,
}

impl LeaveType {
    /// Paid leave draws down a balance; unpaid leave does not.
    pub fn is_paid(&self) -> bool {
        matches!(self, LeaveType::Annual | LeaveType::Sick)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, AsRefStr, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveRequest {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2026-02-04", value_type = String, format = "date")]
    pub end_date: NaiveDate,
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = "pending", nullable = true)]
    pub status: Option<String>,
    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Inclusive day count of a leave span. Callers validate the date order
/// first; a reversed span counts as zero days.
pub fn leave_days(start_date: NaiveDate, end_date: NaiveDate) -> u32 {
    if end_date < start_date {
        return 0;
    }
    ((end_date - start_date).num_days() + 1) as u32
}

/// True when any approved span in `spans` covers `date`.
pub fn covered_by_leave(date: NaiveDate, spans: &[(NaiveDate, NaiveDate)]) -> bool {
    spans
        .iter()
        .any(|(start, end)| *start <= date && date <= *end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, d).unwrap()
    }

    #[test]
    fn test_leave_days_inclusive() {
        assert_eq!(leave_days(date(2, 2), date(2, 2)), 1);
        assert_eq!(leave_days(date(2, 2), date(2, 4)), 3);
        assert_eq!(leave_days(date(2, 4), date(2, 2)), 0);
    }

    #[test]
    fn test_paid_leave_types() {
        assert!(LeaveType::Annual.is_paid());
        assert!(LeaveType::Sick.is_paid());
        assert!(!LeaveType::Unpaid.is_paid());
    }

    #[test]
    fn test_covered_by_leave_spans() {
        let spans = vec![(date(2, 2), date(2, 4)), (date(3, 1), date(3, 1))];
        assert!(covered_by_leave(date(2, 2), &spans));
        assert!(covered_by_leave(date(2, 3), &spans));
        assert!(covered_by_leave(date(2, 4), &spans));
        assert!(covered_by_leave(date(3, 1), &spans));
        assert!(!covered_by_leave(date(2, 5), &spans));
        assert!(!covered_by_leave(date(2, 1), &spans));
    }

    #[test]
    fn test_type_and_status_string_mapping() {
        assert_eq!(LeaveType::Annual.as_ref(), "annual");
        assert_eq!("sick".parse::<LeaveType>().unwrap(), LeaveType::Sick);
        assert_eq!(LeaveStatus::Pending.to_string(), "pending");
        assert_eq!("approved".parse::<LeaveStatus>().unwrap(), LeaveStatus::Approved);
    }
}
