use chrono::{DateTime, Datelike, NaiveDate, Utc};
use derive_more::Display;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display as StrumDisplay, EnumString};
use utoipa::ToSchema;

/// Calendar-month pay period key, e.g. `2026-01`.
///
/// Payroll rows are unique per employee and period; the key is stored as
/// the plain `YYYY-MM` string it parses from.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize, Deserialize, ToSchema)]
#[display(fmt = "{}", _0)]
#[schema(value_type = String, example = "2026-01")]
pub struct PayPeriod(String);

impl PayPeriod {
    /// Parses a `YYYY-MM` key. Rejects malformed strings and out-of-range
    /// months.
    pub fn parse(s: &str) -> Option<Self> {
        // Leans on chrono for the calendar check by pinning the day.
        let day_one = format!("{}-01", s);
        let date = NaiveDate::parse_from_str(&day_one, "%Y-%m-%d").ok()?;
        if s.len() != 7 {
            return None;
        }
        Some(PayPeriod(format!("{:04}-{:02}", date.year(), date.month())))
    }

    /// The period containing the given date.
    pub fn containing(date: NaiveDate) -> Self {
        PayPeriod(format!("{:04}-{:02}", date.year(), date.month()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<PayPeriod> for String {
    fn from(p: PayPeriod) -> String {
        p.0
    }
}

/// Payroll record lifecycle. Draft rows may be processed once; processed
/// rows are immutable (there is no correction flow).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    AsRefStr,
    StrumDisplay,
    EnumString,
    ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayrollStatus {
    Draft,
    Processed,
}

/// One payroll run entry: an employee's pay for one period.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollRecord {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(example = "2026-01")]
    pub period: String,

    #[schema(value_type = String, example = "25000")]
    pub basic_salary: Decimal,

    #[schema(value_type = String, example = "25000")]
    pub allowances: Decimal,

    #[schema(value_type = String, example = "2000")]
    pub deductions: Decimal,

    /// `basic_salary + allowances - deductions`.
    #[schema(value_type = String, example = "48000")]
    pub net_salary: Decimal,

    #[schema(example = "draft")]
    pub status: String,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub processed_at: Option<DateTime<Utc>>,
}

impl PayrollRecord {
    /// Typed view of the stored status string. Unknown strings read as
    /// draft, matching how they were written.
    pub fn status(&self) -> PayrollStatus {
        self.status.parse().unwrap_or(PayrollStatus::Draft)
    }

    pub fn is_processed(&self) -> bool {
        self.status() == PayrollStatus::Processed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pay_period_parses_valid_keys() {
        let p = PayPeriod::parse("2026-01").unwrap();
        assert_eq!(p.as_str(), "2026-01");
        assert_eq!(p.to_string(), "2026-01");
        assert_eq!(PayPeriod::parse("1999-12").unwrap().as_str(), "1999-12");
    }

    #[test]
    fn test_pay_period_rejects_malformed_keys() {
        assert!(PayPeriod::parse("2026-13").is_none());
        assert!(PayPeriod::parse("2026-00").is_none());
        assert!(PayPeriod::parse("26-01").is_none());
        assert!(PayPeriod::parse("2026/01").is_none());
        assert!(PayPeriod::parse("2026-1").is_none());
        assert!(PayPeriod::parse("").is_none());
        assert!(PayPeriod::parse("not-a-period").is_none());
    }

    #[test]
    fn test_pay_period_containing_date() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 15).unwrap();
        assert_eq!(PayPeriod::containing(date).as_str(), "2026-03");
    }

    #[test]
    fn test_status_parse_defaults_to_draft() {
        let mut record = PayrollRecord {
            id: 1,
            employee_id: 1,
            period: "2026-01".to_string(),
            basic_salary: Decimal::ZERO,
            allowances: Decimal::ZERO,
            deductions: Decimal::ZERO,
            net_salary: Decimal::ZERO,
            status: "processed".to_string(),
            created_at: None,
            processed_at: None,
        };
        assert!(record.is_processed());

        record.status = "garbage".to_string();
        assert_eq!(record.status(), PayrollStatus::Draft);
    }

    #[test]
    fn test_status_string_mapping() {
        assert_eq!(PayrollStatus::Draft.as_ref(), "draft");
        assert_eq!(PayrollStatus::Processed.to_string(), "processed");
        assert_eq!("processed".parse::<PayrollStatus>().unwrap(), PayrollStatus::Processed);
    }
}
