use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Persisted salary breakdown snapshot, one row per employee.
///
/// Written by the wage-assignment flow from a freshly computed
/// [`crate::salary::SalaryComponents`]; reads (slips, reports) replay the
/// stored values rather than recomputing from the current rules.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct SalaryInfo {
    #[schema(example = 1)]
    pub id: u64,

    #[schema(example = 1001)]
    pub employee_id: u64,

    #[schema(value_type = String, example = "50000")]
    pub monthly_wage: Decimal,

    #[schema(value_type = String, example = "600000")]
    pub yearly_wage: Decimal,

    #[schema(value_type = String, example = "25000")]
    pub basic: Decimal,

    #[schema(value_type = String, example = "12500")]
    pub hra: Decimal,

    #[schema(value_type = String, example = "4167")]
    pub standard_allowance: Decimal,

    #[schema(value_type = String, example = "4165")]
    pub performance_bonus: Decimal,

    #[schema(value_type = String, example = "4165")]
    pub lta: Decimal,

    #[schema(value_type = String, example = "3")]
    pub fixed_allowance: Decimal,

    #[schema(value_type = String, example = "1800")]
    pub pf_employee: Decimal,

    #[schema(value_type = String, example = "1800")]
    pub pf_employer: Decimal,

    #[schema(value_type = String, example = "200")]
    pub professional_tax: Decimal,

    #[schema(value_type = String, format = "date-time", nullable = true)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl SalaryInfo {
    /// Sum of the stored earning components.
    pub fn gross_earnings(&self) -> Decimal {
        self.basic
            + self.hra
            + self.standard_allowance
            + self.performance_bonus
            + self.lta
            + self.fixed_allowance
    }

    /// Stored employee-side deductions.
    pub fn total_deductions(&self) -> Decimal {
        self.pf_employee + self.professional_tax
    }

    /// Gross earnings minus deductions, from the stored snapshot.
    pub fn net_pay(&self) -> Decimal {
        self.gross_earnings() - self.total_deductions()
    }
}
