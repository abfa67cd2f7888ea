//! Salary engine: component derivation and payroll aggregation.
//!
//! The calculator turns a monthly wage into the full earning/deduction
//! breakdown under fixed percentage rules; the report half rolls stored
//! rows up into slips, company statistics and period summaries. Both
//! halves are pure functions over their inputs.

mod components;
mod error;
mod report;

pub use components::{
    BASIC_RATE, HRA_RATE, LTA_RATE, PERFORMANCE_BONUS_RATE, PF_MONTHLY_CAP, PF_RATE,
    PROFESSIONAL_TAX, STANDARD_ALLOWANCE, SalaryComponents, compute_components, yearly_wage,
};
pub use error::{SalaryError, SalaryResult};
pub use report::{
    CompanySalaryStats, DepartmentSummary, DepartmentWageRow, PayrollPeriodSummary, SalarySlip,
    SlipDeductions, SlipEarnings, build_slip, company_salary_stats, department_breakdown,
    period_summary,
};
