//! Payroll aggregation.
//!
//! Read-only rollups over already-fetched salary and payroll rows:
//! per-employee salary slips, company-wide wage statistics, per-department
//! totals and the per-period payroll summary. All functions here are pure;
//! handlers fetch the rows and hand them in, so every aggregate is
//! unit-testable without a database.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::Serialize;
use utoipa::ToSchema;

use crate::model::payroll::{PayPeriod, PayrollRecord};
use crate::model::salary_info::SalaryInfo;

use super::components::round_money;

/// Earnings section of a salary slip, replayed from the stored snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SlipEarnings {
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
}

/// Deductions section of a salary slip.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SlipDeductions {
    #[schema(value_type = String, example = "1800")]
    pub pf_employee: Decimal,
    #[schema(value_type = String, example = "200")]
    pub professional_tax: Decimal,
}

/// Per-employee salary slip view.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SalarySlip {
    #[schema(example = 1001)]
    pub employee_id: u64,
    #[schema(example = "John Doe")]
    pub employee_name: String,
    pub earnings: SlipEarnings,
    #[schema(value_type = String, example = "50000")]
    pub gross_earnings: Decimal,
    pub deductions: SlipDeductions,
    #[schema(value_type = String, example = "2000")]
    pub total_deductions: Decimal,
    #[schema(value_type = String, example = "48000")]
    pub net_pay: Decimal,
    #[schema(value_type = String, example = "50000")]
    pub monthly_wage: Decimal,
    #[schema(value_type = String, example = "600000")]
    pub yearly_wage: Decimal,
}

/// Assembles a slip from the stored snapshot. Values are re-exposed as
/// stored, not recomputed against the current rules.
pub fn build_slip(employee_name: &str, info: &SalaryInfo) -> SalarySlip {
    SalarySlip {
        employee_id: info.employee_id,
        employee_name: employee_name.to_string(),
        earnings: SlipEarnings {
            basic: info.basic,
            hra: info.hra,
            standard_allowance: info.standard_allowance,
            performance_bonus: info.performance_bonus,
            lta: info.lta,
            fixed_allowance: info.fixed_allowance,
        },
        gross_earnings: info.gross_earnings(),
        deductions: SlipDeductions {
            pf_employee: info.pf_employee,
            professional_tax: info.professional_tax,
        },
        total_deductions: info.total_deductions(),
        net_pay: info.net_pay(),
        monthly_wage: info.monthly_wage,
        yearly_wage: info.yearly_wage,
    }
}

/// Company-wide wage statistics across all employees with assigned
/// salaries.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct CompanySalaryStats {
    #[schema(example = 3)]
    pub employees: u64,
    #[schema(value_type = String, example = "150000")]
    pub total_monthly: Decimal,
    #[schema(value_type = String, example = "50000")]
    pub average_monthly: Decimal,
    #[schema(value_type = String, example = "30000")]
    pub min_monthly: Decimal,
    #[schema(value_type = String, example = "70000")]
    pub max_monthly: Decimal,
    #[schema(value_type = String, example = "1800000")]
    pub total_yearly: Decimal,
    #[schema(value_type = String, example = "600000")]
    pub average_yearly: Decimal,
    #[schema(value_type = String, example = "5400")]
    pub total_pf_employee: Decimal,
    #[schema(value_type = String, example = "5400")]
    pub total_pf_employer: Decimal,
}

/// Rolls up wage statistics. An empty input yields all zeros.
pub fn company_salary_stats(rows: &[SalaryInfo]) -> CompanySalaryStats {
    if rows.is_empty() {
        return CompanySalaryStats {
            employees: 0,
            total_monthly: Decimal::ZERO,
            average_monthly: Decimal::ZERO,
            min_monthly: Decimal::ZERO,
            max_monthly: Decimal::ZERO,
            total_yearly: Decimal::ZERO,
            average_yearly: Decimal::ZERO,
            total_pf_employee: Decimal::ZERO,
            total_pf_employer: Decimal::ZERO,
        };
    }

    let count = Decimal::from(rows.len() as u64);
    let total_monthly: Decimal = rows.iter().map(|r| r.monthly_wage).sum();
    let total_yearly: Decimal = rows.iter().map(|r| r.yearly_wage).sum();
    let min_monthly = rows
        .iter()
        .map(|r| r.monthly_wage)
        .min()
        .unwrap_or(Decimal::ZERO);
    let max_monthly = rows
        .iter()
        .map(|r| r.monthly_wage)
        .max()
        .unwrap_or(Decimal::ZERO);

    CompanySalaryStats {
        employees: rows.len() as u64,
        total_monthly,
        average_monthly: round_money(total_monthly / count),
        min_monthly,
        max_monthly,
        total_yearly,
        average_yearly: round_money(total_yearly / count),
        total_pf_employee: rows.iter().map(|r| r.pf_employee).sum(),
        total_pf_employer: rows.iter().map(|r| r.pf_employer).sum(),
    }
}

/// One row of the department-grouping query: an employee's department name
/// and assigned monthly wage.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DepartmentWageRow {
    pub department: String,
    pub monthly_wage: Decimal,
}

/// Per-department wage total and headcount.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DepartmentSummary {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(value_type = String, example = "100000")]
    pub total_wage: Decimal,
    #[schema(example = 2)]
    pub headcount: u64,
}

/// Groups wages by department, ordered by department name.
pub fn department_breakdown(rows: &[DepartmentWageRow]) -> Vec<DepartmentSummary> {
    let mut groups: BTreeMap<&str, (Decimal, u64)> = BTreeMap::new();
    for row in rows {
        let entry = groups
            .entry(row.department.as_str())
            .or_insert((Decimal::ZERO, 0));
        entry.0 += row.monthly_wage;
        entry.1 += 1;
    }

    groups
        .into_iter()
        .map(|(department, (total_wage, headcount))| DepartmentSummary {
            department: department.to_string(),
            total_wage,
            headcount,
        })
        .collect()
}

/// Net payout and processed-record count for one pay period.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollPeriodSummary {
    #[schema(example = "2026-01")]
    pub period: String,
    #[schema(example = 12)]
    pub processed_count: u64,
    #[schema(value_type = String, example = "576000")]
    pub total_net_payout: Decimal,
}

/// Sums processed records for the period. Draft records and records from
/// other periods are excluded.
pub fn period_summary(period: &PayPeriod, rows: &[PayrollRecord]) -> PayrollPeriodSummary {
    let mut processed_count = 0u64;
    let mut total_net_payout = Decimal::ZERO;

    for record in rows {
        if record.is_processed() && record.period == period.as_str() {
            processed_count += 1;
            total_net_payout += record.net_salary;
        }
    }

    PayrollPeriodSummary {
        period: period.as_str().to_string(),
        processed_count,
        total_net_payout,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    use crate::salary::compute_components;

    fn info(employee_id: u64, wage: Decimal) -> SalaryInfo {
        let c = compute_components(wage).unwrap();
        SalaryInfo {
            id: employee_id,
            employee_id,
            monthly_wage: c.monthly_wage,
            yearly_wage: c.yearly_wage,
            basic: c.basic,
            hra: c.hra,
            standard_allowance: c.standard_allowance,
            performance_bonus: c.performance_bonus,
            lta: c.lta,
            fixed_allowance: c.fixed_allowance,
            pf_employee: c.pf_employee,
            pf_employer: c.pf_employer,
            professional_tax: c.professional_tax,
            updated_at: None,
        }
    }

    fn record(employee_id: u64, period: &str, net: Decimal, status: &str) -> PayrollRecord {
        PayrollRecord {
            id: employee_id,
            employee_id,
            period: period.to_string(),
            basic_salary: Decimal::ZERO,
            allowances: Decimal::ZERO,
            deductions: Decimal::ZERO,
            net_salary: net,
            status: status.to_string(),
            created_at: None,
            processed_at: None,
        }
    }

    /// Aggregation scenario: wages 30000/50000/70000.
    #[test]
    fn test_company_stats_scenario() {
        let rows = vec![
            info(1, dec!(30000)),
            info(2, dec!(50000)),
            info(3, dec!(70000)),
        ];
        let stats = company_salary_stats(&rows);

        assert_eq!(stats.employees, 3);
        assert_eq!(stats.total_monthly, dec!(150000));
        assert_eq!(stats.average_monthly, dec!(50000));
        assert_eq!(stats.min_monthly, dec!(30000));
        assert_eq!(stats.max_monthly, dec!(70000));
        assert_eq!(stats.total_yearly, dec!(1800000));
        assert_eq!(stats.average_yearly, dec!(600000));
        // 30000 -> pf 1800 (12% of 15000), 50000 and 70000 cap at 1800.
        assert_eq!(stats.total_pf_employee, dec!(5400));
        assert_eq!(stats.total_pf_employer, dec!(5400));
    }

    #[test]
    fn test_company_stats_empty_is_all_zero() {
        let stats = company_salary_stats(&[]);
        assert_eq!(stats.employees, 0);
        assert_eq!(stats.total_monthly, Decimal::ZERO);
        assert_eq!(stats.average_monthly, Decimal::ZERO);
        assert_eq!(stats.min_monthly, Decimal::ZERO);
        assert_eq!(stats.max_monthly, Decimal::ZERO);
    }

    /// Department scenario: Eng {40000, 60000}, Sales {50000}.
    #[test]
    fn test_department_breakdown_scenario() {
        let rows = vec![
            DepartmentWageRow {
                department: "Eng".to_string(),
                monthly_wage: dec!(40000),
            },
            DepartmentWageRow {
                department: "Eng".to_string(),
                monthly_wage: dec!(60000),
            },
            DepartmentWageRow {
                department: "Sales".to_string(),
                monthly_wage: dec!(50000),
            },
        ];

        let breakdown = department_breakdown(&rows);
        assert_eq!(
            breakdown,
            vec![
                DepartmentSummary {
                    department: "Eng".to_string(),
                    total_wage: dec!(100000),
                    headcount: 2,
                },
                DepartmentSummary {
                    department: "Sales".to_string(),
                    total_wage: dec!(50000),
                    headcount: 1,
                },
            ]
        );
    }

    #[test]
    fn test_department_breakdown_empty() {
        assert!(department_breakdown(&[]).is_empty());
    }

    /// Only processed records in the requested period count.
    #[test]
    fn test_period_summary_filters_status_and_period() {
        let period = PayPeriod::parse("2026-01").unwrap();
        let rows = vec![
            record(1, "2026-01", dec!(48000), "processed"),
            record(2, "2026-01", dec!(28000), "processed"),
            record(3, "2026-01", dec!(60000), "draft"),
            record(4, "2026-02", dec!(48000), "processed"),
        ];

        let summary = period_summary(&period, &rows);
        assert_eq!(summary.period, "2026-01");
        assert_eq!(summary.processed_count, 2);
        assert_eq!(summary.total_net_payout, dec!(76000));
    }

    #[test]
    fn test_period_summary_empty_defaults_to_zero() {
        let period = PayPeriod::parse("2026-01").unwrap();
        let summary = period_summary(&period, &[]);
        assert_eq!(summary.processed_count, 0);
        assert_eq!(summary.total_net_payout, Decimal::ZERO);
    }

    /// The slip replays the stored snapshot and derives the rollup lines.
    #[test]
    fn test_slip_replays_stored_snapshot() {
        let info = info(1001, dec!(50000));
        let slip = build_slip("John Doe", &info);

        assert_eq!(slip.employee_id, 1001);
        assert_eq!(slip.employee_name, "John Doe");
        assert_eq!(slip.earnings.basic, dec!(25000));
        assert_eq!(slip.earnings.fixed_allowance, dec!(3));
        assert_eq!(slip.gross_earnings, dec!(50000));
        assert_eq!(slip.deductions.pf_employee, dec!(1800));
        assert_eq!(slip.total_deductions, dec!(2000));
        assert_eq!(slip.net_pay, dec!(48000));
        assert_eq!(slip.monthly_wage, dec!(50000));
        assert_eq!(slip.yearly_wage, dec!(600000));
    }
}
