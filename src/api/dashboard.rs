use crate::auth::auth::AuthUser;
use crate::model::payroll::{PayPeriod, PayrollRecord};
use crate::model::salary_info::SalaryInfo;
use crate::salary::{
    CompanySalaryStats, DepartmentSummary, DepartmentWageRow, PayrollPeriodSummary,
    company_salary_stats, department_breakdown, period_summary,
};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::MySqlPool;
use utoipa::ToSchema;

use super::payroll::PAYROLL_COLUMNS;
use super::salary::SALARY_INFO_COLUMNS;

#[derive(Serialize, ToSchema)]
pub struct Headcount {
    #[schema(example = 42)]
    pub total: i64,
    #[schema(example = 40)]
    pub active: i64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceToday {
    #[schema(example = 30)]
    pub checked_in: i64,
    #[schema(example = 5)]
    pub checked_out: i64,
    #[schema(example = 2)]
    pub on_leave: i64,
}

/// One-screen company overview for the HR landing page.
#[derive(Serialize, ToSchema)]
pub struct DashboardSummary {
    pub headcount: Headcount,
    pub attendance_today: AttendanceToday,
    #[schema(example = 3)]
    pub pending_leave_requests: i64,
    pub salary: CompanySalaryStats,
    pub departments: Vec<DepartmentSummary>,
    pub payroll_current_period: PayrollPeriodSummary,
}

/// Swagger doc for dashboard_summary endpoint
#[utoipa::path(
    get,
    path = "/api/dashboard/summary",
    responses(
        (status = 200, description = "Company overview", body = DashboardSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn dashboard_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let internal = |e: sqlx::Error| {
        tracing::error!(error = %e, "Failed to build dashboard summary");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    };

    let (total, active) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT COUNT(*),
               CAST(COALESCE(SUM(status = 'active'), 0) AS SIGNED)
        FROM employees
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(internal)?;

    let (checked_in, checked_out) = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT CAST(COALESCE(SUM(check_out IS NULL), 0) AS SIGNED),
               CAST(COALESCE(SUM(check_out IS NOT NULL), 0) AS SIGNED)
        FROM attendance
        WHERE date = CURDATE()
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(internal)?;

    let on_leave = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT employee_id)
        FROM leave_requests
        WHERE status = 'approved'
        AND start_date <= CURDATE()
        AND end_date >= CURDATE()
        "#,
    )
    .fetch_one(pool.get_ref())
    .await
    .map_err(internal)?;

    let pending_leave_requests =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM leave_requests WHERE status = 'pending'")
            .fetch_one(pool.get_ref())
            .await
            .map_err(internal)?;

    let salary_sql = format!("SELECT {} FROM salary_info", SALARY_INFO_COLUMNS);
    let salary_rows = sqlx::query_as::<_, SalaryInfo>(&salary_sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(internal)?;

    let wage_rows = sqlx::query_as::<_, DepartmentWageRow>(
        r#"
        SELECT d.name AS department, s.monthly_wage
        FROM salary_info s
        INNER JOIN employees e ON e.id = s.employee_id
        INNER JOIN departments d ON d.id = e.department_id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(internal)?;

    // current pay period keyed off the database clock, same as attendance
    let today = sqlx::query_scalar::<_, NaiveDate>("SELECT CURDATE()")
        .fetch_one(pool.get_ref())
        .await
        .map_err(internal)?;
    let period = PayPeriod::containing(today);

    let payroll_sql = format!("SELECT {} FROM payroll WHERE period = ?", PAYROLL_COLUMNS);
    let payroll_rows = sqlx::query_as::<_, PayrollRecord>(&payroll_sql)
        .bind(period.as_str())
        .fetch_all(pool.get_ref())
        .await
        .map_err(internal)?;

    let summary = DashboardSummary {
        headcount: Headcount { total, active },
        attendance_today: AttendanceToday {
            checked_in,
            checked_out,
            on_leave,
        },
        pending_leave_requests,
        salary: company_salary_stats(&salary_rows),
        departments: department_breakdown(&wage_rows),
        payroll_current_period: period_summary(&period, &payroll_rows),
    };

    Ok(HttpResponse::Ok().json(summary))
}
