use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use rust_decimal::Decimal;
use serde_json::json;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::salary_info::SalaryInfo;
use crate::salary::{
    self, DepartmentWageRow, build_slip, company_salary_stats, department_breakdown,
};

#[derive(Deserialize, ToSchema)]
pub struct AssignSalary {
    /// Monthly wage; every component is derived from this single figure.
    #[schema(value_type = String, example = "50000")]
    pub monthly_wage: Decimal,
}

pub(crate) const SALARY_INFO_COLUMNS: &str = r#"
    id, employee_id, monthly_wage, yearly_wage,
    basic, hra, standard_allowance, performance_bonus, lta, fixed_allowance,
    pf_employee, pf_employer, professional_tax, updated_at
"#;

/// Assign or revise an employee's wage
///
/// Recomputes the full component breakdown and upserts the stored
/// snapshot. Reads elsewhere replay this snapshot untouched.
#[utoipa::path(
    put,
    path = "/api/salary/{employee_id}",
    request_body = AssignSalary,
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Salary assigned", body = Object, example = json!({
            "message": "Salary assigned",
            "components": {"monthly_wage": "50000", "basic": "25000"}
        })),
        (status = 400, description = "Negative wage rejected"),
        (status = 404, description = "Employee not found"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn assign_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<AssignSalary>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    let employee_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
            .bind(employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, employee_id, "Failed to check employee");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if !employee_exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let components = match salary::compute_components(body.monthly_wage) {
        Ok(c) => c,
        Err(e) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": e.to_string()
            })));
        }
    };

    sqlx::query(
        r#"
        INSERT INTO salary_info
        (employee_id, monthly_wage, yearly_wage, basic, hra, standard_allowance,
         performance_bonus, lta, fixed_allowance, pf_employee, pf_employer,
         professional_tax, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, NOW())
        ON DUPLICATE KEY UPDATE
            monthly_wage = VALUES(monthly_wage),
            yearly_wage = VALUES(yearly_wage),
            basic = VALUES(basic),
            hra = VALUES(hra),
            standard_allowance = VALUES(standard_allowance),
            performance_bonus = VALUES(performance_bonus),
            lta = VALUES(lta),
            fixed_allowance = VALUES(fixed_allowance),
            pf_employee = VALUES(pf_employee),
            pf_employer = VALUES(pf_employer),
            professional_tax = VALUES(professional_tax),
            updated_at = NOW()
        "#,
    )
    .bind(employee_id)
    .bind(components.monthly_wage)
    .bind(components.yearly_wage)
    .bind(components.basic)
    .bind(components.hra)
    .bind(components.standard_allowance)
    .bind(components.performance_bonus)
    .bind(components.lta)
    .bind(components.fixed_allowance)
    .bind(components.pf_employee)
    .bind(components.pf_employer)
    .bind(components.professional_tax)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to upsert salary info");
        ErrorInternalServerError("Internal Server Error")
    })?;

    info!(employee_id, wage = %components.monthly_wage, "Salary assigned");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Salary assigned",
        "components": components
    })))
}

/// Stored salary breakdown for one employee
#[utoipa::path(
    get,
    path = "/api/salary/{employee_id}",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Stored salary snapshot", body = SalaryInfo),
        (status = 403),
        (status = 404, description = "No salary assigned")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_salary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let sql = format!(
        "SELECT {} FROM salary_info WHERE employee_id = ?",
        SALARY_INFO_COLUMNS
    );
    let info = sqlx::query_as::<_, SalaryInfo>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch salary info");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match info {
        Some(info) => Ok(HttpResponse::Ok().json(info)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "No salary assigned"
        }))),
    }
}

/// Salary slip for one employee
///
/// Replays the stored snapshot into the earnings/deductions slip shape.
#[utoipa::path(
    get,
    path = "/api/salary/{employee_id}/slip",
    params(
        ("employee_id", Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Salary slip", body = crate::salary::SalarySlip),
        (status = 403),
        (status = 404, description = "Employee or salary not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn get_salary_slip(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let name = sqlx::query_as::<_, (String, String)>(
        "SELECT first_name, last_name FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch employee");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some((first_name, last_name)) = name else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    };

    let sql = format!(
        "SELECT {} FROM salary_info WHERE employee_id = ?",
        SALARY_INFO_COLUMNS
    );
    let info = sqlx::query_as::<_, SalaryInfo>(&sql)
        .bind(employee_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, employee_id, "Failed to fetch salary info");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let Some(info) = info else {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "No salary assigned"
        })));
    };

    let slip = build_slip(&format!("{} {}", first_name, last_name), &info);
    Ok(HttpResponse::Ok().json(slip))
}

/// Company-wide wage statistics
#[utoipa::path(
    get,
    path = "/api/salary/stats/summary",
    responses(
        (status = 200, description = "Company wage statistics", body = crate::salary::CompanySalaryStats),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn salary_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let sql = format!("SELECT {} FROM salary_info", SALARY_INFO_COLUMNS);
    let rows = sqlx::query_as::<_, SalaryInfo>(&sql)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch salary rows");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(company_salary_stats(&rows)))
}

/// Wage totals per department
#[utoipa::path(
    get,
    path = "/api/salary/stats/departments",
    responses(
        (status = 200, description = "Per-department wage totals", body = [crate::salary::DepartmentSummary]),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Salary"
)]
pub async fn department_stats(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let rows = sqlx::query_as::<_, DepartmentWageRow>(
        r#"
        SELECT d.name AS department, s.monthly_wage
        FROM salary_info s
        INNER JOIN employees e ON e.id = s.employee_id
        INNER JOIN departments d ON d.id = e.department_id
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to fetch department wages");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(department_breakdown(&rows)))
}
