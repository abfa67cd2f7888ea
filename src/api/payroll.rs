use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::auth::AuthUser;
use crate::model::payroll::{PayPeriod, PayrollRecord, PayrollStatus};
use crate::model::salary_info::SalaryInfo;
use crate::salary::period_summary;

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 1001)]
    pub employee_id: u64,

    /// Pay period key, `YYYY-MM`.
    #[schema(example = "2026-01", value_type = String)]
    pub period: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    #[schema(example = 1001)]
    pub employee_id: Option<u64>,

    #[schema(example = "2026-01")]
    pub period: Option<String>,

    #[schema(example = "draft")]
    pub status: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedPayrollResponse {
    pub data: Vec<PayrollRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    /// Pay period key, `YYYY-MM`.
    #[schema(example = "2026-01")]
    pub period: String,
}

enum FilterValue {
    U64(u64),
    Str(String),
}

pub(crate) const PAYROLL_COLUMNS: &str = r#"
    id, employee_id, period, basic_salary, allowances, deductions, net_salary,
    status, created_at, processed_at
"#;

/// Create a payroll record for one employee and period
///
/// Amounts come from the employee's stored salary snapshot, never from the
/// request. The record starts as a draft.
#[utoipa::path(
    post,
    path = "/api/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = Object, example = json!({
            "message": "Payroll created successfully",
            "id": 1
        })),
        (status = 400, description = "Malformed period key"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Payroll already exists for this period"),
        (status = 422, description = "No salary assigned to the employee")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn create_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreatePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let Some(period) = PayPeriod::parse(&payload.period) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Period must be a valid YYYY-MM key"
        })));
    };

    let employee_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
            .bind(payload.employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, employee_id = payload.employee_id, "Failed to check employee");
                ErrorInternalServerError("Internal Server Error")
            })?;

    if !employee_exists {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    let info = sqlx::query_as::<_, SalaryInfo>(
        r#"
        SELECT id, employee_id, monthly_wage, yearly_wage,
               basic, hra, standard_allowance, performance_bonus, lta, fixed_allowance,
               pf_employee, pf_employer, professional_tax, updated_at
        FROM salary_info
        WHERE employee_id = ?
        "#,
    )
    .bind(payload.employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id = payload.employee_id, "Failed to fetch salary info");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(info) = info else {
        return Ok(HttpResponse::UnprocessableEntity().json(json!({
            "message": "Assign a salary before creating payroll"
        })));
    };

    let basic_salary = info.basic;
    let allowances = info.gross_earnings() - info.basic;
    let deductions = info.total_deductions();
    let net_salary = basic_salary + allowances - deductions;

    let result = sqlx::query(
        r#"
        INSERT INTO payroll
        (employee_id, period, basic_salary, allowances, deductions, net_salary, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, NOW())
        "#,
    )
    .bind(payload.employee_id)
    .bind(period.as_str())
    .bind(basic_salary)
    .bind(allowances)
    .bind(deductions)
    .bind(net_salary)
    .bind(PayrollStatus::Draft.as_ref())
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(res) => {
            info!(
                employee_id = payload.employee_id,
                period = %period,
                "Payroll created"
            );
            Ok(HttpResponse::Created().json(json!({
                "message": "Payroll created successfully",
                "id": res.last_insert_id()
            })))
        }
        Err(e) => {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code() == Some("23000".into()) {
                    return Ok(HttpResponse::Conflict().json(json!({
                        "message": "Payroll already exists for this period"
                    })));
                }
            }

            error!(error = %e, "Failed to create payroll");
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Internal Server Error"
            })))
        }
    }
}

/// Process a draft payroll record
///
/// Draft goes to processed exactly once; processed records never change
/// again.
#[utoipa::path(
    put,
    path = "/api/payroll/{payroll_id}/process",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Payroll processed"),
        (status = 400, description = "Already processed"),
        (status = 404, description = "Payroll not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn process_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let payroll_id = path.into_inner();

    // Status guard in the WHERE clause keeps the transition race-free.
    let affected = sqlx::query(
        r#"
        UPDATE payroll
        SET status = ?, processed_at = NOW()
        WHERE id = ? AND status = ?
        "#,
    )
    .bind(PayrollStatus::Processed.as_ref())
    .bind(payroll_id)
    .bind(PayrollStatus::Draft.as_ref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, payroll_id, "Failed to process payroll");
        ErrorInternalServerError("Internal Server Error")
    })?
    .rows_affected();

    if affected == 0 {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM payroll WHERE id = ?)")
            .bind(payroll_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                error!(error = %e, payroll_id, "Failed to check payroll");
                ErrorInternalServerError("Internal Server Error")
            })?;

        if !exists {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll record not found"
            })));
        }

        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Payroll already processed"
        })));
    }

    info!(payroll_id, "Payroll processed");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Payroll processed successfully"
    })))
}

/// Net payout summary for one period
///
/// Counts processed records only; drafts are excluded.
#[utoipa::path(
    get,
    path = "/api/payroll/summary",
    params(PeriodQuery),
    responses(
        (status = 200, description = "Period summary", body = crate::salary::PayrollPeriodSummary),
        (status = 400, description = "Malformed period key")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn payroll_summary(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let Some(period) = PayPeriod::parse(&query.period) else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Period must be a valid YYYY-MM key"
        })));
    };

    let sql = format!("SELECT {} FROM payroll WHERE period = ?", PAYROLL_COLUMNS);
    let rows = sqlx::query_as::<_, PayrollRecord>(&sql)
        .bind(period.as_str())
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, period = %period, "Failed to fetch payroll rows");
            ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(period_summary(&period, &rows)))
}

/// Get one payroll record
#[utoipa::path(
    get,
    path = "/api/payroll/{payroll_id}",
    params(
        ("payroll_id", Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, body = PayrollRecord),
        (status = 404)
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payroll_id = path.into_inner();

    let sql = format!("SELECT {} FROM payroll WHERE id = ?", PAYROLL_COLUMNS);
    let payroll = sqlx::query_as::<_, PayrollRecord>(&sql)
        .bind(payroll_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, payroll_id, "Failed to fetch payroll");
            ErrorInternalServerError("Internal Server Error")
        })?;

    match payroll {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "Payroll not found"
        }))),
    }
}

/// List payroll records
#[utoipa::path(
    get,
    path = "/api/payroll",
    params(PayrollQuery),
    responses(
        (status = 200, body = PaginatedPayrollResponse),
        (status = 400, description = "Malformed filter")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payrolls(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = Vec::new();
    let mut bindings: Vec<FilterValue> = Vec::new();

    if let Some(employee_id) = query.employee_id {
        conditions.push("employee_id = ?");
        bindings.push(FilterValue::U64(employee_id));
    }

    if let Some(raw) = &query.period {
        let Some(period) = PayPeriod::parse(raw) else {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Period must be a valid YYYY-MM key"
            })));
        };
        conditions.push("period = ?");
        bindings.push(FilterValue::Str(period.as_str().to_string()));
    }

    if let Some(raw) = &query.status {
        let Ok(status) = raw.parse::<PayrollStatus>() else {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Status must be draft or processed"
            })));
        };
        conditions.push("status = ?");
        bindings.push(FilterValue::Str(status.as_ref().to_string()));
    }

    let where_clause = if conditions.is_empty() {
        "".to_string()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    };

    let count_sql = format!("SELECT COUNT(*) FROM payroll {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
    for b in &bindings {
        count_query = match b {
            FilterValue::U64(v) => count_query.bind(*v),
            FilterValue::Str(s) => count_query.bind(s.clone()),
        };
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to count payrolls");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT {} FROM payroll {} ORDER BY period DESC, id DESC LIMIT ? OFFSET ?",
        PAYROLL_COLUMNS, where_clause
    );
    let mut data_query = sqlx::query_as::<_, PayrollRecord>(&data_sql);
    for b in &bindings {
        data_query = match b {
            FilterValue::U64(v) => data_query.bind(*v),
            FilterValue::Str(s) => data_query.bind(s.clone()),
        };
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let data = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch payroll list");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(PaginatedPayrollResponse {
        data,
        page,
        per_page,
        total,
    }))
}
