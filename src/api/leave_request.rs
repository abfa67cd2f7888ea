use crate::auth::auth::AuthUser;
use crate::model::leave_balance::LeaveBalance;
use crate::model::leave_request::{LeaveRequest, LeaveStatus, LeaveType, leave_days};
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct CreateLeave {
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub start_date: chrono::NaiveDate,
    #[schema(example = "2026-01-01", format = "date", value_type = String)]
    pub end_date: chrono::NaiveDate,
    #[schema(example = "sick")]
    pub leave_type: LeaveType, // enum ensures Swagger dropdown
}

#[derive(Serialize, ToSchema)]
#[schema(example = json!({
    "data": [
        {
            "id": 1,
            "employee_id": 1000,
            "start_date": "2026-01-01",
            "end_date": "2026-01-03",
            "leave_type": "sick",
            "status": "pending",
            "created_at": "2026-01-01T00:00:00Z"
        }
    ],
    "page": 1,
    "per_page": 10,
    "total": 1
}))]
pub struct LeaveListResponse {
    pub data: Vec<LeaveRequest>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveFilter {
    #[schema(example = 123)]
    /// Filter by employee ID
    pub employee_id: Option<u64>,
    #[schema(example = "pending")]
    /// Filter by leave status
    pub status: Option<String>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 3)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    U64(u64),
    Str(&'a str),
}

/// Per-type balance view with the derived remaining count.
#[derive(Serialize, ToSchema)]
pub struct BalanceView {
    #[schema(example = "annual")]
    pub leave_type: String,
    #[schema(example = 20)]
    pub allocated_days: u32,
    #[schema(example = 5)]
    pub used_days: u32,
    #[schema(example = 15)]
    pub remaining_days: u32,
}

#[derive(Deserialize, ToSchema)]
pub struct AllocateBalance {
    #[schema(example = "annual")]
    pub leave_type: LeaveType,
    #[schema(example = 20)]
    pub allocated_days: u32,
}

const LEAVE_COLUMNS: &str = "id, employee_id, start_date, end_date, leave_type, status, created_at";

/// Insert an in-app notification; failures are logged and swallowed so
/// the main flow never fails on a side effect.
async fn notify(pool: &MySqlPool, employee_id: u64, title: &str, body: &str) {
    if let Err(e) = sqlx::query(
        "INSERT INTO notifications (recipient_employee_id, title, body) VALUES (?, ?, ?)",
    )
    .bind(employee_id)
    .bind(title)
    .bind(body)
    .execute(pool)
    .await
    {
        tracing::error!(error = %e, employee_id, "Failed to insert notification");
    }
}

async fn fetch_balances(
    pool: &MySqlPool,
    employee_id: u64,
) -> Result<Vec<BalanceView>, sqlx::Error> {
    let rows = sqlx::query_as::<_, LeaveBalance>(
        r#"
        SELECT id, employee_id, leave_type, allocated_days, used_days
        FROM leave_balances
        WHERE employee_id = ?
        ORDER BY leave_type
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|b| BalanceView {
            remaining_days: b.remaining_days(),
            leave_type: b.leave_type,
            allocated_days: b.allocated_days,
            used_days: b.used_days,
        })
        .collect())
}

/* =========================
Create leave request
========================= */
/// Swagger doc for create_leave endpoint
#[utoipa::path(
    post,
    path = "/api/leave",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 200, description = "Leave request submitted successfully",
         body = Object,
         example = json!({
            "message": "Leave request submitted",
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Insufficient leave balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn create_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    // 1️⃣ validate dates
    if payload.start_date > payload.end_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "start_date cannot be after end_date"
        })));
    }

    let days = leave_days(payload.start_date, payload.end_date);

    // 2️⃣ paid leave draws down a balance; check it before accepting
    if payload.leave_type.is_paid() {
        let balance = sqlx::query_as::<_, (u32, u32)>(
            r#"
            SELECT allocated_days, used_days
            FROM leave_balances
            WHERE employee_id = ? AND leave_type = ?
            "#,
        )
        .bind(employee_id)
        .bind(payload.leave_type.as_ref())
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch leave balance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        let remaining = balance
            .map(|(allocated, used)| allocated.saturating_sub(used))
            .unwrap_or(0);

        if remaining < days {
            return Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "message": format!(
                    "Insufficient {} leave balance: {} days remaining, {} requested",
                    payload.leave_type, remaining, days
                )
            })));
        }
    }

    // 3️⃣ insert request
    sqlx::query(
        r#"
        INSERT INTO leave_requests
            (employee_id, start_date, end_date, leave_type)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(employee_id)
    .bind(payload.start_date)
    .bind(payload.end_date)
    .bind(payload.leave_type.as_ref())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave request submitted",
        "status": "pending"
    })))
}

#[derive(sqlx::FromRow)]
struct PendingLeave {
    employee_id: u64,
    start_date: NaiveDate,
    end_date: NaiveDate,
    leave_type: String,
}

/* =========================
Approve leave (HR/Admin)
========================= */
/// Swagger doc for approve_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/approve",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to approve")
    ),
    responses(
        (status = 200, description = "Leave approved successfully", body = Object, example = json!({
            "message": "Leave approved"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Insufficient leave balance")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    // Balance decrement and status flip must agree, so both run in one
    // transaction with the request row locked.
    let mut tx = pool.get_ref().begin().await.map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to start transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let leave = sqlx::query_as::<_, PendingLeave>(
        r#"
        SELECT employee_id, start_date, end_date, leave_type
        FROM leave_requests
        WHERE id = ? AND status = 'pending'
        FOR UPDATE
        "#,
    )
    .bind(leave_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(leave) = leave else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    };

    let days = leave_days(leave.start_date, leave.end_date);
    let is_paid = leave
        .leave_type
        .parse::<LeaveType>()
        .map(|t| t.is_paid())
        .unwrap_or(false);

    if is_paid {
        let affected = sqlx::query(
            r#"
            UPDATE leave_balances
            SET used_days = used_days + ?
            WHERE employee_id = ? AND leave_type = ?
            AND allocated_days - used_days >= ?
            "#,
        )
        .bind(days)
        .bind(leave.employee_id)
        .bind(&leave.leave_type)
        .bind(days)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to decrement leave balance");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?
        .rows_affected();

        if affected == 0 {
            tx.rollback().await.ok();
            return Ok(HttpResponse::UnprocessableEntity().json(serde_json::json!({
                "message": "Insufficient leave balance"
            })));
        }
    }

    sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'approved'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Approve leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to commit approval");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // side effect only; the approval stands even if this fails
    notify(
        pool.get_ref(),
        leave.employee_id,
        "Leave approved",
        &format!(
            "Your {} leave from {} to {} was approved.",
            leave.leave_type, leave.start_date, leave.end_date
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave approved"
    })))
}

/* =========================
Reject leave (HR/Admin)
========================= */
/// Swagger doc for reject_leave endpoint
#[utoipa::path(
    put,
    path = "/api/leave/{leave_id}/reject",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to reject")
    ),
    responses(
        (status = 200, description = "Leave rejected successfully", body = Object, example = json!({
            "message": "Leave rejected"
        })),
        (status = 400, description = "Leave request not found or already processed", body = Object, example = json!({
            "message": "Leave request not found or already processed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let leave_id = path.into_inner();

    let leave = sqlx::query_as::<_, PendingLeave>(
        r#"
        SELECT employee_id, start_date, end_date, leave_type
        FROM leave_requests
        WHERE id = ? AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(leave) = leave else {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    };

    let result = sqlx::query(
        r#"
        UPDATE leave_requests
        SET status = 'rejected'
        WHERE id = ?
        AND status = 'pending'
        "#,
    )
    .bind(leave_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, leave_id, "Reject leave failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Leave request not found or already processed"
        })));
    }

    notify(
        pool.get_ref(),
        leave.employee_id,
        "Leave rejected",
        &format!(
            "Your {} leave from {} to {} was rejected.",
            leave.leave_type, leave.start_date, leave.end_date
        ),
    )
    .await;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Leave rejected"
    })))
}

/// for getting a leave application details endpoint
#[utoipa::path(
    get,
    path = "/api/leave/{leave_id}",
    params(
        ("leave_id" = u64, Path, description = "ID of the leave request to fetch")
    ),
    responses(
        (status = 200, description = "Leave request found", body = LeaveRequest),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found", body = Object, example = json!({
            "message": "Leave request not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let leave_id = path.into_inner();

    let sql = format!("SELECT {} FROM leave_requests WHERE id = ?", LEAVE_COLUMNS);
    let leave = sqlx::query_as::<_, LeaveRequest>(&sql)
        .bind(leave_id)
        .fetch_optional(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, leave_id, "Failed to fetch leave request");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    match leave {
        Some(data) => {
            auth.require_self_or_hr(data.employee_id)?;
            Ok(HttpResponse::Ok().json(data))
        }
        None => Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Leave request not found"
        }))),
    }
}

/// for getting leave applications endpoint
#[utoipa::path(
    get,
    path = "/api/leave",
    params(LeaveFilter),
    responses(
        (status = 200, description = "Paginated leave list", body = LeaveListResponse),
        (status = 400, description = "Malformed status filter"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn leave_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveFilter>,
) -> actix_web::Result<impl Responder> {
    // -------------------------
    // Pagination
    // -------------------------
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // Employees only ever see their own requests
    let employee_filter = if auth.is_employee() {
        Some(
            auth.employee_id
                .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?,
        )
    } else {
        query.employee_id
    };

    if let Some(raw) = query.status.as_deref() {
        if raw.parse::<LeaveStatus>().is_err() {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Status must be pending, approved or rejected"
            })));
        }
    }

    // -------------------------
    // WHERE clause
    // -------------------------
    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = employee_filter {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::U64(emp_id));
    }

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    // -------------------------
    // COUNT query
    // -------------------------
    let count_sql = format!("SELECT COUNT(*) FROM leave_requests{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::U64(v) => count_q.bind(*v),
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error=%e, "Failed to count leave requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // -------------------------
    // DATA query
    // -------------------------
    let data_sql = format!(
        r#"
        SELECT {}
        FROM leave_requests
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        LEAVE_COLUMNS, where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveRequest>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::U64(v) => data_q.bind(v),
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let leaves = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error=%e, "Failed to fetch leave list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    // -------------------------
    // Response
    // -------------------------
    let response = LeaveListResponse {
        data: leaves,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

/* =========================
Leave balances
========================= */

/// Calling employee's own balances
#[utoipa::path(
    get,
    path = "/api/leave/balance",
    responses(
        (status = 200, description = "Balances by leave type", body = [BalanceView]),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn my_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let balances = fetch_balances(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch balances");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(balances))
}

/// Balances for a specific employee
#[utoipa::path(
    get,
    path = "/api/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    responses(
        (status = 200, description = "Balances by leave type", body = [BalanceView]),
        (status = 403)
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn employee_balances(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    auth.require_self_or_hr(employee_id)?;

    let balances = fetch_balances(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch balances");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(balances))
}

/// Allocate leave days (Admin)
///
/// Sets the yearly allocation for one leave type; days already used are
/// untouched.
#[utoipa::path(
    put,
    path = "/api/leave/balance/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID")
    ),
    request_body = AllocateBalance,
    responses(
        (status = 200, description = "Updated balances", body = [BalanceView]),
        (status = 400, description = "Unpaid leave has no balance"),
        (status = 403),
        (status = 404, description = "Employee not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Leave"
)]
pub async fn allocate_balance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    body: web::Json<AllocateBalance>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    if !body.leave_type.is_paid() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Unpaid leave has no balance"
        })));
    }

    let employee_exists =
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM employees WHERE id = ?)")
            .bind(employee_id)
            .fetch_one(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, employee_id, "Failed to check employee");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    if !employee_exists {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Employee not found"
        })));
    }

    sqlx::query(
        r#"
        INSERT INTO leave_balances (employee_id, leave_type, allocated_days, used_days)
        VALUES (?, ?, ?, 0)
        ON DUPLICATE KEY UPDATE allocated_days = VALUES(allocated_days)
        "#,
    )
    .bind(employee_id)
    .bind(body.leave_type.as_ref())
    .bind(body.allocated_days)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to allocate balance");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let balances = fetch_balances(pool.get_ref(), employee_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Failed to fetch balances");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(balances))
}
