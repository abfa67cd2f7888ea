use crate::api::company::fetch_company;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceStatus, can_check_out, derive_status};
use crate::model::leave_request::covered_by_leave;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceQuery {
    #[schema(example = 1)]
    pub page: Option<u32>,

    #[schema(example = 10)]
    pub per_page: Option<u32>,

    /// Required for HR/admin; employees always see their own records.
    #[schema(example = 1001)]
    pub employee_id: Option<u64>,

    #[schema(example = "2026-01-01", value_type = String, format = "date")]
    pub from: Option<NaiveDate>,

    #[schema(example = "2026-01-31", value_type = String, format = "date")]
    pub to: Option<NaiveDate>,
}

/// One attendance day with its derived status.
#[derive(Serialize, ToSchema)]
pub struct AttendanceDay {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "2026-01-05", value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(example = "09:02:11", value_type = String, format = "time", nullable = true)]
    pub check_in: Option<NaiveTime>,
    #[schema(example = "18:01:45", value_type = String, format = "time", nullable = true)]
    pub check_out: Option<NaiveTime>,
    #[schema(example = "checked-out")]
    pub status: AttendanceStatus,
    #[schema(example = false)]
    pub late: bool,
    #[schema(example = 480)]
    pub worked_minutes: i64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceDay>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(sqlx::FromRow)]
struct AttendanceRow {
    id: u64,
    date: NaiveDate,
    check_in: Option<NaiveTime>,
    check_out: Option<NaiveTime>,
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let result = sqlx::query(
        r#"
        INSERT INTO attendance (employee_id, date, check_in)
        VALUES (?, CURDATE(), CURTIME())
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await;

    match result {
        Ok(_) => Ok(HttpResponse::Ok().json(json!({
            "message": "Checked in successfully"
        }))),

        Err(e) => {
            // Duplicate check-in for same day
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.code().as_deref() == Some("23000") {
                    return Ok(HttpResponse::BadRequest().json(json!({
                        "message": "Already checked in today"
                    })));
                }
            }

            tracing::error!(error = %e, employee_id, "Check-in failed");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

#[derive(sqlx::FromRow)]
struct CheckoutProbe {
    check_in: Option<NaiveTime>,
    now_time: NaiveTime,
}

/// Check-out endpoint
///
/// Rejected until the company's minimum tenure has elapsed since
/// check-in; both sides of that comparison come from the database clock.
#[utoipa::path(
    put,
    path = "/api/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "No active check-in, or too early", body = Object, example = json!({
            "message": "No active check-in found for today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let policy = fetch_company(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch company policy");
            ErrorInternalServerError("Internal Server Error")
        })?
        .policy();

    let probe = sqlx::query_as::<_, CheckoutProbe>(
        r#"
        SELECT check_in, CURTIME() AS now_time
        FROM attendance
        WHERE employee_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Check-out probe failed");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(CheckoutProbe {
        check_in: Some(check_in),
        now_time,
    }) = probe
    else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found for today"
        })));
    };

    if !can_check_out(check_in, now_time, &policy) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": format!(
                "Check-out allowed {} minutes after check-in",
                policy.checkout_after_minutes
            )
        })));
    }

    let result = sqlx::query(
        r#"
        UPDATE attendance
        SET check_out = CURTIME()
        WHERE employee_id = ?
        AND date = CURDATE()
        AND check_out IS NULL
        "#,
    )
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Check-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "No active check-in found for today"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully"
    })))
}

/// Today's derived status for the calling employee
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses(
        (status = 200, description = "Derived status for today", body = Object, example = json!({
            "date": "2026-01-05",
            "status": "checked-in",
            "late": false,
            "worked_minutes": 0,
            "check_in": "09:02:11",
            "check_out": null
        })),
        (status = 403, description = "No employee profile")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let policy = fetch_company(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch company policy");
            ErrorInternalServerError("Internal Server Error")
        })?
        .policy();

    let today = sqlx::query_scalar::<_, NaiveDate>("SELECT CURDATE()")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to read database date");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let row = sqlx::query_as::<_, AttendanceRow>(
        r#"
        SELECT id, date, check_in, check_out
        FROM attendance
        WHERE employee_id = ? AND date = CURDATE()
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch today's attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let on_leave = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM leave_requests
            WHERE employee_id = ?
            AND status = 'approved'
            AND start_date <= CURDATE()
            AND end_date >= CURDATE()
        )
        "#,
    )
    .bind(employee_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to check leave cover");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let (check_in, check_out) = row
        .as_ref()
        .map(|r| (r.check_in, r.check_out))
        .unwrap_or((None, None));

    let derived = derive_status(today, today, check_in, check_out, on_leave, &policy);

    Ok(HttpResponse::Ok().json(json!({
        "date": today,
        "status": derived.status,
        "late": derived.late,
        "worked_minutes": derived.worked_minutes,
        "check_in": check_in,
        "check_out": check_out,
    })))
}

/// Attendance history with derived statuses
///
/// Statuses are evaluated on read; approved leave spans overlay the raw
/// timestamps.
#[utoipa::path(
    get,
    path = "/api/attendance",
    params(AttendanceQuery),
    responses(
        (status = 200, description = "Derived attendance records", body = AttendanceListResponse),
        (status = 400, description = "Missing employee filter")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    // Employees are pinned to their own history
    let employee_id = if auth.is_employee() {
        auth.employee_id
            .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?
    } else {
        match query.employee_id {
            Some(id) => id,
            None => {
                return Ok(HttpResponse::BadRequest().json(json!({
                    "message": "employee_id is required"
                })));
            }
        }
    };

    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(31).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let mut conditions = vec!["employee_id = ?".to_string()];
    if query.from.is_some() {
        conditions.push("date >= ?".to_string());
    }
    if query.to.is_some() {
        conditions.push("date <= ?".to_string());
    }
    let where_clause = format!("WHERE {}", conditions.join(" AND "));

    let count_sql = format!("SELECT COUNT(*) FROM attendance {}", where_clause);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(employee_id);
    if let Some(from) = query.from {
        count_query = count_query.bind(from);
    }
    if let Some(to) = query.to {
        count_query = count_query.bind(to);
    }

    let total = count_query.fetch_one(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to count attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        "SELECT id, date, check_in, check_out FROM attendance {} ORDER BY date DESC LIMIT ? OFFSET ?",
        where_clause
    );
    let mut data_query = sqlx::query_as::<_, AttendanceRow>(&data_sql).bind(employee_id);
    if let Some(from) = query.from {
        data_query = data_query.bind(from);
    }
    if let Some(to) = query.to {
        data_query = data_query.bind(to);
    }
    data_query = data_query.bind(per_page as i64).bind(offset as i64);

    let rows = data_query.fetch_all(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch attendance");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let policy = fetch_company(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch company policy");
            ErrorInternalServerError("Internal Server Error")
        })?
        .policy();

    let today = sqlx::query_scalar::<_, NaiveDate>("SELECT CURDATE()")
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to read database date");
            ErrorInternalServerError("Internal Server Error")
        })?;

    let leave_spans = sqlx::query_as::<_, (NaiveDate, NaiveDate)>(
        r#"
        SELECT start_date, end_date
        FROM leave_requests
        WHERE employee_id = ? AND status = 'approved'
        "#,
    )
    .bind(employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, employee_id, "Failed to fetch leave spans");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let data = rows
        .into_iter()
        .map(|row| {
            let on_leave = covered_by_leave(row.date, &leave_spans);
            let derived = derive_status(
                row.date,
                today,
                row.check_in,
                row.check_out,
                on_leave,
                &policy,
            );
            AttendanceDay {
                id: row.id,
                date: row.date,
                check_in: row.check_in,
                check_out: row.check_out,
                status: derived.status,
                late: derived.late,
                worked_minutes: derived.worked_minutes,
            }
        })
        .collect();

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data,
        page,
        per_page,
        total,
    }))
}
