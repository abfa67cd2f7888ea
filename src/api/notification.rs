use crate::auth::auth::AuthUser;
use crate::model::notification::Notification;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct Announcement {
    #[schema(example = "Office closed on Friday")]
    pub title: String,
    #[schema(example = "The office is closed this Friday for maintenance.")]
    pub body: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u64>, // 1-based
    #[schema(example = 10)]
    /// Pagination per page number
    pub per_page: Option<u64>, // items per page
}

#[derive(Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 10)]
    pub per_page: u32,
    #[schema(example = 1)]
    pub total: i64,
}

/* =========================
Company-wide announcement (Admin)
========================= */
/// Swagger doc for announce endpoint
#[utoipa::path(
    post,
    path = "/api/notifications/announce",
    request_body(
        content = Announcement,
        description = "Announcement payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Announcement published", body = Object, example = json!({
            "message": "Announcement published",
            "id": 7
        })),
        (status = 400, description = "Empty title or body"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notification"
)]
pub async fn announce(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<Announcement>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let title = payload.title.trim();
    let body = payload.body.trim();
    if title.is_empty() || body.is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Title and body must not be empty"
        })));
    }

    // NULL recipient marks a broadcast
    let result = sqlx::query(
        "INSERT INTO notifications (recipient_employee_id, title, body) VALUES (NULL, ?, ?)",
    )
    .bind(title)
    .bind(body)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to publish announcement");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Announcement published",
        "id": result.last_insert_id()
    })))
}

/* =========================
List own notifications
========================= */
/// Swagger doc for my_notifications endpoint
#[utoipa::path(
    get,
    path = "/api/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Own notifications plus broadcasts, newest first",
         body = NotificationListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notification"
)]
pub async fn my_notifications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    // A NULL bind never matches the equality arm, so accounts without an
    // employee profile still receive broadcasts.
    let total = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*)
        FROM notifications
        WHERE (recipient_employee_id = ? OR recipient_employee_id IS NULL)
        "#,
    )
    .bind(auth.employee_id)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to count notifications");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let notifications = sqlx::query_as::<_, Notification>(
        r#"
        SELECT id, recipient_employee_id, title, body, is_read, created_at
        FROM notifications
        WHERE (recipient_employee_id = ? OR recipient_employee_id IS NULL)
        ORDER BY created_at DESC, id DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(auth.employee_id)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch notifications");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let response = NotificationListResponse {
        data: notifications,
        page: page as u32,
        per_page: per_page as u32,
        total,
    };

    Ok(HttpResponse::Ok().json(response))
}

/* =========================
Mark one notification read
========================= */
/// Swagger doc for mark_read endpoint
#[utoipa::path(
    put,
    path = "/api/notifications/{notification_id}/read",
    params(
        ("notification_id" = u64, Path, description = "ID of the notification to mark read")
    ),
    responses(
        (status = 200, description = "Notification marked read", body = Object, example = json!({
            "message": "Notification marked read"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "No employee profile"),
        (status = 404, description = "Notification not found", body = Object, example = json!({
            "message": "Notification not found"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Notification"
)]
pub async fn mark_read(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id: u64 = auth
        .employee_id
        .ok_or_else(|| actix_web::error::ErrorForbidden("No employee profile"))?;

    let notification_id = path.into_inner();

    // Broadcasts stay unread; the flag is global, not per reader.
    let result = sqlx::query(
        r#"
        UPDATE notifications
        SET is_read = TRUE
        WHERE id = ?
        AND recipient_employee_id = ?
        "#,
    )
    .bind(notification_id)
    .bind(employee_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, notification_id, "Failed to mark notification read");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(serde_json::json!({
            "message": "Notification not found"
        })));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Notification marked read"
    })))
}
