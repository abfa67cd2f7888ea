use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveTime;
use serde::Deserialize;
use sqlx::MySqlPool;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::auth::auth::AuthUser;
use crate::model::company::Company;

/// A deployment serves exactly one company; its settings live in row 1.
pub(crate) async fn fetch_company(pool: &MySqlPool) -> Result<Company, sqlx::Error> {
    sqlx::query_as::<_, Company>(
        r#"
        SELECT id, name, work_start, grace_minutes, full_day_minutes, checkout_after_minutes
        FROM companies
        WHERE id = 1
        "#,
    )
    .fetch_one(pool)
    .await
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePolicy {
    #[schema(example = "Acme Corp")]
    pub name: Option<String>,
    #[schema(example = "09:00:00", value_type = String, format = "time")]
    pub work_start: Option<NaiveTime>,
    #[schema(example = 15)]
    pub grace_minutes: Option<u32>,
    #[schema(example = 480)]
    pub full_day_minutes: Option<u32>,
    #[schema(example = 240)]
    pub checkout_after_minutes: Option<u32>,
}

/// Company attendance policy
#[utoipa::path(
    get,
    path = "/api/company/policy",
    responses(
        (status = 200, description = "Company settings", body = Company)
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn get_policy(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let company = fetch_company(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch company");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(company))
}

/// Update the company attendance policy
///
/// Partial update; omitted fields keep their current values.
#[utoipa::path(
    put,
    path = "/api/company/policy",
    request_body = UpdatePolicy,
    responses(
        (status = 200, description = "Updated company settings", body = Company),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Company"
)]
pub async fn update_policy(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    body: web::Json<UpdatePolicy>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let current = fetch_company(pool.get_ref()).await.map_err(|e| {
        error!(error = %e, "Failed to fetch company");
        ErrorInternalServerError("Internal Server Error")
    })?;

    let merged = Company {
        id: current.id,
        name: body.name.clone().unwrap_or(current.name),
        work_start: body.work_start.unwrap_or(current.work_start),
        grace_minutes: body.grace_minutes.unwrap_or(current.grace_minutes),
        full_day_minutes: body.full_day_minutes.unwrap_or(current.full_day_minutes),
        checkout_after_minutes: body
            .checkout_after_minutes
            .unwrap_or(current.checkout_after_minutes),
    };

    sqlx::query(
        r#"
        UPDATE companies
        SET name = ?, work_start = ?, grace_minutes = ?,
            full_day_minutes = ?, checkout_after_minutes = ?
        WHERE id = 1
        "#,
    )
    .bind(&merged.name)
    .bind(merged.work_start)
    .bind(merged.grace_minutes)
    .bind(merged.full_day_minutes)
    .bind(merged.checkout_after_minutes)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to update company policy");
        ErrorInternalServerError("Internal Server Error")
    })?;

    info!("Company policy updated");

    Ok(HttpResponse::Ok().json(merged))
}
