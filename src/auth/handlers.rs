use crate::{
    auth::{
        auth::AuthUser,
        jwt::{generate_access_token, generate_refresh_token, verify_token},
        password::{hash_password, verify_password},
    },
    config::Config,
    model::role::Role,
    models::{LoginReqDto, ProvisionReqDto, TokenType, UserSql},
    utils::login_id,
};
use actix_web::{HttpRequest, HttpResponse, Responder, get, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error, info, instrument};

// auth end points

const MIN_PASSWORD_LEN: usize = 8;

/// Which unique key an INSERT into `users` tripped, if any.
enum InsertUserError {
    /// `employee_id` key: the employee got an account concurrently.
    AlreadyProvisioned,
    /// `login_id` key: another insert won the generated id.
    LoginIdTaken,
    Db(sqlx::Error),
}

/// MySQL reports SQLSTATE 23000 for both unique keys on `users`; the
/// violated index is only named in the message, e.g. "Duplicate entry
/// 'jane.doe' for key 'users.login_id'". Generated ids are slugs plus
/// digits, so the key name cannot appear in the entry value.
fn duplicate_is_login_id(message: &str) -> bool {
    message.contains("login_id")
}

/// Creates the user row and keeps both availability tiers in sync.
async fn insert_user(
    login: &str,
    password_hash: &str,
    role_id: u8,
    employee_id: u64,
    pool: &MySqlPool,
) -> Result<(), InsertUserError> {
    let result = sqlx::query(
        r#"INSERT INTO users (login_id, password, role_id, employee_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(login)
    .bind(password_hash)
    .bind(role_id)
    .bind(employee_id)
    .execute(pool)
    .await;

    match result {
        Ok(_) => {
            // keep filter and cache aware of the new id
            login_id::mark_taken(login).await;
            Ok(())
        }
        Err(sqlx::Error::Database(db_err)) if db_err.code() == Some("23000".into()) => {
            if duplicate_is_login_id(db_err.message()) {
                // Someone else holds this id now; remember that so the
                // next generation pass starts past it.
                login_id::mark_taken(login).await;
                Err(InsertUserError::LoginIdTaken)
            } else {
                Err(InsertUserError::AlreadyProvisioned)
            }
        }
        Err(e) => Err(InsertUserError::Db(e)),
    }
}

/// Admin provisions a login for an existing employee. The login id is
/// generated from the employee's name, never chosen by the caller.
#[instrument(name = "auth_provision", skip(body, auth, pool), fields(employee_id = %path))]
pub async fn provision_account(
    path: web::Path<u64>,
    body: web::Json<ProvisionReqDto>,
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let employee_id = path.into_inner();

    if body.password.len() < MIN_PASSWORD_LEN {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Password must be at least 8 characters"
        })));
    }

    let role_id = body.role_id.unwrap_or(Role::Employee.id());
    if Role::from_id(role_id).is_none() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "error": "Unknown role id"
        })));
    }

    // The employee record must exist before it can get a login
    let names = match sqlx::query_as::<_, (String, String)>(
        "SELECT first_name, last_name FROM employees WHERE id = ?",
    )
    .bind(employee_id)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(names)) => names,
        Ok(None) => {
            return Ok(HttpResponse::NotFound().json(json!({
                "error": "Employee not found"
            })));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching employee");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let has_account = match sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE employee_id = ? LIMIT 1)",
    )
    .bind(employee_id)
    .fetch_one(pool.get_ref())
    .await
    {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "Database error while checking for an existing account");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    if has_account {
        return Ok(HttpResponse::Conflict().json(json!({
            "error": "Employee already has an account"
        })));
    }

    let mut login = match login_id::generate_login_id(pool.get_ref(), &names.0, &names.1).await {
        Ok(l) => l,
        Err(e) => {
            error!(error = %e, "Database error while generating login id");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let hashed = match hash_password(&body.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "Password hashing failed");
            return Ok(HttpResponse::InternalServerError().finish());
        }
    };

    let mut outcome = insert_user(&login, &hashed, role_id, employee_id, pool.get_ref()).await;

    // Lost a race for the generated id. The conflict marked it taken,
    // so one more pass lands on the next free suffix.
    if matches!(outcome, Err(InsertUserError::LoginIdTaken)) {
        debug!(login_id = %login, "Generated login id was taken concurrently, retrying");

        login = match login_id::generate_login_id(pool.get_ref(), &names.0, &names.1).await {
            Ok(l) => l,
            Err(e) => {
                error!(error = %e, "Database error while regenerating login id");
                return Ok(HttpResponse::InternalServerError().finish());
            }
        };
        outcome = insert_user(&login, &hashed, role_id, employee_id, pool.get_ref()).await;
    }

    match outcome {
        Ok(()) => {
            info!(login_id = %login, "Account provisioned");
            Ok(HttpResponse::Created().json(json!({
                "message": "Account provisioned",
                "login_id": login
            })))
        }
        Err(InsertUserError::AlreadyProvisioned) => Ok(HttpResponse::Conflict().json(json!({
            "error": "Employee already has an account"
        }))),
        Err(InsertUserError::LoginIdTaken) => {
            error!(login_id = %login, "Login id collided twice in a row");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to provision account"
            })))
        }
        Err(InsertUserError::Db(e)) => {
            error!(error = %e, "Failed to insert user row");
            Ok(HttpResponse::InternalServerError().json(json!({
                "error": "Failed to provision account"
            })))
        }
    }
}

#[derive(Serialize, Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
}

// #[post("/login")]
#[instrument(
    name = "auth_login",
    skip(pool, config, user),
    fields(login_id = %user.login_id)
)]
pub async fn login(
    user: web::Json<LoginReqDto>,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if user.login_id.trim().is_empty() || user.password.is_empty() {
        info!("Validation failed: empty login id or password");
        return HttpResponse::BadRequest().body("Login id or password required");
    }

    debug!("Fetching user from database");

    // 2️⃣ Fetch user
    let db_user = match sqlx::query_as::<_, UserSql>(
        r#"
        SELECT id, login_id, password, role_id, employee_id
        FROM users
        WHERE login_id = ?
        "#,
    )
    .bind(&user.login_id)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(Some(user)) => {
            debug!(user_id = user.id, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found");
            return HttpResponse::Unauthorized().body("Invalid credentials");
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 3️⃣ Verify password
    debug!("Verifying password");

    if let Err(e) = verify_password(&user.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().body("Invalid credentials");
    }

    debug!("Password verified");

    // 4️⃣ Generate access token
    debug!("Generating access token");

    let access_token = match generate_access_token(
        db_user.id,
        db_user.login_id.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 5️⃣ Generate refresh token
    debug!("Generating refresh token");

    let (refresh_token, refresh_claims) = match generate_refresh_token(
        db_user.id,
        db_user.login_id.clone(),
        db_user.role_id,
        db_user.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to sign refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 6️⃣ Store refresh token
    debug!(
        user_id = db_user.id,
        jti = %refresh_claims.jti,
        "Storing refresh token"
    );

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(db_user.id)
    .bind(&refresh_claims.jti)
    .bind(refresh_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 7️⃣ Update last_login_at (non-fatal)
    debug!("Updating last_login_at");

    if let Err(e) = sqlx::query("UPDATE users SET last_login_at = NOW() WHERE login_id = ?")
        .bind(&user.login_id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to update last_login_at");
        // intentionally not failing login
    }

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        refresh_token,
    })
}

/// Who am I, according to my access token.
#[get("/me")]
pub async fn me(auth: AuthUser) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "user_id": auth.user_id,
        "login_id": auth.login_id,
        "role": auth.role.as_ref(),
        "employee_id": auth.employee_id,
    }))
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    id: u64,
    user_id: u64,
    revoked: bool,
}

// #[post("/refresh")]
pub async fn refresh_token(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::Unauthorized().body("No token"),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::Unauthorized().body("Invalid token"),
    };

    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::Unauthorized().finish(),
    };

    if claims.token_type != TokenType::Refresh {
        return HttpResponse::Unauthorized().finish();
    }

    // 🔍 find refresh token in DB
    let record = match sqlx::query_as::<_, RefreshTokenRow>(
        r#"
        SELECT id, user_id, revoked
        FROM refresh_tokens
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .fetch_optional(pool.get_ref())
    .await
    {
        Ok(r) => r,
        Err(e) => {
            error!(error = %e, "Database error while looking up refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    let record = match record {
        Some(r) if !r.revoked => r,
        _ => return HttpResponse::Unauthorized().finish(),
    };

    // 🔥 revoke old refresh token
    if let Err(e) = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE id = ?")
        .bind(record.id)
        .execute(pool.get_ref())
        .await
    {
        error!(error = %e, "Failed to revoke old refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 🔄 issue new refresh token
    let (new_refresh_token, new_claims) = match generate_refresh_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.refresh_token_ttl,
    ) {
        Ok(pair) => pair,
        Err(e) => {
            error!(error = %e, "Failed to sign refresh token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    if let Err(e) = sqlx::query(
        r#"
        INSERT INTO refresh_tokens (user_id, jti, expires_at)
        VALUES (?, ?, FROM_UNIXTIME(?))
        "#,
    )
    .bind(record.user_id)
    .bind(&new_claims.jti)
    .bind(new_claims.exp as i64)
    .execute(pool.get_ref())
    .await
    {
        error!(error = %e, "Failed to store rotated refresh token");
        return HttpResponse::InternalServerError().finish();
    }

    // 🎫 new access token
    let access_token = match generate_access_token(
        claims.user_id,
        claims.sub.clone(),
        claims.role,
        claims.employee_id,
        &config.jwt_secret,
        config.access_token_ttl,
    ) {
        Ok(t) => t,
        Err(e) => {
            error!(error = %e, "Failed to sign access token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "access_token": access_token,
        "refresh_token": new_refresh_token
    }))
}

// #[post("/logout")]
pub async fn logout(
    req: HttpRequest,
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    // 1️⃣ extract Authorization header
    let header = match req.headers().get("Authorization") {
        Some(h) => h.to_str().unwrap_or(""),
        None => return HttpResponse::NoContent().finish(),
    };

    let token = match header.strip_prefix("Bearer ") {
        Some(t) => t,
        None => return HttpResponse::NoContent().finish(),
    };

    // 2️⃣ verify JWT
    let claims = match verify_token(token, &config.jwt_secret) {
        Ok(c) => c,
        Err(_) => return HttpResponse::NoContent().finish(),
    };

    // 3️⃣ only refresh tokens can logout
    if claims.token_type != TokenType::Refresh {
        return HttpResponse::NoContent().finish();
    }

    // 4️⃣ revoke refresh token (idempotent)
    let _ = sqlx::query(
        r#"
        UPDATE refresh_tokens
        SET revoked = 1
        WHERE jti = ?
        "#,
    )
    .bind(&claims.jti)
    .execute(pool.get_ref())
    .await;

    // 5️⃣ success (even if token didn't exist)
    HttpResponse::NoContent().finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_classification_names_the_violated_index() {
        assert!(duplicate_is_login_id(
            "Duplicate entry 'jane.doe' for key 'users.login_id'"
        ));
        // pre-8.0.19 servers omit the table prefix
        assert!(duplicate_is_login_id(
            "Duplicate entry 'sam.lee' for key 'login_id'"
        ));

        assert!(!duplicate_is_login_id(
            "Duplicate entry '42' for key 'users.employee_id'"
        ));
        assert!(!duplicate_is_login_id(
            "Duplicate entry '42' for key 'employee_id'"
        ));
    }
}
