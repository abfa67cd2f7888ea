use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    pub login_id: String,
    pub password: String,
}

/// Admin-supplied options when provisioning an employee account.
/// The login id itself is always generated server side.
#[derive(Deserialize, ToSchema)]
pub struct ProvisionReqDto {
    pub password: String,
    /// Role id: 1 = admin, 2 = hr, 3 = employee. Defaults to employee.
    pub role_id: Option<u8>,
}

#[derive(FromRow)]
pub struct UserSql {
    pub id: u64,        // BIGINT UNSIGNED
    pub login_id: String,
    pub password: String,
    pub role_id: u8,
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub role: u8,        // role id
    pub exp: usize,
    pub jti: String,

    pub token_type: TokenType,
    /// Present only if this user is linked to an employee record
    pub employee_id: Option<u64>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub enum TokenType {
    Access,
    Refresh,
}
