use actix_web::{
    post,
    web::{Data, Json},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::accounts::{AccountManager, AuthError};
use crate::auth::routes::redirect_target;
use crate::error::HResult;

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    message: String,
    /// Bearer session token
    access: String,
    is_privileged: bool,
    /// Where the frontend should send the account next
    redirect_to: String,
}

/// Log in
///
/// Authenticate with email (matched case-insensitively) and password. The
/// response for a wrong password and an unknown email is identical, so the
/// endpoint cannot be used to probe which addresses have accounts.
#[utoipa::path(
    responses(
        (status = OK, description = "Login successful", body = LoginResponse),
        (status = BAD_REQUEST, description = "Missing email or password"),
        (status = UNAUTHORIZED, description = "Invalid email or password"),
        (status = SERVICE_UNAVAILABLE, description = "The record store could not be reached")
    ),
    tag = "identity"
)]
#[post("/auth/login")]
pub async fn login(am: Data<AccountManager>, req: Json<LoginRequest>) -> HResult<HttpResponse> {
    let email = req.email.as_deref().unwrap_or("");
    let password = req.password.as_deref().unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials.into());
    }

    let outcome = am.login(email, password).await?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".into(),
        access: outcome.token,
        is_privileged: outcome.is_privileged,
        redirect_to: redirect_target(outcome.is_privileged).into(),
    }))
}
