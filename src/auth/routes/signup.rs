use actix_web::{
    post,
    web::{Data, Json},
    HttpResponse,
};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::accounts::{AccountManager, AuthError};
use crate::auth::routes::redirect_target;
use crate::error::HResult;

lazy_static! {
    pub static ref EMAIL_REGEX: regex::Regex = regex::Regex::new(r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$").unwrap();
}

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    /// The email address of the account
    #[serde(default)]
    email: Option<String>,
    /// The password of the account
    #[serde(default)]
    password: Option<String>,
    /// Whether the account is a privileged (sadhaka) member
    #[serde(default)]
    is_privileged: bool,
}

#[derive(Serialize, ToSchema)]
pub struct SignupResponse {
    message: String,
    /// Bearer session token
    access: String,
    is_privileged: bool,
    /// Where the frontend should send the account next
    redirect_to: String,
    /// Id of the account's freshly provisioned practice log
    partition_id: String,
}

/// Sign up
///
/// Register a new account and log it in at the same time: a private practice
/// log is provisioned in the record store and a session token naming it is
/// returned immediately.
#[utoipa::path(
    responses(
        (status = CREATED, description = "Account created", body = SignupResponse),
        (status = BAD_REQUEST, description = "Missing or malformed details, or an account with that email already exists"),
        (status = SERVICE_UNAVAILABLE, description = "The record store could not be reached")
    ),
    tag = "identity"
)]
#[post("/auth/signup")]
pub async fn signup(am: Data<AccountManager>, req: Json<SignupRequest>) -> HResult<HttpResponse> {
    let email = req.email.as_deref().unwrap_or("");
    let password = req.password.as_deref().unwrap_or("");

    if email.is_empty() || password.is_empty() {
        return Err(AuthError::MissingCredentials.into());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err(AuthError::InvalidEmail.into());
    }

    let outcome = am.signup(email, password, req.is_privileged).await?;

    Ok(HttpResponse::Created().json(SignupResponse {
        message: "Signup successful".into(),
        access: outcome.token,
        is_privileged: req.is_privileged,
        redirect_to: redirect_target(req.is_privileged).into(),
        partition_id: outcome.table_id,
    }))
}
