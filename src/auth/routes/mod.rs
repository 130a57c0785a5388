use utoipa::OpenApi;

pub mod list_activity;
pub mod login;
pub mod record_activity;
pub mod signup;

pub fn configure_app(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(signup::signup)
        .service(login::login)
        .service(list_activity::list_activity)
        .service(record_activity::record_activity);
}

/// Where the frontend sends an account after authentication.
pub(crate) fn redirect_target(privileged: bool) -> &'static str {
    if privileged {
        "dashboard"
    } else {
        "home"
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        signup::signup,
        login::login,
        list_activity::list_activity,
        record_activity::record_activity
    ),
    components(schemas(crate::auth::accounts::PracticeEntry))
)]
pub(crate) struct AuthApiDocs;
