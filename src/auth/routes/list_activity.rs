use actix_web::{
    get,
    web::{Data, Json},
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::accounts::{AccountManager, PracticeEntry};
use crate::auth::session::Session;
use crate::error::HResult;

#[derive(Serialize, ToSchema)]
pub struct ActivityListResponse {
    stats: Vec<PracticeEntry>,
}

/// List practice
///
/// Return every entry of the practice log named by the bearer token. Rows
/// with missing fields come back with ""/0 defaults.
#[utoipa::path(
    responses(
        (status = OK, description = "The account's practice log", body = ActivityListResponse),
        (status = BAD_REQUEST, description = "No practice log on the account"),
        (status = UNAUTHORIZED, description = "Missing, invalid or expired token"),
        (status = INTERNAL_SERVER_ERROR, description = "The record store could not be reached")
    ),
    security(("token" = [])),
    tag = "practice"
)]
#[get("/auth/activity")]
pub async fn list_activity(
    am: Data<AccountManager>,
    session: Session,
) -> HResult<Json<ActivityListResponse>> {
    let stats = am.list_practice(&session).await?;

    Ok(Json(ActivityListResponse { stats }))
}
