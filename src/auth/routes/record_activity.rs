use actix_web::{
    post,
    web::{Data, Json},
    HttpResponse,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::auth::accounts::{AccountManager, AuthError, PracticeEntry};
use crate::auth::session::Session;
use crate::error::{HResult, HandlerError, IntoHandlerErrorResult};

#[derive(Deserialize, ToSchema)]
pub struct RecordActivityRequest {
    #[serde(default)]
    date: Option<String>,
    /// Japa rounds; a JSON number or a numeric string
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    rounds: Option<Value>,
    /// Minutes of reading; a JSON number or a numeric string
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    reading_time: Option<Value>,
}

#[derive(Serialize, ToSchema)]
pub struct RecordActivityResponse {
    message: String,
    data: PracticeEntry,
}

/// Record practice
///
/// Append one entry to the practice log named by the bearer token. Nothing
/// is written upstream unless the whole entry validates.
#[utoipa::path(
    responses(
        (status = CREATED, description = "Entry recorded", body = RecordActivityResponse),
        (status = BAD_REQUEST, description = "Missing fields, non-numeric or negative counts, or no practice log on the account"),
        (status = UNAUTHORIZED, description = "Missing, invalid or expired token"),
        (status = INTERNAL_SERVER_ERROR, description = "The record store could not be reached")
    ),
    security(("token" = [])),
    tag = "practice"
)]
#[post("/auth/activity")]
pub async fn record_activity(
    am: Data<AccountManager>,
    session: Session,
    req: Json<RecordActivityRequest>,
) -> HResult<HttpResponse> {
    if session.table_id.is_none() {
        return Err(AuthError::MissingPartition.into());
    }

    let date = match req.date.as_deref() {
        Some(date) if !date.is_empty() => date,
        _ => {
            return Err(HandlerError::from((
                400,
                "Date, rounds, and reading_time are required",
            )))
        }
    };

    let rounds = req
        .rounds
        .as_ref()
        .filter(|v| !v.is_null())
        .or_err_msg(400, "Date, rounds, and reading_time are required")?;
    let reading_time = req
        .reading_time
        .as_ref()
        .filter(|v| !v.is_null())
        .or_err_msg(400, "Date, rounds, and reading_time are required")?;

    let rounds = coerce_count(rounds).or_err_msg(
        400,
        "Rounds and reading_time must be non-negative whole numbers",
    )?;
    let reading_time = coerce_count(reading_time).or_err_msg(
        400,
        "Rounds and reading_time must be non-negative whole numbers",
    )?;

    let entry = PracticeEntry {
        date: date.to_owned(),
        rounds,
        reading_time,
    };

    am.record_practice(&session, &entry).await?;

    Ok(HttpResponse::Created().json(RecordActivityResponse {
        message: "Stats recorded successfully".into(),
        data: entry,
    }))
}

/// Coerce a count field to a non-negative integer. Clients send both JSON
/// numbers and numeric strings here.
fn coerce_count(value: &Value) -> Option<i64> {
    let n = match value {
        Value::Number(n) => n.as_i64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };

    (n >= 0).then_some(n)
}
