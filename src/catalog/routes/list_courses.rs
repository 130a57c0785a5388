use actix_web::{get, web::Data, HttpResponse};

use crate::config::Config;
use crate::error::HResult;
use crate::store::RecordStore;

/// List courses
///
/// Returns the course table's record list exactly as the record store
/// serves it; the frontend reads `records[].fields`.
#[utoipa::path(
    responses(
        (status = OK, description = "The record store's course list payload"),
        (status = SERVICE_UNAVAILABLE, description = "The record store could not be reached")
    ),
    tag = "catalog"
)]
#[get("/api/courses")]
pub async fn list_courses(store: Data<RecordStore>, config: Data<Config>) -> HResult<HttpResponse> {
    let payload = store.fetch_table(&config.courses_table_id).await?;

    Ok(HttpResponse::Ok().json(payload))
}
