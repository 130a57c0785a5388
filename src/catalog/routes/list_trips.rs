use actix_web::{get, web::Data, HttpResponse};

use crate::config::Config;
use crate::error::HResult;
use crate::store::RecordStore;

/// List trips
///
/// Passthrough of the trip table, same shape as the course list.
#[utoipa::path(
    responses(
        (status = OK, description = "The record store's trip list payload"),
        (status = SERVICE_UNAVAILABLE, description = "The record store could not be reached")
    ),
    tag = "catalog"
)]
#[get("/api/trips")]
pub async fn list_trips(store: Data<RecordStore>, config: Data<Config>) -> HResult<HttpResponse> {
    let payload = store.fetch_table(&config.trips_table_id).await?;

    Ok(HttpResponse::Ok().json(payload))
}
