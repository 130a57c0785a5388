use utoipa::OpenApi;

pub mod list_courses;
pub mod list_trips;

pub fn configure_app(cfg: &mut actix_web::web::ServiceConfig) {
    cfg.service(list_courses::list_courses)
        .service(list_trips::list_trips);
}

#[derive(OpenApi)]
#[openapi(paths(list_courses::list_courses, list_trips::list_trips))]
pub(crate) struct CatalogApiDocs;
