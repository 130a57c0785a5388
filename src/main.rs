use actix_cors::Cors;
use actix_web::{
    middleware::{Condition, Logger},
    web::Data,
    App, HttpServer,
};
use log::info;
use utoipa_rapidoc::RapiDoc;

use sadhana_server::{
    apidocs,
    auth::{self, AccountManager},
    catalog,
    config::Config,
    store::RecordStore,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = Config::from_env();
    config.print_summary();

    let store = RecordStore::new(&config);
    let accounts = Data::new(AccountManager::new(store.clone(), &config));
    let store = Data::new(store);

    let handle_cors = config.handle_cors;
    let workers = config.web_workers;
    let bind_addr = config.bind_addr;
    let config = Data::new(config);

    let oapi = apidocs::setup_oapi();

    HttpServer::new(move || {
        // add logging middleware
        App::new()
            .wrap(Logger::new("%{r}a %r -> %s in %Dms").log_target("http"))
            .wrap(Condition::new(handle_cors, Cors::permissive()))
            .app_data(Data::clone(&config))
            .app_data(Data::clone(&store))
            .app_data(Data::clone(&accounts))
            .configure(auth::routes::configure_app)
            .configure(catalog::routes::configure_app)
            .service(RapiDoc::with_openapi("/docs/openapi.json", oapi.clone()).path("/docs"))
    })
    .workers(workers)
    .bind(bind_addr)?
    .run()
    .await
}
