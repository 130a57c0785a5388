#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use actix_web::{
    web::{self, Data, Json, Path},
    App, HttpResponse,
};
use serde_json::{json, Map, Value};

use sadhana_server::auth::AccountManager;
use sadhana_server::config::Config;
use sadhana_server::store::RecordStore;

pub const SIGNING_KEY: [u8; 32] = [11; 32];
pub const ACCOUNTS_TABLE: &str = "tblaccounts";
pub const COURSES_TABLE: &str = "tblcourses";
pub const TRIPS_TABLE: &str = "tbltrips";

/// In-memory stand-in for the record store SaaS: tables of field maps, a
/// running counter for provisioned tables, and a write counter so tests can
/// assert that a rejected request wrote nothing.
pub struct FakeStore {
    tables: Mutex<HashMap<String, Vec<Map<String, Value>>>>,
    next_table: AtomicUsize,
    record_writes: AtomicUsize,
}

impl FakeStore {
    fn new() -> Self {
        let mut tables = HashMap::new();
        tables.insert(ACCOUNTS_TABLE.to_owned(), Vec::new());
        tables.insert(COURSES_TABLE.to_owned(), Vec::new());
        tables.insert(TRIPS_TABLE.to_owned(), Vec::new());

        Self {
            tables: Mutex::new(tables),
            next_table: AtomicUsize::new(1),
            record_writes: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, table_id: &str, fields: Value) {
        let fields = fields.as_object().expect("fields must be an object").clone();
        self.tables
            .lock()
            .unwrap()
            .entry(table_id.to_owned())
            .or_default()
            .push(fields);
    }

    pub fn records(&self, table_id: &str) -> Vec<Map<String, Value>> {
        self.tables
            .lock()
            .unwrap()
            .get(table_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn table_count(&self) -> usize {
        self.tables.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.record_writes.load(Ordering::SeqCst)
    }
}

async fn list_records(state: Data<FakeStore>, path: Path<String>) -> HttpResponse {
    // small fixed latency: two in-flight signups both read the account list
    // before either write lands, like against the real remote store
    actix_rt::time::sleep(Duration::from_millis(25)).await;

    let table_id = path.into_inner();
    let tables = state.tables.lock().unwrap();

    match tables.get(&table_id) {
        Some(records) => {
            let records: Vec<Value> = records
                .iter()
                .map(|fields| json!({ "fields": fields }))
                .collect();

            HttpResponse::Ok().json(json!({ "records": records }))
        }
        None => HttpResponse::NotFound().json(json!({ "message": "table not found" })),
    }
}

async fn create_record(
    state: Data<FakeStore>,
    path: Path<String>,
    body: Json<Value>,
) -> HttpResponse {
    let table_id = path.into_inner();
    let mut tables = state.tables.lock().unwrap();

    let Some(records) = tables.get_mut(&table_id) else {
        return HttpResponse::NotFound().json(json!({ "message": "table not found" }));
    };

    let incoming = body
        .get("records")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    for record in incoming {
        if let Some(fields) = record.get("fields").and_then(Value::as_object) {
            records.push(fields.clone());
            state.record_writes.fetch_add(1, Ordering::SeqCst);
        }
    }

    HttpResponse::Created().json(json!({ "records": [] }))
}

async fn create_table(
    state: Data<FakeStore>,
    _path: Path<String>,
    body: Json<Value>,
) -> HttpResponse {
    let id = format!("tblfake{}", state.next_table.fetch_add(1, Ordering::SeqCst));
    state.tables.lock().unwrap().insert(id.clone(), Vec::new());

    let name = body.get("name").cloned().unwrap_or(Value::Null);
    HttpResponse::Created().json(json!({ "id": id, "name": name }))
}

pub struct StoreHandle {
    pub state: Data<FakeStore>,
    server: actix_test::TestServer,
}

impl StoreHandle {
    pub fn url(&self) -> String {
        format!("http://{}", self.server.addr())
    }
}

pub fn start_fake_store() -> StoreHandle {
    let state = Data::new(FakeStore::new());
    let app_state = Data::clone(&state);

    let server = actix_test::start(move || {
        App::new()
            .app_data(Data::clone(&app_state))
            .route("/table/{table_id}/record", web::get().to(list_records))
            .route("/table/{table_id}/record", web::post().to(create_record))
            .route("/base/{base_id}/table", web::post().to(create_table))
    });

    StoreHandle { state, server }
}

pub fn test_config(store_url: &str) -> Config {
    Config {
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        web_workers: 1,
        handle_cors: false,
        store_base_url: store_url.to_owned(),
        store_api_key: "test-key".to_owned(),
        store_base_id: "bsetest".to_owned(),
        accounts_table_id: ACCOUNTS_TABLE.to_owned(),
        courses_table_id: COURSES_TABLE.to_owned(),
        trips_table_id: TRIPS_TABLE.to_owned(),
        token_signing_key: SIGNING_KEY,
    }
}

/// App data for a service instance wired to the given record store url.
pub fn app_data_for(store_url: &str) -> (Data<Config>, Data<RecordStore>, Data<AccountManager>) {
    let config = test_config(store_url);
    let store = RecordStore::new(&config);
    let accounts = AccountManager::new(store.clone(), &config);

    (Data::new(config), Data::new(store), Data::new(accounts))
}

/// A base url nothing listens on, for upstream-down tests.
pub fn unreachable_store_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    format!("http://{}", addr)
}
