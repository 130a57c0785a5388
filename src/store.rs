use std::time::Duration;

use derive_more::{Display, Error};
use log::error;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::config::Config;

/// Connect/read timeout for every upstream call. No retries; a failed call
/// fails the current request only.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Display, Error)]
pub enum StoreError {
    #[display(fmt = "record store request failed: {}", _0)]
    Transport(reqwest::Error),
    #[display(fmt = "record store returned status {}", code)]
    Status { code: u16 },
    #[display(fmt = "record store returned a malformed payload")]
    Malformed,
}

/// One row of a table. Field values stay untyped; the store typecasts on
/// write and older rows may hold anything.
#[derive(Debug, Clone, Deserialize)]
pub struct Record {
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct RecordList {
    #[serde(default)]
    records: Vec<Record>,
}

/// Client for the spreadsheet-style record store that acts as the system of
/// record for accounts, practice logs, and the catalog tables.
#[derive(Clone)]
pub struct RecordStore {
    client: Client,
    base_url: String,
    api_key: String,
    base_id: String,
}

impl RecordStore {
    pub fn new(config: &Config) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to construct the record store http client");

        Self {
            client,
            base_url: config.store_base_url.trim_end_matches('/').to_owned(),
            api_key: config.store_api_key.clone(),
            base_id: config.store_base_id.clone(),
        }
    }

    fn record_url(&self, table_id: &str) -> String {
        format!("{}/table/{}/record", self.base_url, table_id)
    }

    /// Fetch a table's record-list payload verbatim, for passthrough
    /// endpoints that return the store's own response shape.
    pub async fn fetch_table(&self, table_id: &str) -> Result<Value, StoreError> {
        let response = self
            .client
            .get(self.record_url(table_id))
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        let response = check_status(response)?;
        response.json().await.map_err(|_| StoreError::Malformed)
    }

    pub async fn list_records(&self, table_id: &str) -> Result<Vec<Record>, StoreError> {
        let response = self
            .client
            .get(self.record_url(table_id))
            .bearer_auth(&self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport)?;

        let response = check_status(response)?;
        let list: RecordList = response.json().await.map_err(|_| StoreError::Malformed)?;

        Ok(list.records)
    }

    pub async fn create_record(
        &self,
        table_id: &str,
        fields: Map<String, Value>,
    ) -> Result<(), StoreError> {
        let body = json!({
            "fieldKeyType": "name",
            "typecast": true,
            "records": [{ "fields": fields }],
        });

        let response = self
            .client
            .post(self.record_url(table_id))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        check_status(response)?;
        Ok(())
    }

    /// Provision a new table under the configured base and return its id.
    /// `columns` is the store's column-definition array.
    pub async fn create_table(&self, name: &str, columns: Value) -> Result<String, StoreError> {
        let url = format!("{}/base/{}/table", self.base_url, self.base_id);
        let body = json!({ "name": name, "fields": columns });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let response = check_status(response)?;
        let created: Value = response.json().await.map_err(|_| StoreError::Malformed)?;

        created
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_owned)
            .ok_or(StoreError::Malformed)
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    error!("record store request failed: {}", err);
    StoreError::Transport(err)
}

fn check_status(response: reqwest::Response) -> Result<reqwest::Response, StoreError> {
    let status = response.status();
    if !status.is_success() {
        error!("record store returned {} for {}", status, response.url());
        return Err(StoreError::Status {
            code: status.as_u16(),
        });
    }

    Ok(response)
}
