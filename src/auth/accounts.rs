use derive_more::{Display, Error};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use utoipa::ToSchema;

use crate::config::Config;
use crate::crypto;
use crate::store::{Record, RecordStore, StoreError};
use crate::util::constant_time_compare;

use super::token::Claims;

#[derive(Debug, Display, Error)]
pub enum AuthError {
    #[display(fmt = "email and password are required")]
    MissingCredentials,
    #[display(fmt = "malformed email address")]
    InvalidEmail,
    #[display(fmt = "an account with that email already exists")]
    AccountExists,
    #[display(fmt = "invalid email or password")]
    InvalidCredentials,
    #[display(fmt = "the account has no practice log attached")]
    MissingPartition,
    #[display(fmt = "account listing failed: {}", _0)]
    UpstreamUnavailable(StoreError),
    #[display(fmt = "practice log provisioning failed: {}", _0)]
    ProvisioningFailed(StoreError),
    #[display(fmt = "account write failed: {}", _0)]
    UpstreamWriteFailed(StoreError),
    #[display(fmt = "practice log access failed: {}", _0)]
    PartitionAccess(StoreError),
}

/// One entry of a practice log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PracticeEntry {
    pub date: String,
    /// Japa rounds chanted that day.
    pub rounds: i64,
    /// Minutes of reading.
    pub reading_time: i64,
}

pub struct SignupOutcome {
    pub token: String,
    /// Id of the freshly provisioned practice-log table.
    pub table_id: String,
}

pub struct LoginOutcome {
    pub token: String,
    pub is_privileged: bool,
}

/// Registers accounts, authenticates them, and reads/writes their practice
/// logs. Entirely stateless between requests; the record store is the only
/// consistency authority.
pub struct AccountManager {
    store: RecordStore,
    accounts_table: String,
    signing_key: [u8; 32],
}

impl AccountManager {
    pub fn new(store: RecordStore, config: &Config) -> Self {
        Self {
            store,
            accounts_table: config.accounts_table_id.clone(),
            signing_key: config.token_signing_key,
        }
    }

    /// Register a new account and issue its first session token.
    ///
    /// The uniqueness check and the account write are two separate store
    /// calls; simultaneous signups for the same email can both pass the
    /// check. The store offers no conditional write, so the race stands.
    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        privileged: bool,
    ) -> Result<SignupOutcome, AuthError> {
        let accounts = self
            .store
            .list_records(&self.accounts_table)
            .await
            .map_err(AuthError::UpstreamUnavailable)?;

        // the duplicate check is case-sensitive, matching what the store
        // holds verbatim; login is the case-insensitive side
        if accounts
            .iter()
            .any(|account| field_str(account, "email") == Some(email))
        {
            return Err(AuthError::AccountExists);
        }

        let table_id = self
            .store
            .create_table(&format!("stats-{}", email), practice_log_columns())
            .await
            .map_err(AuthError::ProvisioningFailed)?;

        let mut fields = Map::new();
        fields.insert("email".into(), json!(email));
        fields.insert("password".into(), json!(crypto::hash(password)));
        fields.insert("is_privileged".into(), json!(privileged));
        fields.insert("table_id".into(), json!(table_id));

        if let Err(e) = self.store.create_record(&self.accounts_table, fields).await {
            // the freshly provisioned log is orphaned at this point; there
            // is no compensating delete, the id is logged for cleanup
            error!(
                "account write failed, practice log {} is now orphaned: {}",
                table_id, e
            );
            return Err(AuthError::UpstreamWriteFailed(e));
        }

        let claims = Claims::new(email.to_owned(), privileged, Some(table_id.clone()));

        Ok(SignupOutcome {
            token: claims.sign(&self.signing_key),
            table_id,
        })
    }

    /// Authenticate against the stored account list and issue a session
    /// token. Unknown email and wrong password are indistinguishable to the
    /// caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome, AuthError> {
        let accounts = self
            .store
            .list_records(&self.accounts_table)
            .await
            .map_err(AuthError::UpstreamUnavailable)?;

        let account = accounts
            .iter()
            .find(|account| {
                field_str(account, "email")
                    .map(|stored| stored.eq_ignore_ascii_case(email))
                    .unwrap_or(false)
            })
            .ok_or(AuthError::InvalidCredentials)?;

        let stored_password = field_str(account, "password").unwrap_or("");
        if !password_matches(password, stored_password) {
            warn!("rejected login for {}", email);
            return Err(AuthError::InvalidCredentials);
        }

        // the token carries the stored spelling of the email, not whatever
        // casing the client typed
        let stored_email = field_str(account, "email").unwrap_or(email).to_owned();
        let privileged = field_bool(account, "is_privileged");
        let table_id = field_str(account, "table_id").map(str::to_owned);

        let claims = Claims::new(stored_email, privileged, table_id);

        Ok(LoginOutcome {
            token: claims.sign(&self.signing_key),
            is_privileged: privileged,
        })
    }

    /// Append one entry to the practice log named by the token.
    pub async fn record_practice(
        &self,
        claims: &Claims,
        entry: &PracticeEntry,
    ) -> Result<(), AuthError> {
        let table_id = claims
            .table_id
            .as_deref()
            .ok_or(AuthError::MissingPartition)?;

        let mut fields = Map::new();
        fields.insert("date".into(), json!(entry.date));
        fields.insert("rounds".into(), json!(entry.rounds));
        fields.insert("reading_time".into(), json!(entry.reading_time));

        self.store
            .create_record(table_id, fields)
            .await
            .map_err(AuthError::PartitionAccess)
    }

    /// Read the whole practice log named by the token. Missing fields on a
    /// row come back as ""/0 rather than failing the request.
    pub async fn list_practice(&self, claims: &Claims) -> Result<Vec<PracticeEntry>, AuthError> {
        let table_id = claims
            .table_id
            .as_deref()
            .ok_or(AuthError::MissingPartition)?;

        let records = self
            .store
            .list_records(table_id)
            .await
            .map_err(AuthError::PartitionAccess)?;

        Ok(records
            .iter()
            .map(|record| PracticeEntry {
                date: field_str(record, "date").unwrap_or_default().to_owned(),
                rounds: field_int(record, "rounds"),
                reading_time: field_int(record, "reading_time"),
            })
            .collect())
    }
}

/// Column schema every practice log is provisioned with.
fn practice_log_columns() -> Value {
    json!([
        { "name": "date", "type": "singleLineText" },
        { "name": "rounds", "type": "number" },
        { "name": "reading_time", "type": "number" },
    ])
}

fn password_matches(supplied: &str, stored: &str) -> bool {
    if crypto::is_encoded_hash(stored) {
        crypto::verify(supplied, stored)
    } else {
        // legacy rows store the password as typed
        constant_time_compare(supplied, stored)
    }
}

fn field_str<'a>(record: &'a Record, name: &str) -> Option<&'a str> {
    record.fields.get(name).and_then(Value::as_str)
}

fn field_bool(record: &Record, name: &str) -> bool {
    record
        .fields
        .get(name)
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

// numeric columns, but rows written through the store's UI sometimes hold
// strings
fn field_int(record: &Record, name: &str) -> i64 {
    match record.fields.get(name) {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashed_passwords_verify() {
        let stored = crypto::hash("japa-mala-108");

        assert!(password_matches("japa-mala-108", &stored));
        assert!(!password_matches("japa-mala-109", &stored));
    }

    #[test]
    fn legacy_plaintext_rows_still_match() {
        assert!(password_matches("oldpassword", "oldpassword"));
        assert!(!password_matches("oldpassword", "otherpassword"));
    }

    #[test]
    fn malformed_stored_hash_never_matches() {
        assert!(!password_matches("anything", "$argon2id$garbage"));
    }

    fn record_with(name: &str, value: Value) -> Record {
        serde_json::from_value(json!({ "fields": { name: value } })).unwrap()
    }

    #[test]
    fn numeric_fields_tolerate_store_typing() {
        assert_eq!(field_int(&record_with("rounds", json!(16)), "rounds"), 16);
        assert_eq!(field_int(&record_with("rounds", json!("16")), "rounds"), 16);
        assert_eq!(field_int(&record_with("rounds", json!("n/a")), "rounds"), 0);
        assert_eq!(field_int(&record_with("date", json!("x")), "rounds"), 0);
    }
}
