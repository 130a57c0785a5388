use std::{net::SocketAddr, str::FromStr};

use log::{error, info, warn};

use crate::crypto;

// get and parse an environment variable
// use default value if not set
fn var<T>(name: &str, default: &str) -> T
where
    T: FromStr,
    <T as FromStr>::Err: std::fmt::Debug,
{
    let given = std::env::var(name).unwrap_or(default.to_owned());
    match given.parse() {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(
                "Invalid config option `{}={}`: {:?} ({}'s default is usually {})",
                name, given, e, name, default
            );
            std::process::exit(1);
        }
    }
}

/// Everything the server needs from the environment, resolved once at
/// startup. Handlers receive this through actix `Data`; secrets and table
/// ids are never compiled in.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub web_workers: usize,
    pub handle_cors: bool,

    /// Record store API root, e.g. `https://app.teable.io/api`.
    pub store_base_url: String,
    pub store_api_key: String,
    /// Base that per-user practice logs are created under.
    pub store_base_id: String,
    pub accounts_table_id: String,
    pub courses_table_id: String,
    pub trips_table_id: String,

    pub token_signing_key: [u8; 32],
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: var("BIND_ADDR", "127.0.0.1:8000"),
            web_workers: var("NUM_WEB_WORKERS", "4"),
            handle_cors: var("HANDLE_CORS", "true"),

            store_base_url: var("STORE_BASE_URL", "https://app.teable.io/api"),
            store_api_key: var("STORE_API_KEY", ""),
            store_base_id: var("STORE_BASE_ID", ""),
            accounts_table_id: var("ACCOUNTS_TABLE_ID", ""),
            courses_table_id: var("COURSES_TABLE_ID", ""),
            trips_table_id: var("TRIPS_TABLE_ID", ""),

            token_signing_key: load_signing_key(),
        }
    }

    pub fn print_summary(&self) {
        info!("config: listening on {}", self.bind_addr);
        info!("config: record store at {}", self.store_base_url);
        info!(
            "config: accounts table: {}, courses table: {}, trips table: {}",
            self.accounts_table_id, self.courses_table_id, self.trips_table_id
        );

        if self.store_api_key.is_empty() {
            warn!("STORE_API_KEY is empty, every record store call will be rejected upstream!");
        }

        if self.store_base_id.is_empty() {
            warn!("STORE_BASE_ID is empty, signup will not be able to provision practice logs!");
        }
    }
}

fn load_signing_key() -> [u8; 32] {
    let tsk: String = var("TOKEN_SIGNING_KEY", "");

    if tsk.is_empty() {
        info!("Generating new token signing key... (provide one with TOKEN_SIGNING_KEY)");
        let generated = crypto::generate_token_sig_key();
        info!("Token signing key: {}", hex::encode(generated));
        generated
    } else {
        let key = match hex::decode(&tsk) {
            Ok(key) => key,
            Err(e) => {
                error!("Token signing key is not valid hex: {}", e);
                std::process::exit(1);
            }
        };

        match key.try_into() {
            Ok(key) => key,
            Err(_) => {
                error!("Invalid token signing key length, must be 32 bytes");
                std::process::exit(1);
            }
        }
    }
}
