use chrono::{Duration, Utc};
use derive_more::{Display, Error};
use lazy_static::lazy_static;
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

use crate::crypto;

lazy_static! {
    pub static ref TOKEN_VALIDITY: Duration = Duration::hours(24);
}

/// Marker distinguishing session tokens from any other signed blob that
/// might be minted with the same key later.
pub const TOKEN_PURPOSE: &str = "access";

/// Claims carried by a session token:
/// ```text
///    eyJzdWIiOiJhQHguY29tIiw...fQ.iIuDsgiT4s2ehQ-3ATImimyPUoooTPC1ytqqQuPQSJU
///
///    AAAAAAAAAAAAAAAAAAAAAAAAAAAA BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB
///    ~~~~~~~~~~~~~~~~~~~~~~~~~~~~.~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~~
///         BASE64URL(claims json)               signature
/// ```
///
/// Where `signature` = `BASE64URL(HMACSHA256_SIGN(BASE64URL(claims json), key))`.
///
/// The token is self-contained: verification needs no store lookup, only the
/// signing key. There is no server-side session state and no revocation;
/// tokens die by expiry alone (`jti` is reserved should revocation ever be
/// needed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account email, in the exact spelling held by the accounts table.
    pub sub: String,
    pub is_privileged: bool,
    /// Id of the account's private practice-log table. Absent on account
    /// rows that predate per-user logs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_id: Option<String>,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
    pub typ: String,
}

impl Claims {
    pub fn new(sub: String, is_privileged: bool, table_id: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            sub,
            is_privileged,
            table_id,
            iat: now.timestamp(),
            exp: (now + *TOKEN_VALIDITY).timestamp(),
            jti: nanoid!(),
            typ: TOKEN_PURPOSE.to_owned(),
        }
    }

    pub fn is_expired(&self) -> bool {
        // check if expiry is before now
        self.exp < Utc::now().timestamp()
    }

    /// Serializes and signs the claims into a token string.
    pub fn sign(&self, key: &[u8]) -> String {
        let payload = base64_url::encode(&serde_json::to_vec(self).unwrap());
        let signature = base64_url::encode(&crypto::sign(key, payload.as_bytes()));

        format!("{}.{}", payload, signature)
    }

    /// Parses a token string and validates signature, purpose and expiry.
    /// The signature is checked before the payload is even decoded.
    pub fn verify(token: &str, key: &[u8]) -> Result<Self, TokenError> {
        let mut parts = token.split('.');
        let payload = parts.next().ok_or(TokenError::InvalidFormat)?;
        let signature = parts.next().ok_or(TokenError::InvalidFormat)?;

        if parts.next().is_some() {
            return Err(TokenError::InvalidFormat);
        }

        let signature = base64_url::decode(signature).map_err(|_| TokenError::InvalidFormat)?;
        if !crypto::verify_signature(key, payload.as_bytes(), &signature) {
            return Err(TokenError::SignatureInvalid);
        }

        let decoded = base64_url::decode(payload).map_err(|_| TokenError::InvalidFormat)?;
        let claims: Claims =
            serde_json::from_slice(&decoded).map_err(|_| TokenError::InvalidFormat)?;

        if claims.typ != TOKEN_PURPOSE {
            return Err(TokenError::WrongPurpose);
        }

        if claims.is_expired() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum TokenError {
    InvalidFormat,
    SignatureInvalid,
    WrongPurpose,
    Expired,
}
