use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use derive_more::{Display, Error};
use log::error;
use serde::Serialize;

use crate::auth::accounts::AuthError;
use crate::auth::token::TokenError;
use crate::store::StoreError;

pub type HResult<T> = std::result::Result<T, HandlerError>;

#[derive(Debug, Display, Error, Serialize)]
#[display(fmt = "{}", message)]
pub struct HandlerError {
    pub message: String,
    pub code: u16,
}

impl HandlerError {
    pub fn with_code(code: u16, message: String) -> Self {
        Self { message, code }
    }

    pub fn internal_error() -> Self {
        Self::with_code(500, "Internal Server Error".into())
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

impl From<u16> for HandlerError {
    fn from(code: u16) -> Self {
        let message = match code {
            403 => "Access denied".into(),
            401 => "Authorization required".into(),
            _ => StatusCode::from_u16(code)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                .to_string(),
        };

        Self::with_code(code, message)
    }
}

impl From<(u16, &'static str)> for HandlerError {
    fn from(tuple: (u16, &'static str)) -> Self {
        Self::with_code(tuple.0, tuple.1.into())
    }
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        error!("record store failure: {}", err);
        Self::with_code(503, "The record service is currently unavailable".into())
    }
}

impl From<TokenError> for HandlerError {
    fn from(err: TokenError) -> Self {
        use TokenError::*;
        match err {
            Expired => Self::with_code(401, "The supplied token has expired.".into()),
            InvalidFormat | SignatureInvalid | WrongPurpose => {
                Self::with_code(401, "Invalid token supplied.".into())
            }
        }
    }
}

impl From<AuthError> for HandlerError {
    fn from(err: AuthError) -> Self {
        use AuthError::*;
        match err {
            MissingCredentials => {
                Self::with_code(400, "Email and password are required".into())
            }
            InvalidEmail => Self::with_code(400, "Enter a valid email address".into()),
            AccountExists => Self::with_code(400, "User already exists".into()),
            InvalidCredentials => Self::with_code(401, "Invalid email or password".into()),
            MissingPartition => {
                Self::with_code(400, "No practice log is linked to this account".into())
            }
            UpstreamUnavailable(e) | ProvisioningFailed(e) | UpstreamWriteFailed(e) => {
                error!("record store failure during auth: {}", e);
                Self::with_code(503, "The record service is currently unavailable".into())
            }
            // the record store's verdict on a log read/write is passed on
            // verbatim; transport-level failures stay a plain 500
            PartitionAccess(StoreError::Status { code }) => {
                Self::with_code(code, "The record service rejected the request".into())
            }
            PartitionAccess(e) => {
                error!("practice log access failed: {}", e);
                Self::internal_error()
            }
        }
    }
}

pub trait IntoHandlerErrorResult<T> {
    fn or_err(self, code: u16) -> Result<T, HandlerError>;
    fn or_err_msg(self, code: u16, message: &'static str) -> Result<T, HandlerError>;
}

impl<T, E> IntoHandlerErrorResult<T> for Result<T, E> {
    fn or_err(self, code: u16) -> Result<T, HandlerError> {
        self.map_err(|_| code.into())
    }

    fn or_err_msg(self, code: u16, message: &'static str) -> Result<T, HandlerError> {
        self.map_err(|_| HandlerError::from((code, message)))
    }
}

impl<T> IntoHandlerErrorResult<T> for Option<T> {
    fn or_err(self, code: u16) -> Result<T, HandlerError> {
        self.ok_or_else(|| code.into())
    }

    fn or_err_msg(self, code: u16, message: &'static str) -> Result<T, HandlerError> {
        self.ok_or_else(|| HandlerError::from((code, message)))
    }
}
