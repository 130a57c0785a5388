use std::{ops::Deref, pin::Pin};

use actix_web::{web::Data, FromRequest};
use futures::Future;

use crate::config::Config;
use crate::error::IntoHandlerErrorResult;
use crate::error::{HResult, HandlerError};

use super::token::Claims;

/// Verified bearer-token claims of the requesting account. Extracting this
/// from a request performs the whole authentication check; handlers that
/// take a `Session` can trust every claim in it.
pub struct Session(pub Claims);

impl Deref for Session {
    type Target = Claims;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequest for Session {
    type Error = HandlerError;
    type Future = Pin<Box<dyn Future<Output = HResult<Self>>>>;

    fn from_request(
        req: &actix_web::HttpRequest,
        _payload: &mut actix_web::dev::Payload,
    ) -> Self::Future {
        let req = req.clone();
        Box::pin(async move {
            // get the authorization header
            let auth_header = req
                .headers()
                .get("Authorization")
                .map(|v| v.to_str())
                .or_err(401)?
                .or_err(401)?;

            // needs to be a Bearer token
            let token = auth_header.strip_prefix("Bearer ").or_err(401)?;

            let config = req.app_data::<Data<Config>>().or_err(500)?;

            // parse & validate the token
            let claims = Claims::verify(token, &config.token_signing_key)?;

            Ok(Session(claims))
        })
    }
}
