//! Bearer-token extraction from the `Authorization` header.
//!
//! Syntax only: the token comes back verbatim, with no decoding and no
//! signature or expiry checks.
//!
//! ```rust
//! use auxi::auth::AuthorizationHeader;
//! use http::HeaderMap;
//!
//! let mut headers = HeaderMap::new();
//! headers.insert("authorization", "Bearer abc123".parse().unwrap());
//!
//! let token = AuthorizationHeader::new(&headers).bearer_token().unwrap();
//! assert_eq!(token, "abc123");
//! ```

use http::HeaderMap;
use http::header::AUTHORIZATION;

use crate::envelope::ErrorResponse;
use crate::request::Request;

/// Scheme expected by [`AuthorizationHeader::bearer_token`].
pub const DEFAULT_TOKEN_PREFIX: &str = "Bearer";

const FIELD: &str = "Authorization header";

/// Why a token could not be extracted. Both variants carry the envelope to
/// send back to the client.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    MissingAuthHeader(ErrorResponse),
    #[error("{0}")]
    MalformedAuthHeader(ErrorResponse),
}

impl AuthError {
    pub fn envelope(&self) -> &ErrorResponse {
        match self {
            Self::MissingAuthHeader(e) | Self::MalformedAuthHeader(e) => e,
        }
    }

    pub fn into_envelope(self) -> ErrorResponse {
        match self {
            Self::MissingAuthHeader(e) | Self::MalformedAuthHeader(e) => e,
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        let mut err = ErrorResponse::new("Authorization header value is malformed");
        err.add_validation(FIELD, reason);
        Self::MalformedAuthHeader(err)
    }
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        err.into_envelope()
    }
}

/// A read-only view of a request's `Authorization` header.
#[derive(Clone, Copy, Debug)]
pub struct AuthorizationHeader<'a> {
    headers: &'a HeaderMap,
}

impl<'a> AuthorizationHeader<'a> {
    pub fn new(headers: &'a HeaderMap) -> Self {
        Self { headers }
    }

    pub fn from_request(req: &'a Request) -> Self {
        Self::new(req.headers())
    }

    /// Token following the `Bearer` scheme.
    pub fn bearer_token(&self) -> Result<&'a str, AuthError> {
        self.token(DEFAULT_TOKEN_PREFIX)
    }

    /// Token following `prefix`, compared case-sensitively.
    ///
    /// The header value must be exactly `<prefix> <token>`: one single space,
    /// two parts.
    pub fn token(&self, prefix: &str) -> Result<&'a str, AuthError> {
        let Some(value) = self.headers.get(AUTHORIZATION) else {
            return Err(missing());
        };
        if value.is_empty() {
            return Err(missing());
        }
        let value = value
            .to_str()
            .map_err(|_| AuthError::malformed("Expected only visible ASCII characters"))?;

        let mut parts = value.split(' ');
        let (Some(scheme), Some(token), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(AuthError::malformed("Expected exactly 2 values separated by spaces"));
        };
        if scheme != prefix {
            return Err(AuthError::malformed(format!(
                "First value (token prefix) must be '{prefix}'"
            )));
        }

        Ok(token)
    }
}

fn missing() -> AuthError {
    AuthError::MissingAuthHeader(ErrorResponse::new("No authorization header or value given"))
}
