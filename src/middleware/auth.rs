use std::sync::Arc;

use http::StatusCode;
use tracing::debug;

use super::Middleware;
use crate::auth::AuthorizationHeader;
use crate::handler;
use crate::request::Request;
use crate::response::IntoResponse;

/// The token accepted by [`require_bearer`], available to inner handlers
/// through [`Request::extensions`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BearerToken(pub String);

/// Rejects requests whose `Authorization` header is not `<prefix> <token>`
/// with `401 Unauthorized` and the extractor's error envelope. Accepted
/// requests continue with a [`BearerToken`] in their extensions.
pub fn require_bearer(prefix: impl Into<String>) -> Middleware {
    let prefix: Arc<str> = Arc::from(prefix.into());

    Middleware::new(move |next| {
        let prefix = Arc::clone(&prefix);
        handler::boxed(move |mut req: Request| {
            let token = AuthorizationHeader::from_request(&req)
                .token(&prefix)
                .map(str::to_owned);
            let next = Arc::clone(&next);
            async move {
                match token {
                    Ok(token) => {
                        req.extensions_mut().insert(BearerToken(token));
                        next.call(req).await
                    }
                    Err(err) => {
                        debug!(path = req.path(), error = %err, "rejecting request without bearer token");
                        (StatusCode::UNAUTHORIZED, err.into_envelope()).into_response()
                    }
                }
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::envelope::ErrorResponse;
    use crate::Response;

    fn echo_token() -> handler::BoxedHandler {
        handler::boxed(|req: Request| async move {
            match req.extensions().get::<BearerToken>() {
                Some(BearerToken(token)) => Response::text(token.clone()),
                None => Response::status(StatusCode::INTERNAL_SERVER_ERROR),
            }
        })
    }

    fn request(authorization: Option<&'static str>) -> Request {
        let mut builder = http::Request::builder();
        if let Some(value) = authorization {
            builder = builder.header("authorization", value);
        }
        builder.body(Bytes::new()).unwrap().into()
    }

    #[tokio::test]
    async fn forwards_token_to_handler() {
        let guarded = require_bearer("Bearer").wrap(echo_token());
        let res = guarded.call(request(Some("Bearer s3cret"))).await;
        assert_eq!(res.status_code(), StatusCode::OK);
        assert_eq!(res.body().as_ref(), b"s3cret");
    }

    #[tokio::test]
    async fn short_circuits_with_envelope() {
        let guarded = require_bearer("Bearer").wrap(echo_token());
        let res = guarded.call(request(Some("Basic s3cret"))).await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);

        let body: ErrorResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body.message(), "Authorization header value is malformed");
        assert_eq!(body.validations().len(), 1);
    }

    #[tokio::test]
    async fn missing_header_is_unauthorized() {
        let guarded = require_bearer("Bearer").wrap(echo_token());
        let res = guarded.call(request(None)).await;
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
    }
}
