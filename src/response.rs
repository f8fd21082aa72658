//! Outgoing HTTP response type and the [`IntoResponse`] conversion trait.
//!
//! Build a [`Response`] in your handler and return it, or return anything that
//! implements [`IntoResponse`]: a status code, a string, a `(StatusCode, envelope)`
//! pair, a [`Json`] value.

use bytes::Bytes;
use http::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue, X_CONTENT_TYPE_OPTIONS};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;
use tracing::error;

use crate::envelope::{ErrorResponse, SuccessResponse};

fn json() -> HeaderValue {
    HeaderValue::from_static("application/json")
}

// ── ContentType ───────────────────────────────────────────────────────────────

/// Common content-type values for use with [`ResponseBuilder::bytes`].
pub enum ContentType {
    Html,         // text/html; charset=utf-8
    Json,         // application/json
    OctetStream,  // application/octet-stream
    Text,         // text/plain; charset=utf-8
}

impl ContentType {
    fn as_header(&self) -> HeaderValue {
        match self {
            Self::Html        => HeaderValue::from_static("text/html; charset=utf-8"),
            Self::Json        => json(),
            Self::OctetStream => HeaderValue::from_static("application/octet-stream"),
            Self::Text        => HeaderValue::from_static("text/plain; charset=utf-8"),
        }
    }
}

// ── Response ─────────────────────────────────────────────────────────────────

/// An outgoing HTTP response.
///
/// ```rust
/// use auxi::{ErrorResponse, Response, StatusCode, SuccessResponse};
///
/// Response::envelope(StatusCode::OK, &SuccessResponse::new("created"));
/// Response::envelope(StatusCode::BAD_REQUEST, &ErrorResponse::new("name is required"));
/// Response::status(StatusCode::NO_CONTENT);
///
/// Response::builder()
///     .status(StatusCode::CREATED)
///     .header("location", "/users/42")
///     .json(br#"{"id":42}"#.to_vec());
/// ```
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl Response {
    /// `200 OK` with pre-serialized JSON bytes.
    pub fn json(body: impl Into<Bytes>) -> Self {
        Self::builder().json(body)
    }

    /// `200 OK`, `text/plain; charset=utf-8`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::builder().text(body)
    }

    /// Response with no body.
    pub fn status(code: StatusCode) -> Self {
        Self { status: code, headers: HeaderMap::new(), body: Bytes::new() }
    }

    /// Builder for responses that need a custom status or extra headers.
    pub fn builder() -> ResponseBuilder {
        ResponseBuilder { headers: HeaderMap::new(), status: StatusCode::OK }
    }

    /// Serializes `payload` as the JSON body.
    ///
    /// Always sets `content-type: application/json` and
    /// `x-content-type-options: nosniff`. A payload that cannot be represented
    /// as JSON is a bug in the caller's data model, not a request error: the
    /// client gets a `500` with a minimal error envelope and the failure is
    /// logged as fatal.
    pub fn envelope<T: Serialize + ?Sized>(status: StatusCode, payload: &T) -> Self {
        match serde_json::to_vec(payload) {
            Ok(body) => Self::json_with_nosniff(status, body.into()),
            Err(e) => {
                error!(fatal = true, error = %e, "could not serialize response payload to JSON");
                let fallback = ErrorResponse::from_cause("Could not marshal response to JSON", &e);
                let body = serde_json::to_vec(&fallback)
                    .map(Bytes::from)
                    .unwrap_or_else(|_| Bytes::from_static(b"Could not marshal response to JSON"));
                Self::json_with_nosniff(StatusCode::INTERNAL_SERVER_ERROR, body)
            }
        }
    }

    fn json_with_nosniff(status: StatusCode, body: Bytes) -> Self {
        let mut headers = HeaderMap::with_capacity(2);
        headers.insert(CONTENT_TYPE, json());
        headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
        Self { status, headers, body }
    }

    pub fn status_code(&self) -> StatusCode { self.status }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn headers_mut(&mut self) -> &mut HeaderMap { &mut self.headers }
    pub fn body(&self) -> &Bytes { &self.body }

    pub(crate) fn into_inner(self) -> http::Response<Full<Bytes>> {
        let mut res = http::Response::new(Full::new(self.body));
        *res.status_mut() = self.status;
        *res.headers_mut() = self.headers;
        res
    }
}

// ── ResponseBuilder ───────────────────────────────────────────────────────────

/// Fluent builder for [`Response`].
///
/// Obtain via [`Response::builder()`]. Defaults to `200 OK`.
/// Terminated by a typed body method.
pub struct ResponseBuilder {
    headers: HeaderMap,
    status: StatusCode,
}

impl ResponseBuilder {
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code;
        self
    }

    /// Appends a header. Names or values that are not valid HTTP are skipped
    /// with a warning rather than failing the whole response.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
            }
            _ => tracing::warn!(header = name, "dropping invalid response header"),
        }
        self
    }

    /// Terminate with a JSON body (`application/json`).
    pub fn json(self, body: impl Into<Bytes>) -> Response {
        self.finish(json(), body.into())
    }

    /// Terminate with a plain-text body (`text/plain; charset=utf-8`).
    pub fn text(self, body: impl Into<String>) -> Response {
        self.finish(ContentType::Text.as_header(), Bytes::from(body.into()))
    }

    /// Terminate with a typed body.
    pub fn bytes(self, content_type: ContentType, body: impl Into<Bytes>) -> Response {
        self.finish(content_type.as_header(), body.into())
    }

    /// Terminate with a serialized envelope, keeping the builder's headers.
    ///
    /// The envelope's `content-type` and `x-content-type-options` replace any
    /// value set on the builder.
    pub fn envelope<T: Serialize + ?Sized>(mut self, payload: &T) -> Response {
        let res = Response::envelope(self.status, payload);
        for (name, value) in res.headers {
            if let Some(name) = name {
                self.headers.insert(name, value);
            }
        }
        Response { body: res.body, headers: self.headers, status: res.status }
    }

    /// Terminate with no body.
    pub fn no_body(self) -> Response {
        Response { body: Bytes::new(), headers: self.headers, status: self.status }
    }

    fn finish(mut self, content_type: HeaderValue, body: Bytes) -> Response {
        self.headers.insert(CONTENT_TYPE, content_type);
        Response { body, headers: self.headers, status: self.status }
    }
}

// ── IntoResponse ──────────────────────────────────────────────────────────────

/// Conversion into an HTTP [`Response`].
///
/// Implement on your own types to return them directly from handlers.
pub trait IntoResponse {
    fn into_response(self) -> Response;
}

impl IntoResponse for Response {
    fn into_response(self) -> Response { self }
}

impl IntoResponse for &'static str {
    fn into_response(self) -> Response { Response::text(self) }
}

impl IntoResponse for String {
    fn into_response(self) -> Response { Response::text(self) }
}

/// Return a status directly from a handler: `return StatusCode::NOT_FOUND`
impl IntoResponse for StatusCode {
    fn into_response(self) -> Response { Response::status(self) }
}

/// Any serializable value as a `200 OK` JSON body.
///
/// ```rust,no_run
/// use auxi::{Json, Request};
/// # #[derive(serde::Serialize)] struct User { id: u64 }
///
/// async fn get_user(_req: Request) -> Json<User> {
///     Json(User { id: 1 })
/// }
/// ```
#[derive(Clone, Debug)]
pub struct Json<T>(pub T);

impl<T: Serialize> IntoResponse for Json<T> {
    fn into_response(self) -> Response {
        Response::envelope(StatusCode::OK, &self.0)
    }
}

impl<T: Serialize> IntoResponse for (StatusCode, Json<T>) {
    fn into_response(self) -> Response {
        Response::envelope(self.0, &self.1.0)
    }
}

impl IntoResponse for (StatusCode, ErrorResponse) {
    fn into_response(self) -> Response {
        Response::envelope(self.0, &self.1)
    }
}

impl IntoResponse for (StatusCode, SuccessResponse) {
    fn into_response(self) -> Response {
        Response::envelope(self.0, &self.1)
    }
}

impl<T: IntoResponse, E: IntoResponse> IntoResponse for Result<T, E> {
    fn into_response(self) -> Response {
        match self {
            Ok(ok) => ok.into_response(),
            Err(err) => err.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::Value;

    use super::*;

    #[test]
    fn envelope_sets_json_headers() {
        let res = Response::envelope(StatusCode::CREATED, &SuccessResponse::new("made"));
        assert_eq!(res.status_code(), StatusCode::CREATED);
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");

        let body: Value = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body["message"], "made");
    }

    #[test]
    fn unserializable_payload_becomes_500_envelope() {
        // JSON object keys must be strings.
        let mut bad: HashMap<Vec<u8>, u8> = HashMap::new();
        bad.insert(vec![1, 2], 3);

        let res = Response::envelope(StatusCode::OK, &bad);
        assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");

        let body: ErrorResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body.message(), "Could not marshal response to JSON");
        assert!(!body.error.details.is_empty());
    }

    #[test]
    fn builder_envelope_keeps_extra_headers() {
        let res = Response::builder()
            .status(StatusCode::UNAUTHORIZED)
            .header("www-authenticate", "Bearer")
            .envelope(&ErrorResponse::new("no token"));
        assert_eq!(res.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(res.headers()["www-authenticate"], "Bearer");
        assert_eq!(res.headers()[CONTENT_TYPE], "application/json");
    }

    #[test]
    fn builder_envelope_overrides_content_type() {
        let res = Response::builder()
            .header("content-type", "text/plain")
            .header("x-content-type-options", "off")
            .envelope(&SuccessResponse::new("x"));

        let content_types: Vec<_> = res.headers().get_all(CONTENT_TYPE).iter().collect();
        assert_eq!(content_types, ["application/json"]);
        assert_eq!(res.headers().get_all(X_CONTENT_TYPE_OPTIONS).iter().count(), 1);
        assert_eq!(res.headers()[X_CONTENT_TYPE_OPTIONS], "nosniff");
    }

    #[test]
    fn invalid_builder_header_is_skipped() {
        let res = Response::builder().header("bad header", "x").text("hi");
        assert!(res.headers().get("bad header").is_none());
        assert_eq!(res.body().as_ref(), b"hi");
    }

    #[test]
    fn result_picks_the_matching_arm() {
        let ok: Result<&'static str, (StatusCode, ErrorResponse)> = Ok("fine");
        assert_eq!(ok.into_response().status_code(), StatusCode::OK);

        let err: Result<&'static str, (StatusCode, ErrorResponse)> =
            Err((StatusCode::BAD_REQUEST, ErrorResponse::new("nope")));
        assert_eq!(err.into_response().status_code(), StatusCode::BAD_REQUEST);
    }
}
