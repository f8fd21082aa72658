use std::sync::Arc;

use http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
    ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, HeaderValue,
};

use super::Middleware;
use crate::handler;
use crate::request::Request;

const ALLOW_HEADERS: &str = "Content-Type, Content-Length, Accept-Encoding, X-CSRF-Token, \
    Authorization, accept, origin, Cache-Control, X-Requested-With";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";

/// Permissive CORS headers on every response.
///
/// Sets `Access-Control-Allow-Origin: *`, `Access-Control-Allow-Credentials:
/// true`, a fixed allow-list of request headers and `GET, POST, PUT, DELETE,
/// OPTIONS`, then applies `overrides`, which replace defaults of the same name.
///
/// ```rust
/// use auxi::middleware::cors;
/// use http::header::{ACCESS_CONTROL_ALLOW_ORIGIN, HeaderMap, HeaderValue};
///
/// let mut overrides = HeaderMap::new();
/// overrides.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("https://app.example"));
/// let layer = cors(overrides);
/// ```
pub fn cors(overrides: HeaderMap) -> Middleware {
    let mut headers = HeaderMap::with_capacity(4 + overrides.len());
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(ACCESS_CONTROL_ALLOW_CREDENTIALS, HeaderValue::from_static("true"));
    headers.insert(ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS));
    headers.insert(ACCESS_CONTROL_ALLOW_METHODS, HeaderValue::from_static(ALLOW_METHODS));
    for (name, value) in &overrides {
        headers.insert(name, value.clone());
    }
    let headers = Arc::new(headers);

    Middleware::new(move |next| {
        let headers = Arc::clone(&headers);
        handler::boxed(move |req: Request| {
            let fut = next.call(req);
            let headers = Arc::clone(&headers);
            async move {
                let mut res = fut.await;
                for (name, value) in headers.iter() {
                    res.headers_mut().insert(name, value.clone());
                }
                res
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;
    use http::StatusCode;

    use super::*;
    use crate::Response;

    async fn run(overrides: HeaderMap) -> Response {
        let inner = handler::boxed(|_req: Request| async { StatusCode::NO_CONTENT });
        cors(overrides)
            .wrap(inner)
            .call(http::Request::new(Bytes::new()).into())
            .await
    }

    #[tokio::test]
    async fn sets_default_headers() {
        let res = run(HeaderMap::new()).await;
        assert_eq!(res.status_code(), StatusCode::NO_CONTENT);
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_METHODS], ALLOW_METHODS);
        assert!(res.headers()[ACCESS_CONTROL_ALLOW_HEADERS].to_str().unwrap().contains("Authorization"));
    }

    #[tokio::test]
    async fn overrides_win() {
        let mut overrides = HeaderMap::new();
        overrides.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("https://app.example"));
        overrides.insert("access-control-max-age", HeaderValue::from_static("600"));

        let res = run(overrides).await;
        assert_eq!(res.headers()[ACCESS_CONTROL_ALLOW_ORIGIN], "https://app.example");
        assert_eq!(res.headers()["access-control-max-age"], "600");
        assert_eq!(res.headers().get_all(ACCESS_CONTROL_ALLOW_ORIGIN).iter().count(), 1);
    }
}
