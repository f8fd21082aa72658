//! Per-path, per-method request router.
//!
//! One radix tree of paths (via [`matchit`]). Each path owns a
//! [`MethodHandlers`] table and dispatches on the request method:
//!
//! | method                          | handler set | outcome            |
//! |---------------------------------|-------------|--------------------|
//! | GET POST PUT DELETE PATCH HEAD OPTIONS | yes  | handler runs       |
//! | GET POST PUT DELETE PATCH HEAD OPTIONS | no   | `404 Not Found`    |
//! | anything else                   | -           | `405 Method Not Allowed` |
//!
//! Every route is wrapped in the router's [`MiddlewareChain`] *as it stands
//! when the route is registered*. Add middleware first, then routes.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use http::StatusCode;
use http::header::{ALLOW, HeaderValue};
use matchit::Router as MatchitRouter;
use tracing::debug;

use crate::envelope::ErrorResponse;
use crate::error::Error;
use crate::handler::{self, BoxedHandler, Handler};
use crate::method::Method;
use crate::middleware::{Middleware, MiddlewareChain};
use crate::request::Request;
use crate::response::Response;

// ── MethodHandlers ────────────────────────────────────────────────────────────

/// One optional handler per routable method.
///
/// ```rust
/// use auxi::{MethodHandlers, Request};
/// # async fn list(_: Request) -> &'static str { "" }
/// # async fn create(_: Request) -> &'static str { "" }
/// let users = MethodHandlers::new().get(list).post(create);
/// ```
#[derive(Clone, Default)]
pub struct MethodHandlers {
    get: Option<BoxedHandler>,
    post: Option<BoxedHandler>,
    put: Option<BoxedHandler>,
    delete: Option<BoxedHandler>,
    patch: Option<BoxedHandler>,
    head: Option<BoxedHandler>,
    options: Option<BoxedHandler>,
}

impl MethodHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the handler for `method`, replacing any earlier one.
    pub fn on(mut self, method: Method, handler: impl Handler) -> Self {
        *self.slot_mut(method) = Some(handler::boxed(handler));
        self
    }

    pub fn get(self, handler: impl Handler) -> Self { self.on(Method::Get, handler) }
    pub fn post(self, handler: impl Handler) -> Self { self.on(Method::Post, handler) }
    pub fn put(self, handler: impl Handler) -> Self { self.on(Method::Put, handler) }
    pub fn delete(self, handler: impl Handler) -> Self { self.on(Method::Delete, handler) }
    pub fn patch(self, handler: impl Handler) -> Self { self.on(Method::Patch, handler) }
    pub fn head(self, handler: impl Handler) -> Self { self.on(Method::Head, handler) }
    pub fn options(self, handler: impl Handler) -> Self { self.on(Method::Options, handler) }

    /// The handler for `method`, if one was set.
    pub fn handler(&self, method: Method) -> Option<&BoxedHandler> {
        self.slot(method).as_ref()
    }

    /// Methods that have a handler, in [`Method::ALL`] order.
    pub fn allowed(&self) -> impl Iterator<Item = Method> + '_ {
        Method::ALL.into_iter().filter(|m| self.slot(*m).is_some())
    }

    fn slot(&self, method: Method) -> &Option<BoxedHandler> {
        match method {
            Method::Get     => &self.get,
            Method::Post    => &self.post,
            Method::Put     => &self.put,
            Method::Delete  => &self.delete,
            Method::Patch   => &self.patch,
            Method::Head    => &self.head,
            Method::Options => &self.options,
        }
    }

    fn slot_mut(&mut self, method: Method) -> &mut Option<BoxedHandler> {
        match method {
            Method::Get     => &mut self.get,
            Method::Post    => &mut self.post,
            Method::Put     => &mut self.put,
            Method::Delete  => &mut self.delete,
            Method::Patch   => &mut self.patch,
            Method::Head    => &mut self.head,
            Method::Options => &mut self.options,
        }
    }
}

impl fmt::Debug for MethodHandlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.allowed()).finish()
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

/// The application router.
///
/// Build it once at startup; pass it to [`Server::serve`](crate::Server::serve).
/// Builder methods take `self`, so configuration is single-threaded by
/// construction and the finished router is read-only while serving.
///
/// ```rust
/// use auxi::{middleware, MethodHandlers, Request, Router};
/// # use http::HeaderMap;
/// # async fn get_user(_: Request) -> &'static str { "" }
/// # async fn delete_user(_: Request) -> &'static str { "" }
/// let app = Router::new()
///     .wrap(middleware::cors(HeaderMap::new()))
///     .route("/users/{id}", MethodHandlers::new().get(get_user).delete(delete_user));
/// ```
pub struct Router {
    paths: MatchitRouter<BoxedHandler>,
    chain: MiddlewareChain,
}

impl Router {
    pub fn new() -> Self {
        Self { paths: MatchitRouter::new(), chain: MiddlewareChain::new() }
    }

    /// Appends `middleware` to the chain applied to routes registered from now on.
    pub fn wrap(mut self, middleware: Middleware) -> Self {
        self.chain.add(middleware);
        self
    }

    /// Appends every middleware of `chain`, in order.
    pub fn wrap_chain(mut self, chain: &MiddlewareChain) -> Self {
        self.chain = self.chain.concat(chain);
        self
    }

    /// Registers `handlers` at `pattern`. Path parameters use `{name}` syntax.
    ///
    /// # Panics
    ///
    /// Panics if the pattern is invalid or conflicts with an existing route.
    /// Use [`try_route`](Self::try_route) to handle that as an error.
    pub fn route(self, pattern: &str, handlers: MethodHandlers) -> Self {
        self.try_route(pattern, handlers)
            .unwrap_or_else(|e| panic!("{e}"))
    }

    /// Fallible [`route`](Self::route).
    pub fn try_route(mut self, pattern: &str, handlers: MethodHandlers) -> Result<Self, Error> {
        let dispatcher = self.chain.apply(method_dispatcher(handlers));
        self.paths
            .insert(pattern, dispatcher)
            .map_err(|source| Error::Route { pattern: pattern.to_owned(), source })?;
        Ok(self)
    }

    /// Routes one request to its handler and produces its response.
    ///
    /// An unmatched path gets `404 Not Found` without running any middleware.
    pub async fn dispatch(&self, mut req: Request) -> Response {
        let Some((handler, params)) = self.lookup(req.path()) else {
            debug!(path = req.path(), "no route matched");
            return not_found();
        };
        req.params = params;
        handler.call(req).await
    }

    fn lookup(&self, path: &str) -> Option<(BoxedHandler, HashMap<String, String>)> {
        let matched = self.paths.at(path).ok()?;
        let handler = Arc::clone(matched.value);
        let params = matched.params.iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        Some((handler, params))
    }
}

impl Default for Router {
    fn default() -> Self { Self::new() }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

/// The per-path handler: picks the method's handler or answers 404/405.
fn method_dispatcher(handlers: MethodHandlers) -> BoxedHandler {
    let handlers = Arc::new(handlers);
    handler::boxed(move |req: Request| {
        let handlers = Arc::clone(&handlers);
        async move {
            match Method::from_http(req.method()) {
                Some(method) => match handlers.handler(method) {
                    Some(handler) => handler.call(req).await,
                    None => {
                        debug!(%method, path = req.path(), "method has no handler");
                        not_found()
                    }
                },
                None => method_not_allowed(&req, &handlers),
            }
        }
    })
}

fn not_found() -> Response {
    Response::envelope(
        StatusCode::NOT_FOUND,
        &ErrorResponse::detailed(StatusCode::NOT_FOUND.as_u16(), "Not found", "", Vec::new()),
    )
}

fn method_not_allowed(req: &Request, handlers: &MethodHandlers) -> Response {
    debug!(method = %req.method(), path = req.path(), "method not supported");
    let allow = handlers.allowed().map(Method::as_str).collect::<Vec<_>>().join(", ");
    let mut res = Response::envelope(
        StatusCode::METHOD_NOT_ALLOWED,
        &ErrorResponse::detailed(
            StatusCode::METHOD_NOT_ALLOWED.as_u16(),
            "Method not supported",
            format!("{} is not supported on {}", req.method(), req.path()),
            Vec::new(),
        ),
    );
    if let Ok(value) = HeaderValue::from_str(&allow) {
        res.headers_mut().insert(ALLOW, value);
    }
    res
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    async fn ok(_req: Request) -> &'static str { "ok" }

    fn request(method: &str, uri: &str) -> Request {
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(Bytes::new())
            .unwrap()
            .into()
    }

    #[test]
    fn allowed_lists_set_methods_in_order() {
        let handlers = MethodHandlers::new().post(ok).get(ok).options(ok);
        let allowed: Vec<_> = handlers.allowed().collect();
        assert_eq!(allowed, [Method::Get, Method::Post, Method::Options]);
    }

    #[test]
    fn duplicate_route_is_an_error() {
        let router = Router::new().route("/a", MethodHandlers::new().get(ok));
        let err = router.try_route("/a", MethodHandlers::new().post(ok)).err().unwrap();
        assert!(matches!(err, Error::Route { ref pattern, .. } if pattern == "/a"));
    }

    #[tokio::test]
    async fn path_params_reach_the_handler() {
        let router = Router::new().route(
            "/users/{id}",
            MethodHandlers::new().get(|req: Request| async move {
                req.param("id").unwrap_or_default().to_owned()
            }),
        );
        let res = router.dispatch(request("GET", "/users/42")).await;
        assert_eq!(res.body().as_ref(), b"42");
    }

    #[tokio::test]
    async fn method_not_allowed_lists_allowed_methods() {
        let router = Router::new().route("/a", MethodHandlers::new().get(ok).post(ok));
        let res = router.dispatch(request("TRACE", "/a")).await;
        assert_eq!(res.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.headers()[ALLOW], "GET, POST");

        let body: ErrorResponse = serde_json::from_slice(res.body()).unwrap();
        assert_eq!(body.error.code, "405");
    }
}
