//! Middleware layer.
//!
//! A [`Middleware`] turns the next handler into a wrapping handler. Cross-cutting
//! concerns (CORS headers, request tracing, auth-header inspection) live here,
//! outside of route handlers.
//!
//! # Ordering
//!
//! A [`MiddlewareChain`] applies its middlewares in insertion order: the
//! first one added is the outermost wrapper, so it sees the request first and
//! the response last.
//!
//! ```text
//! chain = [A, B]       apply(H) = A(B(H))
//!
//! request  → A → B → H
//! response ← A ← B ← H
//! ```
//!
//! Order is observable. Put [`cors`] before [`require_bearer`] and a rejected
//! request still carries CORS headers; put it after and it does not.
//!
//! Built-in middleware:
//! - [`cors`]: permissive CORS headers plus caller overrides
//! - [`trace`]: per-request span with method, path, status, latency
//! - [`require_bearer`]: rejects requests without a well-formed bearer token

use std::fmt;
use std::sync::Arc;

use crate::handler::BoxedHandler;

mod auth;
mod cors;
mod trace;

pub use auth::{BearerToken, require_bearer};
pub use cors::cors;
pub use trace::trace;

/// A decorator from "next handler" to "wrapping handler".
///
/// Cheap to clone; the transformation itself is shared.
#[derive(Clone)]
pub struct Middleware(Arc<dyn Fn(BoxedHandler) -> BoxedHandler + Send + Sync>);

impl Middleware {
    /// ```rust
    /// use auxi::handler;
    /// use auxi::middleware::Middleware;
    /// use auxi::Request;
    ///
    /// let deny_frames = Middleware::new(|next| {
    ///     handler::boxed(move |req: Request| {
    ///         let fut = next.call(req);
    ///         async move {
    ///             let mut res = fut.await;
    ///             res.headers_mut().insert("x-frame-options", "DENY".parse().unwrap());
    ///             res
    ///         }
    ///     })
    /// });
    /// ```
    pub fn new<F>(wrap: F) -> Self
    where
        F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
    {
        Self(Arc::new(wrap))
    }

    /// Wraps `next`.
    pub fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (self.0)(next)
    }
}

impl fmt::Debug for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Middleware")
    }
}

/// An ordered list of middleware, applied first-added-outermost.
#[derive(Clone, Debug, Default)]
pub struct MiddlewareChain {
    middlewares: Vec<Middleware>,
}

impl MiddlewareChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one middleware.
    pub fn add(&mut self, middleware: Middleware) {
        self.middlewares.push(middleware);
    }

    /// Builder-style [`add`](Self::add).
    pub fn with(mut self, middleware: Middleware) -> Self {
        self.add(middleware);
        self
    }

    /// Wraps `handler` in every middleware of the chain.
    ///
    /// The chain is not consumed; every call builds an independent handler.
    pub fn apply(&self, handler: BoxedHandler) -> BoxedHandler {
        self.middlewares
            .iter()
            .rev()
            .fold(handler, |next, middleware| middleware.wrap(next))
    }

    /// A new chain running `self`'s middlewares, then `other`'s.
    pub fn concat(&self, other: &MiddlewareChain) -> MiddlewareChain {
        self.middlewares.iter().chain(&other.middlewares).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl FromIterator<Middleware> for MiddlewareChain {
    fn from_iter<I: IntoIterator<Item = Middleware>>(iter: I) -> Self {
        Self { middlewares: iter.into_iter().collect() }
    }
}

impl Extend<Middleware> for MiddlewareChain {
    fn extend<I: IntoIterator<Item = Middleware>>(&mut self, iter: I) {
        self.middlewares.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::handler;
    use crate::{Request, Response};

    type Log = Arc<Mutex<Vec<String>>>;

    fn marker(log: &Log, name: &'static str) -> Middleware {
        let log = Arc::clone(log);
        Middleware::new(move |next| {
            let log = Arc::clone(&log);
            handler::boxed(move |req: Request| {
                log.lock().unwrap().push(format!("{name}>"));
                let fut = next.call(req);
                let log = Arc::clone(&log);
                async move {
                    let res = fut.await;
                    log.lock().unwrap().push(format!("<{name}"));
                    res
                }
            })
        })
    }

    fn terminal(log: &Log) -> BoxedHandler {
        let log = Arc::clone(log);
        handler::boxed(move |_req: Request| {
            log.lock().unwrap().push("handler".to_owned());
            async { Response::text("done") }
        })
    }

    fn request() -> Request {
        http::Request::new(bytes::Bytes::new()).into()
    }

    #[tokio::test]
    async fn first_added_runs_outermost() {
        let log = Log::default();
        let chain = MiddlewareChain::new()
            .with(marker(&log, "A"))
            .with(marker(&log, "B"));

        chain.apply(terminal(&log)).call(request()).await;

        assert_eq!(*log.lock().unwrap(), ["A>", "B>", "handler", "<B", "<A"]);
    }

    #[tokio::test]
    async fn concat_keeps_left_chain_outside() {
        let log = Log::default();
        let left = MiddlewareChain::new().with(marker(&log, "L"));
        let right = MiddlewareChain::new().with(marker(&log, "R"));

        let joined = left.concat(&right);
        assert_eq!((left.len(), right.len(), joined.len()), (1, 1, 2));

        joined.apply(terminal(&log)).call(request()).await;
        let concat_log = std::mem::take(&mut *log.lock().unwrap());

        left.apply(right.apply(terminal(&log))).call(request()).await;
        assert_eq!(concat_log, *log.lock().unwrap());
        assert_eq!(concat_log[..2], ["L>", "R>"]);
    }

    #[tokio::test]
    async fn apply_is_repeatable() {
        let log = Log::default();
        let chain: MiddlewareChain = [marker(&log, "A")].into_iter().collect();

        let first = chain.apply(terminal(&log));
        let second = chain.apply(terminal(&log));
        first.call(request()).await;
        second.call(request()).await;

        assert_eq!(log.lock().unwrap().len(), 6);
    }

    #[tokio::test]
    async fn empty_chain_is_identity() {
        let chain = MiddlewareChain::new();
        assert!(chain.is_empty());

        let res = chain.apply(terminal(&Log::default())).call(request()).await;
        assert_eq!(res.body().as_ref(), b"done");
    }
}
