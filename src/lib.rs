//! # auxi
//!
//! Small helpers on top of a path router for JSON HTTP services.
//!
//! ## What it adds
//!
//! - **Per-method routing**: one registration per path, one optional handler
//!   per method. A method with no handler is `404`; a method auxi does not
//!   route at all is `405`.
//! - **Ordered middleware**: a [`MiddlewareChain`] wraps every route, first
//!   added outermost. CORS, tracing and a bearer-token guard ship in
//!   [`middleware`].
//! - **One response envelope**: [`SuccessResponse`] and [`ErrorResponse`]
//!   (with field-level [`Validation`]s) are the only body shapes, always sent
//!   with `content-type: application/json` and `x-content-type-options: nosniff`.
//! - **Bearer-token extraction**: [`auth::AuthorizationHeader`] turns a bad
//!   `Authorization` header into a ready-to-send error envelope.
//!
//! Radix-tree path lookup comes from [`matchit`], I/O from tokio and hyper.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use auxi::auth::AuthorizationHeader;
//! use auxi::{middleware, ErrorResponse, MethodHandlers, Request, Router, Server, StatusCode, SuccessResponse};
//! use http::HeaderMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), auxi::Error> {
//!     let app = Router::new()
//!         .wrap(middleware::cors(HeaderMap::new()))
//!         .route("/me", MethodHandlers::new().get(me));
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn me(req: Request) -> Result<(StatusCode, SuccessResponse), (StatusCode, ErrorResponse)> {
//!     let token = AuthorizationHeader::from_request(&req)
//!         .bearer_token()
//!         .map_err(|e| (StatusCode::UNAUTHORIZED, e.into_envelope()))?;
//!     let mut data = serde_json::Map::new();
//!     data.insert("token".into(), token.into());
//!     Ok((StatusCode::OK, SuccessResponse::with_data(data, "authenticated")))
//! }
//! ```

mod envelope;
mod error;
mod method;
mod request;
mod response;
mod router;
mod server;

pub mod auth;
pub mod handler;
pub mod logging;
pub mod middleware;
pub mod query;

pub use envelope::{ErrorBody, ErrorResponse, SuccessResponse, Validation};
pub use error::Error;
pub use handler::Handler;
pub use http::StatusCode;
pub use method::{Method, UnknownMethod};
pub use middleware::{Middleware, MiddlewareChain};
pub use request::Request;
pub use response::{ContentType, IntoResponse, Json, Response, ResponseBuilder};
pub use router::{MethodHandlers, Router};
pub use server::Server;
