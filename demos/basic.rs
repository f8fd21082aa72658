//! Minimal auxi example: per-method routes, middleware and envelopes.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl 'http://localhost:3000/people?name=alice&age=41'
//!   curl -X POST http://localhost:3000/people \
//!        -H 'content-type: application/json' \
//!        -d '{"name":"alice","age":41}'
//!   curl -X PUT http://localhost:3000/people -H 'authorization: Bearer s3cret'
//!   curl -X PATCH http://localhost:3000/people      # 404, no handler
//!   curl -X TRACE http://localhost:3000/people      # 405
//!   curl http://localhost:3000/admin -H 'authorization: Bearer s3cret'

use auxi::auth::AuthorizationHeader;
use auxi::logging::LogConfig;
use auxi::middleware::{self, BearerToken};
use auxi::query::{FromQuery, Query, QueryError};
use auxi::{
    ErrorResponse, IntoResponse, Json, MethodHandlers, Request, Response, Router, Server, StatusCode,
    SuccessResponse,
};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Serialize)]
struct Person {
    name: String,
    age: u32,
}

impl FromQuery for Person {
    fn from_query(query: &Query) -> Result<Self, QueryError> {
        let mut problems = QueryError::default();
        let name = problems.check(query.required("name"));
        let age = problems.check(query.parsed("age"));
        problems.into_result()?;
        Ok(Person {
            name: name.unwrap_or_default().to_owned(),
            age: age.unwrap_or_default(),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), auxi::Error> {
    LogConfig::default().level("info").init()?;

    let app = Router::new()
        .wrap(middleware::trace())
        .wrap(middleware::cors(HeaderMap::new()))
        .route(
            "/people",
            MethodHandlers::new()
                .get(get_person)
                .post(create_person)
                .put(replace_person),
        )
        .wrap(middleware::require_bearer("Bearer"))
        .route("/admin", MethodHandlers::new().get(admin));

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

// GET /people?name=..&age=..
async fn get_person(req: Request) -> Response {
    match req.bind_query::<Person>() {
        Ok(person) => Json(person).into_response(),
        Err(e) => Response::envelope(StatusCode::BAD_REQUEST, &ErrorResponse::from(e)),
    }
}

// POST /people
async fn create_person(req: Request) -> Response {
    match serde_json::from_slice::<Person>(req.body()) {
        Ok(person) => Response::envelope(StatusCode::CREATED, &person),
        Err(e) => Response::envelope(
            StatusCode::BAD_REQUEST,
            &ErrorResponse::from_cause("body malformed", &e),
        ),
    }
}

// PUT /people, checks the bearer token by hand.
async fn replace_person(req: Request) -> Response {
    match AuthorizationHeader::from_request(&req).bearer_token() {
        Ok(_token) => Response::envelope(StatusCode::OK, &SuccessResponse::new("replaced")),
        Err(e) => Response::envelope(StatusCode::BAD_REQUEST, e.envelope()),
    }
}

// GET /admin, guarded by `require_bearer`.
async fn admin(req: Request) -> Response {
    let who = req
        .extensions()
        .get::<BearerToken>()
        .map(|t| t.0.len())
        .unwrap_or_default();
    let mut data = serde_json::Map::new();
    data.insert("tokenLength".to_owned(), who.into());
    Response::envelope(StatusCode::OK, &SuccessResponse::with_data(data, "welcome"))
}
