//! Training API routes.
pub mod proxy;
pub mod users;

use axum::Json;
use axum::Router;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use serde_json::Value;
use tower_http::set_header::SetResponseHeaderLayer;

use crate::AppState;
use crate::error::ResponseBody;

/// Upstream JSON answered as-is.
#[derive(Debug, PartialEq)]
pub struct Payload(pub Value);

impl IntoResponse for Payload {
    fn into_response(self) -> Response {
        match self.0 {
            Value::Null => Json(ResponseBody::from_status(StatusCode::OK))
                .into_response(),
            value => Json(value).into_response(),
        }
    }
}

/// Routes mounted under the configured prefix.
pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /online` goes to upstream `/online`.
        .route("/online", get(proxy::online))
        // `GET /admins` goes to upstream `/admin`.
        .route("/admins", get(proxy::admins))
        // `GET /user` goes to upstream `/user`.
        .route("/user", get(proxy::users))
        // `GET /user/{user}` goes to upstream `/user/{user}`.
        .route("/user/{user}", get(proxy::user))
        // `GET /v2/user` merges upstream and local profiles.
        .route("/v2/user", get(users::handler))
        // Every answer is JSON, empty bodies included.
        .layer(SetResponseHeaderLayer::overriding(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        ))
}
