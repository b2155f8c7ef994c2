//! Error handler for the training API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Invalid client input. Answered without body.
    #[error("invalid query parameters")]
    InvalidQuery,

    /// Upstream call failed on a path that hides the cause.
    #[error("upstream lookup failed: {0}")]
    BadUpstream(#[source] crate::upstream::Error),

    #[error("SQL request failed: {0}")]
    Sql(#[from] sqlx::Error),
}

/// Generic JSON envelope, `{"Message": ..}` or `{"Error": ..}`.
#[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseBody {
    #[serde(rename = "Message", skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(rename = "Error", skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseBody {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            message: None,
            error: Some(error.into()),
        }
    }

    /// Envelope carrying the canonical reason of `status`.
    pub fn from_status(status: StatusCode) -> Self {
        let reason = status.canonical_reason().unwrap_or_default();
        if status.is_success() {
            Self::message(reason)
        } else {
            Self::error(reason)
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        match self {
            ServerError::InvalidQuery => {
                StatusCode::BAD_REQUEST.into_response()
            },

            ServerError::BadUpstream(err) => match err {
                crate::upstream::Error::Status(status) => {
                    (status, Json(ResponseBody::error(status.to_string())))
                        .into_response()
                },
                err => {
                    if err.status().is_server_error() {
                        tracing::error!(
                            error = %err,
                            "upstream user lookup failed"
                        );
                    }
                    let status = StatusCode::BAD_REQUEST;
                    (status, Json(ResponseBody::from_status(status)))
                        .into_response()
                },
            },

            ServerError::Sql(sqlx::Error::RowNotFound) => {
                StatusCode::NOT_FOUND.into_response()
            },

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "server returned 500 status");
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;

    use super::*;

    async fn body(response: Response) -> Vec<u8> {
        response
            .into_body()
            .collect()
            .await
            .unwrap()
            .to_bytes()
            .to_vec()
    }

    #[test]
    fn test_envelopes() {
        assert_eq!(
            serde_json::to_string(&ResponseBody::from_status(StatusCode::OK))
                .unwrap(),
            r#"{"Message":"OK"}"#
        );
        assert_eq!(
            serde_json::to_string(&ResponseBody::from_status(
                StatusCode::BAD_REQUEST
            ))
            .unwrap(),
            r#"{"Error":"Bad Request"}"#
        );
    }

    #[tokio::test]
    async fn test_invalid_query_has_no_body() {
        let response = ServerError::InvalidQuery.into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_sql_errors() {
        let response =
            ServerError::Sql(sqlx::Error::RowNotFound).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(body(response).await.is_empty());

        let response =
            ServerError::Sql(sqlx::Error::PoolTimedOut).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body(response).await.is_empty());
    }

    #[tokio::test]
    async fn test_bad_upstream_keeps_only_status() {
        let response = ServerError::BadUpstream(crate::upstream::Error::Status(
            StatusCode::NOT_FOUND,
        ))
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body(response).await, br#"{"Error":"404 Not Found"}"#);

        let decode = serde_json::from_str::<u8>("x").unwrap_err();
        let response =
            ServerError::BadUpstream(crate::upstream::Error::Decode(decode))
                .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await, br#"{"Error":"Bad Request"}"#);

        let response = ServerError::BadUpstream(
            crate::upstream::Error::DotSegment("..".into()),
        )
        .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body(response).await, br#"{"Error":"Bad Request"}"#);
    }
}
