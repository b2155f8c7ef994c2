//! Game-server API client.
//!
//! One attempt per call, bounded by the configured timeout. The call is
//! awaited inside the handling task, so dropping the inbound request drops
//! the upstream request with it.

use std::time::Duration;

use axum::Json;
use axum::extract::FromRef;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::AppState;
use crate::error::ResponseBody;

pub const ONLINE: &[&str] = &["online"];
pub const ADMINS: &[&str] = &["admin"];
pub const USERS: &[&str] = &["user"];
pub const USER: &str = "user";

/// Failure of an upstream call.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, timeout or body read failure.
    #[error(transparent)]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with anything but `200 OK`.
    #[error("{0}")]
    Status(StatusCode),

    #[error(transparent)]
    Decode(#[from] serde_json::Error),

    /// `.` or `..`, which URLs resolve instead of sending.
    #[error("invalid path segment {0:?}")]
    DotSegment(String),

    #[error("upstream URL cannot be a base: {0}")]
    BaseUrl(String),

    #[error(transparent)]
    Url(#[from] url::ParseError),
}

impl Error {
    /// HTTP status to answer with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::Status(status) => *status,
            Error::DotSegment(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "upstream call failed");
        }

        (status, Json(ResponseBody::error(self.to_string()))).into_response()
    }
}

/// HTTP client bound to the upstream base URL.
#[derive(Clone, Debug)]
pub struct UpstreamClient {
    client: Client,
    base: Url,
}

impl UpstreamClient {
    /// Create a new [`UpstreamClient`].
    pub fn new(base: &str, timeout: Duration) -> Result<Self, Error> {
        let base = Url::parse(base)?;
        if base.cannot_be_a_base() {
            return Err(Error::BaseUrl(base.to_string()));
        }

        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base })
    }

    /// Append percent-encoded `segments` to the base URL.
    pub fn url(&self, segments: &[&str]) -> Result<Url, Error> {
        if let Some(dot) = segments.iter().find(|s| matches!(**s, "." | "..")) {
            return Err(Error::DotSegment((*dot).to_owned()));
        }

        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// GET `segments` and decode the `200 OK` body.
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, Error> {
        let url = self.url(segments)?;
        tracing::trace!(%url, "upstream request");

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::debug!(%status, "upstream refused request");
            return Err(Error::Status(status));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl FromRef<AppState> for UpstreamClient {
    fn from_ref(app_state: &AppState) -> UpstreamClient {
        app_state.upstream.clone()
    }
}
