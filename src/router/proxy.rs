//! Plain upstream passthrough.

use axum::extract::{Path, State};

use crate::router::Payload;
use crate::upstream::{ADMINS, Error, ONLINE, USER, USERS, UpstreamClient};

/// Players currently online.
pub async fn online(
    State(upstream): State<UpstreamClient>,
) -> Result<Payload, Error> {
    upstream.get(ONLINE).await.map(Payload)
}

/// Staff list.
pub async fn admins(
    State(upstream): State<UpstreamClient>,
) -> Result<Payload, Error> {
    upstream.get(ADMINS).await.map(Payload)
}

pub async fn users(
    State(upstream): State<UpstreamClient>,
) -> Result<Payload, Error> {
    upstream.get(USERS).await.map(Payload)
}

/// Single upstream user, by login.
pub async fn user(
    State(upstream): State<UpstreamClient>,
    Path(user): Path<String>,
) -> Result<Payload, Error> {
    upstream.get(&[USER, &user]).await.map(Payload)
}
