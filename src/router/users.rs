//! `GET /v2/user`: nickname lookup or profile search.

use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};

use crate::error::{Result, ServerError};
use crate::user::{Pagination, UserService};

/// Raw query string. Numbers are parsed by hand so that any invalid
/// value ends as an empty `400`.
#[derive(Debug, Default)]
pub struct Params {
    nickname: Option<String>,
    limit: Option<String>,
    page: Option<String>,
    order_by: Option<String>,
    search: Option<String>,
}

/// Repeated keys keep their first value.
impl FromIterator<(String, String)> for Params {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(pairs: I) -> Self {
        let mut params = Params::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "nickname" => &mut params.nickname,
                "limit" => &mut params.limit,
                "page" => &mut params.page,
                "orderBy" => &mut params.order_by,
                "search" => &mut params.search,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
        params
    }
}

#[derive(Debug, PartialEq)]
pub enum Lookup {
    Nickname(String),
    Page(Pagination),
}

impl TryFrom<Params> for Lookup {
    type Error = ServerError;

    fn try_from(params: Params) -> Result<Self> {
        if let Some(nickname) = params.nickname.filter(|n| !n.is_empty()) {
            return Ok(Lookup::Nickname(nickname));
        }

        let number = |value: Option<String>| {
            value
                .and_then(|v| v.parse::<i64>().ok())
                .ok_or(ServerError::InvalidQuery)
        };
        let limit = number(params.limit)?;
        let page = number(params.page)?;

        let order = match params.order_by.filter(|o| !o.is_empty()) {
            Some(order) => {
                order.parse().map_err(|_| ServerError::InvalidQuery)?
            },
            None => Default::default(),
        };

        Ok(Lookup::Page(Pagination {
            limit,
            page,
            order,
            search: params.search.unwrap_or_default(),
        }))
    }
}

pub async fn handler(
    State(users): State<UserService>,
    query: std::result::Result<Query<Vec<(String, String)>>, QueryRejection>,
) -> Result<Response> {
    let Query(pairs) = query.map_err(|_| ServerError::InvalidQuery)?;

    match Lookup::try_from(Params::from_iter(pairs))? {
        Lookup::Nickname(nickname) => {
            Ok(Json(users.find_by_nickname(&nickname).await?).into_response())
        },
        Lookup::Page(page) => {
            Ok(Json(users.search(&page).await?).into_response())
        },
    }
}
