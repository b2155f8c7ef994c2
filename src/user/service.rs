use axum::extract::FromRef;
use validator::Validate;

use crate::AppState;
use crate::error::{Result, ServerError};
use crate::upstream::{USER, UpstreamClient};
use crate::user::{
    Envelope, LongUser, Order, Profile, ShortUser, UserRepository,
};

pub const MAX_LIMIT: i64 = 1000;

/// Validated search page.
#[derive(Debug, Clone, Default, PartialEq, Validate)]
pub struct Pagination {
    #[validate(range(min = 1, max = MAX_LIMIT))]
    pub limit: i64,
    #[validate(range(min = 1))]
    pub page: i64,
    pub order: Order,
    pub search: String,
}

impl Pagination {
    /// Rows skipped before this page, `None` past `i64::MAX` rows.
    pub fn offset(&self) -> Option<i64> {
        (self.page - 1).checked_mul(self.limit)
    }
}

/// Profile lookups over upstream and local data.
#[derive(Clone)]
pub struct UserService {
    pub repo: UserRepository,
    pub upstream: UpstreamClient,
}

impl UserService {
    /// Create a new [`UserService`].
    pub fn new(repo: UserRepository, upstream: UpstreamClient) -> Self {
        Self { repo, upstream }
    }

    /// Fetch `nickname` upstream and enrich it with its local profile.
    ///
    /// Any storage failure falls back to the upstream user.
    pub async fn find_by_nickname(&self, nickname: &str) -> Result<Profile> {
        let Envelope { data: user } = self
            .upstream
            .get(&[USER, nickname])
            .await
            .map_err(ServerError::BadUpstream)?;

        match self.repo.find_by_id(user.id).await {
            Ok(profile) => {
                Ok(Profile::Long(Box::new(LongUser::merge(user, profile))))
            },
            Err(sqlx::Error::RowNotFound) => Ok(Profile::Upstream(user)),
            Err(err) => {
                // TODO: answer 500 once clients stop relying on this fallback.
                tracing::error!(
                    user_id = user.id,
                    error = %err,
                    "profile lookup failed, answering with upstream data"
                );
                Ok(Profile::Upstream(user))
            },
        }
    }

    /// Search local profiles.
    pub async fn search(&self, page: &Pagination) -> Result<Vec<ShortUser>> {
        page.validate().map_err(|_| ServerError::InvalidQuery)?;

        // No table holds that many rows.
        let Some(offset) = page.offset() else {
            return Ok(Vec::new());
        };

        Ok(self
            .repo
            .search(&page.search, page.limit, offset, page.order)
            .await?)
    }
}

impl FromRef<AppState> for UserService {
    fn from_ref(state: &AppState) -> UserService {
        UserService::new(
            UserRepository::new(state.db.postgres.clone()),
            state.upstream.clone(),
        )
    }
}
