//! Handle database requests.

use std::str::FromStr;

use sqlx::types::Json;
use sqlx::{Pool, Postgres};

use crate::user::{LocalUser, ShortUser};

const SELECT_BY_ID: &str = r#"
SELECT
    account_id,
    account_name,
    COALESCE(account_names, '[]'::jsonb) AS account_names,
    COALESCE(avatar, '') AS avatar,
    COALESCE(background, '') AS background,
    COALESCE(vip, '') AS vip,
    COALESCE(social_credits, 0) AS social_credits,
    COALESCE(kills, 0) AS kills,
    COALESCE(deaths, 0) AS deaths,
    COALESCE(cop_chase_rating, 0) AS cop_chase_rating,
    COALESCE(punishments, '[]'::jsonb) AS punishments,
    COALESCE(verification, '') AS verification,
    COALESCE(achievement, '') AS achievement,
    COALESCE(telegram, '') AS telegram,
    COALESCE(prefix, '') AS prefix,
    COALESCE(star, '') AS star,
    COALESCE(application_verification, '') AS application_verification
FROM users
WHERE account_id = $1
"#;

const UPSERT: &str = r#"
INSERT INTO users (
    account_id, account_name, account_names, avatar, background, vip,
    social_credits, kills, deaths, cop_chase_rating, punishments,
    verification, achievement, telegram, prefix, star, application_verification
)
VALUES (
    $1, $2, $3, $4, $5, $6, $7, $8, $9,
    $10, $11, $12, $13, $14, $15, $16, $17
)
ON CONFLICT (account_id) DO UPDATE SET
    account_name = EXCLUDED.account_name,
    account_names = EXCLUDED.account_names,
    avatar = EXCLUDED.avatar,
    background = EXCLUDED.background,
    vip = EXCLUDED.vip,
    social_credits = EXCLUDED.social_credits,
    kills = EXCLUDED.kills,
    deaths = EXCLUDED.deaths,
    cop_chase_rating = EXCLUDED.cop_chase_rating,
    punishments = EXCLUDED.punishments,
    verification = EXCLUDED.verification,
    achievement = EXCLUDED.achievement,
    telegram = EXCLUDED.telegram,
    prefix = EXCLUDED.prefix,
    star = EXCLUDED.star,
    application_verification = EXCLUDED.application_verification
"#;

/// Columns a search may be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortColumn {
    #[default]
    AccountId,
    AccountName,
    SocialCredits,
    Kills,
    Deaths,
    CopChaseRating,
}

impl std::fmt::Display for SortColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SortColumn::AccountId => write!(f, "account_id"),
            SortColumn::AccountName => write!(f, "account_name"),
            SortColumn::SocialCredits => write!(f, "social_credits"),
            SortColumn::Kills => write!(f, "kills"),
            SortColumn::Deaths => write!(f, "deaths"),
            SortColumn::CopChaseRating => write!(f, "cop_chase_rating"),
        }
    }
}

/// Sort clause of a search, parsed from `<column>[ asc|desc]`.
///
/// Renders as an `ORDER BY` list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Order {
    pub column: SortColumn,
    pub descending: bool,
}

/// Unknown column or direction in an `orderBy` value.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("cannot sort by {0:?}")]
pub struct InvalidOrder(pub String);

impl FromStr for Order {
    type Err = InvalidOrder;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let lowered = value.trim().to_lowercase();
        let mut parts = lowered.split_whitespace();

        let column = match parts.next() {
            Some("account_id") => SortColumn::AccountId,
            Some("account_name") => SortColumn::AccountName,
            Some("social_credits") => SortColumn::SocialCredits,
            Some("kills") => SortColumn::Kills,
            Some("deaths") => SortColumn::Deaths,
            Some("cop_chase_rating") => SortColumn::CopChaseRating,
            _ => return Err(InvalidOrder(value.to_owned())),
        };
        let descending = match parts.next() {
            None | Some("asc") => false,
            Some("desc") => true,
            Some(_) => return Err(InvalidOrder(value.to_owned())),
        };
        if parts.next().is_some() {
            return Err(InvalidOrder(value.to_owned()));
        }

        Ok(Self { column, descending })
    }
}

impl std::fmt::Display for Order {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let direction = if self.descending { "DESC" } else { "ASC" };
        write!(f, "{} {direction}", self.column)?;
        // Ties resolve on the primary key.
        if self.column != SortColumn::AccountId {
            write!(f, ", {}", SortColumn::AccountId)?;
        }
        Ok(())
    }
}

/// Escape `LIKE` wildcards so `search` is matched literally.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

#[derive(Clone)]
pub struct UserRepository {
    pool: Pool<Postgres>,
}

impl UserRepository {
    /// Create a new [`UserRepository`].
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Find a profile by its `account_id`.
    ///
    /// Returns [`sqlx::Error::RowNotFound`] when absent.
    pub async fn find_by_id(&self, id: i64) -> Result<LocalUser, sqlx::Error> {
        sqlx::query_as::<_, LocalUser>(SELECT_BY_ID)
            .bind(id)
            .fetch_one(&self.pool)
            .await
    }

    /// Page through profiles whose name or id contains `search`,
    /// case-insensitively.
    pub async fn search(
        &self,
        search: &str,
        limit: i64,
        offset: i64,
        order: Order,
    ) -> Result<Vec<ShortUser>, sqlx::Error> {
        // `order` only renders allowlisted identifiers.
        let query = format!(
            r#"SELECT account_id, account_name
                FROM users
                WHERE account_name ILIKE $1 OR account_id::text ILIKE $1
                ORDER BY {order}
                LIMIT $2 OFFSET $3"#
        );

        sqlx::query_as::<_, ShortUser>(&query)
            .bind(like_pattern(search))
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
    }

    /// Insert or replace a profile.
    pub async fn insert(&self, user: &LocalUser) -> Result<(), sqlx::Error> {
        sqlx::query(UPSERT)
            .bind(user.account_id)
            .bind(&user.account_name)
            .bind(Json(&user.account_names))
            .bind(&user.avatar)
            .bind(&user.background)
            .bind(&user.vip)
            .bind(user.social_credits)
            .bind(user.kills)
            .bind(user.deaths)
            .bind(user.cop_chase_rating)
            .bind(Json(&user.punishments))
            .bind(&user.verification)
            .bind(&user.achievement)
            .bind(&user.telegram)
            .bind(&user.prefix)
            .bind(&user.star)
            .bind(&user.application_verification)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::fixtures::{profile, seeded};

    #[test]
    fn test_order_parsing() {
        assert_eq!("account_id".parse::<Order>(), Ok(Order::default()));
        assert_eq!(
            "Kills DESC".parse::<Order>(),
            Ok(Order {
                column: SortColumn::Kills,
                descending: true
            })
        );
        assert_eq!(
            "cop_chase_rating asc".parse::<Order>().unwrap().to_string(),
            "cop_chase_rating ASC, account_id"
        );
        assert_eq!(
            "account_id desc".parse::<Order>().unwrap().to_string(),
            "account_id DESC"
        );
        assert!("password".parse::<Order>().is_err());
        assert!("kills; DROP TABLE users".parse::<Order>().is_err());
        assert!("kills sideways".parse::<Order>().is_err());
        assert!("kills desc nulls".parse::<Order>().is_err());
        assert!("".parse::<Order>().is_err());
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(""), "%%");
        assert_eq!(like_pattern("abc"), "%abc%");
        assert_eq!(like_pattern("50%_\\"), "%50\\%\\_\\\\%");
    }

    #[sqlx::test]
    async fn test_round_trip(pool: Pool<Postgres>) {
        let repo = seeded(pool).await;

        let user = repo.find_by_id(12).await.unwrap();
        assert_eq!(user, profile(12, "delta"));

        let mut updated = profile(12, "delta");
        updated.kills = 0;
        updated.punishments.clear();
        repo.insert(&updated).await.unwrap();
        assert_eq!(repo.find_by_id(12).await.unwrap(), updated);
    }

    #[sqlx::test]
    async fn test_find_missing_is_row_not_found(pool: Pool<Postgres>) {
        let repo = seeded(pool).await;

        let err = repo.find_by_id(404).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::RowNotFound));
    }

    #[sqlx::test]
    async fn test_null_columns_read_as_zero_values(pool: Pool<Postgres>) {
        let repo = seeded(pool.clone()).await;
        sqlx::query(
            "INSERT INTO users (account_id, account_name) VALUES (7, 'bare')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let user = repo.find_by_id(7).await.unwrap();
        assert_eq!(
            user,
            LocalUser {
                account_id: 7,
                account_name: "bare".into(),
                ..Default::default()
            }
        );
    }

    #[sqlx::test]
    async fn test_search_matches_name_or_id(pool: Pool<Postgres>) {
        let repo = seeded(pool).await;

        let users =
            repo.search("alpha", 10, 0, Order::default()).await.unwrap();
        assert_eq!(ids(&users), vec![1, 21]);

        // `1` is contained in ids 1, 12 and 21.
        let users = repo.search("1", 10, 0, Order::default()).await.unwrap();
        assert_eq!(ids(&users), vec![1, 12, 21]);
        assert_eq!(users[1].login, "delta");
    }

    #[sqlx::test]
    async fn test_search_pages_and_orders(pool: Pool<Postgres>) {
        let repo = seeded(pool).await;
        let by_kills = Order {
            column: SortColumn::Kills,
            descending: true,
        };

        let first = repo.search("", 2, 0, by_kills).await.unwrap();
        let second = repo.search("", 2, 2, by_kills).await.unwrap();
        let third = repo.search("", 2, 4, by_kills).await.unwrap();

        assert_eq!(ids(&first), vec![21, 12]);
        assert_eq!(ids(&second), vec![3, 2]);
        assert_eq!(ids(&third), vec![1]);
    }

    #[sqlx::test]
    async fn test_search_pages_through_ties(pool: Pool<Postgres>) {
        let repo = seeded(pool).await;
        // Same kills, inserted out of id order.
        for (id, name) in [(32, "tie_c"), (30, "tie_a"), (31, "tie_b")] {
            let mut user = profile(id, name);
            user.kills = 5;
            repo.insert(&user).await.unwrap();
        }
        let by_kills = Order {
            column: SortColumn::Kills,
            descending: false,
        };

        let mut seen = Vec::new();
        for offset in 0..3 {
            let page = repo.search("tie", 1, offset, by_kills).await.unwrap();
            seen.extend(ids(&page));
        }
        assert_eq!(seen, vec![30, 31, 32]);
    }

    #[sqlx::test]
    async fn test_search_without_match_is_empty(pool: Pool<Postgres>) {
        let repo = seeded(pool).await;
        let search = |query: &'static str| {
            let repo = repo.clone();
            async move {
                repo.search(query, 10, 0, Order::default()).await.unwrap()
            }
        };

        assert!(search("zzz").await.is_empty());

        // Wildcards are literal.
        assert!(search("%").await.is_empty());
        assert!(search("l_h").await.is_empty());
        assert_eq!(
            search("A_t").await,
            vec![ShortUser {
                id: 2,
                login: "beta_Tester".into()
            }]
        );
    }

    fn ids(users: &[ShortUser]) -> Vec<i64> {
        users.iter().map(|u| u.id).collect()
    }
}
