mod repository;
mod service;
#[cfg(test)]
pub(crate) mod fixtures;

pub use repository::*;
pub use service::*;

use serde::{Deserialize, Serialize};

/// Profile as saved on database.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct LocalUser {
    pub account_id: i64,
    pub account_name: String,
    /// Previous nicknames.
    #[sqlx(json)]
    pub account_names: Vec<String>,
    pub avatar: String,
    pub background: String,
    pub vip: String,
    pub social_credits: f64,
    pub kills: i64,
    pub deaths: i64,
    pub cop_chase_rating: i64,
    #[sqlx(json)]
    pub punishments: Vec<String>,
    pub verification: String,
    pub achievement: String,
    pub telegram: String,
    pub prefix: String,
    pub star: String,
    pub application_verification: String,
}

/// User as returned by the game-server API.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamUser {
    pub id: i64,
    pub login: String,
    pub access: i64,
    pub moder: i64,
    pub verify: i64,
    #[serde(rename = "verifyText")]
    pub verify_text: String,
    pub mute: i64,
    pub online: i64,
    #[serde(rename = "playerid")]
    pub player_id: i64,
    #[serde(rename = "regdate")]
    pub reg_date: String,
    #[serde(rename = "lastlogin")]
    pub last_login: String,
    /// `null` upstream is kept as `null`.
    pub warn: Option<Vec<Warn>>,
}

/// Warning attached to an [`UpstreamUser`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Warn {
    pub reason: String,
    pub admin: String,
    #[serde(rename = "bantime")]
    pub ban_time: String,
}

/// `GET /user/{name}` upstream body.
#[derive(Debug, Default, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub data: UpstreamUser,
}

/// [`UpstreamUser`] enriched with its [`LocalUser`] profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LongUser {
    pub id: i64,
    pub login: String,
    pub access: i64,
    pub moder: i64,
    pub verify: i64,
    #[serde(rename = "verifyText")]
    pub verify_text: String,
    pub mute: i64,
    pub online: i64,
    #[serde(rename = "playerid")]
    pub player_id: i64,
    #[serde(rename = "regdate")]
    pub reg_date: String,
    #[serde(rename = "lastlogin")]
    pub last_login: String,
    pub warn: Option<Vec<Warn>>,
    pub avatar: String,
    pub background: String,
    pub vip: String,
    pub social_credits: f64,
    pub kills: i64,
    pub deaths: i64,
    pub cop_chase_rating: i64,
    pub punishments: Vec<String>,
    pub achievement: String,
    pub telegram: String,
    pub prefix: String,
    pub star: String,
    pub application_verification: String,
}

impl LongUser {
    /// Merge field-by-field. Identity comes from `upstream`, display data
    /// from `profile`.
    pub fn merge(upstream: UpstreamUser, profile: LocalUser) -> Self {
        Self {
            id: upstream.id,
            login: upstream.login,
            access: upstream.access,
            moder: upstream.moder,
            verify: upstream.verify,
            verify_text: upstream.verify_text,
            mute: upstream.mute,
            online: upstream.online,
            player_id: upstream.player_id,
            reg_date: upstream.reg_date,
            last_login: upstream.last_login,
            warn: upstream.warn,
            avatar: profile.avatar,
            background: profile.background,
            vip: profile.vip,
            social_credits: profile.social_credits,
            kills: profile.kills,
            deaths: profile.deaths,
            cop_chase_rating: profile.cop_chase_rating,
            punishments: profile.punishments,
            achievement: profile.achievement,
            telegram: profile.telegram,
            prefix: profile.prefix,
            star: profile.star,
            application_verification: profile.application_verification,
        }
    }
}

/// Search result row.
#[derive(
    Clone, Debug, Default, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct ShortUser {
    #[sqlx(rename = "account_id")]
    pub id: i64,
    #[sqlx(rename = "account_name")]
    pub login: String,
}

/// Answer of a nickname lookup.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Profile {
    /// Upstream user with a local profile.
    Long(Box<LongUser>),
    /// Upstream user without local profile.
    Upstream(UpstreamUser),
}
