//! Profiles shared by database tests.

use sqlx::{Pool, Postgres};

use crate::database::Database;
use crate::user::{LocalUser, UserRepository};

pub(crate) fn profile(id: i64, name: &str) -> LocalUser {
    LocalUser {
        account_id: id,
        account_name: name.into(),
        account_names: vec![format!("{name}_old")],
        avatar: format!("https://cdn.example/{id}.png"),
        background: "night".into(),
        vip: "gold".into(),
        social_credits: 99.5,
        kills: id * 10,
        deaths: id,
        cop_chase_rating: 1000 + id,
        punishments: vec!["warn".into(), "mute".into()],
        verification: "verified".into(),
        achievement: "veteran".into(),
        telegram: format!("@{name}"),
        prefix: "[T]".into(),
        star: "1".into(),
        application_verification: "approved".into(),
    }
}

/// Create the table and insert ids 1, 2, 3, 12 and 21.
pub(crate) async fn seeded(pool: Pool<Postgres>) -> UserRepository {
    Database::from_pool(pool.clone())
        .ensure_schema()
        .await
        .unwrap();
    let repo = UserRepository::new(pool);
    for (id, name) in [
        (1, "Alpha"),
        (2, "beta_Tester"),
        (3, "Gamma"),
        (12, "delta"),
        (21, "ALPHARD"),
    ] {
        repo.insert(&profile(id, name)).await.unwrap();
    }
    repo
}
