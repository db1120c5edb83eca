use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// User record in the local store. The id is caller-assigned: the next
/// integer after the current local maximum, or an id recovered from the
/// remote store when an existing account lands on a fresh install.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub vorname: String,
    pub nachname: String,
    pub phone: String,
    pub geburtstag: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
}

impl User {
    pub async fn find_by_email(db: &SqlitePool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, vorname, nachname, phone, geburtstag, password_hash
            FROM users
            WHERE email = ?1
            LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &SqlitePool, id: i64) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, vorname, nachname, phone, geburtstag, password_hash
            FROM users
            WHERE id = ?1
            LIMIT 1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Current maximum user id, None on an empty table. Used for next-id
    /// allocation at registration.
    pub async fn max_id(db: &SqlitePool) -> anyhow::Result<Option<i64>> {
        let max: Option<i64> = sqlx::query_scalar(r#"SELECT MAX(id) FROM users"#)
            .fetch_one(db)
            .await?;
        Ok(max)
    }

    pub async fn insert(db: &SqlitePool, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO users (id, email, vorname, nachname, phone, geburtstag, password_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.vorname)
        .bind(&user.nachname)
        .bind(&user.phone)
        .bind(&user.geburtstag)
        .bind(&user.password_hash)
        .execute(db)
        .await?;
        Ok(())
    }

    /// Full-replace update by id.
    pub async fn update(db: &SqlitePool, user: &User) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET email = ?2, vorname = ?3, nachname = ?4, phone = ?5, geburtstag = ?6, password_hash = ?7
            WHERE id = ?1
            "#,
        )
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.vorname)
        .bind(&user.nachname)
        .bind(&user.phone)
        .bind(&user.geburtstag)
        .bind(&user.password_hash)
        .execute(db)
        .await?;
        Ok(())
    }
}
