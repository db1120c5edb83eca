use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// A single day's plan. `daten_json` is the serialized line-item array; the
/// (userId, tag) pair is the business key, kept unique by the upsert path in
/// the service layer rather than by a constraint.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Plan {
    pub id: i64,
    pub tag: String,
    #[sqlx(rename = "erstelltAm")]
    #[serde(rename = "erstelltAm")]
    pub erstellt_am: String,
    #[sqlx(rename = "aktualisiertAm")]
    #[serde(rename = "aktualisiertAm")]
    pub aktualisiert_am: Option<String>,
    #[sqlx(rename = "datenJson")]
    #[serde(rename = "datenJson")]
    pub daten_json: String,
    #[sqlx(rename = "userId")]
    #[serde(rename = "userId")]
    pub user_id: i64,
}

/// Insert-or-replace by id. An id of 0 always creates a fresh row and the
/// generated id is returned; any other id overwrites that row.
pub async fn insert_or_replace(db: &SqlitePool, plan: &Plan) -> anyhow::Result<i64> {
    if plan.id == 0 {
        let result = sqlx::query(
            r#"
            INSERT INTO plan (tag, erstelltAm, aktualisiertAm, datenJson, userId)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&plan.tag)
        .bind(&plan.erstellt_am)
        .bind(&plan.aktualisiert_am)
        .bind(&plan.daten_json)
        .bind(plan.user_id)
        .execute(db)
        .await?;
        Ok(result.last_insert_rowid())
    } else {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO plan (id, tag, erstelltAm, aktualisiertAm, datenJson, userId)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(plan.id)
        .bind(&plan.tag)
        .bind(&plan.erstellt_am)
        .bind(&plan.aktualisiert_am)
        .bind(&plan.daten_json)
        .bind(plan.user_id)
        .execute(db)
        .await?;
        Ok(plan.id)
    }
}

/// All plans for a user, unordered; weekday ordering is the caller's job.
pub async fn list_by_user(db: &SqlitePool, user_id: i64) -> anyhow::Result<Vec<Plan>> {
    let rows = sqlx::query_as::<_, Plan>(
        r#"
        SELECT id, tag, erstelltAm, aktualisiertAm, datenJson, userId
        FROM plan
        WHERE userId = ?1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_user_and_tag(
    db: &SqlitePool,
    user_id: i64,
    tag: &str,
) -> anyhow::Result<Option<Plan>> {
    let row = sqlx::query_as::<_, Plan>(
        r#"
        SELECT id, tag, erstelltAm, aktualisiertAm, datenJson, userId
        FROM plan
        WHERE userId = ?1 AND tag = ?2
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(tag)
    .fetch_optional(db)
    .await?;
    Ok(row)
}

pub async fn delete(db: &SqlitePool, plan: &Plan) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM plan WHERE id = ?1 AND userId = ?2"#)
        .bind(plan.id)
        .bind(plan.user_id)
        .execute(db)
        .await?;
    Ok(())
}
