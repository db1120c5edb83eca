use serde::{Deserialize, Serialize};
use sqlx::{FromRow, SqlitePool};

/// Catalog record. The four nutrient fields hold decimal-formatted text with
/// one fractional digit so that nutrient math off reconstructed plan
/// payloads reproduces the same formatting.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Lebensmittel {
    pub id: i64,
    pub gruppe: String,
    pub produkt: String,
    pub kalorien: String,
    pub fett: String,
    pub eiweiss: String,
    pub kohlenhydrate: String,
    pub glyk_index: i64,
}

pub async fn delete_all(db: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(r#"DELETE FROM lebensmittel"#).execute(db).await?;
    Ok(())
}

pub async fn insert_all(db: &SqlitePool, items: &[Lebensmittel]) -> anyhow::Result<()> {
    for item in items {
        sqlx::query(
            r#"
            INSERT INTO lebensmittel (gruppe, produkt, kalorien, fett, eiweiss, kohlenhydrate, glyk_index)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&item.gruppe)
        .bind(&item.produkt)
        .bind(&item.kalorien)
        .bind(&item.fett)
        .bind(&item.eiweiss)
        .bind(&item.kohlenhydrate)
        .bind(item.glyk_index)
        .execute(db)
        .await?;
    }
    Ok(())
}

/// Replaces the whole catalog. Delete and insert run as separate statements;
/// the catalog is reproducible from the bundled file on the next start.
pub async fn replace_all(db: &SqlitePool, items: &[Lebensmittel]) -> anyhow::Result<()> {
    delete_all(db).await?;
    insert_all(db, items).await?;
    Ok(())
}

/// Case-insensitive substring search by product name. The empty query
/// matches everything and doubles as "load the whole catalog".
pub async fn search_by_produkt(db: &SqlitePool, query: &str) -> anyhow::Result<Vec<Lebensmittel>> {
    let rows = sqlx::query_as::<_, Lebensmittel>(
        r#"
        SELECT id, gruppe, produkt, kalorien, fett, eiweiss, kohlenhydrate, glyk_index
        FROM lebensmittel
        WHERE produkt LIKE '%' || ?1 || '%'
        "#,
    )
    .bind(query)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
