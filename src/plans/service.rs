use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::info;

use crate::plans::payload::{self, PlanItem};
use crate::plans::repo::{self, Plan};

pub fn now_millis() -> String {
    (OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000).to_string()
}

/// Save-or-update for (user_id, tag): an existing plan keeps its id and gets
/// aktualisiertAm set to now; a first save inserts with a generated id and a
/// null aktualisiertAm. Lookup and upsert run sequentially within this call,
/// so a single save never races itself; two concurrent saves for the same
/// pair can still both insert (documented race, not defended against).
///
/// The remote mirror write is the caller's second, independent call; it is
/// not part of this operation.
pub async fn save_plan(
    db: &SqlitePool,
    user_id: i64,
    tag: &str,
    items: &[PlanItem],
) -> anyhow::Result<Plan> {
    let existing = repo::find_by_user_and_tag(db, user_id, tag).await?;
    let now = now_millis();
    let mut plan = Plan {
        id: existing.as_ref().map(|p| p.id).unwrap_or(0),
        tag: tag.to_string(),
        erstellt_am: now.clone(),
        aktualisiert_am: existing.is_some().then(|| now.clone()),
        daten_json: payload::render_payload(items)?,
        user_id,
    };
    plan.id = repo::insert_or_replace(db, &plan).await?;
    info!(user_id, tag, plan_id = plan.id, "plan saved");
    Ok(plan)
}

/// Login hydration: insert-or-replace each given plan sequentially. The
/// first failure propagates and the remainder is not attempted.
pub async fn import_plans(db: &SqlitePool, plans: &[Plan]) -> anyhow::Result<usize> {
    for plan in plans {
        repo::insert_or_replace(db, plan).await?;
    }
    Ok(plans.len())
}

pub async fn delete_plan(db: &SqlitePool, plan: &Plan) -> anyhow::Result<()> {
    repo::delete(db, plan).await
}
