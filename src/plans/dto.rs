use serde::{Deserialize, Serialize};

use crate::plans::payload::{self, PlanItem, PlanTotals};
use crate::plans::repo::Plan;

/// Request body for saving a day's plan.
#[derive(Debug, Deserialize)]
pub struct SavePlanRequest {
    pub tag: String,
    pub items: Vec<PlanItem>,
}

/// A plan as shown in the saved-plans list: stored row plus the parsed line
/// items and their totals row.
#[derive(Debug, Serialize)]
pub struct PlanResponse {
    pub id: i64,
    pub tag: String,
    #[serde(rename = "erstelltAm")]
    pub erstellt_am: String,
    #[serde(rename = "aktualisiertAm")]
    pub aktualisiert_am: Option<String>,
    #[serde(rename = "userId")]
    pub user_id: i64,
    pub items: Vec<PlanItem>,
    pub totals: PlanTotals,
}

impl From<Plan> for PlanResponse {
    fn from(plan: Plan) -> Self {
        let items = payload::parse_payload(&plan.daten_json);
        let totals = payload::totals(&items);
        Self {
            id: plan.id,
            tag: plan.tag,
            erstellt_am: plan.erstellt_am,
            aktualisiert_am: plan.aktualisiert_am,
            user_id: plan.user_id,
            items,
            totals,
        }
    }
}
