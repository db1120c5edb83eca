use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{repo::User, services::AuthUser},
    plans::{
        dto::{PlanResponse, SavePlanRequest},
        payload, repo, service,
    },
    state::AppState,
};

pub fn plan_routes() -> Router<AppState> {
    Router::new()
        .route("/plans", get(list_plans).post(save_plan))
        .route("/plans/:tag", delete(delete_plan))
}

async fn require_user(state: &AppState, user_id: i64) -> Result<User, (StatusCode, String)> {
    User::find_by_id(&state.db, user_id)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, "find_by_id failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::UNAUTHORIZED, "User not found".to_string()))
}

#[instrument(skip(state, payload))]
pub async fn save_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<SavePlanRequest>,
) -> Result<Json<PlanResponse>, (StatusCode, String)> {
    if payload.items.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "items must be non-empty".into()));
    }
    if !payload::is_weekday(&payload.tag) {
        warn!(tag = %payload.tag, "unknown weekday tag");
        return Err((StatusCode::BAD_REQUEST, "Unknown weekday tag".into()));
    }

    let user = require_user(&state, user_id).await?;

    let plan = service::save_plan(&state.db, user_id, &payload.tag, &payload.items)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, tag = %payload.tag, "save plan failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;

    // Second leg of the dual write. Independent of the local write: a remote
    // failure is logged and the already-persisted local row stands.
    if let Err(e) = state.remote.save_plan(&user.email, &plan).await {
        warn!(error = %e, user_id, tag = %plan.tag, "remote plan mirror failed");
    }

    Ok(Json(plan.into()))
}

#[instrument(skip(state))]
pub async fn list_plans(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<PlanResponse>>, (StatusCode, String)> {
    let mut plans = repo::list_by_user(&state.db, user_id).await.map_err(|e| {
        error!(error = %e, user_id, "list plans failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;
    // The store returns rows unordered; present Montag..Sonntag.
    plans.sort_by_key(|p| payload::weekday_order(&p.tag));
    Ok(Json(plans.into_iter().map(PlanResponse::from).collect()))
}

#[instrument(skip(state))]
pub async fn delete_plan(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(tag): Path<String>,
) -> Result<StatusCode, (StatusCode, String)> {
    let user = require_user(&state, user_id).await?;

    let plan = repo::find_by_user_and_tag(&state.db, user_id, &tag)
        .await
        .map_err(|e| {
            error!(error = %e, user_id, %tag, "plan lookup failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?
        .ok_or((StatusCode::NOT_FOUND, "Plan not found".to_string()))?;

    service::delete_plan(&state.db, &plan).await.map_err(|e| {
        error!(error = %e, user_id, %tag, "delete plan failed");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    // The remote delete targets whatever document the current (email, tag)
    // derives to; deleting a key that no longer exists succeeds vacuously.
    if let Err(e) = state.remote.delete_plan(&user.email, &tag).await {
        warn!(error = %e, user_id, %tag, "remote plan delete failed");
    }

    info!(user_id, %tag, "plan deleted");
    Ok(StatusCode::NO_CONTENT)
}
