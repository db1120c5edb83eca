use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tracing::{error, instrument};

use crate::catalog::repo::{self, Lebensmittel};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

pub fn catalog_routes() -> Router<AppState> {
    Router::new().route("/lebensmittel", get(search))
}

#[instrument(skip(state))]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<Lebensmittel>>, (StatusCode, String)> {
    let items = repo::search_by_produkt(&state.db, &params.query)
        .await
        .map_err(|e| {
            error!(error = %e, "catalog search failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(items))
}
