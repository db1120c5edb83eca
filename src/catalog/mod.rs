use crate::state::AppState;
use axum::Router;

pub mod handlers;
pub mod importer;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::catalog_routes()
}
