use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod payload;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::plan_routes()
}
