pub mod dto;
pub mod handlers;
pub mod memory;
pub mod model;
pub mod nearby;
pub mod repo;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::station_routes()
}
