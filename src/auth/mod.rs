use crate::state::AppState;
use axum::Router;

pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod password;
pub mod repo;
pub mod token;

pub fn router() -> Router<AppState> {
    handlers::user_routes()
}
