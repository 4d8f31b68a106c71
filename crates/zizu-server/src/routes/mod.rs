pub mod chat;
pub mod leads;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().merge(chat::router()).merge(leads::router())
}
