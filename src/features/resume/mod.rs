pub mod model;
pub mod repo;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use super::ListQuery;
use crate::error::ContentError;
use crate::AppState;
use model::WorkExperience;

pub fn resume_router() -> Router<AppState> {
    Router::new().route("/", get(list_work_experience_handler))
}

async fn list_work_experience_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<WorkExperience>>, ContentError> {
    let entries = state.resume.all(query.limit)?;
    Ok(Json(entries.to_vec()))
}
