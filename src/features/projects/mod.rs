pub mod model;
pub mod repo;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use super::ListQuery;
use crate::error::ContentError;
use crate::AppState;
use model::Project;

pub fn projects_router() -> Router<AppState> {
    Router::new().route("/", get(list_projects_handler))
}

async fn list_projects_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Project>>, ContentError> {
    let projects = state.projects.all(query.limit)?;
    Ok(Json(projects.to_vec()))
}
