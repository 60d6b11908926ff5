pub mod model;
pub mod repo;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};

use super::ListQuery;
use crate::error::ContentError;
use crate::AppState;
use model::Certification;

pub fn certifications_router() -> Router<AppState> {
    Router::new().route("/", get(list_certifications_handler))
}

async fn list_certifications_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Certification>>, ContentError> {
    let certifications = state.certifications.all(query.limit)?;
    Ok(Json(certifications.to_vec()))
}
