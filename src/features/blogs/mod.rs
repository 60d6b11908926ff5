pub mod model;
pub mod repo;

use axum::extract::{Path, Query, State};
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};

use super::ListQuery;
use crate::error::ContentError;
use crate::AppState;
use model::Blog;

pub fn blogs_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_blogs_handler))
        .route("/{blog_id}", get(get_blog_handler))
        .route("/{blog_id}/content", get(blog_content_handler))
        .route("/{blog_id}/toc", get(blog_toc_handler))
}

async fn list_blogs_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Blog>>, ContentError> {
    let blogs = state.blogs.all(query.limit)?;
    Ok(Json(blogs.to_vec()))
}

async fn get_blog_handler(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Json<Blog>, ContentError> {
    Ok(Json(state.blogs.by_id(&blog_id)?))
}

async fn blog_content_handler(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Html<String>, ContentError> {
    // resolve the id through the cache first so an unknown id is a 404, not
    // a file error
    state.blogs.by_id(&blog_id)?;
    Ok(Html(state.blogs.html_content(&blog_id)?))
}

async fn blog_toc_handler(
    State(state): State<AppState>,
    Path(blog_id): Path<String>,
) -> Result<Html<String>, ContentError> {
    let toc = state
        .toc
        .get_or_generate(&blog_id, state.blogs.as_ref())
        .await?;
    Ok(Html(toc))
}
