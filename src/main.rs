use std::sync::Arc;

use axum::Router;
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::AtriumConfig;
use crate::features::blogs::repo::BlogRepository;
use crate::features::certifications::repo::CertificationRepository;
use crate::features::projects::repo::ProjectRepository;
use crate::features::resume::repo::WorkExperienceRepository;
use crate::features::watcher::{start_content_watcher, WatchedSource};
use crate::services::toc::TocService;

pub mod cache;
pub mod config;
pub mod error;
mod features;
mod services;
#[cfg(test)]
mod tests;

/// Shared handler state: one repository (and one cache instance) per content
/// type, plus the table-of-contents service.
#[derive(Clone)]
pub struct AppState {
    pub blogs: Arc<BlogRepository>,
    pub projects: Arc<ProjectRepository>,
    pub certifications: Arc<CertificationRepository>,
    pub resume: Arc<WorkExperienceRepository>,
    pub toc: Arc<TocService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // determine environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // load centralized config
    let config = Arc::new(AtriumConfig::from_env());

    // one cache-backed repository per content type, each with its own
    // TTL ticker
    let blogs = Arc::new(BlogRepository::new(&config));
    let projects = Arc::new(ProjectRepository::new(&config));
    let certifications = Arc::new(CertificationRepository::new(&config));
    let resume = Arc::new(WorkExperienceRepository::new(&config));
    let toc = Arc::new(TocService::new(config.toc_dir.clone()));

    if !config.cache_enabled {
        info!("content caching disabled by configuration");
        blogs.set_cache_disabled(true);
        projects.set_cache_disabled(true);
        certifications.set_cache_disabled(true);
        resume.set_cache_disabled(true);
    }

    // pre-generate every blog's table of contents before serving; during
    // development they are synthesized lazily on first request instead
    if config.is_production() {
        if let Err(err) = toc.generate_all(blogs.as_ref()).await {
            error!(error = %err, "table of contents pre-generation failed");
        }
    }

    // start the background content watcher so out-of-band edits invalidate
    // the matching cache without waiting for the TTL
    if config.content_dir.exists() {
        let watched = vec![
            WatchedSource {
                label: "blog",
                path: blogs.source_path().to_path_buf(),
                invalidate: {
                    let repo = blogs.clone();
                    Arc::new(move || repo.clear_cache())
                },
            },
            WatchedSource {
                label: "project",
                path: projects.source_path().to_path_buf(),
                invalidate: {
                    let repo = projects.clone();
                    Arc::new(move || repo.clear_cache())
                },
            },
            WatchedSource {
                label: "certification",
                path: certifications.source_path().to_path_buf(),
                invalidate: {
                    let repo = certifications.clone();
                    Arc::new(move || repo.clear_cache())
                },
            },
            WatchedSource {
                label: "work experience",
                path: resume.source_path().to_path_buf(),
                invalidate: {
                    let repo = resume.clone();
                    Arc::new(move || repo.clear_cache())
                },
            },
        ];
        start_content_watcher(watched, config.content_dir.clone());
    } else {
        warn!(
            content_dir = %config.content_dir.display(),
            "content directory does not exist, watcher not started"
        );
    }

    let state = AppState {
        blogs,
        projects,
        certifications,
        resume,
        toc,
    };

    // api router, where features are composed
    let mut api_router = Router::new()
        .nest("/projects", features::projects::projects_router())
        .nest(
            "/certifications",
            features::certifications::certifications_router(),
        )
        .nest("/resume", features::resume::resume_router());
    if config.display_blogs {
        api_router = api_router.nest("/blogs", features::blogs::blogs_router());
    }

    let app = Router::new()
        .nest("/api", api_router)
        .fallback_service(ServeDir::new(config.static_dir.clone()))
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
