use std::path::PathBuf;
use std::time::Duration;

/// Centralized configuration, collected once from the environment at
/// startup. The four JSON sources, the pre-rendered blog bodies, and the
/// table-of-contents artifacts all live under `content_dir`.
#[derive(Clone, Debug)]
pub struct AtriumConfig {
    pub server_port: u16,
    pub environment: String,
    pub content_dir: PathBuf,
    pub blogs_json: PathBuf,
    pub projects_json: PathBuf,
    pub certifications_json: PathBuf,
    pub work_experience_json: PathBuf,
    pub blog_html_dir: PathBuf,
    pub toc_dir: PathBuf,
    pub static_dir: PathBuf,
    pub cache_enabled: bool,
    pub cache_ttl: Duration,
    pub display_blogs: bool,
}

impl AtriumConfig {
    pub fn from_env() -> Self {
        let server_port = std::env::var("SERVER_PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(8080);

        let environment =
            std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        let content_dir = PathBuf::from(
            std::env::var("CONTENT_DIR").unwrap_or_else(|_| "./content".to_string()),
        );

        let static_dir = PathBuf::from(
            std::env::var("STATIC_DIR").unwrap_or_else(|_| "./static".to_string()),
        );

        let cache_enabled =
            std::env::var("CACHE_ENABLED").unwrap_or_else(|_| "true".to_string()) == "true";

        // a zero interval would panic the ticker, clamp to one minute
        let cache_ttl_minutes = std::env::var("CACHE_TTL_MINUTES")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(60)
            .max(1);

        let display_blogs =
            std::env::var("DISPLAY_BLOGS").unwrap_or_else(|_| "true".to_string()) == "true";

        Self {
            server_port,
            environment,
            blogs_json: content_dir.join("blogs.json"),
            projects_json: content_dir.join("projects.json"),
            certifications_json: content_dir.join("certifications.json"),
            work_experience_json: content_dir.join("work-experience.json"),
            blog_html_dir: content_dir.join("blog-html"),
            toc_dir: content_dir.join("toc"),
            content_dir,
            static_dir,
            cache_enabled,
            cache_ttl: Duration::from_secs(cache_ttl_minutes * 60),
            display_blogs,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}
