use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

use super::model::Blog;
use crate::cache::ContentCache;
use crate::config::AtriumConfig;
use crate::error::ContentError;
use crate::services::toc::{BlogProvider, BlogSummary};

/// Content accessor for blog entries: metadata comes through the cache,
/// pre-rendered HTML bodies are read straight from `{blog_html_dir}/{id}.html`.
pub struct BlogRepository {
    cache: ContentCache<Blog>,
    blog_html_dir: PathBuf,
}

impl BlogRepository {
    pub fn new(config: &AtriumConfig) -> Self {
        Self {
            cache: ContentCache::new(config.blogs_json.clone(), config.cache_ttl, "blog"),
            blog_html_dir: config.blog_html_dir.clone(),
        }
    }

    /// All blog entries in backing-file order; `limit` trims the view.
    pub fn all(&self, limit: Option<usize>) -> Result<Arc<[Blog]>, ContentError> {
        self.cache.get(limit)
    }

    pub fn by_id(&self, id: &str) -> Result<Blog, ContentError> {
        let blogs = self.cache.get(None)?;
        blogs
            .iter()
            .find(|blog| blog.id == id)
            .cloned()
            .ok_or_else(|| ContentError::UnknownContentId { id: id.to_string() })
    }

    /// The pre-rendered HTML body for a blog.
    pub fn html_content(&self, id: &str) -> Result<String, ContentError> {
        let path = self.blog_html_dir.join(format!("{id}.html"));
        fs::read_to_string(&path).map_err(|err| ContentError::SourceUnavailable {
            name: "blog content",
            path,
            source: Arc::new(err),
        })
    }

    pub fn set_cache_disabled(&self, disabled: bool) {
        self.cache.set_disabled(disabled);
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub fn source_path(&self) -> &Path {
        self.cache.source_path()
    }
}

#[async_trait]
impl BlogProvider for BlogRepository {
    async fn all_blogs(&self) -> Result<Vec<BlogSummary>, ContentError> {
        let blogs = self.cache.get(None)?;
        Ok(blogs
            .iter()
            .map(|blog| BlogSummary {
                id: blog.id.clone(),
                title: blog.title.clone(),
            })
            .collect())
    }

    async fn blog_content(&self, blog_id: &str) -> Result<String, ContentError> {
        self.html_content(blog_id)
    }
}
