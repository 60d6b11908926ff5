use std::path::Path;
use std::sync::Arc;

use super::model::Project;
use crate::cache::ContentCache;
use crate::config::AtriumConfig;
use crate::error::ContentError;

/// Content accessor for portfolio projects.
pub struct ProjectRepository {
    cache: ContentCache<Project>,
}

impl ProjectRepository {
    pub fn new(config: &AtriumConfig) -> Self {
        Self {
            cache: ContentCache::new(config.projects_json.clone(), config.cache_ttl, "project"),
        }
    }

    pub fn all(&self, limit: Option<usize>) -> Result<Arc<[Project]>, ContentError> {
        self.cache.get(limit)
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
