use std::path::Path;
use std::sync::Arc;

use super::model::WorkExperience;
use crate::cache::ContentCache;
use crate::config::AtriumConfig;
use crate::error::ContentError;

/// Content accessor for the résumé's work-experience entries.
pub struct WorkExperienceRepository {
    cache: ContentCache<WorkExperience>,
}

impl WorkExperienceRepository {
    pub fn new(config: &AtriumConfig) -> Self {
        Self {
            cache: ContentCache::new(
                config.work_experience_json.clone(),
                config.cache_ttl,
                "work experience",
            ),
        }
    }

    pub fn all(&self, limit: Option<usize>) -> Result<Arc<[WorkExperience]>, ContentError> {
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
