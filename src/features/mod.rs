pub mod blogs;
pub mod certifications;
pub mod projects;
pub mod resume;
pub mod watcher;

use serde::Deserialize;

/// Query parameters shared by the list endpoints. `limit` trims the returned
/// view; the cached data underneath is never truncated.
#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}
