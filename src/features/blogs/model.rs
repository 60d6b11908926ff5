use derive_more::derive::Display;
use serde::{Deserialize, Serialize};

/// One blog entry as it appears in the backing JSON array. Field names are
/// fixed by the content schema and round-trip unchanged; the HTML body lives
/// in a separate per-blog file keyed by `id`.
#[derive(Clone, Debug, Display, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[display("{} ({})", title, id)]
pub struct Blog {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub published_date: String,
    #[serde(default)]
    pub external_link: String,
}
