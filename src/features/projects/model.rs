use serde::{Deserialize, Serialize};

/// One portfolio project from the backing JSON array.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    pub description: String,
    pub link: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
