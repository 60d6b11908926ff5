use serde::{Deserialize, Serialize};

/// One work-experience entry from the backing JSON array, newest first as
/// stored.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperience {
    pub job_title: String,
    pub company_name: String,
    pub description: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub tags: Vec<String>,
}
