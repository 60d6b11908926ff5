use serde::{Deserialize, Serialize};

/// One professional certification from the backing JSON array.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certification {
    pub name: String,
    pub issuer: String,
    pub date_received: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub credly_url: String,
}
