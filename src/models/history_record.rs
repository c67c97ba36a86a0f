use super::release::{Asset, Release, null_as_default};

/// One entry of the persisted history file.
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct HistoryRecord {
    pub tag_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assets: Vec<Asset>,
}

impl From<&Release> for HistoryRecord {
    fn from(release: &Release) -> Self {
        HistoryRecord {
            tag_name: release.tag_name.clone(),
            published_at: release.published_at.clone(),
            html_url: release.html_url.clone(),
            assets: release.assets.clone(),
        }
    }
}
