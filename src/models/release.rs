use serde::{Deserialize, Deserializer};

/// A release as returned by the releases API. Only the fields the keeper
/// uses are kept; everything except `tag_name` may be missing or `null`.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Release {
    pub tag_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub published_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub html_url: String,
    /// `null` when the release has no notes; a missing key reads as
    /// `No description`.
    #[serde(default = "missing_body")]
    pub body: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub assets: Vec<Asset>,
}

fn missing_body() -> Option<String> {
    Some("No description".to_string())
}

/// Drafts come back with `"published_at": null`; treat `null` like a
/// missing key.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_optional_fields_default() {
        let release: Release = serde_json::from_str(r#"{"tag_name": "v1.0.0"}"#).unwrap();

        assert_eq!(release.tag_name, "v1.0.0");
        assert_eq!(release.published_at, "");
        assert_eq!(release.body.as_deref(), Some("No description"));
        assert!(release.assets.is_empty());
    }

    #[test]
    fn test_null_fields_default() {
        let page: Vec<Release> = serde_json::from_str(
            r#"[
                {"tag_name": "v2-draft", "published_at": null, "html_url": null, "assets": null},
                {"tag_name": "v1", "published_at": "2024-01-01T00:00:00Z"}
            ]"#,
        )
        .unwrap();

        assert_eq!(page.len(), 2);
        assert_eq!(page[0].published_at, "");
        assert_eq!(page[0].html_url, "");
        assert!(page[0].assets.is_empty());
        assert_eq!(page[1].published_at, "2024-01-01T00:00:00Z");
    }

    #[test]
    fn test_null_body_is_absent() {
        let release: Release =
            serde_json::from_str(r#"{"tag_name": "v1", "body": null, "extra": 3}"#).unwrap();

        assert!(release.body.is_none());
    }

    #[test]
    fn test_missing_tag_is_a_parse_error() {
        let result = serde_json::from_str::<Release>(r#"{"html_url": "https://x"}"#);

        assert!(result.is_err());
    }
}
