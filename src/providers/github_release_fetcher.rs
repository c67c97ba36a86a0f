use std::time::Duration;

use reqwest::{StatusCode, header};
use serde::de::DeserializeOwned;

use crate::error::{Error, Result};
use crate::models::configuration::Configuration;
use crate::models::release::Release;

use super::release_fetcher::ReleaseFetcher;

pub const METADATA_TIMEOUT: Duration = Duration::from_secs(30);

pub struct GithubReleaseFetcher {
    client: reqwest::Client,
    releases_url: String,
    per_page: u32,
}

impl GithubReleaseFetcher {
    pub fn new(configuration: &Configuration) -> Result<GithubReleaseFetcher> {
        Ok(GithubReleaseFetcher {
            client: build_client(configuration)?,
            releases_url: configuration.releases_url(),
            per_page: configuration.per_page,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .timeout(METADATA_TIMEOUT)
            .send()
            .await?;
        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(url.to_string())),
            status if !status.is_success() => Err(Error::Status {
                status: status.as_u16(),
                url: url.to_string(),
            }),
            _ => {
                let bytes = response.bytes().await?;
                Ok(serde_json::from_slice(&bytes)?)
            }
        }
    }
}

/// Client shared by metadata calls and asset downloads. Carries the
/// identifying headers and, when a token is configured, the bearer token.
pub fn build_client(configuration: &Configuration) -> Result<reqwest::Client> {
    let mut headers = header::HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        header::HeaderValue::from_static("application/vnd.github.v3+json"),
    );
    if let Some(token) = &configuration.token {
        let mut value = header::HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| Error::Config(format!("invalid token: {}", e)))?;
        value.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, value);
    }
    let client = reqwest::Client::builder()
        .user_agent(configuration.user_agent.clone())
        .default_headers(headers)
        .build()?;
    Ok(client)
}

impl ReleaseFetcher for GithubReleaseFetcher {
    async fn list_all_releases(&self) -> Vec<Release> {
        let mut releases = Vec::new();
        let mut page = 1;
        loop {
            let url = format!(
                "{}?per_page={}&page={}",
                self.releases_url, self.per_page, page
            );
            match self.get_json::<Vec<Release>>(&url).await {
                Ok(batch) if batch.is_empty() => break,
                Ok(batch) => {
                    releases.extend(batch);
                    page += 1;
                }
                Err(Error::NotFound(_)) => break,
                Err(e) => {
                    tracing::warn!("Failed to list releases on page {}: {}", page, e);
                    break;
                }
            }
        }
        releases
    }

    async fn get_latest_release(&self) -> Option<Release> {
        let url = format!("{}/latest", self.releases_url);
        match self.get_json::<Release>(&url).await {
            Ok(release) => Some(release),
            Err(Error::NotFound(_)) => {
                tracing::info!("No release marked latest, falling back to the release list");
                self.list_all_releases().await.into_iter().next()
            }
            Err(e) => {
                tracing::warn!("Failed to fetch latest release: {}", e);
                None
            }
        }
    }

    async fn get_release_by_tag(&self, tag: &str) -> Option<Release> {
        let url = format!("{}/tags/{}", self.releases_url, tag);
        match self.get_json::<Release>(&url).await {
            Ok(release) => Some(release),
            Err(e) => {
                tracing::warn!("Failed to fetch release {}: {}", tag, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RELEASES_PATH: &str = "/repos/octo/widgets/releases";

    fn configuration(server: &MockServer, token: Option<&str>) -> Configuration {
        Configuration {
            owner: "octo".to_string(),
            repo: "widgets".to_string(),
            api_base_url: server.uri(),
            per_page: 2,
            ..Configuration::default()
        }
        .with_environment(token.map(str::to_string), None)
        .unwrap()
    }

    fn release_json(tag: &str) -> serde_json::Value {
        json!({
            "tag_name": tag,
            "published_at": "2024-03-01T10:00:00Z",
            "html_url": format!("https://github.com/octo/widgets/releases/{}", tag),
            "body": "notes",
            "assets": [
                {"name": "app.zip", "browser_download_url": "https://example.com/app.zip", "size": 3}
            ]
        })
    }

    async fn mount_page(server: &MockServer, page: &str, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .and(query_param("page", page))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_list_all_releases_follows_pages_until_empty() {
        // Arrange
        let server = MockServer::start().await;
        mount_page(&server, "1", json!([release_json("v3"), release_json("v2")])).await;
        mount_page(&server, "2", json!([release_json("v1")])).await;
        mount_page(&server, "3", json!([])).await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        // Act
        let releases = fetcher.list_all_releases().await;

        // Assert
        let tags: Vec<_> = releases.iter().map(|r| r.tag_name.as_str()).collect();
        assert_eq!(tags, vec!["v3", "v2", "v1"]);
        assert_eq!(releases[0].assets[0].name, "app.zip");
    }

    #[tokio::test]
    async fn test_list_all_releases_keeps_partial_results_on_error() {
        // Arrange
        let server = MockServer::start().await;
        mount_page(&server, "1", json!([release_json("v3"), release_json("v2")])).await;
        Mock::given(method("GET"))
            .and(path(RELEASES_PATH))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        // Act
        let releases = fetcher.list_all_releases().await;

        // Assert
        assert_eq!(releases.len(), 2);
    }

    #[tokio::test]
    async fn test_list_all_releases_stops_on_not_found() {
        let server = MockServer::start().await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        let releases = fetcher.list_all_releases().await;

        assert!(releases.is_empty());
    }

    #[tokio::test]
    async fn test_get_latest_release_sends_token() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/latest", RELEASES_PATH)))
            .and(header("authorization", "Bearer secret"))
            .and(header("accept", "application/vnd.github.v3+json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(release_json("v9")))
            .mount(&server)
            .await;
        let fetcher =
            GithubReleaseFetcher::new(&configuration(&server, Some("secret"))).unwrap();

        // Act
        let release = fetcher.get_latest_release().await;

        // Assert
        assert_eq!(release.unwrap().tag_name, "v9");
    }

    #[tokio::test]
    async fn test_get_latest_release_falls_back_to_list() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/latest", RELEASES_PATH)))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        mount_page(&server, "1", json!([release_json("v2-beta"), release_json("v1-beta")])).await;
        mount_page(&server, "2", json!([])).await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        // Act
        let release = fetcher.get_latest_release().await;

        // Assert
        assert_eq!(release.unwrap().tag_name, "v2-beta");
    }

    #[tokio::test]
    async fn test_get_latest_release_none_when_no_releases() {
        let server = MockServer::start().await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        assert!(fetcher.get_latest_release().await.is_none());
    }

    #[tokio::test]
    async fn test_get_latest_release_none_on_server_error() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/latest", RELEASES_PATH)))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        // Act & Assert
        assert!(fetcher.get_latest_release().await.is_none());
    }

    #[tokio::test]
    async fn test_get_release_by_tag() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/tags/v1.2.0", RELEASES_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_json(release_json("v1.2.0")))
            .mount(&server)
            .await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        // Act
        let found = fetcher.get_release_by_tag("v1.2.0").await;
        let missing = fetcher.get_release_by_tag("v0.0.1").await;

        // Assert
        assert_eq!(found.unwrap().html_url, "https://github.com/octo/widgets/releases/v1.2.0");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_get_json_reports_parse_errors() {
        // Arrange
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("{}/latest", RELEASES_PATH)))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;
        let fetcher = GithubReleaseFetcher::new(&configuration(&server, None)).unwrap();

        // Act
        let result = fetcher
            .get_json::<Release>(&format!("{}/latest", fetcher.releases_url))
            .await;

        // Assert
        assert!(matches!(result, Err(Error::Parse(_))));
    }
}
