use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Repository identity and local file layout, read once at start-up.
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Configuration {
    pub owner: String,
    pub repo: String,
    #[serde(rename = "apiBaseUrl")]
    pub api_base_url: String,
    #[serde(rename = "userAgent")]
    pub user_agent: String,
    #[serde(rename = "historyPath")]
    pub history_path: PathBuf,
    #[serde(rename = "versionPath")]
    pub version_path: PathBuf,
    #[serde(rename = "reportPath")]
    pub report_path: PathBuf,
    #[serde(rename = "downloadDir")]
    pub download_dir: PathBuf,
    #[serde(rename = "perPage")]
    pub per_page: u32,

    /// Bearer token, taken from `GITHUB_TOKEN`.
    #[serde(skip)]
    pub token: Option<String>,
    /// Key-value sink, taken from `GITHUB_OUTPUT`.
    #[serde(skip)]
    pub output_path: Option<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            owner: "lbjlaq".to_string(),
            repo: "Antigravity-Manager".to_string(),
            api_base_url: "https://api.github.com".to_string(),
            user_agent: "release-keeper".to_string(),
            history_path: PathBuf::from("history.json"),
            version_path: PathBuf::from("VERSION"),
            report_path: PathBuf::from("README.md"),
            download_dir: PathBuf::from("."),
            per_page: 100,
            token: None,
            output_path: None,
        }
    }
}

impl Configuration {
    /// Loads the YAML file at `path`, or the defaults when no path is given,
    /// then applies the environment overlay.
    pub async fn load(path: Option<&str>) -> Result<Configuration> {
        let configuration = match path {
            Some(path) => read_yaml_file(path).await?,
            None => Configuration::default(),
        };
        configuration.with_environment(
            std::env::var("GITHUB_TOKEN").ok(),
            std::env::var("GITHUB_OUTPUT").ok(),
        )
    }

    pub fn with_environment(
        mut self,
        token: Option<String>,
        output_path: Option<String>,
    ) -> Result<Configuration> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(Error::Config("owner and repo must not be empty".into()));
        }
        if self.per_page == 0 {
            return Err(Error::Config("perPage must be positive".into()));
        }
        self.api_base_url = self.api_base_url.trim_end_matches('/').to_string();
        self.history_path = expand(&self.history_path);
        self.version_path = expand(&self.version_path);
        self.report_path = expand(&self.report_path);
        self.download_dir = expand(&self.download_dir);
        self.token = token.filter(|t| !t.trim().is_empty());
        self.output_path = output_path.filter(|p| !p.is_empty()).map(PathBuf::from);
        Ok(self)
    }

    pub fn releases_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base_url, self.owner, self.repo
        )
    }

    pub fn repository_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.repo)
    }
}

async fn read_yaml_file(path: &str) -> Result<Configuration> {
    let file = tokio::fs::read(path)
        .await
        .map_err(|e| Error::io(path, e))?;
    let content =
        String::from_utf8(file).map_err(|e| Error::Config(format!("{}: {}", path, e)))?;
    let configuration: Configuration = serde_yaml::from_str(&content)?;
    Ok(configuration)
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(raw.as_ref()).as_ref())
}
