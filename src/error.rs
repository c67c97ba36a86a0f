use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected status {status} from {url}")]
    Status { status: u16, url: String },

    #[error("failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("failed to access {}, {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no release could be resolved as latest")]
    NoLatestRelease,

    #[error("release {0} not found")]
    TagNotFound(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(e: serde_yaml::Error) -> Self {
        Error::Config(e.to_string())
    }
}
