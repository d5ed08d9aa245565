use thiserror::Error;

#[derive(Debug, Error)]
pub enum InvoiceError {
    #[error("render service returned HTTP {status}")]
    RenderStatus { status: u16 },

    #[error("render service returned non-binary content ({0})")]
    UnexpectedContentType(String),

    #[error("render service returned an empty document")]
    EmptyArtifact,

    #[error("invalid render endpoint '{0}': must be an http(s) URL")]
    InvalidEndpoint(String),

    #[error("stored value for '{key}' is malformed: {source}")]
    CorruptStore {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
