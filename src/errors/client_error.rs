use reqwest::StatusCode;
use thiserror::Error;

/// Failures while assembling the HTTPS transport for the REST client.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Failed to read PFX file: {path}. {cause}")]
    CertificateRead { path: String, cause: String },

    #[error("Invalid HTTPS proxy URL: {url}. {cause}")]
    ProxyInvalid { url: String, cause: String },

    #[error("Failed to load PFX file: {path}. {cause}")]
    CertificateInvalid { path: String, cause: String },
}

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Failed to build HTTP client: {0}")]
    Build(String),

    #[error("kintone request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("kintone API error ({status}) [{code}]: {message}")]
    Api {
        status: StatusCode,
        code: String,
        message: String,
    },
}

impl ClientError {
    /// kintone error code (for example `GAIA_RE01`) when the API answered with one.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            ClientError::Api { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }
}
