mod client_error;
mod config_error;

pub use client_error::{AgentError, ClientError};
pub use config_error::{ConfigError, ValidationErrors};
