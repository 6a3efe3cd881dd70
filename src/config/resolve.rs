use crate::config::args::parse_flags;
use crate::config::merge::merge;
use crate::config::validate::{validate, KintoneConfig};
use crate::errors::ConfigError;
use crate::utils::redact::redact_object;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::ffi::OsString;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "@", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedConfig {
    pub config: KintoneConfig,
    pub user_agent: String,
    pub is_api_token_auth: bool,
}

impl ResolvedConfig {
    pub fn auth_mode(&self) -> &'static str {
        if self.is_api_token_auth {
            "api_token"
        } else {
            "password"
        }
    }

    /// Operator-facing view with credentials masked.
    pub fn summary(&self) -> Value {
        let proxy = self.config.https_proxy().filter(|p| !p.is_empty());
        let summary = json!({
            "config": self.config,
            "user_agent": self.user_agent,
            "auth_mode": self.auth_mode(),
            "basic_auth": self.config.has_basic_auth(),
            "proxy": proxy,
            "client_certificate": self.config.pfx_file_path().filter(|p| !p.is_empty()),
        });
        redact_object(&summary, usize::MAX)
    }
}

/// Resolves settings from the running process. Re-reads argv and the environment on every call.
pub fn resolve() -> Result<ResolvedConfig, ConfigError> {
    let env: HashMap<String, String> = std::env::vars_os()
        .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?)))
        .collect();
    resolve_from(std::env::args_os(), &env)
}

pub fn resolve_from<I, T>(argv: I, env: &HashMap<String, String>) -> Result<ResolvedConfig, ConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let flags = parse_flags(argv)?;
    let raw = merge(env, &flags);
    let config = validate(&raw)?;

    let has_token = config.api_token().map(|t| !t.is_empty()).unwrap_or(false);
    let is_api_token_auth = !config.has_password_credentials() && has_token;

    Ok(ResolvedConfig {
        config,
        user_agent: USER_AGENT.to_string(),
        is_api_token_auth,
    })
}
