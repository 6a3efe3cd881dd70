use crate::config::keys::{ConfigKey, CONFIG_KEYS};
use clap::Parser;
use std::collections::HashMap;
use std::ffi::OsString;

/// Flags given on the command line, keyed by the setting they override.
pub type FlagMap = HashMap<ConfigKey, String>;

/// kintone MCP server: every flag overrides the matching environment variable.
#[derive(Parser, Debug, Default, Clone)]
#[command(name = "kintone-mcp-server", version)]
pub struct CliArgs {
    /// kintone base URL [env: KINTONE_BASE_URL]
    #[arg(long, value_name = "URL", allow_hyphen_values = true)]
    pub base_url: Option<String>,

    /// Login name for password authentication [env: KINTONE_USERNAME]
    #[arg(long, value_name = "NAME", allow_hyphen_values = true)]
    pub username: Option<String>,

    /// Password for password authentication [env: KINTONE_PASSWORD]
    #[arg(long, value_name = "PASSWORD", allow_hyphen_values = true)]
    pub password: Option<String>,

    /// Comma-separated API tokens (max 9) [env: KINTONE_API_TOKEN]
    #[arg(long, value_name = "TOKENS", allow_hyphen_values = true)]
    pub api_token: Option<String>,

    /// Basic authentication user [env: KINTONE_BASIC_AUTH_USERNAME]
    #[arg(long, value_name = "NAME", allow_hyphen_values = true)]
    pub basic_auth_username: Option<String>,

    /// Basic authentication password [env: KINTONE_BASIC_AUTH_PASSWORD]
    #[arg(long, value_name = "PASSWORD", allow_hyphen_values = true)]
    pub basic_auth_password: Option<String>,

    /// Client certificate in PFX format [env: KINTONE_PFX_FILE_PATH]
    #[arg(long, value_name = "FILE", allow_hyphen_values = true)]
    pub pfx_file_path: Option<String>,

    /// Password of the client certificate [env: KINTONE_PFX_FILE_PASSWORD]
    #[arg(long, value_name = "PASSWORD", allow_hyphen_values = true)]
    pub pfx_file_password: Option<String>,

    /// HTTPS proxy URL [env: HTTPS_PROXY, https_proxy]
    #[arg(long, value_name = "URL", allow_hyphen_values = true)]
    pub proxy: Option<String>,

    /// Directory for downloaded attachments [env: KINTONE_ATTACHMENTS_DIR]
    #[arg(long, value_name = "DIR", allow_hyphen_values = true)]
    pub attachments_dir: Option<String>,
}

impl CliArgs {
    pub fn value(&self, key: ConfigKey) -> Option<&str> {
        let slot = match key {
            ConfigKey::BaseUrl => &self.base_url,
            ConfigKey::Username => &self.username,
            ConfigKey::Password => &self.password,
            ConfigKey::ApiToken => &self.api_token,
            ConfigKey::BasicAuthUsername => &self.basic_auth_username,
            ConfigKey::BasicAuthPassword => &self.basic_auth_password,
            ConfigKey::PfxFilePath => &self.pfx_file_path,
            ConfigKey::PfxFilePassword => &self.pfx_file_password,
            ConfigKey::HttpsProxy => &self.proxy,
            ConfigKey::AttachmentsDir => &self.attachments_dir,
        };
        slot.as_deref()
    }

    pub fn to_flag_map(&self) -> FlagMap {
        CONFIG_KEYS
            .iter()
            .filter_map(|key| self.value(*key).map(|value| (*key, value.to_string())))
            .collect()
    }
}

/// Parses a full argv (program name first) into the flags that were actually given.
pub fn parse_flags<I, T>(argv: I) -> Result<FlagMap, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args = CliArgs::try_parse_from(argv)?;
    Ok(args.to_flag_map())
}
