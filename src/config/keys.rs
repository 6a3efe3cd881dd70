use serde::Serialize;

/// A single configuration setting, sourced from a flag or one of its environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ConfigKey {
    BaseUrl,
    Username,
    Password,
    ApiToken,
    BasicAuthUsername,
    BasicAuthPassword,
    PfxFilePath,
    PfxFilePassword,
    HttpsProxy,
    AttachmentsDir,
}

/// Merge order of every key. Environment names are tried left to right after the flag.
pub const CONFIG_KEYS: &[ConfigKey] = &[
    ConfigKey::BaseUrl,
    ConfigKey::Username,
    ConfigKey::Password,
    ConfigKey::ApiToken,
    ConfigKey::BasicAuthUsername,
    ConfigKey::BasicAuthPassword,
    ConfigKey::PfxFilePath,
    ConfigKey::PfxFilePassword,
    ConfigKey::HttpsProxy,
    ConfigKey::AttachmentsDir,
];

impl ConfigKey {
    pub fn env_names(self) -> &'static [&'static str] {
        match self {
            ConfigKey::BaseUrl => &["KINTONE_BASE_URL"],
            ConfigKey::Username => &["KINTONE_USERNAME"],
            ConfigKey::Password => &["KINTONE_PASSWORD"],
            ConfigKey::ApiToken => &["KINTONE_API_TOKEN"],
            ConfigKey::BasicAuthUsername => &["KINTONE_BASIC_AUTH_USERNAME"],
            ConfigKey::BasicAuthPassword => &["KINTONE_BASIC_AUTH_PASSWORD"],
            ConfigKey::PfxFilePath => &["KINTONE_PFX_FILE_PATH"],
            ConfigKey::PfxFilePassword => &["KINTONE_PFX_FILE_PASSWORD"],
            ConfigKey::HttpsProxy => &["HTTPS_PROXY", "https_proxy"],
            ConfigKey::AttachmentsDir => &["KINTONE_ATTACHMENTS_DIR"],
        }
    }

    /// Name used in validation messages and in serialized configs.
    pub fn env_name(self) -> &'static str {
        self.env_names()[0]
    }

    /// Long flag name without the leading dashes.
    pub fn flag(self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "base-url",
            ConfigKey::Username => "username",
            ConfigKey::Password => "password",
            ConfigKey::ApiToken => "api-token",
            ConfigKey::BasicAuthUsername => "basic-auth-username",
            ConfigKey::BasicAuthPassword => "basic-auth-password",
            ConfigKey::PfxFilePath => "pfx-file-path",
            ConfigKey::PfxFilePassword => "pfx-file-password",
            ConfigKey::HttpsProxy => "proxy",
            ConfigKey::AttachmentsDir => "attachments-dir",
        }
    }
}
