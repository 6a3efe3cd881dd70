use crate::config::keys::ConfigKey;
use crate::config::merge::RawConfig;
use crate::errors::ValidationErrors;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use url::Url;

const MAX_API_TOKENS: usize = 9;

static API_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+$").expect("api token regex"));

/// Validated settings. Values are stored exactly as they were given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KintoneConfig {
    #[serde(rename = "KINTONE_BASE_URL")]
    base_url: String,
    #[serde(rename = "KINTONE_USERNAME", skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(rename = "KINTONE_PASSWORD", skip_serializing_if = "Option::is_none")]
    password: Option<String>,
    #[serde(rename = "KINTONE_API_TOKEN", skip_serializing_if = "Option::is_none")]
    api_token: Option<String>,
    #[serde(
        rename = "KINTONE_BASIC_AUTH_USERNAME",
        skip_serializing_if = "Option::is_none"
    )]
    basic_auth_username: Option<String>,
    #[serde(
        rename = "KINTONE_BASIC_AUTH_PASSWORD",
        skip_serializing_if = "Option::is_none"
    )]
    basic_auth_password: Option<String>,
    #[serde(rename = "KINTONE_PFX_FILE_PATH", skip_serializing_if = "Option::is_none")]
    pfx_file_path: Option<String>,
    #[serde(
        rename = "KINTONE_PFX_FILE_PASSWORD",
        skip_serializing_if = "Option::is_none"
    )]
    pfx_file_password: Option<String>,
    #[serde(rename = "HTTPS_PROXY", skip_serializing_if = "Option::is_none")]
    https_proxy: Option<String>,
    #[serde(
        rename = "KINTONE_ATTACHMENTS_DIR",
        skip_serializing_if = "Option::is_none"
    )]
    attachments_dir: Option<String>,
}

impl KintoneConfig {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn api_token(&self) -> Option<&str> {
        self.api_token.as_deref()
    }

    pub fn basic_auth_username(&self) -> Option<&str> {
        self.basic_auth_username.as_deref()
    }

    pub fn basic_auth_password(&self) -> Option<&str> {
        self.basic_auth_password.as_deref()
    }

    pub fn pfx_file_path(&self) -> Option<&str> {
        self.pfx_file_path.as_deref()
    }

    pub fn pfx_file_password(&self) -> Option<&str> {
        self.pfx_file_password.as_deref()
    }

    /// Raw proxy value; an empty string means no proxy.
    pub fn https_proxy(&self) -> Option<&str> {
        self.https_proxy.as_deref()
    }

    pub fn attachments_dir(&self) -> Option<&str> {
        self.attachments_dir.as_deref()
    }

    pub fn has_password_credentials(&self) -> bool {
        is_present(self.username()) && is_present(self.password())
    }

    pub fn has_basic_auth(&self) -> bool {
        is_present(self.basic_auth_username()) && is_present(self.basic_auth_password())
    }
}

fn is_present(value: Option<&str>) -> bool {
    value.map(|v| !v.is_empty()).unwrap_or(false)
}

type Rule = fn(&RawConfig) -> Option<String>;

// Field rules first, then whole-object rules. Every rule runs.
const RULES: &[Rule] = &[
    check_base_url,
    check_username,
    check_password,
    check_api_token,
    check_https_proxy,
    check_auth_presence,
    check_pfx_pair,
    check_basic_auth_pair,
];

fn field_message(key: ConfigKey, message: &str) -> String {
    format!("{}: {}", key.env_name(), message)
}

fn check_base_url(raw: &RawConfig) -> Option<String> {
    match raw.get(ConfigKey::BaseUrl) {
        None => Some(field_message(ConfigKey::BaseUrl, "Required")),
        Some(value) if Url::parse(value).is_err() => {
            Some(field_message(ConfigKey::BaseUrl, "Invalid url"))
        }
        Some(_) => None,
    }
}

fn check_non_empty(raw: &RawConfig, key: ConfigKey) -> Option<String> {
    match raw.get(key) {
        Some("") => Some(field_message(
            key,
            "String must contain at least 1 character(s)",
        )),
        _ => None,
    }
}

fn check_username(raw: &RawConfig) -> Option<String> {
    check_non_empty(raw, ConfigKey::Username)
}

fn check_password(raw: &RawConfig) -> Option<String> {
    check_non_empty(raw, ConfigKey::Password)
}

pub fn is_valid_api_token(value: &str) -> bool {
    let tokens: Vec<&str> = value.split(',').map(str::trim).collect();
    tokens.len() <= MAX_API_TOKENS && tokens.iter().all(|token| API_TOKEN_RE.is_match(token))
}

fn check_api_token(raw: &RawConfig) -> Option<String> {
    let value = raw.get(ConfigKey::ApiToken)?;
    if is_valid_api_token(value) {
        return None;
    }
    Some(field_message(
        ConfigKey::ApiToken,
        "API tokens must be comma-separated alphanumeric strings (max 9 tokens)",
    ))
}

fn check_https_proxy(raw: &RawConfig) -> Option<String> {
    let value = raw.get(ConfigKey::HttpsProxy)?;
    if value.is_empty() || Url::parse(value).is_ok() {
        return None;
    }
    Some(field_message(ConfigKey::HttpsProxy, "Invalid url"))
}

fn check_auth_presence(raw: &RawConfig) -> Option<String> {
    let has_password = raw.is_set(ConfigKey::Username) && raw.is_set(ConfigKey::Password);
    if has_password || raw.is_set(ConfigKey::ApiToken) {
        return None;
    }
    Some(
        "Either KINTONE_USERNAME and KINTONE_PASSWORD, or KINTONE_API_TOKEN must be provided"
            .to_string(),
    )
}

fn paired(raw: &RawConfig, first: ConfigKey, second: ConfigKey) -> Option<String> {
    if raw.is_set(first) == raw.is_set(second) {
        return None;
    }
    Some(format!(
        "Both {} and {} must be provided together",
        first.env_name(),
        second.env_name()
    ))
}

fn check_pfx_pair(raw: &RawConfig) -> Option<String> {
    paired(raw, ConfigKey::PfxFilePath, ConfigKey::PfxFilePassword)
}

fn check_basic_auth_pair(raw: &RawConfig) -> Option<String> {
    paired(
        raw,
        ConfigKey::BasicAuthUsername,
        ConfigKey::BasicAuthPassword,
    )
}

pub fn validate(raw: &RawConfig) -> Result<KintoneConfig, ValidationErrors> {
    let mut errors = ValidationErrors::new();
    for rule in RULES {
        if let Some(message) = rule(raw) {
            errors.push(message);
        }
    }
    if !errors.is_empty() {
        return Err(errors);
    }

    let mut values = raw.clone();
    Ok(KintoneConfig {
        base_url: values.take(ConfigKey::BaseUrl).unwrap_or_default(),
        username: values.take(ConfigKey::Username),
        password: values.take(ConfigKey::Password),
        api_token: values.take(ConfigKey::ApiToken),
        basic_auth_username: values.take(ConfigKey::BasicAuthUsername),
        basic_auth_password: values.take(ConfigKey::BasicAuthPassword),
        pfx_file_path: values.take(ConfigKey::PfxFilePath),
        pfx_file_password: values.take(ConfigKey::PfxFilePassword),
        https_proxy: values.take(ConfigKey::HttpsProxy),
        attachments_dir: values.take(ConfigKey::AttachmentsDir),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.cybozu.com";

    fn base() -> RawConfig {
        RawConfig::new().with(ConfigKey::BaseUrl, BASE)
    }

    #[test]
    fn reports_every_violation_at_once() {
        let raw = RawConfig::new()
            .with(ConfigKey::BaseUrl, "invalid-url")
            .with(ConfigKey::Username, "")
            .with(ConfigKey::Password, "");
        let errors = validate(&raw).unwrap_err();
        let messages = errors.messages();
        assert!(messages.contains(&"KINTONE_BASE_URL: Invalid url".to_string()));
        assert!(messages.contains(
            &"KINTONE_USERNAME: String must contain at least 1 character(s)".to_string()
        ));
        assert!(messages.contains(
            &"KINTONE_PASSWORD: String must contain at least 1 character(s)".to_string()
        ));
        assert_eq!(
            messages.last().map(String::as_str),
            Some("Either KINTONE_USERNAME and KINTONE_PASSWORD, or KINTONE_API_TOKEN must be provided")
        );
    }

    #[test]
    fn missing_base_url_is_required() {
        let errors = validate(&RawConfig::new().with(ConfigKey::ApiToken, "abc")).unwrap_err();
        assert_eq!(errors.messages(), &["KINTONE_BASE_URL: Required".to_string()]);
    }

    #[test]
    fn requires_password_pair_or_token() {
        assert!(validate(&base()).is_err());
        assert!(validate(&base().with(ConfigKey::Username, "u")).is_err());
        assert!(validate(&base().with(ConfigKey::ApiToken, "abc123")).is_ok());
        assert!(validate(
            &base()
                .with(ConfigKey::Username, "u")
                .with(ConfigKey::Password, "p")
        )
        .is_ok());
    }

    #[test]
    fn pfx_fields_must_be_paired() {
        let token = base().with(ConfigKey::ApiToken, "abc");
        let errors = validate(&token.clone().with(ConfigKey::PfxFilePath, "/a")).unwrap_err();
        assert_eq!(
            errors.messages(),
            &["Both KINTONE_PFX_FILE_PATH and KINTONE_PFX_FILE_PASSWORD must be provided together"
                .to_string()]
        );
        assert!(validate(&token.clone().with(ConfigKey::PfxFilePassword, "pw")).is_err());
        assert!(validate(&token).is_ok());
        assert!(validate(
            &token
                .with(ConfigKey::PfxFilePath, "/a")
                .with(ConfigKey::PfxFilePassword, "pw")
        )
        .is_ok());
    }

    #[test]
    fn basic_auth_fields_must_be_paired() {
        let token = base().with(ConfigKey::ApiToken, "abc");
        let errors =
            validate(&token.clone().with(ConfigKey::BasicAuthUsername, "basic")).unwrap_err();
        assert_eq!(
            errors.messages(),
            &["Both KINTONE_BASIC_AUTH_USERNAME and KINTONE_BASIC_AUTH_PASSWORD must be provided together"
                .to_string()]
        );
        assert!(validate(&token.clone().with(ConfigKey::BasicAuthPassword, "pw")).is_err());
        assert!(validate(
            &token
                .with(ConfigKey::BasicAuthUsername, "basic")
                .with(ConfigKey::BasicAuthPassword, "pw")
        )
        .is_ok());
    }

    #[test]
    fn api_token_format() {
        assert!(is_valid_api_token("t1,t2,t3"));
        assert!(is_valid_api_token("t1 , t2"));
        assert!(is_valid_api_token("a,b,c,d,e,f,g,h,i"));
        assert!(!is_valid_api_token("a,b,c,d,e,f,g,h,i,j"));
        assert!(!is_valid_api_token("tok-1"));
        assert!(!is_valid_api_token("t1,,t2"));
        assert!(!is_valid_api_token(""));
    }

    #[test]
    fn invalid_api_token_is_reported_with_env_prefix() {
        let errors = validate(&base().with(ConfigKey::ApiToken, "bad-token")).unwrap_err();
        assert_eq!(
            errors.messages()[0],
            "KINTONE_API_TOKEN: API tokens must be comma-separated alphanumeric strings (max 9 tokens)"
        );
    }

    #[test]
    fn empty_proxy_means_no_proxy() {
        let token = base().with(ConfigKey::ApiToken, "abc");
        let config = validate(&token.clone().with(ConfigKey::HttpsProxy, "")).expect("valid");
        assert_eq!(config.https_proxy(), Some(""));

        let errors = validate(&token.with(ConfigKey::HttpsProxy, "not a url")).unwrap_err();
        assert_eq!(errors.messages(), &["HTTPS_PROXY: Invalid url".to_string()]);
    }

    #[test]
    fn values_are_stored_verbatim() {
        let config = validate(&base().with(ConfigKey::ApiToken, " t1 , t2")).expect("valid");
        assert_eq!(config.api_token(), Some(" t1 , t2"));
        assert_eq!(config.base_url(), BASE);
    }

    #[test]
    fn serializes_with_env_names() {
        let config = validate(&base().with(ConfigKey::ApiToken, "tok1,tok2")).expect("valid");
        let value = serde_json::to_value(&config).expect("json");
        assert_eq!(
            value,
            serde_json::json!({
                "KINTONE_BASE_URL": BASE,
                "KINTONE_API_TOKEN": "tok1,tok2",
            })
        );
    }
}
