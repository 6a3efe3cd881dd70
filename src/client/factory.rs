use crate::client::agent::build_agent;
use crate::client::rest::{Auth, BasicAuth, ClientParams, KintoneRestClient};
use crate::config::ResolvedConfig;
use crate::errors::ClientError;
use crate::services::logger::Logger;
use std::sync::{Arc, Mutex};

/// Turns resolved client parameters into a client instance.
pub trait ClientConstructor: Send + Sync {
    type Client: Send + Sync;

    fn construct(&self, params: ClientParams) -> Result<Self::Client, ClientError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct KintoneConstructor;

impl ClientConstructor for KintoneConstructor {
    type Client = KintoneRestClient;

    fn construct(&self, params: ClientParams) -> Result<KintoneRestClient, ClientError> {
        KintoneRestClient::new(params)
    }
}

/// Owns the single cached client. The first successful `get_client` wins until `reset`.
pub struct ClientFactory<C: ClientConstructor = KintoneConstructor> {
    logger: Logger,
    constructor: C,
    cached: Mutex<Option<Arc<C::Client>>>,
}

impl ClientFactory<KintoneConstructor> {
    pub fn new(logger: Logger) -> Self {
        Self::with_constructor(logger, KintoneConstructor)
    }
}

impl<C: ClientConstructor> ClientFactory<C> {
    pub fn with_constructor(logger: Logger, constructor: C) -> Self {
        Self {
            logger: logger.child("client"),
            constructor,
            cached: Mutex::new(None),
        }
    }

    /// Returns the cached client without looking at `resolved`, or builds one from it.
    pub fn get_client(&self, resolved: &ResolvedConfig) -> Result<Arc<C::Client>, ClientError> {
        let mut slot = self.cached.lock().unwrap_or_else(|err| err.into_inner());
        if let Some(existing) = slot.as_ref() {
            return Ok(existing.clone());
        }

        let params = client_params(resolved)?;
        self.logger.debug(
            "constructing kintone REST client",
            Some(&serde_json::json!({
                "base_url": params.base_url,
                "auth": resolved.auth_mode(),
                "basic_auth": params.basic_auth.is_some(),
                "proxy": params.https_agent.proxy_url(),
                "client_certificate": params.https_agent.tls().pfx.is_some(),
            })),
        );
        let client = Arc::new(self.constructor.construct(params)?);
        *slot = Some(client.clone());
        Ok(client)
    }

    pub fn reset(&self) {
        let mut slot = self.cached.lock().unwrap_or_else(|err| err.into_inner());
        if slot.take().is_some() {
            self.logger.debug("cached kintone REST client cleared", None);
        }
    }

    pub fn is_cached(&self) -> bool {
        self.cached
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false)
    }
}

fn client_params(resolved: &ResolvedConfig) -> Result<ClientParams, ClientError> {
    let config = &resolved.config;
    let auth = if resolved.is_api_token_auth {
        Auth::ApiToken(config.api_token().unwrap_or_default().to_string())
    } else {
        Auth::Password {
            username: config.username().unwrap_or_default().to_string(),
            password: config.password().unwrap_or_default().to_string(),
        }
    };

    let basic_auth = match (config.basic_auth_username(), config.basic_auth_password()) {
        (Some(username), Some(password)) if !username.is_empty() && !password.is_empty() => {
            Some(BasicAuth {
                username: username.to_string(),
                password: password.to_string(),
            })
        }
        _ => None,
    };

    let https_agent = build_agent(
        config.https_proxy(),
        config.pfx_file_path(),
        config.pfx_file_password(),
    )?;

    Ok(ClientParams {
        base_url: config.base_url().to_string(),
        auth,
        basic_auth,
        user_agent: resolved.user_agent.clone(),
        https_agent,
    })
}
