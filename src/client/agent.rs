use crate::errors::AgentError;
use reqwest::{ClientBuilder, Identity, Proxy};
use std::fmt;

/// PKCS#12 bundle loaded from disk, kept as raw bytes until the client is built.
#[derive(Clone, PartialEq, Eq)]
pub struct PfxIdentity {
    pub path: String,
    pub der: Vec<u8>,
    pub passphrase: String,
}

impl fmt::Debug for PfxIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PfxIdentity")
            .field("path", &self.path)
            .field("der", &format_args!("<{} bytes>", self.der.len()))
            .field("passphrase", &"[REDACTED]")
            .finish()
    }
}

/// TLS settings shared by both transport kinds. Empty unless a client certificate is configured.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    pub pfx: Option<PfxIdentity>,
}

#[derive(Debug, Clone)]
pub enum HttpsAgent {
    Direct {
        tls: TlsOptions,
    },
    Proxied {
        url: String,
        proxy: Proxy,
        tls: TlsOptions,
    },
}

impl HttpsAgent {
    pub fn tls(&self) -> &TlsOptions {
        match self {
            HttpsAgent::Direct { tls } | HttpsAgent::Proxied { tls, .. } => tls,
        }
    }

    pub fn proxy_url(&self) -> Option<&str> {
        match self {
            HttpsAgent::Proxied { url, .. } => Some(url.as_str()),
            HttpsAgent::Direct { .. } => None,
        }
    }

    /// Applies the transport to a reqwest builder.
    pub fn configure(&self, mut builder: ClientBuilder) -> Result<ClientBuilder, AgentError> {
        if let Some(pfx) = self.tls().pfx.as_ref() {
            let identity = Identity::from_pkcs12_der(&pfx.der, &pfx.passphrase).map_err(|err| {
                AgentError::CertificateInvalid {
                    path: pfx.path.clone(),
                    cause: err.to_string(),
                }
            })?;
            builder = builder.use_native_tls().identity(identity);
        }
        // A direct agent must not pick up HTTPS_PROXY on its own.
        Ok(match self {
            HttpsAgent::Proxied { proxy, .. } => builder.proxy(proxy.clone()),
            HttpsAgent::Direct { .. } => builder.no_proxy(),
        })
    }
}

fn load_pfx(path: &str, passphrase: &str) -> Result<PfxIdentity, AgentError> {
    let der = std::fs::read(path).map_err(|err| AgentError::CertificateRead {
        path: path.to_string(),
        cause: err.to_string(),
    })?;
    Ok(PfxIdentity {
        path: path.to_string(),
        der,
        passphrase: passphrase.to_string(),
    })
}

pub fn build_agent(
    proxy: Option<&str>,
    pfx_path: Option<&str>,
    pfx_password: Option<&str>,
) -> Result<HttpsAgent, AgentError> {
    let mut tls = TlsOptions::default();
    if let (Some(path), Some(passphrase)) = (
        pfx_path.filter(|p| !p.is_empty()),
        pfx_password.filter(|p| !p.is_empty()),
    ) {
        tls.pfx = Some(load_pfx(path, passphrase)?);
    }

    match proxy.filter(|p| !p.is_empty()) {
        Some(url) => {
            let proxy = Proxy::https(url).map_err(|err| AgentError::ProxyInvalid {
                url: url.to_string(),
                cause: err.to_string(),
            })?;
            Ok(HttpsAgent::Proxied {
                url: url.to_string(),
                proxy,
                tls,
            })
        }
        None => Ok(HttpsAgent::Direct { tls }),
    }
}
