pub mod agent;
pub mod factory;
pub mod rest;

pub use agent::{build_agent, HttpsAgent, PfxIdentity, TlsOptions};
pub use factory::{ClientConstructor, ClientFactory, KintoneConstructor};
pub use rest::{Auth, BasicAuth, ClientParams, KintoneRestClient};
