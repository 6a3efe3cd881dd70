pub mod args;
pub mod keys;
pub mod merge;
pub mod resolve;
pub mod validate;

pub use args::{parse_flags, CliArgs, FlagMap};
pub use keys::{ConfigKey, CONFIG_KEYS};
pub use merge::{merge, RawConfig};
pub use resolve::{resolve, resolve_from, ResolvedConfig, USER_AGENT};
pub use validate::{validate, KintoneConfig};
