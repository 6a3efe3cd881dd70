pub mod client;
pub mod config;
pub mod errors;
pub mod services;
pub mod utils;
