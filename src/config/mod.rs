pub mod server;
pub mod session;

use std::env;

pub use server::{ConfigError, ReportScope, RunAccessPolicy, ServerConfig};
pub use session::{validate_production_config, SessionConfig, SessionLayer};

pub(crate) fn current_environment() -> String {
    env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string())
}

pub(crate) fn env_flag_enabled(key: &str) -> bool {
    env::var(key)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "True"))
        .unwrap_or(false)
}
