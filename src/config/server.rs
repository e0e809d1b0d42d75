use std::{env, net::SocketAddr, str::FromStr};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Whether edit and delete by id are limited to the run's owner.
///
/// `Shared` keeps the historical behaviour where any signed-in user can edit
/// or delete any run by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunAccessPolicy {
    #[default]
    Shared,
    OwnerOnly,
}

impl FromStr for RunAccessPolicy {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(RunAccessPolicy::Shared),
            "owner" | "owner_only" => Ok(RunAccessPolicy::OwnerOnly),
            _ => Err(()),
        }
    }
}

/// Which runs the weekly report aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportScope {
    #[default]
    AllRuns,
    CurrentUser,
}

impl FromStr for ReportScope {
    type Err = ();

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(ReportScope::AllRuns),
            "owner" | "user" => Ok(ReportScope::CurrentUser),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub run_access: RunAccessPolicy,
    pub report_scope: ReportScope,
    pub report_sender: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            run_access: RunAccessPolicy::default(),
            report_scope: ReportScope::default(),
            report_sender: "reports@runnerbee.app".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();

        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                key: "PORT",
                value,
            })?,
            Err(_) => defaults.port,
        };

        Ok(Self {
            host: env::var("HOST").unwrap_or(defaults.host),
            port,
            run_access: parse_env("RUN_ACCESS_POLICY", defaults.run_access)?,
            report_scope: parse_env("REPORT_SCOPE", defaults.report_scope)?,
            report_sender: env::var("REPORT_SENDER").unwrap_or(defaults.report_sender),
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let host = self
            .host
            .parse::<std::net::IpAddr>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "HOST",
                value: self.host.clone(),
            })?;
        Ok(SocketAddr::from((host, self.port)))
    }
}

fn parse_env<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_parsing() {
        assert_eq!("shared".parse::<RunAccessPolicy>(), Ok(RunAccessPolicy::Shared));
        assert_eq!("Owner".parse::<RunAccessPolicy>(), Ok(RunAccessPolicy::OwnerOnly));
        assert!("everyone".parse::<RunAccessPolicy>().is_err());

        assert_eq!("all".parse::<ReportScope>(), Ok(ReportScope::AllRuns));
        assert_eq!(" owner ".parse::<ReportScope>(), Ok(ReportScope::CurrentUser));
        assert!("team".parse::<ReportScope>().is_err());
    }

    #[test]
    fn test_defaults_preserve_shared_behaviour() {
        let config = ServerConfig::default();
        assert_eq!(config.run_access, RunAccessPolicy::Shared);
        assert_eq!(config.report_scope, ReportScope::AllRuns);
        assert_eq!(
            config.socket_addr().unwrap(),
            "127.0.0.1:8080".parse::<SocketAddr>().unwrap()
        );
    }
}
