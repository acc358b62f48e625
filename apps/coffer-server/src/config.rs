//! Server configuration: one section per component, loaded from an optional
//! YAML file and `COFFER__`-prefixed environment variables.
//!
//! ```yaml
//! gateway:
//!   bind_addr: "0.0.0.0:8080"
//!   enforcer_timeout: 500ms
//! authn:
//!   secret: "at-least-32-bytes-of-shared-secret-material"
//! authz:
//!   mode: deny_all
//! logging:
//!   format: json
//! ```
//!
//! `COFFER__GATEWAY__BIND_ADDR=0.0.0.0:9000` overrides `gateway.bind_addr`.

use std::path::Path;

use api_gateway::ApiGatewayConfig;
use figment::Figment;
use figment::providers::{Env, Format, Yaml};
use jwt_authn_plugin::JwtAuthNConfig;
use serde::{Deserialize, Serialize};
use static_authz_plugin::StaticAuthZPluginConfig;
use static_directory_plugin::StaticDirectoryConfig;

pub const ENV_PREFIX: &str = "COFFER__";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub gateway: ApiGatewayConfig,
    pub authn: JwtAuthNConfig,
    pub authz: StaticAuthZPluginConfig,
    pub directory: StaticDirectoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub format: LogFormat,
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::Text,
            level: "info".to_owned(),
        }
    }
}

/// Layered sources: file (if any), then environment.
fn figment(path: Option<&Path>) -> Figment {
    let mut figment = Figment::new();
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
}

/// Load the configuration.
///
/// # Errors
/// Returns an error if the file cannot be read or any value does not parse.
pub fn load(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    if let Some(path) = path
        && !path.is_file()
    {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    figment(path)
        .extract()
        .map_err(|e| anyhow::anyhow!("Config error: {e}"))
}
