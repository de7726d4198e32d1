//! Agent configuration.
//!
//! A TOML file is parsed into `AgentConfigInput` (every field optional), CLI
//! flags are laid over it, and `resolve` turns the result into a validated
//! `AgentConfig`. A relative `scenario.path` in a config file is taken
//! relative to that file.
//!
//! ```toml
//! version = 1
//! backend = "mmcli"
//!
//! [permissions]
//! granted = ["fine_location", "coarse_location", "read_phone_state"]
//!
//! [mmcli]
//! modem = "0"
//!
//! [portal]
//! addr = "127.0.0.1:3002"
//! ```

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use cellprobe::backend::mmcli::DEFAULT_BINARY;
use cellprobe::GrantedPermissions;
use serde::Deserialize;
use thiserror::Error;

pub const CONFIG_VERSION: u32 = 1;
pub const DEFAULT_PORTAL_ADDR: &str = "127.0.0.1:3002";
pub const DEFAULT_MODEM: &str = "0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid permissions: {0}")]
    Permissions(String),
    #[error("invalid portal address {addr}: {source}")]
    PortalAddr {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Scripted cell list (simulated when no scenario file is given).
    Scenario,
    /// ModemManager via `mmcli`.
    Mmcli,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AgentConfigInput {
    pub version: Option<u32>,
    pub backend: Option<BackendKind>,
    pub permissions: PermissionsInput,
    pub scenario: ScenarioInput,
    pub mmcli: MmcliInput,
    pub portal: PortalInput,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PermissionsInput {
    pub granted: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioInput {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MmcliInput {
    pub modem: Option<String>,
    pub binary: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PortalInput {
    pub addr: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendConfig {
    Scenario { path: Option<PathBuf> },
    Mmcli { modem: String, binary: String },
}

#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub version: u32,
    pub backend: BackendConfig,
    /// Explicit grant list; `None` defers to the scenario or grants all.
    pub granted: Option<GrantedPermissions>,
    pub portal_addr: SocketAddr,
}

impl AgentConfigInput {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut input = Self::from_toml_str(&text)?;
        if let (Some(scenario), Some(dir)) = (input.scenario.path.as_mut(), path.parent()) {
            if scenario.is_relative() {
                *scenario = dir.join(&*scenario);
            }
        }
        Ok(input)
    }

    pub fn resolve(self) -> Result<AgentConfig, ConfigError> {
        let version = self.version.unwrap_or(CONFIG_VERSION);
        if version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(version));
        }

        let backend = match self.backend.unwrap_or(BackendKind::Scenario) {
            BackendKind::Scenario => BackendConfig::Scenario {
                path: self.scenario.path,
            },
            BackendKind::Mmcli => BackendConfig::Mmcli {
                modem: non_empty(self.mmcli.modem).unwrap_or_else(|| DEFAULT_MODEM.to_string()),
                binary: non_empty(self.mmcli.binary)
                    .unwrap_or_else(|| DEFAULT_BINARY.to_string()),
            },
        };

        let granted = self
            .permissions
            .granted
            .map(|names| {
                GrantedPermissions::from_names(names.as_slice()).map_err(ConfigError::Permissions)
            })
            .transpose()?;

        let addr = non_empty(self.portal.addr).unwrap_or_else(|| DEFAULT_PORTAL_ADDR.to_string());
        let portal_addr = addr
            .parse::<SocketAddr>()
            .map_err(|source| ConfigError::PortalAddr { addr, source })?;

        Ok(AgentConfig {
            version,
            backend,
            granted,
            portal_addr,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellprobe::{Permission, PermissionChecker};

    #[test]
    fn empty_config_resolves_to_defaults() {
        let cfg = AgentConfigInput::default().resolve().unwrap();
        assert_eq!(cfg.version, CONFIG_VERSION);
        assert_eq!(cfg.backend, BackendConfig::Scenario { path: None });
        assert!(cfg.granted.is_none());
        assert_eq!(cfg.portal_addr.to_string(), DEFAULT_PORTAL_ADDR);
    }

    #[test]
    fn full_config_parses() {
        let cfg = AgentConfigInput::from_toml_str(
            r#"
version = 1
backend = "mmcli"

[permissions]
granted = ["fine_location", "coarse_location"]

[mmcli]
modem = " 2 "

[portal]
addr = "0.0.0.0:8080"
"#,
        )
        .unwrap()
        .resolve()
        .unwrap();

        assert_eq!(
            cfg.backend,
            BackendConfig::Mmcli {
                modem: "2".into(),
                binary: "mmcli".into()
            }
        );
        let granted = cfg.granted.unwrap();
        assert!(granted.is_granted(Permission::CoarseLocation));
        assert!(!granted.is_granted(Permission::ReadPhoneState));
        assert_eq!(cfg.portal_addr.port(), 8080);
    }

    #[test]
    fn rejects_unknown_version() {
        let err = AgentConfigInput::from_toml_str("version = 7")
            .unwrap()
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(7)));
    }

    #[test]
    fn explicit_zero_version_is_rejected() {
        let err = AgentConfigInput::from_toml_str("version = 0")
            .unwrap()
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedVersion(0)));
    }

    #[test]
    fn scenario_path_is_relative_to_config_file() {
        let demos = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../demos");
        let cfg = AgentConfigInput::load(&demos.join("agent.toml"))
            .unwrap()
            .resolve()
            .unwrap();
        let BackendConfig::Scenario { path: Some(path) } = cfg.backend else {
            panic!("expected a scenario backend with a path");
        };
        assert_eq!(path, demos.join("happy-path.toml"));
        assert!(path.is_file());
    }

    #[test]
    fn absolute_scenario_path_is_kept() {
        let dir = std::env::temp_dir().join(format!("cellprobe-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("agent.toml");
        std::fs::write(&file, "[scenario]\npath = \"/srv/scenarios/s1.toml\"\n").unwrap();
        let input = AgentConfigInput::load(&file).unwrap();
        assert_eq!(
            input.scenario.path.as_deref(),
            Some(Path::new("/srv/scenarios/s1.toml"))
        );
    }

    #[test]
    fn rejects_bad_permission_and_addr() {
        let mut input = AgentConfigInput::default();
        input.permissions.granted = Some(vec!["microphone".into()]);
        assert!(matches!(input.resolve(), Err(ConfigError::Permissions(_))));

        let mut input = AgentConfigInput::default();
        input.portal.addr = Some("not an addr".into());
        assert!(matches!(input.resolve(), Err(ConfigError::PortalAddr { .. })));
    }

    #[test]
    fn unknown_backend_is_toml_error() {
        assert!(matches!(
            AgentConfigInput::from_toml_str(r#"backend = "qmi""#),
            Err(ConfigError::Toml(_))
        ));
    }
}
