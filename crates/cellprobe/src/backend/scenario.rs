//! Scripted telephony backend.
//!
//! A scenario file lists the cells the "OS" reports, or a failure message the
//! query raises instead:
//!
//! ```toml
//! [permissions]
//! granted = ["fine_location", "coarse_location", "read_phone_state"]
//!
//! [[cells]]
//! tech = "lte"
//! registered = true
//! identity = { ci = 12345678, tac = 4321, mcc = 310, mnc = 260 }
//! signal = { dbm = -85 }
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use cellprobe_common::models::CellInfo;
use serde::Deserialize;
use thiserror::Error;

use crate::permissions::GrantedPermissions;
use crate::telephony::{TelephonyError, TelephonyService};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid scenario: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid scenario permissions: {0}")]
    Permissions(String),
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioFile {
    pub cells: Vec<CellInfo>,
    /// Report no list at all rather than an empty one.
    pub null_list: bool,
    /// Fail the query with this message.
    pub failure: Option<String>,
    /// Simulated modem response time.
    pub latency_ms: Option<u64>,
    pub permissions: Option<ScenarioPermissions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ScenarioPermissions {
    pub granted: Vec<String>,
}

/// Telephony service that replays a fixed scenario.
#[derive(Debug, Default)]
pub struct ScenarioTelephony {
    cells: Vec<CellInfo>,
    null_list: bool,
    failure: Option<String>,
    latency: Option<Duration>,
    queries: AtomicUsize,
}

impl ScenarioTelephony {
    pub fn new(cells: Vec<CellInfo>) -> Self {
        Self {
            cells,
            ..Self::default()
        }
    }

    /// Every query fails with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Every query returns no list.
    pub fn null_list() -> Self {
        Self {
            null_list: true,
            ..Self::default()
        }
    }

    pub fn from_file(file: &ScenarioFile) -> Self {
        Self {
            cells: file.cells.clone(),
            null_list: file.null_list,
            failure: file.failure.clone(),
            latency: file.latency_ms.map(Duration::from_millis),
            queries: AtomicUsize::new(0),
        }
    }

    /// Number of times the cell list has been requested.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

impl TelephonyService for ScenarioTelephony {
    fn all_cell_info(&self) -> Result<Option<Vec<CellInfo>>, TelephonyError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if let Some(latency) = self.latency {
            std::thread::sleep(latency);
        }
        if let Some(msg) = &self.failure {
            return Err(TelephonyError::Platform(msg.clone()));
        }
        if self.null_list {
            return Ok(None);
        }
        Ok(Some(self.cells.clone()))
    }
}

impl ScenarioFile {
    pub fn from_toml_str(s: &str) -> Result<Self, ScenarioError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScenarioError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Permissions granted by the scenario, if it declares any.
    pub fn granted_permissions(&self) -> Result<Option<GrantedPermissions>, ScenarioError> {
        self.permissions
            .as_ref()
            .map(|p| GrantedPermissions::from_names(p.granted.as_slice()).map_err(ScenarioError::Permissions))
            .transpose()
    }
}
