//! The serving-cell probe.
//!
//! Stateless: every call re-checks permissions and re-queries telephony.
//! The decision path does not log; hosts log the outcome if they want to.

use std::panic::{self, AssertUnwindSafe};

use cellprobe_common::models::{CellInfo, CellInfoLte, CellReport};
use thiserror::Error;

use crate::permissions::PermissionChecker;
use crate::telephony::{TelephonyError, TelephonyService};

// ── Errors ──────────────────────────────────────────────────────────

/// Why a probe produced no report. `Display` is the failure reason handed to
/// the host, so the first two messages are part of the host contract.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("Required permissions not granted")]
    PermissionsMissing,
    #[error("No cell information available")]
    NoServingLte,
    #[error("{0}")]
    Platform(String),
}

impl From<TelephonyError> for ProbeError {
    fn from(e: TelephonyError) -> Self {
        ProbeError::Platform(e.to_string())
    }
}

// ── Probe ───────────────────────────────────────────────────────────

pub struct CellInfoProbe<P, T> {
    permissions: P,
    telephony: T,
}

impl<P: PermissionChecker, T: TelephonyService> CellInfoProbe<P, T> {
    pub fn new(permissions: P, telephony: T) -> Self {
        Self {
            permissions,
            telephony,
        }
    }

    pub fn telephony(&self) -> &T {
        &self.telephony
    }

    /// Report the LTE cell the device is registered on.
    ///
    /// Telephony is not consulted unless all required permissions are held.
    /// Unknown values are passed through as the platform's sentinel.
    pub fn query_serving_lte_cell(&self) -> Result<CellReport, ProbeError> {
        if !self.permissions.all_required_granted() {
            return Err(ProbeError::PermissionsMissing);
        }

        let cells = self.query_cells()?;
        let lte = select_serving_lte(cells.as_deref().unwrap_or_default())
            .ok_or(ProbeError::NoServingLte)?;
        extract_report(lte)
    }

    /// Backend panics count as platform failures, like any other error raised
    /// by the OS call.
    fn query_cells(&self) -> Result<Option<Vec<CellInfo>>, ProbeError> {
        match panic::catch_unwind(AssertUnwindSafe(|| self.telephony.all_cell_info())) {
            Ok(result) => result.map_err(ProbeError::from),
            Err(payload) => Err(ProbeError::Platform(panic_message(payload.as_ref()))),
        }
    }
}

/// First LTE cell flagged as registered, in list order.
pub fn select_serving_lte(cells: &[CellInfo]) -> Option<&CellInfoLte> {
    cells
        .iter()
        .filter_map(CellInfo::as_lte)
        .find(|lte| lte.registered)
}

fn extract_report(lte: &CellInfoLte) -> Result<CellReport, ProbeError> {
    let identity = lte
        .identity
        .as_ref()
        .ok_or_else(|| ProbeError::Platform("LTE cell identity missing".into()))?;
    let signal = lte
        .signal
        .as_ref()
        .ok_or_else(|| ProbeError::Platform("LTE signal strength missing".into()))?;
    Ok(CellReport::from_lte(identity, signal))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "telephony service panicked".to_string()
    }
}
