//! Host bridge adapters.
//!
//! Callback hosts call [`get_cell_tower_info`] with an error handler and a
//! success handler; exactly one of them runs, exactly once. Promise-style or
//! HTTP hosts use [`query_reply`] and get the tagged JSON envelope instead.

use cellprobe_common::protocol::{ProbeOutcome, ProbeReply};
use serde_json::{Map, Value};

use crate::permissions::PermissionChecker;
use crate::probe::CellInfoProbe;
use crate::telephony::TelephonyService;

/// Name the module is registered under on the host side.
pub const MODULE_NAME: &str = "CellInfoModule";

/// Name of the single exposed operation.
pub const OPERATION: &str = "getCellTowerInfo";

/// Run the probe and hand the result to one of two completion handlers.
///
/// `on_error` receives the failure reason; `on_success` receives the
/// five-key report map (`cellId`, `lac`, `mcc`, `mnc`, `signalStrength`).
pub fn get_cell_tower_info<P, T, E, S>(probe: &CellInfoProbe<P, T>, on_error: E, on_success: S)
where
    P: PermissionChecker,
    T: TelephonyService,
    E: FnOnce(String),
    S: FnOnce(Map<String, Value>),
{
    match probe.query_serving_lte_cell() {
        Ok(report) => on_success(report.to_map()),
        Err(e) => on_error(e.to_string()),
    }
}

/// Run the probe and return its tagged outcome.
pub fn query_outcome<P, T>(probe: &CellInfoProbe<P, T>) -> ProbeOutcome
where
    P: PermissionChecker,
    T: TelephonyService,
{
    ProbeOutcome::from(probe.query_serving_lte_cell())
}

/// Run the probe and wrap its outcome in a reply envelope.
pub fn query_reply<P, T>(probe: &CellInfoProbe<P, T>) -> ProbeReply
where
    P: PermissionChecker,
    T: TelephonyService,
{
    ProbeReply::new(query_outcome(probe))
}
