//! Serving LTE cell probe.
//!
//! Answers "which LTE cell is this device camped on, and how strong is the
//! signal?" in a single call:
//!
//! - **Permission gate** — fine location, coarse location, phone state
//! - **Telephony query** — the OS list of visible cells
//! - **LTE selection** — first registered LTE entry, in OS order
//! - **Dispatch** — one `CellReport` or one failure reason, never both
//!
//! The OS sits behind the [`PermissionChecker`] and [`TelephonyService`]
//! traits. [`bridge`] adapts the result to completion-handler hosts.

pub mod backend;
pub mod bridge;
pub mod permissions;
pub mod probe;
pub mod telephony;

pub use cellprobe_common::models::{self, CellInfo, CellReport, UNAVAILABLE};
pub use cellprobe_common::protocol;
pub use permissions::{GrantedPermissions, Permission, PermissionChecker};
pub use probe::{CellInfoProbe, ProbeError};
pub use telephony::{TelephonyError, TelephonyService};
