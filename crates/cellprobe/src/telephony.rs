//! Telephony service boundary.

use cellprobe_common::models::CellInfo;
use thiserror::Error;

// ── Errors ──────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum TelephonyError {
    /// Failure reported by the platform; the message is surfaced verbatim.
    #[error("{0}")]
    Platform(String),
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("unparsable telephony output: {0}")]
    Parse(String),
}

/// Source of the visible-cell list.
///
/// Implementations may block while the modem answers. `Ok(None)` means the
/// platform returned no list at all, which the probe treats like an empty one.
pub trait TelephonyService: Send + Sync {
    fn all_cell_info(&self) -> Result<Option<Vec<CellInfo>>, TelephonyError>;
}

impl<T: TelephonyService + ?Sized> TelephonyService for std::sync::Arc<T> {
    fn all_cell_info(&self) -> Result<Option<Vec<CellInfo>>, TelephonyError> {
        (**self).all_cell_info()
    }
}

impl<T: TelephonyService + ?Sized> TelephonyService for Box<T> {
    fn all_cell_info(&self) -> Result<Option<Vec<CellInfo>>, TelephonyError> {
        (**self).all_cell_info()
    }
}
