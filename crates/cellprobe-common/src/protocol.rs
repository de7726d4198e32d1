//! Reply envelope for a probe outcome.
//!
//! A probe run ends in exactly one of two tagged outcomes. Hosts that prefer
//! promises or HTTP consume the JSON envelope; callback hosts go through the
//! bridge adapter instead.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::CellReport;

// ── Outcome ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Success { info: CellReport },
    Failure { error: String },
}

impl ProbeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ProbeOutcome::Success { .. })
    }
}

impl<E: std::fmt::Display> From<Result<CellReport, E>> for ProbeOutcome {
    fn from(result: Result<CellReport, E>) -> Self {
        match result {
            Ok(info) => ProbeOutcome::Success { info },
            Err(e) => ProbeOutcome::Failure {
                error: e.to_string(),
            },
        }
    }
}

// ── Envelope ────────────────────────────────────────────────────────

/// The outer envelope for a probe reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeReply {
    /// Unique reply ID (`rep_<uuid7>`).
    pub id: String,
    /// ISO 8601 timestamp.
    pub ts: DateTime<Utc>,
    pub outcome: ProbeOutcome,
}

impl ProbeReply {
    /// Wrap an outcome with a fresh ID and the current timestamp.
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            id: reply_id(),
            ts: Utc::now(),
            outcome,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// `rep_<uuid7>`, so replies logged by the host sort by creation time.
fn reply_id() -> String {
    format!("rep_{}", Uuid::now_v7().as_simple())
}
