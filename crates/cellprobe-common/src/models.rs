//! Cell models for the serving-cell probe.
//!
//! `CellInfo` mirrors what a telephony service reports for every visible
//! cell. `CellReport` is the five-field answer handed back to the host.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Platform sentinel for "value not reported by the modem".
///
/// Passed through untouched; consumers decide what to do with it.
pub const UNAVAILABLE: i32 = i32::MAX;

fn unavailable() -> i32 {
    UNAVAILABLE
}

// ── Radio technology ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RadioTech {
    Gsm,
    Wcdma,
    Lte,
    Nr,
}

impl std::fmt::Display for RadioTech {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RadioTech::Gsm => write!(f, "gsm"),
            RadioTech::Wcdma => write!(f, "wcdma"),
            RadioTech::Lte => write!(f, "lte"),
            RadioTech::Nr => write!(f, "nr"),
        }
    }
}

impl std::str::FromStr for RadioTech {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gsm" => Ok(RadioTech::Gsm),
            "wcdma" | "umts" => Ok(RadioTech::Wcdma),
            "lte" => Ok(RadioTech::Lte),
            "nr" | "5gnr" => Ok(RadioTech::Nr),
            other => Err(format!("unknown radio technology: {other}")),
        }
    }
}

// ── Cell info (telephony input) ─────────────────────────────────────

/// One entry of the telephony service's visible-cell list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tech", rename_all = "snake_case")]
pub enum CellInfo {
    Lte(CellInfoLte),
    Gsm(OtherCell),
    Wcdma(OtherCell),
    Nr(OtherCell),
}

impl CellInfo {
    pub fn radio_tech(&self) -> RadioTech {
        match self {
            CellInfo::Lte(_) => RadioTech::Lte,
            CellInfo::Gsm(_) => RadioTech::Gsm,
            CellInfo::Wcdma(_) => RadioTech::Wcdma,
            CellInfo::Nr(_) => RadioTech::Nr,
        }
    }

    /// Whether the handset is camped on this cell.
    pub fn is_registered(&self) -> bool {
        match self {
            CellInfo::Lte(lte) => lte.registered,
            CellInfo::Gsm(c) | CellInfo::Wcdma(c) | CellInfo::Nr(c) => c.registered,
        }
    }

    pub fn as_lte(&self) -> Option<&CellInfoLte> {
        match self {
            CellInfo::Lte(lte) => Some(lte),
            _ => None,
        }
    }
}

/// An LTE cell. Either block may be missing when the OS omits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellInfoLte {
    pub registered: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<CellIdentityLte>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signal: Option<CellSignalLte>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellIdentityLte {
    /// 28-bit Cell Identity.
    #[serde(default = "unavailable")]
    pub ci: i32,
    /// 16-bit Tracking Area Code.
    #[serde(default = "unavailable")]
    pub tac: i32,
    #[serde(default = "unavailable")]
    pub mcc: i32,
    #[serde(default = "unavailable")]
    pub mnc: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSignalLte {
    /// Reference signal received power, dBm.
    #[serde(default = "unavailable")]
    pub dbm: i32,
}

/// A non-LTE cell. Only its registration flag matters to the probe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OtherCell {
    #[serde(default)]
    pub registered: bool,
}

// ── Cell report (host output) ───────────────────────────────────────

/// Identity and signal of the serving LTE cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CellReport {
    pub cell_id: i32,
    /// Carries the LTE TAC; the key keeps its legacy name.
    pub lac: i32,
    pub mcc: i32,
    pub mnc: i32,
    pub signal_strength: i32,
}

impl CellReport {
    pub fn from_lte(identity: &CellIdentityLte, signal: &CellSignalLte) -> Self {
        Self {
            cell_id: identity.ci,
            lac: identity.tac,
            mcc: identity.mcc,
            mnc: identity.mnc,
            signal_strength: signal.dbm,
        }
    }

    /// The report as the five-key map handed to a bridge success callback.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(5);
        map.insert("cellId".into(), Value::from(self.cell_id));
        map.insert("lac".into(), Value::from(self.lac));
        map.insert("mcc".into(), Value::from(self.mcc));
        map.insert("mnc".into(), Value::from(self.mnc));
        map.insert("signalStrength".into(), Value::from(self.signal_strength));
        map
    }
}
