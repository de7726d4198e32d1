//! ModemManager backend.
//!
//! Reads the serving cell through `mmcli --output-keyvalue`. ModemManager
//! only reports the cell the modem is camped on, so the list holds at most
//! one entry:
//!
//! - `mmcli -m N` — access technologies and 3GPP registration state
//! - `mmcli -m N --location-get` — MCC, MNC, TAC and cell ID (hex)
//! - `mmcli -m N --signal-get` — LTE RSRP in dBm (needs `--signal-setup`)

use std::collections::HashMap;
use std::process::Command;

use cellprobe_common::models::{
    CellIdentityLte, CellInfo, CellInfoLte, CellSignalLte, OtherCell, UNAVAILABLE,
};

use crate::telephony::{TelephonyError, TelephonyService};

pub const DEFAULT_BINARY: &str = "mmcli";

type KeyValues = HashMap<String, String>;

/// Telephony service backed by the `mmcli` command-line client.
#[derive(Debug, Clone)]
pub struct MmcliTelephony {
    binary: String,
    modem: String,
}

impl MmcliTelephony {
    pub fn new(modem: impl Into<String>) -> Self {
        Self {
            binary: DEFAULT_BINARY.to_string(),
            modem: modem.into(),
        }
    }

    pub fn with_binary(mut self, binary: impl Into<String>) -> Self {
        self.binary = binary.into();
        self
    }

    fn run(&self, extra: &[&str]) -> Result<KeyValues, TelephonyError> {
        let output = Command::new(&self.binary)
            .arg("-m")
            .arg(&self.modem)
            .args(extra)
            .arg("--output-keyvalue")
            .output()
            .map_err(|source| TelephonyError::Spawn {
                command: self.binary.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::debug!(
                modem = %self.modem,
                args = ?extra,
                status = %output.status,
                stderr = %stderr,
                "mmcli query failed"
            );
            let msg = if stderr.is_empty() {
                format!("{} exited with {}", self.binary, output.status)
            } else {
                stderr
            };
            return Err(TelephonyError::Platform(msg));
        }

        Ok(parse_keyvalue(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl TelephonyService for MmcliTelephony {
    fn all_cell_info(&self) -> Result<Option<Vec<CellInfo>>, TelephonyError> {
        let status = self.run(&[])?;
        let Some(tech) = serving_tech(&status) else {
            tracing::debug!(modem = %self.modem, "modem reports no access technology");
            return Ok(Some(Vec::new()));
        };
        let registered = is_registered(&status);

        let cell = match tech {
            ServingTech::Lte => {
                let location = self.run(&["--location-get"])?;
                let signal = self.run(&["--signal-get"])?;
                CellInfo::Lte(CellInfoLte {
                    registered,
                    identity: Some(identity_from(&location)?),
                    signal: Some(signal_from(&signal)?),
                })
            }
            ServingTech::Nr => CellInfo::Nr(OtherCell { registered }),
            ServingTech::Wcdma => CellInfo::Wcdma(OtherCell { registered }),
            ServingTech::Gsm => CellInfo::Gsm(OtherCell { registered }),
        };
        Ok(Some(vec![cell]))
    }
}

// ── Output parsing ──────────────────────────────────────────────────

/// Parse `key : value` lines. ModemManager prints `--` for empty values;
/// those keys are dropped.
fn parse_keyvalue(text: &str) -> KeyValues {
    text.lines()
        .filter_map(|line| line.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, v)| !k.is_empty() && !v.is_empty() && v != "--")
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ServingTech {
    Lte,
    Nr,
    Wcdma,
    Gsm,
}

/// Access technologies may be a comma list or a `.value[N]` array.
/// LTE wins over NR so NSA attachments count as LTE.
fn serving_tech(kv: &KeyValues) -> Option<ServingTech> {
    let techs: Vec<&str> = kv
        .iter()
        .filter(|(k, _)| {
            k.starts_with("modem.generic.access-technologies") && !k.ends_with(".length")
        })
        .flat_map(|(_, v)| v.split(','))
        .map(str::trim)
        .collect();

    let has = |names: &[&str]| techs.iter().any(|t| names.contains(t));
    if has(&["lte", "lte-cat-m", "lte-nb-iot"]) {
        Some(ServingTech::Lte)
    } else if has(&["5gnr"]) {
        Some(ServingTech::Nr)
    } else if has(&["umts", "hsdpa", "hsupa", "hspa", "hspa-plus"]) {
        Some(ServingTech::Wcdma)
    } else if has(&["gsm", "gsm-compact", "gprs", "edge"]) {
        Some(ServingTech::Gsm)
    } else {
        None
    }
}

fn is_registered(kv: &KeyValues) -> bool {
    kv.get("modem.3gpp.registration-state")
        .is_some_and(|s| s.starts_with("home") || s.starts_with("roaming"))
}

fn identity_from(kv: &KeyValues) -> Result<CellIdentityLte, TelephonyError> {
    Ok(CellIdentityLte {
        ci: field(kv, "modem.location.3gpp.cid", 16)?,
        tac: field(kv, "modem.location.3gpp.tac", 16)?,
        mcc: field(kv, "modem.location.3gpp.mcc", 10)?,
        mnc: field(kv, "modem.location.3gpp.mnc", 10)?,
    })
}

fn signal_from(kv: &KeyValues) -> Result<CellSignalLte, TelephonyError> {
    let dbm = match kv.get("modem.signal.lte.rsrp") {
        None => UNAVAILABLE,
        Some(v) => v
            .parse::<f64>()
            .map(|d| d.round() as i32)
            .map_err(|_| TelephonyError::Parse(format!("modem.signal.lte.rsrp = {v}")))?,
    };
    Ok(CellSignalLte { dbm })
}

/// Missing keys map to the sentinel; present but malformed values are errors.
fn field(kv: &KeyValues, key: &str, radix: u32) -> Result<i32, TelephonyError> {
    match kv.get(key) {
        None => Ok(UNAVAILABLE),
        Some(v) => i32::from_str_radix(v, radix)
            .map_err(|_| TelephonyError::Parse(format!("{key} = {v}"))),
    }
}
