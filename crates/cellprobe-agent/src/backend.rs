//! Backend wiring — turns the resolved config into a probe.
//!
//! With no scenario file the agent runs a simulated modem: one registered LTE
//! cell behind a couple of neighbours, with a jittered signal so repeated
//! probes look like a live radio.

use anyhow::Context;
use cellprobe::backend::mmcli::MmcliTelephony;
use cellprobe::backend::scenario::{ScenarioFile, ScenarioTelephony};
use cellprobe::models::{CellIdentityLte, CellInfoLte, CellSignalLte, OtherCell};
use cellprobe::{CellInfo, CellInfoProbe, GrantedPermissions, TelephonyService};

use crate::config::{AgentConfig, BackendConfig};

pub type AgentProbe = CellInfoProbe<GrantedPermissions, Box<dyn TelephonyService>>;

/// Build the probe described by `cfg`.
///
/// Permissions come from the config's grant list, then from the scenario
/// file, and are otherwise all granted.
pub fn build_probe(cfg: &AgentConfig) -> anyhow::Result<AgentProbe> {
    let (telephony, scenario_grants) = match &cfg.backend {
        BackendConfig::Scenario { path: Some(path) } => {
            let file = ScenarioFile::load(path)?;
            let grants = file
                .granted_permissions()
                .with_context(|| format!("scenario {}", path.display()))?;
            tracing::info!(path = %path.display(), cells = file.cells.len(), "loaded scenario");
            (Box::new(ScenarioTelephony::from_file(&file)) as Box<dyn TelephonyService>, grants)
        }
        BackendConfig::Scenario { path: None } => {
            tracing::info!("no scenario file, simulating a registered LTE modem");
            (
                Box::new(ScenarioTelephony::from_file(&simulated_scenario()))
                    as Box<dyn TelephonyService>,
                None,
            )
        }
        BackendConfig::Mmcli { modem, binary } => {
            tracing::info!(modem = %modem, binary = %binary, "using ModemManager backend");
            (
                Box::new(MmcliTelephony::new(modem.clone()).with_binary(binary.clone()))
                    as Box<dyn TelephonyService>,
                None,
            )
        }
    };

    let permissions = cfg
        .granted
        .clone()
        .or(scenario_grants)
        .unwrap_or_else(GrantedPermissions::all);
    let missing = permissions.missing();
    if !missing.is_empty() {
        tracing::warn!(?missing, "required permissions not granted, probes will fail");
    }

    Ok(CellInfoProbe::new(permissions, telephony))
}

/// A plausible cell environment: a registered LTE cell on T-Mobile US with a
/// GSM neighbour and an unregistered LTE neighbour.
fn simulated_scenario() -> ScenarioFile {
    use rand::Rng;
    let mut rng = rand::rng();

    let lte = |registered: bool, ci: i32, dbm: i32| {
        CellInfo::Lte(CellInfoLte {
            registered,
            identity: Some(CellIdentityLte {
                ci,
                tac: 4321,
                mcc: 310,
                mnc: 260,
            }),
            signal: Some(CellSignalLte { dbm }),
        })
    };

    ScenarioFile {
        cells: vec![
            CellInfo::Gsm(OtherCell { registered: false }),
            lte(false, 12345677, -105 - rng.random_range(0..10)),
            lte(true, 12345678, -80 - rng.random_range(0..15)),
        ],
        latency_ms: Some(20 + rng.random_range(0..30)),
        ..ScenarioFile::default()
    }
}
