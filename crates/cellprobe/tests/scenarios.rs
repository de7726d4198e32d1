//! End-to-end probe scenarios through the callback bridge.
//!
//! Each scenario drives `get_cell_tower_info` and records which handler ran,
//! so every test also checks that exactly one handler fired exactly once.

use std::cell::RefCell;

use cellprobe::backend::scenario::{ScenarioFile, ScenarioTelephony};
use cellprobe::bridge::get_cell_tower_info;
use cellprobe::models::{CellIdentityLte, CellInfoLte, CellSignalLte, OtherCell};
use cellprobe::{CellInfo, CellInfoProbe, GrantedPermissions, Permission, PermissionChecker};
use serde_json::{json, Map, Value};

#[derive(Debug, PartialEq)]
enum Dispatch {
    Success(Map<String, Value>),
    Error(String),
}

/// Run the bridge once and return the single dispatched outcome.
fn dispatch<P: PermissionChecker>(probe: &CellInfoProbe<P, ScenarioTelephony>) -> Dispatch {
    let calls = RefCell::new(Vec::new());
    get_cell_tower_info(
        probe,
        |e| calls.borrow_mut().push(Dispatch::Error(e)),
        |m| calls.borrow_mut().push(Dispatch::Success(m)),
    );
    let mut calls = calls.into_inner();
    assert_eq!(calls.len(), 1, "expected exactly one handler call: {calls:?}");
    calls.pop().unwrap()
}

fn lte(registered: bool, ci: i32, tac: i32, mcc: i32, mnc: i32, dbm: i32) -> CellInfo {
    CellInfo::Lte(CellInfoLte {
        registered,
        identity: Some(CellIdentityLte { ci, tac, mcc, mnc }),
        signal: Some(CellSignalLte { dbm }),
    })
}

fn probe_with(cells: Vec<CellInfo>) -> CellInfoProbe<GrantedPermissions, ScenarioTelephony> {
    CellInfoProbe::new(GrantedPermissions::all(), ScenarioTelephony::new(cells))
}

#[test]
fn happy_path_reports_five_fields() {
    let probe = probe_with(vec![lte(true, 12345678, 4321, 310, 260, -85)]);
    let Dispatch::Success(map) = dispatch(&probe) else {
        panic!("expected success");
    };
    assert_eq!(
        Value::Object(map),
        json!({
            "cellId": 12345678,
            "lac": 4321,
            "mcc": 310,
            "mnc": 260,
            "signalStrength": -85,
        })
    );
}

#[test]
fn first_registered_lte_wins() {
    let probe = probe_with(vec![
        lte(false, 1, 1, 1, 1, -100),
        lte(true, 2, 10, 262, 1, -95),
        lte(true, 3, 11, 262, 2, -70),
    ]);
    let Dispatch::Success(map) = dispatch(&probe) else {
        panic!("expected success");
    };
    assert_eq!(map["cellId"], 2);
    assert_eq!(map["lac"], 10);
    assert_eq!(map["mcc"], 262);
    assert_eq!(map["mnc"], 1);
    assert_eq!(map["signalStrength"], -95);
}

#[test]
fn missing_permission_skips_telephony() {
    let permissions =
        GrantedPermissions::new([Permission::FineLocation, Permission::ReadPhoneState]);
    let probe = CellInfoProbe::new(
        permissions,
        ScenarioTelephony::new(vec![lte(true, 1, 2, 3, 4, -80)]),
    );
    assert_eq!(
        dispatch(&probe),
        Dispatch::Error("Required permissions not granted".into())
    );
    assert_eq!(probe.telephony().query_count(), 0);
}

#[test]
fn each_missing_permission_is_rejected() {
    for denied in [
        Permission::FineLocation,
        Permission::CoarseLocation,
        Permission::ReadPhoneState,
    ] {
        let granted = cellprobe::permissions::REQUIRED_PERMISSIONS
            .into_iter()
            .filter(|p| *p != denied);
        let probe = CellInfoProbe::new(
            GrantedPermissions::new(granted),
            ScenarioTelephony::new(vec![lte(true, 1, 2, 3, 4, -80)]),
        );
        assert_eq!(
            dispatch(&probe),
            Dispatch::Error("Required permissions not granted".into()),
            "denied {denied}"
        );
        assert_eq!(probe.telephony().query_count(), 0);
    }
}

#[test]
fn empty_list_has_no_cell_info() {
    let probe = probe_with(vec![]);
    assert_eq!(
        dispatch(&probe),
        Dispatch::Error("No cell information available".into())
    );
    assert_eq!(probe.telephony().query_count(), 1);
}

#[test]
fn null_list_has_no_cell_info() {
    let probe = CellInfoProbe::new(GrantedPermissions::all(), ScenarioTelephony::null_list());
    assert_eq!(
        dispatch(&probe),
        Dispatch::Error("No cell information available".into())
    );
}

#[test]
fn only_non_lte_cells_has_no_cell_info() {
    let probe = probe_with(vec![
        CellInfo::Gsm(OtherCell { registered: true }),
        CellInfo::Wcdma(OtherCell { registered: true }),
    ]);
    assert_eq!(
        dispatch(&probe),
        Dispatch::Error("No cell information available".into())
    );
}

#[test]
fn unregistered_lte_neighbours_only() {
    let probe = probe_with(vec![
        lte(false, 1, 1, 1, 1, -100),
        lte(false, 2, 1, 1, 1, -101),
    ]);
    assert_eq!(
        dispatch(&probe),
        Dispatch::Error("No cell information available".into())
    );
}

#[test]
fn platform_failure_message_is_verbatim() {
    let probe = CellInfoProbe::new(
        GrantedPermissions::all(),
        ScenarioTelephony::failing("modem offline"),
    );
    assert_eq!(dispatch(&probe), Dispatch::Error("modem offline".into()));
}

#[test]
fn scenario_file_drives_probe() {
    let file = ScenarioFile::from_toml_str(
        r#"
[permissions]
granted = ["fine_location", "coarse_location", "read_phone_state"]

[[cells]]
tech = "nr"
registered = true

[[cells]]
tech = "lte"
registered = true
identity = { ci = 12345678, tac = 4321, mcc = 310, mnc = 260 }
signal = { dbm = -85 }
"#,
    )
    .unwrap();
    let permissions = file.granted_permissions().unwrap().unwrap();
    let probe = CellInfoProbe::new(permissions, ScenarioTelephony::from_file(&file));
    let report = probe.query_serving_lte_cell().unwrap();
    assert_eq!(report.cell_id, 12345678);
    assert_eq!(report.signal_strength, -85);
}

#[test]
fn repeated_calls_are_independent() {
    let probe = probe_with(vec![lte(true, 5, 6, 7, 8, -90)]);
    let first = dispatch(&probe);
    let second = dispatch(&probe);
    assert_eq!(first, second);
    assert_eq!(probe.telephony().query_count(), 2);
}
