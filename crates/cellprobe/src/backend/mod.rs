//! Telephony backends.
//!
//! - `scenario` — scripted cell lists loaded from TOML, for development
//!   machines with no modem and for tests
//! - `mmcli` — the serving cell as reported by ModemManager on Linux

pub mod mmcli;
pub mod scenario;
