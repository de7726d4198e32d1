//! Shared types for the serving-cell probe.
//!
//! This crate contains:
//! - **Cell models** — cell-info records as reported by a telephony service,
//!   and the five-field `CellReport` handed to the host
//! - **Reply envelope** — the JSON shape of a probe outcome, with UUIDv7
//!   reply identifiers

pub mod models;
pub mod protocol;
