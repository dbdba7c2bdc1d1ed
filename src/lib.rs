//! Light source identification from LPCSB colour sensor advertisements
//!
//! Bytes from a BLED112 dongle speaking BGAPI are reassembled into frames,
//! scan response events are decoded into advertisement reports, filtered,
//! and the colour readings they carry are classified as incandescent,
//! fluorescent, LED, sunlight or unknown.

pub mod bluetooth;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sensor;
pub mod sink;
pub mod utils;

pub use pipeline::{Outcome, Pipeline};
