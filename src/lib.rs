//! lowlight-pull library
//!
//! Watches an attached Android device over `adb` for batch marker files
//! written by the LowLightCamera app and mirrors each new batch of debug
//! images into a local directory.
//!
//! ## Components
//!
//! 1. DeviceBridge / AdbBridge - all device interaction behind one trait
//! 2. PulledLedger - append-only record of already-collected batch ids
//! 3. BatchSynchronizer - the polling / pull / ack loop

pub mod bridge;
pub mod config;
pub mod error;
pub mod ledger;
pub mod sync;

pub use error::{Error, Result};
