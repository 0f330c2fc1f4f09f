//! Sizing and hourly dispatch of a renewable hydrogen plant, swept over countries, price years and
//! sensitivity cases.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod cli;
pub mod demand;
pub mod error;
pub mod finance;
pub mod input;
pub mod log;
pub mod model;
pub mod output;
pub mod parameters;
pub mod problem;
pub mod scenario;
pub mod settings;
pub mod solver;
pub mod sweep;
pub mod time_series;
pub mod units;
pub mod variant;

#[cfg(test)]
mod fixture;

/// Get the config directory for the program.
///
/// Falls back on the current directory if the platform has no config directory.
pub fn get_config_dir() -> PathBuf {
    let mut path = dirs::config_dir().unwrap_or_default();
    path.push("h2sizing");
    path
}
