//! The module responsible for writing output data to disk.
use crate::problem::Problem;
use crate::scenario::ScenarioConfig;
use crate::solver::Solution;
use crate::sweep::{ResultRow, ResultsTable, ScenarioStatus};
use anyhow::{Context, Result, ensure};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "h2sizing_results";

/// The output file name for the results of the sweep
const RESULTS_FILE_NAME: &str = "results.csv";

/// Prefix for the per-scenario variable dumps
const DEBUG_VARIABLES_FILE_PREFIX: &str = "debug_variables";

/// Get the model name from the specified directory path
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model specified at `model_dir`.
///
/// # Returns
///
/// Whether an existing, non-empty directory is being overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if output_dir.is_dir() {
        let is_empty = fs::read_dir(output_dir)?.next().is_none();
        if is_empty {
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Pass --overwrite to replace it."
        );
        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the results CSV file
#[derive(Serialize, Debug, PartialEq)]
struct ResultsFileRow<'a> {
    country: &'static str,
    price_year: u32,
    sensitivity_case: &'static str,
    status: ScenarioStatus,
    capacity_elec: Option<f64>,
    capacity_wind: Option<f64>,
    capacity_solar: Option<f64>,
    capacity_storage: Option<f64>,
    capacity_battery: Option<f64>,
    objective: Option<f64>,
    message: Option<&'a str>,
}

impl<'a> ResultsFileRow<'a> {
    /// Create a new [`ResultsFileRow`]
    fn new(row: &'a ResultRow) -> Self {
        let capacities = row.capacities.as_ref();
        Self {
            country: row.scenario.country.code(),
            price_year: row.scenario.price_year.year(),
            sensitivity_case: row.scenario.sensitivity.label(),
            status: row.status,
            capacity_elec: capacities.map(|c| c.elec),
            capacity_wind: capacities.map(|c| c.wind),
            capacity_solar: capacities.and_then(|c| c.solar),
            capacity_storage: capacities.map(|c| c.storage),
            capacity_battery: capacities.and_then(|c| c.battery),
            objective: row.objective,
            message: row.message.as_deref(),
        }
    }
}

/// Represents a row in a variable dump CSV file
#[derive(Serialize, Debug, PartialEq)]
struct VariableRow<'a> {
    variable: &'a str,
    value: f64,
}

/// Write the results of a sweep to `results.csv` in the output folder
pub fn write_results(output_path: &Path, results: &ResultsTable) -> Result<()> {
    let file_path = output_path.join(RESULTS_FILE_NAME);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for row in results.rows() {
        writer.serialize(ResultsFileRow::new(row))?;
    }
    writer.flush()?;

    Ok(())
}

/// The path of the variable dump for a scenario
fn debug_variables_file_path(output_path: &Path, scenario: &ScenarioConfig) -> PathBuf {
    output_path.join(format!(
        "{DEBUG_VARIABLES_FILE_PREFIX}_{}.csv",
        scenario.file_stem()
    ))
}

/// Write the value of every variable of an optimal solution, followed by the objective
pub fn write_debug_variables(
    output_path: &Path,
    scenario: &ScenarioConfig,
    problem: &Problem,
    solution: &Solution,
) -> Result<()> {
    let file_path = debug_variables_file_path(output_path, scenario);
    let mut writer = csv::Writer::from_path(&file_path)
        .with_context(|| format!("Could not create {}", file_path.display()))?;
    for (column, &value) in problem.columns().iter().zip(solution.values()) {
        writer.serialize(VariableRow {
            variable: &column.name,
            value,
        })?;
    }
    writer.serialize(VariableRow {
        variable: "Objective",
        value: solution.objective(),
    })?;
    writer.flush()?;

    Ok(())
}
