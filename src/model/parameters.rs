//! Defines the `ModelParameters` struct, which represents the contents of `model.toml`.
use crate::demand::{DemandProfile, deserialise_hour_window};
use crate::input::{input_err_msg, read_toml};
use crate::scenario::ScenarioAxes;
use crate::variant::{CapacityFactorSource, ModelVariant};
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::ops::Range;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Represents the contents of the entire model file.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// Which formulation to build for every scenario
    pub variant: ModelVariant,
    /// Number of hours in the optimisation horizon
    pub horizon_hours: usize,
    /// The countries, price years and sensitivity cases to sweep over
    #[serde(flatten)]
    pub axes: ScenarioAxes,
    /// The hourly hydrogen demand
    pub demand: DemandProfile,
    /// Hours in which the electrolyser is down for maintenance
    #[serde(default, deserialize_with = "deserialise_hour_window")]
    pub maintenance: Option<Range<usize>>,
    /// Hours in which baseload contracts deliver nothing
    #[serde(default, deserialize_with = "deserialise_hour_window")]
    pub availability_outage: Option<Range<usize>>,
}

/// Check that the `horizon_hours` parameter is valid
fn check_horizon_hours(horizon_hours: usize) -> Result<()> {
    ensure!(horizon_hours > 0, "horizon_hours cannot be zero");

    Ok(())
}

/// Check that an hour window lies within the horizon
fn check_window(name: &str, window: Option<&Range<usize>>, horizon_hours: usize) -> Result<()> {
    if let Some(window) = window {
        ensure!(
            window.end <= horizon_hours,
            "{name} window {window:?} extends beyond the horizon of {horizon_hours} hours"
        );
    }

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a [`ModelParameters`] struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_horizon_hours(self.horizon_hours)?;
        self.axes.validate()?;
        self.demand
            .validate(self.horizon_hours)
            .context("Invalid demand profile")?;
        check_window(
            "maintenance",
            self.maintenance.as_ref(),
            self.horizon_hours,
        )?;

        // availability_outage
        let spec = self.variant.spec();
        if self.availability_outage.is_some() {
            ensure!(
                spec.capacity_factors == CapacityFactorSource::ConstantAvailability,
                "availability_outage cannot be used with the {} variant, whose capacity factors \
                are read from file",
                self.variant
            );
        }
        check_window(
            "availability_outage",
            self.availability_outage.as_ref(),
            self.horizon_hours,
        )?;

        // Grid price cases without a grid fail for each scenario, so only warn here
        if !spec.needs_grid_price() {
            for case in &self.axes.sensitivity_cases {
                if case.affects_grid_price() {
                    warn!(
                        "Sensitivity case {case} has no effect on the {} variant and will be \
                        reported as a configuration error",
                        self.variant
                    );
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{Country, PriceYear, SensitivityCase};
    use crate::units::MassPerHour;
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    const VALID_MODEL: &str = r#"
variant = "baseload"
horizon_hours = 24
countries = ["FI", "SE"]
price_years = [2022]
sensitivity_cases = ["baseline", "capex_elec_up"]
maintenance = [10, 12]
availability_outage = [4, 6]

[demand]
rate = 100.0
pause = [20, 22]
"#;

    fn parse(toml_str: &str) -> Result<ModelParameters> {
        let params: ModelParameters = toml::from_str(toml_str)?;
        params.validate()?;
        Ok(params)
    }

    #[test]
    fn test_model_params_from_path() {
        let dir = tempdir().unwrap();
        {
            let mut file = File::create(dir.path().join(MODEL_PARAMETERS_FILE_NAME)).unwrap();
            write!(file, "{VALID_MODEL}").unwrap();
        }

        let model_params = ModelParameters::from_path(dir.path()).unwrap();
        assert_eq!(
            model_params,
            ModelParameters {
                variant: ModelVariant::Baseload,
                horizon_hours: 24,
                axes: ScenarioAxes {
                    countries: vec![Country::Finland, Country::Sweden],
                    price_years: vec![PriceYear::Y2022],
                    sensitivity_cases: vec![
                        SensitivityCase::Baseline,
                        SensitivityCase::CapexElecUp
                    ],
                },
                demand: DemandProfile {
                    rate: MassPerHour(100.0),
                    start_hour: 0,
                    pause: Some(20..22),
                },
                maintenance: Some(10..12),
                availability_outage: Some(4..6),
            }
        );
    }

    #[test]
    fn test_model_params_from_path_invalid() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(MODEL_PARAMETERS_FILE_NAME);
        {
            let mut file = File::create(&file_path).unwrap();
            write!(file, "{}", VALID_MODEL.replace("horizon_hours = 24", "horizon_hours = 0"))
                .unwrap();
        }

        let err = ModelParameters::from_path(dir.path()).unwrap_err();
        assert_eq!(err.to_string(), input_err_msg(&file_path));
        assert_eq!(
            err.chain().nth(1).unwrap().to_string(),
            "horizon_hours cannot be zero"
        );
    }

    #[rstest]
    #[case("maintenance = [10, 12]", "maintenance = [10, 30]", "maintenance window")]
    #[case(
        "availability_outage = [4, 6]",
        "availability_outage = [4, 25]",
        "availability_outage window"
    )]
    #[case("pause = [20, 22]", "pause = [20, 40]", "Invalid demand profile")]
    #[case("countries = [\"FI\", \"SE\"]", "countries = []", "`countries` cannot be empty")]
    #[case(
        "variant = \"baseload\"",
        "variant = \"pay_as_produced\"",
        "availability_outage cannot be used"
    )]
    fn test_validate_invalid(#[case] from: &str, #[case] to: &str, #[case] fragment: &str) {
        let err = parse(&VALID_MODEL.replace(from, to)).unwrap_err();
        assert!(
            err.to_string().contains(fragment),
            "Error message should mention {fragment}, got: {err}"
        );
    }

    #[rstest]
    #[case("variant = \"baseload\"", "variant = \"base_load\"")]
    #[case("price_years = [2022]", "price_years = [2021]")]
    #[case("\"capex_elec_up\"", "\"capex_up\"")]
    fn test_unknown_tags_rejected(#[case] from: &str, #[case] to: &str) {
        assert!(parse(&VALID_MODEL.replace(from, to)).is_err());
    }

    #[test]
    fn test_optional_windows_default_to_none() {
        let toml_str = VALID_MODEL
            .replace("maintenance = [10, 12]\n", "")
            .replace("availability_outage = [4, 6]\n", "");
        let params = parse(&toml_str).unwrap();
        assert_eq!(params.maintenance, None);
        assert_eq!(params.availability_outage, None);
    }
}
