//! The model: sweep definition plus the source of hourly series.
use crate::input::time_series::CsvTimeSeries;
use crate::scenario::ScenarioConfig;
use crate::time_series::{ConstantAvailability, SeriesKind, TimeSeries, TimeSeriesProvider};
use crate::variant::CapacityFactorSource;
use anyhow::Result;
use log::warn;
use std::path::Path;
use strum::IntoEnumIterator;

pub mod parameters;
pub use parameters::ModelParameters;

/// Warn about swept countries which lack a series the variant needs
fn warn_missing_series(parameters: &ModelParameters, series: &CsvTimeSeries) {
    let spec = parameters.variant.spec();
    for kind in SeriesKind::iter() {
        let needed = match kind {
            SeriesKind::WindCapacityFactor => true,
            SeriesKind::SolarCapacityFactor => spec.solar,
            SeriesKind::GridPrice => spec.needs_grid_price(),
        };
        if !needed {
            continue;
        }

        let available: Vec<_> = series.countries(kind).collect();
        for country in &parameters.axes.countries {
            if !available.contains(country) {
                warn!(
                    "No {} series for {country}; its scenarios will be reported as configuration \
                    errors",
                    kind.name()
                );
            }
        }
    }
}

/// Model definition
pub struct Model {
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Where per-country hourly series come from
    series: Box<dyn TimeSeriesProvider>,
}

impl Model {
    /// Create a model from its parameters and a series provider
    pub fn new(parameters: ModelParameters, series: Box<dyn TimeSeriesProvider>) -> Self {
        Self { parameters, series }
    }

    /// Read a model from the specified directory.
    ///
    /// Variants with constant availability don't read any series files.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<Model> {
        let parameters = ModelParameters::from_path(&model_dir)?;
        let series: Box<dyn TimeSeriesProvider> =
            match parameters.variant.spec().capacity_factors {
                CapacityFactorSource::ConstantAvailability => Box::new(ConstantAvailability::new(
                    parameters.horizon_hours,
                    parameters.availability_outage.as_ref(),
                )),
                CapacityFactorSource::Measured => {
                    let series = CsvTimeSeries::from_dir(model_dir.as_ref())?;
                    warn_missing_series(&parameters, &series);
                    Box::new(series)
                }
            };

        Ok(Self::new(parameters, series))
    }

    /// The number of scenarios the model sweeps over
    pub fn num_scenarios(&self) -> usize {
        self.parameters.axes.len()
    }

    /// Iterate over the scenarios to sweep over, in order
    pub fn iter_scenarios(&self) -> impl Iterator<Item = ScenarioConfig> + '_ {
        self.parameters.axes.iter(self.parameters.variant)
    }

    /// Gather the hourly inputs for one scenario.
    ///
    /// Fails with a configuration error if a series the variant needs is not available for the
    /// scenario's country.
    pub fn time_series_for(&self, scenario: &ScenarioConfig) -> Result<TimeSeries> {
        let spec = scenario.variant.spec();
        let get = |kind| -> Result<Vec<f64>> {
            Ok(self.series.series(kind, scenario.country)?.to_vec())
        };

        Ok(TimeSeries {
            wind_capacity_factor: get(SeriesKind::WindCapacityFactor)?,
            solar_capacity_factor: spec
                .solar
                .then(|| get(SeriesKind::SolarCapacityFactor))
                .transpose()?,
            grid_price: spec
                .needs_grid_price()
                .then(|| get(SeriesKind::GridPrice))
                .transpose()?,
            demand: self
                .parameters
                .demand
                .hourly(self.parameters.horizon_hours),
            maintenance: self.parameters.maintenance.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::demand::DemandProfile;
    use crate::error::ConfigurationError;
    use crate::scenario::{Country, PriceYear, ScenarioAxes, SensitivityCase};
    use crate::units::MassPerHour;
    use crate::variant::ModelVariant;
    use std::fs;
    use tempfile::tempdir;

    fn parameters(variant: ModelVariant) -> ModelParameters {
        ModelParameters {
            variant,
            horizon_hours: 4,
            axes: ScenarioAxes {
                countries: vec![Country::Finland, Country::Sweden],
                price_years: vec![PriceYear::Y2022],
                sensitivity_cases: vec![SensitivityCase::Baseline],
            },
            demand: DemandProfile {
                rate: MassPerHour(50.0),
                start_hour: 1,
                pause: None,
            },
            maintenance: Some(2..3),
            availability_outage: Some(0..1),
        }
    }

    fn scenario(variant: ModelVariant, country: Country) -> ScenarioConfig {
        ScenarioConfig {
            variant,
            country,
            price_year: PriceYear::Y2022,
            sensitivity: SensitivityCase::Baseline,
        }
    }

    #[test]
    fn test_time_series_for_constant_availability() {
        let params = parameters(ModelVariant::Baseload);
        let provider = ConstantAvailability::new(4, params.availability_outage.as_ref());
        let model = Model::new(params, Box::new(provider));
        assert_eq!(model.num_scenarios(), 2);

        let series = model
            .time_series_for(&scenario(ModelVariant::Baseload, Country::Finland))
            .unwrap();
        assert_eq!(
            series,
            TimeSeries {
                wind_capacity_factor: vec![0.0, 1.0, 1.0, 1.0],
                solar_capacity_factor: Some(vec![0.0, 1.0, 1.0, 1.0]),
                grid_price: None,
                demand: vec![0.0, 50.0, 50.0, 50.0],
                maintenance: Some(2..3),
            }
        );
    }

    #[test]
    fn test_time_series_for_csv() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("wind_capacity_factors.csv"),
            "hour,FI,SE\n0,0.5,0.1\n1,0.6,0.2\n2,0.7,0.3\n3,0.8,0.4\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("grid_prices.csv"),
            "hour,SE\n0,10\n1,20\n2,30\n3,40\n",
        )
        .unwrap();

        let mut params = parameters(ModelVariant::BatteryDispatch);
        params.availability_outage = None;
        let provider = CsvTimeSeries::from_dir(dir.path()).unwrap();
        let model = Model::new(params, Box::new(provider));

        let series = model
            .time_series_for(&scenario(ModelVariant::BatteryDispatch, Country::Sweden))
            .unwrap();
        assert_eq!(series.wind_capacity_factor, [0.1, 0.2, 0.3, 0.4]);
        assert_eq!(series.solar_capacity_factor, None);
        assert_eq!(series.grid_price, Some(vec![10.0, 20.0, 30.0, 40.0]));

        // No grid price for Finland
        let err = model
            .time_series_for(&scenario(ModelVariant::BatteryDispatch, Country::Finland))
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<ConfigurationError>().unwrap().field,
            "grid_price"
        );
    }
}
