//! Hourly exogenous series: capacity factors, grid prices and demand.
use crate::error::ConfigurationError;
use crate::scenario::Country;
use anyhow::Result;
use std::ops::Range;
use strum::{EnumIter, IntoStaticStr};

/// The kinds of per-country hourly series a provider can supply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum SeriesKind {
    /// Fraction of contracted wind capacity delivered in each hour
    WindCapacityFactor,
    /// Fraction of contracted solar capacity delivered in each hour
    SolarCapacityFactor,
    /// Spot price of grid electricity (€/MWh)
    GridPrice,
}

impl SeriesKind {
    /// The name used for this series in configuration errors and log messages
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Whether values must be fractions between 0 and 1
    pub fn is_capacity_factor(self) -> bool {
        !matches!(self, Self::GridPrice)
    }
}

/// A source of per-country hourly series.
///
/// Implementations only hand out data; they know nothing about scenarios or sensitivity cases.
pub trait TimeSeriesProvider {
    /// Get the series of the given kind for a country.
    ///
    /// Fails with a [`ConfigurationError`] if the series is not available.
    fn series(&self, kind: SeriesKind, country: Country) -> Result<&[f64]>;
}

/// The error for a series which a provider cannot supply
pub fn series_unavailable(kind: SeriesKind, country: Country) -> anyhow::Error {
    ConfigurationError::new(kind.name(), format!("No {} series for {country}", kind.name())).into()
}

/// Full availability of wind and solar in every hour, except for an optional outage window.
///
/// This stands in for baseload contracts, which deliver regardless of the weather.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantAvailability {
    capacity_factor: Vec<f64>,
}

impl ConstantAvailability {
    /// Create a profile covering `horizon_hours` hours
    pub fn new(horizon_hours: usize, outage: Option<&Range<usize>>) -> Self {
        let capacity_factor = (0..horizon_hours)
            .map(|hour| {
                if outage.is_some_and(|outage| outage.contains(&hour)) {
                    0.0
                } else {
                    1.0
                }
            })
            .collect();

        Self { capacity_factor }
    }
}

impl TimeSeriesProvider for ConstantAvailability {
    fn series(&self, kind: SeriesKind, country: Country) -> Result<&[f64]> {
        match kind {
            SeriesKind::WindCapacityFactor | SeriesKind::SolarCapacityFactor => {
                Ok(&self.capacity_factor)
            }
            SeriesKind::GridPrice => Err(series_unavailable(kind, country)),
        }
    }
}

/// The hourly inputs for building one problem
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    /// Wind capacity factor for each hour
    pub wind_capacity_factor: Vec<f64>,
    /// Solar capacity factor for each hour, if there is a solar contract
    pub solar_capacity_factor: Option<Vec<f64>>,
    /// Grid price for each hour (€/MWh), before any sensitivity multiplier
    pub grid_price: Option<Vec<f64>>,
    /// Hydrogen demand for each hour (kg)
    pub demand: Vec<f64>,
    /// Hours in which the electrolyser is down for maintenance
    pub maintenance: Option<Range<usize>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;

    #[test]
    fn test_constant_availability() {
        let provider = ConstantAvailability::new(6, Some(&(2..4)));
        let expected = [1.0, 1.0, 0.0, 0.0, 1.0, 1.0];
        assert_eq!(
            provider
                .series(SeriesKind::WindCapacityFactor, Country::Finland)
                .unwrap(),
            expected
        );
        assert_eq!(
            provider
                .series(SeriesKind::SolarCapacityFactor, Country::Germany)
                .unwrap(),
            expected
        );
        assert_error!(
            provider.series(SeriesKind::GridPrice, Country::Sweden),
            "Invalid value for grid_price: No grid_price series for SE"
        );
    }

    #[test]
    fn test_constant_availability_no_outage() {
        let provider = ConstantAvailability::new(3, None);
        assert_eq!(
            provider
                .series(SeriesKind::WindCapacityFactor, Country::Sweden)
                .unwrap(),
            [1.0, 1.0, 1.0]
        );
    }
}
