//! Fixtures for tests

use crate::parameters::ParameterSet;
use crate::problem::{Variable, VariableMap};
use crate::scenario::{Country, PriceYear};
use crate::time_series::TimeSeries;
use crate::variant::ContractType;
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Number of hours in the fixture series
pub const FIXTURE_HOURS: usize = 10;

#[fixture]
pub fn simple_parameters() -> ParameterSet {
    ParameterSet::baseline(Country::Sweden, PriceYear::Y2022, ContractType::PayAsProduced)
}

/// Full availability with a flat demand and no grid connection
#[fixture]
pub fn simple_time_series() -> TimeSeries {
    TimeSeries {
        wind_capacity_factor: vec![1.0; FIXTURE_HOURS],
        solar_capacity_factor: Some(vec![1.0; FIXTURE_HOURS]),
        grid_price: None,
        demand: vec![100.0; FIXTURE_HOURS],
        maintenance: None,
    }
}

/// Variable wind and solar with hourly grid prices
#[fixture]
pub fn battery_time_series() -> TimeSeries {
    TimeSeries {
        wind_capacity_factor: vec![0.9, 0.8, 0.1, 0.0, 0.3, 0.7, 1.0, 0.6, 0.2, 0.5],
        solar_capacity_factor: Some(vec![0.0, 0.0, 0.2, 0.5, 0.8, 0.9, 0.6, 0.3, 0.0, 0.0]),
        grid_price: Some(vec![
            40.0, 35.0, 80.0, 120.0, 60.0, 30.0, 20.0, 45.0, 90.0, 70.0,
        ]),
        demand: vec![100.0; FIXTURE_HOURS],
        maintenance: None,
    }
}

/// A variable map with only the electrolyser and wind capacities, for hand-built problems
pub fn scalar_variable_map(capacity_elec: Variable, capacity_wind: Variable) -> VariableMap {
    VariableMap {
        capacity_elec,
        capacity_wind,
        capacity_solar: None,
        capacity_storage: capacity_elec,
        capacity_battery: None,
        wind_prod: Vec::new(),
        solar_prod: None,
        electricity_prod: Vec::new(),
        hydrogen_prod: Vec::new(),
        hydrogen_stored: Vec::new(),
        electricity_stored: None,
        electricity_sold: None,
        electricity_bought: None,
    }
}
