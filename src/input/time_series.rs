//! Code for reading per-country hourly series from CSV files.
use super::input_err_msg;
use crate::scenario::Country;
use crate::time_series::{SeriesKind, TimeSeriesProvider, series_unavailable};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use itertools::Itertools;
use log::debug;
use std::io::Read;
use std::path::Path;
use strum::IntoEnumIterator;

const WIND_CAPACITY_FACTORS_FILE_NAME: &str = "wind_capacity_factors.csv";
const SOLAR_CAPACITY_FACTORS_FILE_NAME: &str = "solar_capacity_factors.csv";
const GRID_PRICES_FILE_NAME: &str = "grid_prices.csv";

/// The name of the file holding series of the given kind
fn series_file_name(kind: SeriesKind) -> &'static str {
    match kind {
        SeriesKind::WindCapacityFactor => WIND_CAPACITY_FACTORS_FILE_NAME,
        SeriesKind::SolarCapacityFactor => SOLAR_CAPACITY_FACTORS_FILE_NAME,
        SeriesKind::GridPrice => GRID_PRICES_FILE_NAME,
    }
}

/// Hourly series read from the CSV files in a model directory.
///
/// Each file has one column per country, headed by its code, and one row per hour. Other columns
/// (e.g. an `hour` column) are ignored.
#[derive(Debug, Default, PartialEq)]
pub struct CsvTimeSeries {
    series: IndexMap<(SeriesKind, Country), Vec<f64>>,
}

impl CsvTimeSeries {
    /// Read all series files present in `model_dir`. Missing files are skipped.
    pub fn from_dir(model_dir: &Path) -> Result<Self> {
        let mut series = IndexMap::new();
        for kind in SeriesKind::iter() {
            let file_path = model_dir.join(series_file_name(kind));
            if !file_path.is_file() {
                debug!("No {} file found; skipping", file_path.display());
                continue;
            }

            let reader = csv::Reader::from_path(&file_path)
                .with_context(|| input_err_msg(&file_path))?;
            let by_country =
                read_series_from_reader(reader, kind).with_context(|| input_err_msg(&file_path))?;
            for (country, values) in by_country {
                series.insert((kind, country), values);
            }
        }

        Ok(Self { series })
    }

    /// The countries for which a series of the given kind is available
    pub fn countries(&self, kind: SeriesKind) -> impl Iterator<Item = Country> + '_ {
        self.series
            .keys()
            .filter(move |(k, _)| *k == kind)
            .map(|(_, country)| *country)
    }
}

impl TimeSeriesProvider for CsvTimeSeries {
    fn series(&self, kind: SeriesKind, country: Country) -> Result<&[f64]> {
        self.series
            .get(&(kind, country))
            .map(Vec::as_slice)
            .ok_or_else(|| series_unavailable(kind, country))
    }
}

/// Look up a country by its two-letter code
fn country_from_code(code: &str) -> Option<Country> {
    Country::iter().find(|country| country.code() == code)
}

/// Check that a single value is acceptable for the given kind of series
fn check_value(kind: SeriesKind, value: f64) -> Result<()> {
    if kind.is_capacity_factor() {
        ensure!(
            (0.0..=1.0).contains(&value),
            "Capacity factor must be between 0 and 1"
        );
    } else {
        ensure!(value.is_finite(), "Price must be a finite number");
    }

    Ok(())
}

/// Read one series per country column from CSV data
fn read_series_from_reader<R: Read>(
    mut reader: csv::Reader<R>,
    kind: SeriesKind,
) -> Result<IndexMap<Country, Vec<f64>>> {
    let columns = reader
        .headers()?
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| country_from_code(header.trim()).map(|c| (idx, c)))
        .collect_vec();
    ensure!(!columns.is_empty(), "No country columns found");
    if let Some(country) = columns.iter().map(|(_, c)| c).duplicates().next() {
        bail!("Column {country} appears more than once");
    }

    let mut values = vec![Vec::new(); columns.len()];
    for (row, record) in reader.records().enumerate() {
        let record = record?;
        for ((idx, country), values) in columns.iter().zip(values.iter_mut()) {
            let field = record.get(*idx).unwrap_or_default().trim();
            let value: f64 = field
                .parse()
                .with_context(|| format!("Invalid value '{field}' for {country} in row {row}"))?;
            check_value(kind, value)
                .with_context(|| format!("Invalid value {value} for {country} in row {row}"))?;
            values.push(value);
        }
    }
    ensure!(!values[0].is_empty(), "CSV file cannot be empty");

    Ok(columns
        .into_iter()
        .map(|(_, country)| country)
        .zip(values)
        .collect())
}
