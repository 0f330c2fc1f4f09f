//! Scenario coordinates: which country, PPA price year and sensitivity case a problem is built for.
use crate::variant::ModelVariant;
use anyhow::{Result, ensure};
use itertools::{Itertools, iproduct};
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::fmt;
use strum::{EnumIter, IntoStaticStr};

/// A country (bidding zone) for which PPA prices, tariffs and time series are defined
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    IntoStaticStr,
    DeserializeLabeledStringEnum,
)]
pub enum Country {
    /// Finland
    #[string = "FI"]
    #[strum(serialize = "FI")]
    Finland,
    /// Sweden
    #[string = "SE"]
    #[strum(serialize = "SE")]
    Sweden,
    /// Germany
    #[string = "DE"]
    #[strum(serialize = "DE")]
    Germany,
}

impl Country {
    /// The two-letter code used in input and output files
    pub fn code(self) -> &'static str {
        self.into()
    }

    /// Whether electricity may be bought from the grid to produce hydrogen in this country
    pub fn allows_grid_purchase(self) -> bool {
        matches!(self, Self::Sweden)
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// The year of the Q4 PPA price quotes used for a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, Deserialize)]
#[serde(try_from = "u32")]
pub enum PriceYear {
    /// 2020 Q4 prices
    Y2020,
    /// 2022 Q4 prices
    Y2022,
}

impl PriceYear {
    /// The calendar year
    pub fn year(self) -> u32 {
        match self {
            Self::Y2020 => 2020,
            Self::Y2022 => 2022,
        }
    }
}

impl TryFrom<u32> for PriceYear {
    type Error = String;

    fn try_from(year: u32) -> Result<Self, Self::Error> {
        match year {
            2020 => Ok(Self::Y2020),
            2022 => Ok(Self::Y2022),
            _ => Err(format!(
                "No PPA price table for year {year} (expected 2020 or 2022)"
            )),
        }
    }
}

impl fmt::Display for PriceYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.year())
    }
}

/// A named perturbation of the baseline parameters.
///
/// The perturbations applied for each case are listed in
/// [`crate::parameters::perturbations`].
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    EnumIter,
    IntoStaticStr,
    DeserializeLabeledStringEnum,
)]
#[strum(serialize_all = "snake_case")]
pub enum SensitivityCase {
    /// Unperturbed parameters
    #[string = "baseline"]
    Baseline,
    /// Electrolyser capital and operating costs increased
    #[string = "capex_elec_up"]
    CapexElecUp,
    /// Electrolyser capital and operating costs decreased
    #[string = "capex_elec_down"]
    CapexElecDown,
    /// Higher electrolyser annuity rate
    #[string = "annuity_elec_up"]
    AnnuityElecUp,
    /// Lower electrolyser annuity rate
    #[string = "annuity_elec_down"]
    AnnuityElecDown,
    /// Higher electrolyser efficiency
    #[string = "efficiency_elec_up"]
    EfficiencyElecUp,
    /// Lower electrolyser efficiency
    #[string = "efficiency_elec_down"]
    EfficiencyElecDown,
    /// Higher wind and solar PPA prices
    #[string = "renewable_price_up"]
    RenewablePriceUp,
    /// Lower wind and solar PPA prices
    #[string = "renewable_price_down"]
    RenewablePriceDown,
    /// Higher hourly grid prices
    #[string = "grid_price_up"]
    GridPriceUp,
    /// Lower hourly grid prices
    #[string = "grid_price_down"]
    GridPriceDown,
}

impl SensitivityCase {
    /// The label used in input and output files
    pub fn label(self) -> &'static str {
        self.into()
    }

    /// Whether this case perturbs the hourly grid price
    pub fn affects_grid_price(self) -> bool {
        matches!(self, Self::GridPriceUp | Self::GridPriceDown)
    }
}

impl fmt::Display for SensitivityCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The coordinates of one point in a scenario sweep
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScenarioConfig {
    /// Which formulation to build
    pub variant: ModelVariant,
    /// Country for prices, tariffs and time series
    pub country: Country,
    /// PPA price year
    pub price_year: PriceYear,
    /// Perturbation of baseline parameters
    pub sensitivity: SensitivityCase,
}

impl ScenarioConfig {
    /// A name for the scenario which is safe to use in file names
    pub fn file_stem(&self) -> String {
        format!("{}_{}_{}", self.country, self.price_year, self.sensitivity)
    }
}

impl fmt::Display for ScenarioConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.variant, self.country, self.price_year, self.sensitivity
        )
    }
}

/// The axes of a scenario sweep
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScenarioAxes {
    /// Countries to sweep over
    pub countries: Vec<Country>,
    /// PPA price years to sweep over
    pub price_years: Vec<PriceYear>,
    /// Sensitivity cases to sweep over
    pub sensitivity_cases: Vec<SensitivityCase>,
}

/// Check that an axis is non-empty and has no repeated values
fn check_axis<T: Eq + std::hash::Hash + fmt::Display>(name: &str, values: &[T]) -> Result<()> {
    ensure!(!values.is_empty(), "`{name}` cannot be empty");
    if let Some(dup) = values.iter().duplicates().next() {
        anyhow::bail!("`{name}` contains {dup} more than once");
    }

    Ok(())
}

impl ScenarioAxes {
    /// Check that every axis is non-empty and contains unique values
    pub fn validate(&self) -> Result<()> {
        check_axis("countries", &self.countries)?;
        check_axis("price_years", &self.price_years)?;
        check_axis("sensitivity_cases", &self.sensitivity_cases)?;

        Ok(())
    }

    /// The number of points in the sweep
    pub fn len(&self) -> usize {
        self.countries.len() * self.price_years.len() * self.sensitivity_cases.len()
    }

    /// Whether the sweep has no points
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterate over the Cartesian product of the axes.
    ///
    /// The order is country (outermost), then price year, then sensitivity case (innermost).
    pub fn iter(&self, variant: ModelVariant) -> impl Iterator<Item = ScenarioConfig> + '_ {
        iproduct!(
            self.countries.iter(),
            self.price_years.iter(),
            self.sensitivity_cases.iter()
        )
        .map(move |(&country, &price_year, &sensitivity)| ScenarioConfig {
            variant,
            country,
            price_year,
            sensitivity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[derive(Deserialize)]
    struct Wrapper {
        axes: ScenarioAxes,
    }

    fn parse_axes(toml_str: &str) -> Result<ScenarioAxes> {
        let wrapper: Wrapper = toml::from_str(toml_str)?;
        Ok(wrapper.axes)
    }

    #[test]
    fn test_axes_deserialise() {
        let axes = parse_axes(
            "[axes]
            countries = [\"FI\", \"SE\"]
            price_years = [2022, 2020]
            sensitivity_cases = [\"baseline\", \"grid_price_up\"]",
        )
        .unwrap();
        assert_eq!(axes.countries, [Country::Finland, Country::Sweden]);
        assert_eq!(axes.price_years, [PriceYear::Y2022, PriceYear::Y2020]);
        assert_eq!(
            axes.sensitivity_cases,
            [SensitivityCase::Baseline, SensitivityCase::GridPriceUp]
        );
    }

    #[rstest]
    #[case("countries = [\"NO\"]\nprice_years = [2022]\nsensitivity_cases = [\"baseline\"]")]
    #[case("countries = [\"FI\"]\nprice_years = [2021]\nsensitivity_cases = [\"baseline\"]")]
    #[case("countries = [\"FI\"]\nprice_years = [2022]\nsensitivity_cases = [\"CapexElecUp\"]")]
    fn test_axes_unknown_tag(#[case] body: &str) {
        assert!(parse_axes(&format!("[axes]\n{body}")).is_err());
    }

    #[test]
    fn test_axes_validate() {
        let mut axes = ScenarioAxes {
            countries: vec![Country::Finland],
            price_years: vec![PriceYear::Y2022],
            sensitivity_cases: vec![SensitivityCase::Baseline],
        };
        assert!(axes.validate().is_ok());

        axes.countries.push(Country::Finland);
        assert_eq!(
            axes.validate().unwrap_err().to_string(),
            "`countries` contains FI more than once"
        );

        axes.countries.clear();
        assert_eq!(
            axes.validate().unwrap_err().to_string(),
            "`countries` cannot be empty"
        );
    }

    #[test]
    fn test_axes_iter_order() {
        let axes = ScenarioAxes {
            countries: vec![Country::Sweden, Country::Finland],
            price_years: vec![PriceYear::Y2022, PriceYear::Y2020],
            sensitivity_cases: vec![SensitivityCase::Baseline, SensitivityCase::CapexElecUp],
        };
        let points = axes.iter(ModelVariant::Baseload).collect_vec();
        assert_eq!(points.len(), axes.len());
        assert_eq!(points.len(), 8);

        let coords = points
            .iter()
            .map(|s| (s.country, s.price_year, s.sensitivity))
            .collect_vec();
        assert_eq!(
            coords[..3],
            [
                (
                    Country::Sweden,
                    PriceYear::Y2022,
                    SensitivityCase::Baseline
                ),
                (
                    Country::Sweden,
                    PriceYear::Y2022,
                    SensitivityCase::CapexElecUp
                ),
                (
                    Country::Sweden,
                    PriceYear::Y2020,
                    SensitivityCase::Baseline
                ),
            ]
        );
        assert_eq!(coords[7].0, Country::Finland);
        assert!(points.iter().all(|s| s.variant == ModelVariant::Baseload));
    }

    #[test]
    fn test_labels_round_trip_with_display() {
        for case in SensitivityCase::iter() {
            assert_eq!(case.to_string(), case.label());
        }
        assert_eq!(SensitivityCase::RenewablePriceDown.label(), "renewable_price_down");
        assert_eq!(Country::Germany.to_string(), "DE");
        assert_eq!(PriceYear::Y2020.to_string(), "2020");
    }

    #[test]
    fn test_file_stem() {
        let scenario = ScenarioConfig {
            variant: ModelVariant::PayAsProduced,
            country: Country::Sweden,
            price_year: PriceYear::Y2022,
            sensitivity: SensitivityCase::GridPriceDown,
        };
        assert_eq!(scenario.file_stem(), "SE_2022_grid_price_down");
    }
}
