//! Resolution of scenario coordinates into concrete techno-economic parameters.
//!
//! Baseline values come from fixed tables keyed by country, PPA price year and contract type. A
//! sensitivity case then applies a small set of perturbations on top, listed in a static table so
//! that every case is accounted for at compile time.
use crate::error::ConfigurationError;
use crate::scenario::{Country, PriceYear, SensitivityCase};
use crate::units::{Dimensionless, MassPerEnergy, MoneyPerEnergy, MoneyPerMass, MoneyPerPower};
use crate::variant::{ContractType, ModelVariant};
use anyhow::Result;

/// Multiplier for an upward perturbation
const UP: f64 = 1.2;
/// Multiplier for a downward perturbation
const DOWN: f64 = 0.8;

/// The fully-resolved numeric parameters for one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSet {
    /// Electrolyser capital cost
    pub capex_elec: MoneyPerPower,
    /// Electrolyser yearly operating cost
    pub opex_elec: MoneyPerPower,
    /// Electrolyser annuity rate
    pub annuity_elec: Dimensionless,
    /// Hydrogen produced per MWh of electricity
    pub efficiency_elec: MassPerEnergy,
    /// Maximum change in hydrogen output per hour, as a fraction of electrolyser capacity
    pub ramp_limit: Dimensionless,
    /// Tank capital cost
    pub capex_storage: MoneyPerMass,
    /// Tank yearly operating cost
    pub opex_storage: MoneyPerMass,
    /// Tank annuity rate
    pub annuity_storage: Dimensionless,
    /// Battery capital cost
    pub capex_battery: MoneyPerEnergy,
    /// Battery yearly operating cost
    pub opex_battery: MoneyPerEnergy,
    /// Battery annuity rate
    pub annuity_battery: Dimensionless,
    /// Usable fraction of battery capacity
    pub depth_of_discharge: Dimensionless,
    /// Battery charge efficiency
    pub charge_efficiency: Dimensionless,
    /// Maximum (dis)charge per hour as a fraction of battery capacity
    pub charge_power_fraction: Dimensionless,
    /// Weighted average cost of capital
    pub wacc: Dimensionless,
    /// Cost of water per kg of hydrogen
    pub water_cost: MoneyPerMass,
    /// Electricity tax
    pub electricity_tax: MoneyPerEnergy,
    /// Transmission fee
    pub transmission_fee: MoneyPerEnergy,
    /// Wind PPA price
    pub ppa_price_wind: MoneyPerEnergy,
    /// Solar PPA price
    pub ppa_price_solar: MoneyPerEnergy,
    /// Factor applied to every hourly grid price
    pub grid_price_multiplier: Dimensionless,
}

/// Identifies a perturbable parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKey {
    /// [`ParameterSet::capex_elec`]
    CapexElec,
    /// [`ParameterSet::opex_elec`]
    OpexElec,
    /// [`ParameterSet::annuity_elec`]
    AnnuityElec,
    /// [`ParameterSet::efficiency_elec`]
    EfficiencyElec,
    /// [`ParameterSet::ppa_price_wind`]
    PpaPriceWind,
    /// [`ParameterSet::ppa_price_solar`]
    PpaPriceSolar,
    /// [`ParameterSet::grid_price_multiplier`]
    GridPriceMultiplier,
}

/// A change to a single baseline value
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Perturbation {
    /// Multiply by a factor
    Scale(f64),
    /// Replace with a fixed value
    Set(f64),
}

impl Perturbation {
    /// Apply the perturbation to a value
    fn apply(self, value: &mut f64) {
        match self {
            Self::Scale(factor) => *value *= factor,
            Self::Set(new_value) => *value = new_value,
        }
    }
}

/// The perturbations applied for a sensitivity case
pub fn perturbations(case: SensitivityCase) -> &'static [(ParameterKey, Perturbation)] {
    use ParameterKey::{
        AnnuityElec, CapexElec, EfficiencyElec, GridPriceMultiplier, OpexElec, PpaPriceSolar,
        PpaPriceWind,
    };
    use Perturbation::{Scale, Set};

    match case {
        SensitivityCase::Baseline => &[],
        SensitivityCase::CapexElecUp => &[(CapexElec, Scale(UP)), (OpexElec, Scale(UP))],
        SensitivityCase::CapexElecDown => &[(CapexElec, Scale(DOWN)), (OpexElec, Scale(DOWN))],
        SensitivityCase::AnnuityElecUp => &[(AnnuityElec, Set(0.207))],
        SensitivityCase::AnnuityElecDown => &[(AnnuityElec, Set(0.148))],
        SensitivityCase::EfficiencyElecUp => &[(EfficiencyElec, Scale(UP))],
        SensitivityCase::EfficiencyElecDown => &[(EfficiencyElec, Scale(DOWN))],
        SensitivityCase::RenewablePriceUp => {
            &[(PpaPriceWind, Scale(UP)), (PpaPriceSolar, Scale(UP))]
        }
        SensitivityCase::RenewablePriceDown => {
            &[(PpaPriceWind, Scale(DOWN)), (PpaPriceSolar, Scale(DOWN))]
        }
        SensitivityCase::GridPriceUp => &[(GridPriceMultiplier, Scale(UP))],
        SensitivityCase::GridPriceDown => &[(GridPriceMultiplier, Scale(DOWN))],
    }
}

/// Electricity tax and transmission fee (€/MWh) for a country
fn tariffs(country: Country) -> (f64, f64) {
    match country {
        Country::Finland => (0.63, 4.0),
        Country::Sweden => (0.0, 0.91),
        Country::Germany => (0.0, 12.0),
    }
}

/// Wind and solar PPA prices (€/MWh) from the Q4 price quotes
fn ppa_prices(country: Country, price_year: PriceYear, contract: ContractType) -> (f64, f64) {
    match (contract, country, price_year) {
        (ContractType::Baseload, Country::Finland, PriceYear::Y2022) => (54.6, 39.9),
        (ContractType::Baseload, Country::Finland, PriceYear::Y2020) => (31.5, 36.8),
        (ContractType::Baseload, Country::Sweden, PriceYear::Y2022) => (72.45, 57.6),
        (ContractType::Baseload, Country::Sweden, PriceYear::Y2020) => (52.0, 36.8),
        (ContractType::Baseload, Country::Germany, PriceYear::Y2022) => (67.2, 93.45),
        (ContractType::Baseload, Country::Germany, PriceYear::Y2020) => (57.8, 51.5),
        (ContractType::PayAsProduced, Country::Finland, PriceYear::Y2022) => (52.0, 38.0),
        (ContractType::PayAsProduced, Country::Finland, PriceYear::Y2020) => (30.0, 35.0),
        (ContractType::PayAsProduced, Country::Sweden, PriceYear::Y2022) => (69.0, 54.0),
        (ContractType::PayAsProduced, Country::Sweden, PriceYear::Y2020) => (50.0, 35.0),
        (ContractType::PayAsProduced, Country::Germany, PriceYear::Y2022) => (64.0, 89.0),
        (ContractType::PayAsProduced, Country::Germany, PriceYear::Y2020) => (55.0, 49.0),
    }
}

impl ParameterSet {
    /// The unperturbed parameters for a country, price year and contract type
    pub fn baseline(country: Country, price_year: PriceYear, contract: ContractType) -> Self {
        let (tax, fee) = tariffs(country);
        let (wind, solar) = ppa_prices(country, price_year, contract);

        Self {
            capex_elec: MoneyPerPower(845_000.0),
            opex_elec: MoneyPerPower(16_900.0),
            annuity_elec: Dimensionless(0.171),
            efficiency_elec: MassPerEnergy(15.6),
            ramp_limit: Dimensionless(0.5),
            capex_storage: MoneyPerMass(80.90),
            opex_storage: MoneyPerMass(3.24),
            annuity_storage: Dimensionless(0.092),
            capex_battery: MoneyPerEnergy(378_798.0),
            opex_battery: MoneyPerEnergy(7576.0),
            annuity_battery: Dimensionless(0.147),
            depth_of_discharge: Dimensionless(0.8),
            charge_efficiency: Dimensionless(0.93),
            charge_power_fraction: Dimensionless(0.43),
            wacc: Dimensionless(0.078),
            water_cost: MoneyPerMass(0.07),
            electricity_tax: MoneyPerEnergy(tax),
            transmission_fee: MoneyPerEnergy(fee),
            ppa_price_wind: MoneyPerEnergy(wind),
            ppa_price_solar: MoneyPerEnergy(solar),
            grid_price_multiplier: Dimensionless(1.0),
        }
    }

    /// Mutable access to the raw value of a perturbable parameter
    fn value_mut(&mut self, key: ParameterKey) -> &mut f64 {
        match key {
            ParameterKey::CapexElec => &mut self.capex_elec.0,
            ParameterKey::OpexElec => &mut self.opex_elec.0,
            ParameterKey::AnnuityElec => &mut self.annuity_elec.0,
            ParameterKey::EfficiencyElec => &mut self.efficiency_elec.0,
            ParameterKey::PpaPriceWind => &mut self.ppa_price_wind.0,
            ParameterKey::PpaPriceSolar => &mut self.ppa_price_solar.0,
            ParameterKey::GridPriceMultiplier => &mut self.grid_price_multiplier.0,
        }
    }

    /// Apply a single perturbation
    pub fn perturb(&mut self, key: ParameterKey, perturbation: Perturbation) {
        perturbation.apply(self.value_mut(key));
    }

    /// Tax plus transmission fee paid on every MWh bought or sold
    pub fn grid_charges(&self) -> MoneyPerEnergy {
        self.electricity_tax + self.transmission_fee
    }
}

/// Resolve the parameters for a scenario.
///
/// # Arguments
///
/// * `country` - Country for tariffs and PPA prices
/// * `price_year` - Which year's PPA prices to use
/// * `case` - The sensitivity case to apply on top of the baseline
/// * `variant` - The formulation variant, which decides the contract type
///
/// # Returns
///
/// The resolved parameters, or a [`ConfigurationError`] if the sensitivity case makes no sense for
/// the variant.
pub fn resolve(
    country: Country,
    price_year: PriceYear,
    case: SensitivityCase,
    variant: ModelVariant,
) -> Result<ParameterSet> {
    let spec = variant.spec();
    if case.affects_grid_price() && !spec.needs_grid_price() {
        Err(ConfigurationError::new(
            "sensitivity_case",
            format!("{case} perturbs the grid price, but the {variant} variant has no grid connection"),
        ))?;
    }

    let mut parameters = ParameterSet::baseline(country, price_year, spec.contract);
    for &(key, perturbation) in perturbations(case) {
        parameters.perturb(key, perturbation);
    }

    Ok(parameters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use float_cmp::assert_approx_eq;
    use itertools::iproduct;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    fn resolve_pap(case: SensitivityCase) -> ParameterSet {
        resolve(
            Country::Finland,
            PriceYear::Y2022,
            case,
            ModelVariant::PayAsProduced,
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_is_total() {
        for (country, price_year, case) in
            iproduct!(Country::iter(), PriceYear::iter(), SensitivityCase::iter())
        {
            assert!(resolve(country, price_year, case, ModelVariant::PayAsProduced).is_ok());
            assert_eq!(
                resolve(country, price_year, case, ModelVariant::Baseload).is_ok(),
                !case.affects_grid_price()
            );
        }
    }

    #[test]
    fn test_resolve_baseline() {
        let parameters = resolve(
            Country::Germany,
            PriceYear::Y2020,
            SensitivityCase::Baseline,
            ModelVariant::Baseload,
        )
        .unwrap();
        assert_eq!(parameters.ppa_price_wind, MoneyPerEnergy(57.8));
        assert_eq!(parameters.ppa_price_solar, MoneyPerEnergy(51.5));
        assert_eq!(parameters.grid_charges(), MoneyPerEnergy(12.0));
        assert_eq!(parameters.grid_price_multiplier, Dimensionless(1.0));
    }

    #[rstest]
    #[case(Country::Finland, PriceYear::Y2022, 52.0, 38.0)]
    #[case(Country::Sweden, PriceYear::Y2020, 50.0, 35.0)]
    #[case(Country::Germany, PriceYear::Y2022, 64.0, 89.0)]
    fn test_resolve_pay_as_produced_prices(
        #[case] country: Country,
        #[case] price_year: PriceYear,
        #[case] wind: f64,
        #[case] solar: f64,
    ) {
        let parameters = resolve(
            country,
            price_year,
            SensitivityCase::Baseline,
            ModelVariant::BatteryDispatch,
        )
        .unwrap();
        assert_eq!(parameters.ppa_price_wind, MoneyPerEnergy(wind));
        assert_eq!(parameters.ppa_price_solar, MoneyPerEnergy(solar));
    }

    #[test]
    fn test_capex_elec_up_is_more_expensive() {
        let baseline = resolve_pap(SensitivityCase::Baseline);
        let up = resolve_pap(SensitivityCase::CapexElecUp);
        let down = resolve_pap(SensitivityCase::CapexElecDown);
        assert!(up.capex_elec > baseline.capex_elec);
        assert!(up.opex_elec > baseline.opex_elec);
        assert!(down.capex_elec < baseline.capex_elec);
        assert_approx_eq!(f64, up.capex_elec.value(), 1_014_000.0, epsilon = 1e-6);
    }

    #[rstest]
    #[case(SensitivityCase::AnnuityElecUp, 0.207)]
    #[case(SensitivityCase::AnnuityElecDown, 0.148)]
    fn test_annuity_cases_set_value(#[case] case: SensitivityCase, #[case] expected: f64) {
        assert_eq!(resolve_pap(case).annuity_elec, Dimensionless(expected));
    }

    #[test]
    fn test_each_case_touches_only_its_parameters() {
        let baseline = resolve_pap(SensitivityCase::Baseline);
        let up = resolve_pap(SensitivityCase::RenewablePriceUp);
        assert_approx_eq!(f64, up.ppa_price_wind.value(), 52.0 * UP, epsilon = 1e-10);
        assert_approx_eq!(f64, up.ppa_price_solar.value(), 38.0 * UP, epsilon = 1e-10);
        assert_eq!(
            ParameterSet {
                ppa_price_wind: baseline.ppa_price_wind,
                ppa_price_solar: baseline.ppa_price_solar,
                ..up
            },
            baseline
        );

        let grid = resolve_pap(SensitivityCase::GridPriceDown);
        assert_eq!(grid.grid_price_multiplier, Dimensionless(DOWN));
        assert_eq!(
            ParameterSet {
                grid_price_multiplier: Dimensionless(1.0),
                ..grid
            },
            baseline
        );
    }

    #[test]
    fn test_grid_price_case_without_grid() {
        assert_error!(
            resolve(
                Country::Sweden,
                PriceYear::Y2022,
                SensitivityCase::GridPriceUp,
                ModelVariant::Baseload,
            ),
            "Invalid value for sensitivity_case: grid_price_up perturbs the grid price, but the \
            baseload variant has no grid connection"
        );
    }

    #[test]
    fn test_every_case_has_perturbations() {
        for case in SensitivityCase::iter() {
            assert_eq!(
                perturbations(case).is_empty(),
                case == SensitivityCase::Baseline
            );
        }
    }
}
