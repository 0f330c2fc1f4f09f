//! The formulation variants of the hydrogen plant model.
//!
//! Each variant is a fixed combination of topology, boundary conditions and cost terms. The
//! builder never branches on the variant itself, only on the [`VariantSpec`] it maps to.
use crate::scenario::Country;
use crate::units::{Mass, Power};
use serde_string_enum::DeserializeLabeledStringEnum;
use std::fmt;
use strum::{EnumIter, IntoStaticStr};

/// The named formulation variants
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
pub enum ModelVariant {
    /// Baseload PPAs with constant availability; no battery and no grid connection.
    #[string = "baseload"]
    Baseload,
    /// Pay-as-produced PPAs with measured capacity factors, battery and grid trading.
    #[string = "pay_as_produced"]
    PayAsProduced,
    /// A wind-only plant with a lossless battery and grid sales, starting from empty stores.
    #[string = "battery_dispatch"]
    BatteryDispatch,
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label: &'static str = self.into();
        write!(f, "{label}")
    }
}

/// Which PPA price table applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContractType {
    /// Constant delivery at a fixed price
    Baseload,
    /// Paid per MWh as it is produced
    PayAsProduced,
}

/// Where the hourly wind and solar capacity factors come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapacityFactorSource {
    /// Full availability, except in an optional outage window
    ConstantAvailability,
    /// Per-country series read from input files
    Measured,
}

/// How the stock of a store (hydrogen tank or battery) is pinned at the ends of the horizon
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StorageBoundary {
    /// The store starts empty
    Empty,
    /// The store starts at a fixed absolute level (kg of hydrogen)
    Fixed(Mass),
    /// The store starts at this fraction of its (variable) capacity
    FractionOfCapacity(f64),
}

/// How hydrogen production is tied to electricity
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EnergyBalance {
    /// Production may not exceed what the contracted electricity allows; surplus is curtailed
    AtMost,
    /// Production equals net electricity after grid trading and battery (dis)charge. If
    /// `battery_losses` is set, the battery delta is scaled by the charge efficiency.
    Exact {
        /// Whether to apply the battery charge efficiency to the battery delta
        battery_losses: bool,
    },
}

/// Which optional assets exist in a problem
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TopologyFlags {
    /// A battery is available
    pub battery: bool,
    /// Electricity can be sold to the grid
    pub grid_sales: bool,
    /// Electricity can be bought from the grid
    pub grid_purchase: bool,
}

/// The declarative description of a variant
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSpec {
    /// Which PPA price table applies
    pub contract: ContractType,
    /// Where the capacity factors come from
    pub capacity_factors: CapacityFactorSource,
    /// Whether a solar contract exists alongside the wind contract
    pub solar: bool,
    /// Whether a battery exists
    pub battery: bool,
    /// Whether electricity can be sold to the grid
    pub grid_sales: bool,
    /// Whether grid purchase is allowed in countries that permit it
    pub grid_purchase: bool,
    /// The form of the electricity-to-hydrogen balance
    pub energy_balance: EnergyBalance,
    /// Initial level of the hydrogen tank
    pub storage_initial: StorageBoundary,
    /// Minimum level of the hydrogen tank in the final hour, as a fraction of its capacity
    pub storage_terminal_fraction: Option<f64>,
    /// Initial level of the battery
    pub battery_initial: StorageBoundary,
    /// Minimum level of the battery in the final hour, as a fraction of its capacity
    pub battery_terminal_fraction: Option<f64>,
    /// Upper bound on each contracted wind/solar capacity
    pub renewable_capacity_limit: Power,
    /// Whether water is paid for per kg of hydrogen
    pub water_cost: bool,
    /// Whether one week of PPA payments must be financed as collateral
    pub ppa_collateral: bool,
}

impl ModelVariant {
    /// The declarative description of this variant
    pub fn spec(self) -> VariantSpec {
        match self {
            Self::Baseload => VariantSpec {
                contract: ContractType::Baseload,
                capacity_factors: CapacityFactorSource::ConstantAvailability,
                solar: true,
                battery: false,
                grid_sales: false,
                grid_purchase: false,
                energy_balance: EnergyBalance::AtMost,
                storage_initial: StorageBoundary::Fixed(Mass(4000.0)),
                storage_terminal_fraction: None,
                battery_initial: StorageBoundary::Empty,
                battery_terminal_fraction: None,
                renewable_capacity_limit: Power(200.0),
                water_cost: true,
                ppa_collateral: false,
            },
            Self::PayAsProduced => VariantSpec {
                contract: ContractType::PayAsProduced,
                capacity_factors: CapacityFactorSource::Measured,
                solar: true,
                battery: true,
                grid_sales: true,
                grid_purchase: true,
                energy_balance: EnergyBalance::Exact {
                    battery_losses: true,
                },
                storage_initial: StorageBoundary::FractionOfCapacity(0.2),
                storage_terminal_fraction: Some(0.2),
                battery_initial: StorageBoundary::FractionOfCapacity(0.2),
                battery_terminal_fraction: Some(0.2),
                renewable_capacity_limit: Power(1000.0),
                water_cost: true,
                ppa_collateral: true,
            },
            Self::BatteryDispatch => VariantSpec {
                contract: ContractType::PayAsProduced,
                capacity_factors: CapacityFactorSource::Measured,
                solar: false,
                battery: true,
                grid_sales: true,
                grid_purchase: false,
                energy_balance: EnergyBalance::Exact {
                    battery_losses: false,
                },
                storage_initial: StorageBoundary::Empty,
                storage_terminal_fraction: None,
                battery_initial: StorageBoundary::Empty,
                battery_terminal_fraction: None,
                renewable_capacity_limit: Power(1000.0),
                water_cost: false,
                ppa_collateral: false,
            },
        }
    }
}

impl VariantSpec {
    /// The optional assets present for a given country
    pub fn topology(&self, country: Country) -> TopologyFlags {
        TopologyFlags {
            battery: self.battery,
            grid_sales: self.grid_sales,
            grid_purchase: self.grid_sales && self.grid_purchase && country.allows_grid_purchase(),
        }
    }

    /// Whether the variant needs an hourly grid price
    pub fn needs_grid_price(&self) -> bool {
        self.grid_sales
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case(ModelVariant::PayAsProduced, Country::Sweden, true)]
    #[case(ModelVariant::PayAsProduced, Country::Finland, false)]
    #[case(ModelVariant::PayAsProduced, Country::Germany, false)]
    #[case(ModelVariant::BatteryDispatch, Country::Sweden, false)]
    #[case(ModelVariant::Baseload, Country::Sweden, false)]
    fn test_grid_purchase_topology(
        #[case] variant: ModelVariant,
        #[case] country: Country,
        #[case] expected: bool,
    ) {
        assert_eq!(variant.spec().topology(country).grid_purchase, expected);
    }

    #[test]
    fn test_specs_are_consistent() {
        for variant in ModelVariant::iter() {
            let spec = variant.spec();

            // Purchasing requires a grid connection
            assert!(!spec.grid_purchase || spec.grid_sales, "{variant}");

            // An exact balance is what lets grid and battery terms in
            if spec.battery || spec.grid_sales {
                assert!(
                    matches!(spec.energy_balance, EnergyBalance::Exact { .. }),
                    "{variant}"
                );
            }

            // Measured series come with a price series for trading
            if spec.grid_sales {
                assert_eq!(spec.capacity_factors, CapacityFactorSource::Measured);
            }
        }
    }

    #[test]
    fn test_variant_display() {
        assert_eq!(ModelVariant::PayAsProduced.to_string(), "pay_as_produced");
        assert_eq!(ModelVariant::Baseload.to_string(), "baseload");
    }
}
