//! This module defines the unit types used for techno-economic parameters and their conversions.
//!
//! Capacities of the plant are measured in MW (electrolyser, contracts), MWh (battery) and kg
//! (hydrogen tank), so the annualised cost of each asset comes with its own "money per capacity"
//! unit. The optimisation itself works on plain `f64` coefficients, obtained with `value()`.

/// Represents a dimensionless quantity (fractions, rates, multipliers).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    PartialOrd,
    Default,
    derive_more::Add,
    derive_more::Sub,
    derive_more::Display,
    serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct Dimensionless(pub f64);

impl std::ops::Mul for Dimensionless {
    type Output = Dimensionless;

    fn mul(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 * rhs.0)
    }
}

impl std::ops::Div for Dimensionless {
    type Output = Dimensionless;

    fn div(self, rhs: Dimensionless) -> Self::Output {
        Dimensionless(self.0 / rhs.0)
    }
}

impl Dimensionless {
    /// Creates a new instance from a f64 value.
    pub const fn new(val: f64) -> Self {
        Self(val)
    }

    /// Returns the value as a f64.
    pub const fn value(self) -> f64 {
        self.0
    }
}

impl From<f64> for Dimensionless {
    fn from(val: f64) -> Self {
        Self(val)
    }
}

impl From<Dimensionless> for f64 {
    fn from(val: Dimensionless) -> Self {
        val.0
    }
}

macro_rules! unit_struct {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            PartialOrd,
            Default,
            derive_more::Add,
            derive_more::Sub,
            derive_more::Display,
            serde::Deserialize,
            serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub f64);

        impl $name {
            /// Creates a new instance of the unit type from a f64 value.
            pub const fn new(val: f64) -> Self {
                Self(val)
            }

            /// Returns the value of the unit type as a f64.
            pub const fn value(self) -> f64 {
                self.0
            }

            /// Whether the underlying value is finite
            pub fn is_finite(self) -> bool {
                self.0.is_finite()
            }
        }

        impl std::ops::Mul<Dimensionless> for $name {
            type Output = $name;
            fn mul(self, rhs: Dimensionless) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Mul<$name> for Dimensionless {
            type Output = $name;
            fn mul(self, rhs: $name) -> $name {
                $name(self.0 * rhs.0)
            }
        }

        impl std::ops::Div<Dimensionless> for $name {
            type Output = $name;
            fn div(self, rhs: Dimensionless) -> $name {
                $name(self.0 / rhs.0)
            }
        }

        impl std::ops::Div<$name> for $name {
            type Output = Dimensionless;
            fn div(self, rhs: $name) -> Dimensionless {
                Dimensionless(self.0 / rhs.0)
            }
        }
    };
}

macro_rules! impl_mul {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Mul<$Rhs> for $Lhs {
            type Output = $Out;
            fn mul(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 * rhs.0)
            }
        }
        impl std::ops::Mul<$Lhs> for $Rhs {
            type Output = $Out;
            fn mul(self, lhs: $Lhs) -> $Out {
                <$Out>::new(self.0 * lhs.0)
            }
        }
    };
}

macro_rules! impl_div {
    ($Lhs:ty, $Rhs:ty, $Out:ty) => {
        impl std::ops::Div<$Rhs> for $Lhs {
            type Output = $Out;
            fn div(self, rhs: $Rhs) -> $Out {
                <$Out>::new(self.0 / rhs.0)
            }
        }
    };
}

// Base quantities
unit_struct!(Money, "An amount of money (€)");
unit_struct!(Power, "Electrical power or contracted capacity (MW)");
unit_struct!(Energy, "Electrical energy (MWh)");
unit_struct!(Mass, "A mass of hydrogen (kg)");
unit_struct!(Hours, "A duration in hours");

// Derived quantities
unit_struct!(MoneyPerPower, "Cost per unit power (€/MW)");
unit_struct!(MoneyPerEnergy, "Cost per unit energy (€/MWh)");
unit_struct!(MoneyPerMass, "Cost per unit mass of hydrogen (€/kg)");
unit_struct!(MassPerEnergy, "Hydrogen yield per unit electricity (kg/MWh)");
unit_struct!(MassPerHour, "A hydrogen production or demand rate (kg/h)");

// Multiplication rules
impl_mul!(MoneyPerPower, Power, Money);
impl_mul!(MoneyPerEnergy, Energy, Money);
impl_mul!(MoneyPerMass, Mass, Money);
impl_mul!(MassPerEnergy, Energy, Mass);
impl_mul!(Power, Hours, Energy);
impl_mul!(MoneyPerEnergy, Hours, MoneyPerPower);
impl_mul!(MassPerHour, Hours, Mass);

// Division rules
impl_div!(Energy, Hours, Power);
impl_div!(Mass, MassPerEnergy, Energy);
impl_div!(Money, Power, MoneyPerPower);
impl_div!(Money, Energy, MoneyPerEnergy);
impl_div!(Money, Mass, MoneyPerMass);
