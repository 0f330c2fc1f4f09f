//! General functions related to finance.
use crate::units::{Dimensionless, Hours, MoneyPerEnergy, MoneyPerPower};
use std::ops::{Add, Mul};

/// The length of time for which PPA payments must be covered by collateral
pub const PPA_COLLATERAL_PERIOD: Hours = Hours(7.0 * 24.0);

/// Calculates the annualised cost of an asset per unit of capacity.
///
/// This is the capital cost spread over the asset's lifetime with an annuity rate, plus the
/// yearly operating cost.
pub fn annualised_cost<T>(capital_cost: T, annuity_rate: Dimensionless, operating_cost: T) -> T
where
    T: Mul<Dimensionless, Output = T> + Add<Output = T>,
{
    capital_cost * annuity_rate + operating_cost
}

/// Calculates the yearly cost of financing PPA collateral per MW of contracted capacity.
///
/// The buyer must post one week of payments at full contracted output, financed at the WACC.
pub fn ppa_collateral_cost(ppa_price: MoneyPerEnergy, wacc: Dimensionless) -> MoneyPerPower {
    ppa_price * PPA_COLLATERAL_PERIOD * wacc
}
