//! Code for adding constraints to the sizing and dispatch problem.
//!
//! Each function emits one family of rows. Terms which would refer to the hour before the start
//! of the horizon are left out rather than wrapped around to the final hour.
use super::{ProblemBuilder, RowBounds, Variable, VariableMap};
use crate::parameters::ParameterSet;
use crate::time_series::TimeSeries;
use crate::units::Power;
use crate::variant::{EnergyBalance, StorageBoundary};
use itertools::Itertools;
use std::ops::Range;

/// Production from each contract equals contracted capacity scaled by the capacity factor, and
/// total contracted electricity is the sum over contracts.
pub fn add_production_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    series: &TimeSeries,
) {
    for (hour, (&prod, &cf)) in variables
        .wind_prod
        .iter()
        .zip(&series.wind_capacity_factor)
        .enumerate()
    {
        problem.add_row(
            "WindProdConstr",
            Some(hour),
            vec![(prod, 1.0), (variables.capacity_wind, -cf)],
            RowBounds::Equal(0.0),
        );
    }

    if let (Some(capacity), Some(solar_prod), Some(solar_cf)) = (
        variables.capacity_solar,
        &variables.solar_prod,
        &series.solar_capacity_factor,
    ) {
        for (hour, (&prod, &cf)) in solar_prod.iter().zip(solar_cf).enumerate() {
            problem.add_row(
                "SolarProdConstr",
                Some(hour),
                vec![(prod, 1.0), (capacity, -cf)],
                RowBounds::Equal(0.0),
            );
        }
    }

    for hour in 0..variables.horizon_hours() {
        let mut terms = vec![
            (variables.electricity_prod[hour], 1.0),
            (variables.wind_prod[hour], -1.0),
        ];
        if let Some(solar_prod) = &variables.solar_prod {
            terms.push((solar_prod[hour], -1.0));
        }
        problem.add_row(
            "ElectricityProdConstr",
            Some(hour),
            terms,
            RowBounds::Equal(0.0),
        );
    }
}

/// Contracted wind and solar capacity may not exceed the procurement limit
pub fn add_renewable_capacity_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    limit: Power,
) {
    problem.add_row(
        "WindCapacityConstr",
        None,
        vec![(variables.capacity_wind, 1.0)],
        RowBounds::AtMost(limit.value()),
    );
    if let Some(capacity_solar) = variables.capacity_solar {
        problem.add_row(
            "SolarCapacityConstr",
            None,
            vec![(capacity_solar, 1.0)],
            RowBounds::AtMost(limit.value()),
        );
    }
}

/// Emit the initial level of a store at hour 0
fn add_initial_condition(
    problem: &mut ProblemBuilder,
    name: &'static str,
    level: Variable,
    capacity: Variable,
    boundary: StorageBoundary,
) {
    let (terms, value) = match boundary {
        StorageBoundary::Empty => (vec![(level, 1.0)], 0.0),
        StorageBoundary::Fixed(mass) => (vec![(level, 1.0)], mass.value()),
        StorageBoundary::FractionOfCapacity(fraction) => {
            (vec![(level, 1.0), (capacity, -fraction)], 0.0)
        }
    };
    problem.add_row(name, Some(0), terms, RowBounds::Equal(value));
}

/// Emit a minimum level for a store in the final hour
fn add_terminal_condition(
    problem: &mut ProblemBuilder,
    name: &'static str,
    levels: &[Variable],
    capacity: Variable,
    fraction: Option<f64>,
) {
    let (Some(fraction), Some(&last)) = (fraction, levels.last()) else {
        return;
    };

    problem.add_row(
        name,
        Some(levels.len() - 1),
        vec![(last, 1.0), (capacity, -fraction)],
        RowBounds::AtLeast(0.0),
    );
}

/// Hydrogen stock balance: what is produced and not consumed is stored.
///
/// For `h >= 1`: `HydrogenProd[h] + HydrogenStored[h-1] - HydrogenStored[h] = Demand[h]`. The
/// level at hour 0 is pinned by the initial condition instead, and an optional terminal floor
/// applies to the final hour.
pub fn add_demand_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    demand: &[f64],
    initial: StorageBoundary,
    terminal_fraction: Option<f64>,
) {
    let stored = &variables.hydrogen_stored;
    for (hour, (prev, curr)) in stored.iter().tuple_windows().enumerate() {
        let hour = hour + 1;
        problem.add_row(
            "DemandConstr",
            Some(hour),
            vec![
                (variables.hydrogen_prod[hour], 1.0),
                (*prev, 1.0),
                (*curr, -1.0),
            ],
            RowBounds::Equal(demand[hour]),
        );
    }

    add_initial_condition(
        problem,
        "StorageInitConditionConstr",
        stored[0],
        variables.capacity_storage,
        initial,
    );
    add_terminal_condition(
        problem,
        "StorageTerminalConditionConstr",
        stored,
        variables.capacity_storage,
        terminal_fraction,
    );
}

/// No hydrogen is produced while the electrolyser is down for maintenance
pub fn add_maintenance_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    window: Range<usize>,
) {
    for hour in window {
        problem.add_row(
            "MaintBreakConstr",
            Some(hour),
            vec![(variables.hydrogen_prod[hour], 1.0)],
            RowBounds::Equal(0.0),
        );
    }
}

/// Tie hydrogen production to the electricity available to the electrolyser.
///
/// With an exact balance, production equals efficiency times contracted electricity, plus
/// purchases, minus sales, plus the electricity drawn from the battery in that hour.
pub fn add_energy_balance_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    parameters: &ParameterSet,
    balance: EnergyBalance,
) {
    let efficiency = parameters.efficiency_elec.value();
    for hour in 0..variables.horizon_hours() {
        let mut terms = vec![
            (variables.hydrogen_prod[hour], 1.0),
            (variables.electricity_prod[hour], -efficiency),
        ];

        let bounds = match balance {
            EnergyBalance::AtMost => RowBounds::AtMost(0.0),
            EnergyBalance::Exact { battery_losses } => {
                if let Some(bought) = &variables.electricity_bought {
                    terms.push((bought[hour], -efficiency));
                }
                if let Some(sold) = &variables.electricity_sold {
                    terms.push((sold[hour], efficiency));
                }
                // The battery level at hour 0 is fixed by its initial condition, so there is no
                // (dis)charge to account for until hour 1
                let stored = variables.electricity_stored.as_ref().filter(|_| hour > 0);
                if let Some(stored) = stored {
                    let loss_factor = if battery_losses {
                        parameters.charge_efficiency.value()
                    } else {
                        1.0
                    };
                    let coeff = efficiency * loss_factor;
                    terms.push((stored[hour - 1], -coeff));
                    terms.push((stored[hour], coeff));
                }

                RowBounds::Equal(0.0)
            }
        };

        problem.add_row("ElectricityForProdConstr", Some(hour), terms, bounds);
    }
}

/// Hydrogen output is limited by electrolyser capacity and may only ramp by a fraction of it per
/// hour, in either direction
pub fn add_electrolyser_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    parameters: &ParameterSet,
) {
    let max_output = parameters.efficiency_elec.value();
    let max_ramp = parameters.ramp_limit.value() * max_output;
    let capacity = variables.capacity_elec;

    for (hour, &prod) in variables.hydrogen_prod.iter().enumerate() {
        problem.add_row(
            "HydrogenProdCapacityConstr",
            Some(hour),
            vec![(prod, 1.0), (capacity, -max_output)],
            RowBounds::AtMost(0.0),
        );
    }

    for (hour, (&prev, &curr)) in variables.hydrogen_prod.iter().tuple_windows().enumerate() {
        let hour = hour + 1;
        problem.add_row(
            "PupConstr",
            Some(hour),
            vec![(curr, 1.0), (prev, -1.0), (capacity, -max_ramp)],
            RowBounds::AtMost(0.0),
        );
        problem.add_row(
            "PdownConstr",
            Some(hour),
            vec![(prev, 1.0), (curr, -1.0), (capacity, -max_ramp)],
            RowBounds::AtMost(0.0),
        );
    }
}

/// The tank level may not exceed its capacity in any hour
pub fn add_storage_capacity_constraints(problem: &mut ProblemBuilder, variables: &VariableMap) {
    for (hour, &stored) in variables.hydrogen_stored.iter().enumerate() {
        problem.add_row(
            "CapacityStorageConstr",
            Some(hour),
            vec![(stored, 1.0), (variables.capacity_storage, -1.0)],
            RowBounds::AtMost(0.0),
        );
    }
}

/// Battery level and (dis)charge rate limits, with initial and terminal conditions
pub fn add_battery_constraints(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    parameters: &ParameterSet,
    initial: StorageBoundary,
    terminal_fraction: Option<f64>,
) {
    let (Some(capacity), Some(stored)) = (variables.capacity_battery, &variables.electricity_stored)
    else {
        return;
    };

    add_initial_condition(
        problem,
        "BatteryInitConditionConstr",
        stored[0],
        capacity,
        initial,
    );
    add_terminal_condition(
        problem,
        "BatteryTerminalConditionConstr",
        stored,
        capacity,
        terminal_fraction,
    );

    let depth_of_discharge = parameters.depth_of_discharge.value();
    for (hour, &level) in stored.iter().enumerate() {
        problem.add_row(
            "CapacityBatteryConstr",
            Some(hour),
            vec![(level, 1.0), (capacity, -depth_of_discharge)],
            RowBounds::AtMost(0.0),
        );
    }

    let max_change =
        parameters.charge_power_fraction.value() * parameters.charge_efficiency.value();
    for (hour, (&prev, &curr)) in stored.iter().tuple_windows().enumerate() {
        let hour = hour + 1;
        problem.add_row(
            "BchangeUpConstr",
            Some(hour),
            vec![(curr, 1.0), (prev, -1.0), (capacity, -max_change)],
            RowBounds::AtMost(0.0),
        );
        problem.add_row(
            "BchangeDownConstr",
            Some(hour),
            vec![(prev, 1.0), (curr, -1.0), (capacity, -max_change)],
            RowBounds::AtMost(0.0),
        );
    }
}
