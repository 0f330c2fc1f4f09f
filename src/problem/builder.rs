//! Construction of the sizing and dispatch problem for one scenario.
use super::constraints::{
    add_battery_constraints, add_demand_constraints, add_electrolyser_constraints,
    add_energy_balance_constraints, add_maintenance_constraints, add_production_constraints,
    add_renewable_capacity_constraints, add_storage_capacity_constraints,
};
use super::{Problem, ProblemBuilder, VariableMap};
use crate::error::{ConfigurationError, ensure_config};
use crate::finance::{annualised_cost, ppa_collateral_cost};
use crate::parameters::ParameterSet;
use crate::time_series::TimeSeries;
use crate::units::{MoneyPerEnergy, MoneyPerPower};
use crate::variant::{StorageBoundary, TopologyFlags, VariantSpec};
use anyhow::Result;

/// Build the optimisation problem for one scenario.
///
/// The steps are, in order:
///
/// 1. Declare capacity variables for each asset present and hourly variables for each flow
/// 2. Production from capacity factors
/// 3. Procurement limits on contracted capacity
/// 4. Hydrogen stock balance with initial and terminal conditions
/// 5. Maintenance outage
/// 6. Energy balance between electricity and hydrogen
/// 7. Electrolyser capacity and ramp limits
/// 8. Tank capacity
/// 9. Battery limits, if there is a battery
/// 10. The objective
///
/// # Arguments
///
/// * `parameters` - Resolved techno-economic parameters
/// * `series` - Hourly inputs, each of length `horizon_hours`
/// * `horizon_hours` - Number of hours in the horizon
/// * `topology` - Which optional assets are present
/// * `spec` - Boundary conditions and cost terms for the variant
///
/// # Returns
///
/// A new [`Problem`], or a [`ConfigurationError`] naming the offending input.
pub fn build(
    parameters: &ParameterSet,
    series: &TimeSeries,
    horizon_hours: usize,
    topology: TopologyFlags,
    spec: &VariantSpec,
) -> Result<Problem> {
    let mut problem = ProblemBuilder::default();
    let variables = add_scenario(
        &mut problem,
        parameters,
        series,
        horizon_hours,
        topology,
        spec,
    )?;

    // Capacity times an exogenous factor is linear, so no bilinear terms are ever emitted
    Ok(problem.finish(variables, false))
}

/// Add the variables, constraints and objective for one scenario to `problem`.
///
/// This is [`build`] without the final step, so further rows can be added before finishing.
pub fn add_scenario(
    problem: &mut ProblemBuilder,
    parameters: &ParameterSet,
    series: &TimeSeries,
    horizon_hours: usize,
    topology: TopologyFlags,
    spec: &VariantSpec,
) -> Result<VariableMap> {
    check_inputs(series, horizon_hours, topology, spec)?;
    let variables = add_variables(problem, horizon_hours, topology, spec);

    add_production_constraints(problem, &variables, series);
    add_renewable_capacity_constraints(problem, &variables, spec.renewable_capacity_limit);
    add_demand_constraints(
        problem,
        &variables,
        &series.demand,
        spec.storage_initial,
        spec.storage_terminal_fraction,
    );
    if let Some(window) = series.maintenance.clone() {
        add_maintenance_constraints(problem, &variables, window);
    }
    add_energy_balance_constraints(problem, &variables, parameters, spec.energy_balance);
    add_electrolyser_constraints(problem, &variables, parameters);
    add_storage_capacity_constraints(problem, &variables);
    add_battery_constraints(
        problem,
        &variables,
        parameters,
        spec.battery_initial,
        spec.battery_terminal_fraction,
    );
    add_objective(problem, &variables, parameters, series, spec);

    Ok(variables)
}

/// Check that a series covers exactly the horizon
fn check_length(field: &str, len: usize, horizon_hours: usize) -> Result<()> {
    ensure_config!(
        len == horizon_hours,
        field,
        "series has {len} values but the horizon is {horizon_hours} hours"
    );

    Ok(())
}

/// Check that a store's initial condition is meaningful
fn check_boundary(field: &str, boundary: StorageBoundary, allow_fixed: bool) -> Result<()> {
    match boundary {
        StorageBoundary::Empty => {}
        StorageBoundary::Fixed(mass) => {
            ensure_config!(allow_fixed, field, "a fixed initial level is not supported");
            ensure_config!(
                mass.is_finite() && mass.value() >= 0.0,
                field,
                "initial level must be a finite, non-negative number"
            );
        }
        StorageBoundary::FractionOfCapacity(fraction) => ensure_config!(
            (0.0..=1.0).contains(&fraction),
            field,
            "initial level must be between 0 and 1 of capacity"
        ),
    }

    Ok(())
}

/// Check that the inputs are consistent with each other and with the topology
fn check_inputs(
    series: &TimeSeries,
    horizon_hours: usize,
    topology: TopologyFlags,
    spec: &VariantSpec,
) -> Result<()> {
    ensure_config!(horizon_hours > 0, "horizon_hours", "must be positive");

    check_length(
        "wind_capacity_factor",
        series.wind_capacity_factor.len(),
        horizon_hours,
    )?;
    if spec.solar {
        let Some(solar) = &series.solar_capacity_factor else {
            return Err(ConfigurationError::new(
                "solar_capacity_factor",
                "series is required for a solar contract",
            )
            .into());
        };
        check_length("solar_capacity_factor", solar.len(), horizon_hours)?;
    }
    check_length("demand", series.demand.len(), horizon_hours)?;

    ensure_config!(
        !topology.grid_purchase || topology.grid_sales,
        "grid_purchase",
        "grid purchase requires a grid connection"
    );
    if topology.grid_sales {
        let Some(grid_price) = &series.grid_price else {
            return Err(ConfigurationError::new(
                "grid_price",
                "series is required for a grid connection",
            )
            .into());
        };
        check_length("grid_price", grid_price.len(), horizon_hours)?;
    }

    if let Some(window) = &series.maintenance {
        ensure_config!(
            window.start < window.end && window.end <= horizon_hours,
            "maintenance",
            "window {window:?} is not within the horizon of {horizon_hours} hours"
        );
    }

    check_boundary("storage_initial", spec.storage_initial, true)?;
    if topology.battery {
        check_boundary("battery_initial", spec.battery_initial, false)?;
    }

    Ok(())
}

/// Declare all variables of the problem
fn add_variables(
    problem: &mut ProblemBuilder,
    horizon_hours: usize,
    topology: TopologyFlags,
    spec: &VariantSpec,
) -> VariableMap {
    let hours = 0..horizon_hours;

    let capacity_elec = problem.add_column("CapacityElec".into());
    let capacity_wind = problem.add_column("CapacityWind".into());
    let capacity_solar = spec
        .solar
        .then(|| problem.add_column("CapacitySolar".into()));
    let capacity_storage = problem.add_column("CapacityStorage".into());
    let capacity_battery = topology
        .battery
        .then(|| problem.add_column("CapacityBattery".into()));

    let wind_prod = problem.add_hourly_columns("WindProd", hours.clone());
    let solar_prod = spec
        .solar
        .then(|| problem.add_hourly_columns("SolarProd", hours.clone()));
    let electricity_prod = problem.add_hourly_columns("ElectricityProd", hours.clone());
    let hydrogen_prod = problem.add_hourly_columns("HydrogenProd", hours.clone());
    let hydrogen_stored = problem.add_hourly_columns("HydrogenStored", hours.clone());
    let electricity_stored = topology
        .battery
        .then(|| problem.add_hourly_columns("ElectricityStored", hours.clone()));
    let electricity_sold = topology
        .grid_sales
        .then(|| problem.add_hourly_columns("ElectricitySold", hours.clone()));
    let electricity_bought = topology
        .grid_purchase
        .then(|| problem.add_hourly_columns("ElectricityBought", hours));

    VariableMap {
        capacity_elec,
        capacity_wind,
        capacity_solar,
        capacity_storage,
        capacity_battery,
        wind_prod,
        solar_prod,
        electricity_prod,
        hydrogen_prod,
        hydrogen_stored,
        electricity_stored,
        electricity_sold,
        electricity_bought,
    }
}

/// The yearly cost per MW of a renewable contract: energy payments for the hours it produces, plus
/// collateral where required
fn contract_cost(
    ppa_price: MoneyPerEnergy,
    capacity_factor: &[f64],
    parameters: &ParameterSet,
    spec: &VariantSpec,
) -> MoneyPerPower {
    let full_load_hours: f64 = capacity_factor.iter().sum();
    let mut cost =
        MoneyPerPower((ppa_price + parameters.grid_charges()).value() * full_load_hours);
    if spec.ppa_collateral {
        cost = cost + ppa_collateral_cost(ppa_price, parameters.wacc);
    }

    cost
}

/// Set the objective coefficients of the problem
fn add_objective(
    problem: &mut ProblemBuilder,
    variables: &VariableMap,
    parameters: &ParameterSet,
    series: &TimeSeries,
    spec: &VariantSpec,
) {
    // Annualised asset costs
    problem.add_cost(
        variables.capacity_elec,
        annualised_cost(
            parameters.capex_elec,
            parameters.annuity_elec,
            parameters.opex_elec,
        )
        .value(),
    );
    problem.add_cost(
        variables.capacity_storage,
        annualised_cost(
            parameters.capex_storage,
            parameters.annuity_storage,
            parameters.opex_storage,
        )
        .value(),
    );
    if let Some(capacity_battery) = variables.capacity_battery {
        problem.add_cost(
            capacity_battery,
            annualised_cost(
                parameters.capex_battery,
                parameters.annuity_battery,
                parameters.opex_battery,
            )
            .value(),
        );
    }

    // Renewable contracts
    problem.add_cost(
        variables.capacity_wind,
        contract_cost(
            parameters.ppa_price_wind,
            &series.wind_capacity_factor,
            parameters,
            spec,
        )
        .value(),
    );
    if let (Some(capacity_solar), Some(solar_cf)) =
        (variables.capacity_solar, &series.solar_capacity_factor)
    {
        problem.add_cost(
            capacity_solar,
            contract_cost(parameters.ppa_price_solar, solar_cf, parameters, spec).value(),
        );
    }

    // Water
    if spec.water_cost {
        for &prod in &variables.hydrogen_prod {
            problem.add_cost(prod, parameters.water_cost.value());
        }
    }

    // Grid trading at the hourly price, plus tax and fee
    let Some(grid_price) = &series.grid_price else {
        return;
    };
    let hourly_price = grid_price.iter().map(|&price| {
        (MoneyPerEnergy(price) * parameters.grid_price_multiplier + parameters.grid_charges())
            .value()
    });
    if let Some(sold) = &variables.electricity_sold {
        for (&var, price) in sold.iter().zip(hourly_price.clone()) {
            problem.add_cost(var, -price);
        }
    }
    if let Some(bought) = &variables.electricity_bought {
        for (&var, price) in bought.iter().zip(hourly_price) {
            problem.add_cost(var, price);
        }
    }
}
