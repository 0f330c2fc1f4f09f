//! The scenario sweep: build and solve one problem per scenario and collect the results.
use crate::error::ConfigurationError;
use crate::model::Model;
use crate::parameters::resolve;
use crate::problem::{Problem, VariableMap, build};
use crate::scenario::ScenarioConfig;
use crate::solver::{Solution, SolveOutcome, Solver};
use anyhow::Result;
use log::{debug, info, warn};
use serde::Serialize;
use std::fmt;

/// The outcome of one scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScenarioStatus {
    /// An optimal solution was found
    Optimal,
    /// The problem has no feasible point
    Infeasible,
    /// The problem is unbounded
    Unbounded,
    /// The solver failed or stopped at a limit
    SolverError,
    /// The scenario could not be turned into a problem
    ConfigError,
}

impl fmt::Display for ScenarioStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Optimal => "OPTIMAL",
            Self::Infeasible => "INFEASIBLE",
            Self::Unbounded => "UNBOUNDED",
            Self::SolverError => "SOLVER_ERROR",
            Self::ConfigError => "CONFIG_ERROR",
        };
        write!(f, "{label}")
    }
}

/// Optimal capacities of the plant's assets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capacities {
    /// Electrolyser (MW)
    pub elec: f64,
    /// Wind contract (MW)
    pub wind: f64,
    /// Solar contract (MW), if there is one
    pub solar: Option<f64>,
    /// Hydrogen tank (kg)
    pub storage: f64,
    /// Battery (MWh), if there is one
    pub battery: Option<f64>,
}

impl Capacities {
    /// Read the capacities from a solution
    fn from_solution(variables: &VariableMap, solution: &Solution) -> Self {
        Self {
            elec: solution.value(variables.capacity_elec),
            wind: solution.value(variables.capacity_wind),
            solar: variables.capacity_solar.map(|var| solution.value(var)),
            storage: solution.value(variables.capacity_storage),
            battery: variables.capacity_battery.map(|var| solution.value(var)),
        }
    }
}

/// The result of one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// The scenario's coordinates
    pub scenario: ScenarioConfig,
    /// What happened
    pub status: ScenarioStatus,
    /// Optimal capacities, if the scenario was solved
    pub capacities: Option<Capacities>,
    /// Optimal objective value, if the scenario was solved
    pub objective: Option<f64>,
    /// Details of any failure
    pub message: Option<String>,
}

impl ResultRow {
    /// A row without values
    fn failed(scenario: ScenarioConfig, status: ScenarioStatus, message: Option<String>) -> Self {
        Self {
            scenario,
            status,
            capacities: None,
            objective: None,
            message,
        }
    }

    /// A row for a scenario which could not be built.
    ///
    /// If there is a [`ConfigurationError`] in the error's chain, the message names its field.
    fn config_error(scenario: ScenarioConfig, err: &anyhow::Error) -> Self {
        let message = err
            .chain()
            .find_map(|e| e.downcast_ref::<ConfigurationError>())
            .map_or_else(|| format!("{err:#}"), ToString::to_string);

        Self::failed(scenario, ScenarioStatus::ConfigError, Some(message))
    }
}

/// The results of a sweep, one row per scenario in sweep order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultsTable {
    rows: Vec<ResultRow>,
}

impl ResultsTable {
    /// The rows of the table
    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    /// The number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The number of rows with the given status
    pub fn count(&self, status: ScenarioStatus) -> usize {
        self.rows.iter().filter(|row| row.status == status).count()
    }
}

impl From<Vec<ResultRow>> for ResultsTable {
    fn from(rows: Vec<ResultRow>) -> Self {
        Self { rows }
    }
}

/// Resolve parameters, gather series and build the problem for one scenario
fn build_problem(model: &Model, scenario: &ScenarioConfig) -> Result<Problem> {
    let parameters = resolve(
        scenario.country,
        scenario.price_year,
        scenario.sensitivity,
        scenario.variant,
    )?;
    let series = model.time_series_for(scenario)?;
    let spec = scenario.variant.spec();

    build(
        &parameters,
        &series,
        model.parameters.horizon_hours,
        spec.topology(scenario.country),
        &spec,
    )
}

/// Build and solve one scenario
fn run_scenario<S, F>(
    model: &Model,
    scenario: ScenarioConfig,
    solver: &S,
    on_optimal: &mut F,
) -> Result<ResultRow>
where
    S: Solver + ?Sized,
    F: FnMut(&ScenarioConfig, &Problem, &Solution) -> Result<()>,
{
    let problem = match build_problem(model, &scenario) {
        Ok(problem) => problem,
        Err(err) => {
            warn!("Could not build scenario {scenario}: {err:#}");
            return Ok(ResultRow::config_error(scenario, &err));
        }
    };
    debug!(
        "Built problem with {} variables and {} constraints",
        problem.columns().len(),
        problem.rows().len()
    );

    let row = match solver.solve(&problem) {
        SolveOutcome::Optimal(solution) => {
            info!(
                "Scenario {scenario} solved with objective {}",
                solution.objective()
            );
            on_optimal(&scenario, &problem, &solution)?;
            ResultRow {
                scenario,
                status: ScenarioStatus::Optimal,
                capacities: Some(Capacities::from_solution(problem.variables(), &solution)),
                objective: Some(solution.objective()),
                message: None,
            }
        }
        SolveOutcome::Infeasible => {
            warn!("Scenario {scenario} is infeasible");
            ResultRow::failed(scenario, ScenarioStatus::Infeasible, None)
        }
        SolveOutcome::Unbounded => {
            warn!("Scenario {scenario} is unbounded");
            ResultRow::failed(scenario, ScenarioStatus::Unbounded, None)
        }
        SolveOutcome::TimeLimit => {
            warn!("Solver reached its limit for scenario {scenario}");
            ResultRow::failed(
                scenario,
                ScenarioStatus::SolverError,
                Some("Solver reached its time or iteration limit".into()),
            )
        }
        SolveOutcome::Error(message) => {
            warn!("Solver failed for scenario {scenario}: {message}");
            ResultRow::failed(scenario, ScenarioStatus::SolverError, Some(message))
        }
    };

    Ok(row)
}

/// Run every scenario of a model.
///
/// Scenarios are run one at a time, in sweep order, and each produces exactly one row. A scenario
/// which cannot be built or solved is recorded and the sweep moves on.
///
/// # Arguments
///
/// * `model` - The model to sweep over
/// * `solver` - The solver to hand each problem to
/// * `on_optimal` - Called with each optimal solution, e.g. to write it to disk
///
/// # Returns
///
/// The results table, or an error if `on_optimal` fails.
pub fn run_sweep<S, F>(model: &Model, solver: &S, mut on_optimal: F) -> Result<ResultsTable>
where
    S: Solver + ?Sized,
    F: FnMut(&ScenarioConfig, &Problem, &Solution) -> Result<()>,
{
    let num_scenarios = model.num_scenarios();
    let mut rows = Vec::with_capacity(num_scenarios);
    for (idx, scenario) in model.iter_scenarios().enumerate() {
        info!("Scenario {}/{num_scenarios}: {scenario}", idx + 1);
        rows.push(run_scenario(model, scenario, solver, &mut on_optimal)?);
    }

    Ok(rows.into())
}
