//! Adapter between [`Problem`]s and the HiGHS solver.
use crate::problem::{Problem, Variable};
use highs::{HighsModelStatus, RowProblem, Sense};
use log::debug;

/// Something that can solve a [`Problem`].
///
/// Implementations must not mutate or keep the problem; each call is independent.
pub trait Solver {
    /// Solve the problem, minimising its objective
    fn solve(&self, problem: &Problem) -> SolveOutcome;
}

/// The result of handing a problem to a solver
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// An optimal solution was found
    Optimal(Solution),
    /// No feasible point exists
    Infeasible,
    /// The objective can be decreased without limit
    Unbounded,
    /// The solver stopped at a time or iteration limit before reaching optimality
    TimeLimit,
    /// The solver failed for another reason
    Error(String),
}

/// The values of all variables at an optimal point
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    values: Vec<f64>,
    objective: f64,
}

impl Solution {
    /// Create a solution from column values, computing the objective from the problem's costs
    pub fn new(problem: &Problem, values: Vec<f64>) -> Self {
        let objective = problem.objective_value(&values);
        Self { values, objective }
    }

    /// The value of one variable
    pub fn value(&self, var: Variable) -> f64 {
        self.values[var.index()]
    }

    /// The values of several variables, in the same order
    pub fn values_of(&self, vars: &[Variable]) -> Vec<f64> {
        vars.iter().map(|&var| self.value(var)).collect()
    }

    /// The value of every column, in declaration order
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The objective value
    pub fn objective(&self) -> f64 {
        self.objective
    }
}

/// Solves problems with HiGHS
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighsSolver {
    /// Maximum time to spend on one solve, in seconds
    pub time_limit: Option<f64>,
    /// Whether to print HiGHS's own output to the console
    pub verbose: bool,
}

impl HighsSolver {
    /// Create a solver whose verbosity follows the current log level
    pub fn new(time_limit: Option<f64>) -> Self {
        Self {
            time_limit,
            verbose: log::max_level() >= log::LevelFilter::Debug,
        }
    }
}

/// Convert a problem into a HiGHS problem
fn to_highs(problem: &Problem) -> RowProblem {
    let mut highs_problem = RowProblem::default();
    let cols: Vec<_> = problem
        .columns()
        .iter()
        .map(|column| highs_problem.add_column(column.cost, column.lower..=column.upper))
        .collect();

    for row in problem.rows() {
        highs_problem.add_row(
            row.lower..=row.upper,
            row.terms
                .iter()
                .map(|&(var, coeff)| (cols[var.index()], coeff)),
        );
    }

    highs_problem
}

impl Solver for HighsSolver {
    fn solve(&self, problem: &Problem) -> SolveOutcome {
        if problem.requires_nonconvex() {
            return SolveOutcome::Error(
                "HiGHS cannot solve problems with non-convex constraints".into(),
            );
        }

        debug!(
            "Solving problem with {} variables and {} constraints",
            problem.columns().len(),
            problem.rows().len()
        );
        let mut model = to_highs(problem).optimise(Sense::Minimise);
        if self.verbose {
            model.set_option("log_to_console", true);
            model.set_option("output_flag", true);
        }
        if let Some(time_limit) = self.time_limit {
            model.set_option("time_limit", time_limit);
        }

        let solved = match model.try_solve() {
            Ok(solved) => solved,
            Err(status) => return SolveOutcome::Error(format!("Could not solve: {status:?}")),
        };

        match solved.status() {
            HighsModelStatus::Optimal => {
                let values = solved.get_solution().columns().to_vec();
                SolveOutcome::Optimal(Solution::new(problem, values))
            }
            HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
                SolveOutcome::Infeasible
            }
            HighsModelStatus::Unbounded => SolveOutcome::Unbounded,
            HighsModelStatus::ReachedTimeLimit | HighsModelStatus::ReachedIterationLimit => {
                SolveOutcome::TimeLimit
            }
            status => SolveOutcome::Error(format!("Could not solve: {status:?}")),
        }
    }
}
