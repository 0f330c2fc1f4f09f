//! A solver-independent representation of one linear program.
//!
//! The problem owns its columns (variables with objective costs and bounds) and rows (linear
//! constraints with bounds). Rows carry the name of the constraint family they belong to and,
//! for hourly families, the hour they apply to, which makes problems easy to inspect in tests.
use std::ops::Range;

pub mod builder;
pub mod constraints;

pub use builder::{add_scenario, build};

/// A decision variable in the optimisation
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(usize);

impl Variable {
    /// The index of the column for this variable
    pub fn index(self) -> usize {
        self.0
    }
}

/// A column (variable) of the problem.
///
/// The cost is the variable's coefficient in the (minimised) objective.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Name of the variable, e.g. `HydrogenProd[12]`
    pub name: String,
    /// Coefficient in the objective
    pub cost: f64,
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

/// A linear constraint of the form `lower <= a1*x1 + a2*x2 + ... <= upper`
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// The constraint family, e.g. `DemandConstr`
    pub name: &'static str,
    /// The hour to which the constraint applies, if it is hourly
    pub hour: Option<usize>,
    /// Coefficients for the variables involved
    pub terms: Vec<(Variable, f64)>,
    /// Lower bound
    pub lower: f64,
    /// Upper bound
    pub upper: f64,
}

/// Typed access to every variable declared in a [`Problem`].
///
/// Optional assets have `None` in place of their variables when they are absent from the
/// topology.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableMap {
    /// Electrolyser capacity (MW)
    pub capacity_elec: Variable,
    /// Contracted wind capacity (MW)
    pub capacity_wind: Variable,
    /// Contracted solar capacity (MW)
    pub capacity_solar: Option<Variable>,
    /// Hydrogen tank capacity (kg)
    pub capacity_storage: Variable,
    /// Battery capacity (MWh)
    pub capacity_battery: Option<Variable>,
    /// Electricity from the wind contract in each hour (MWh)
    pub wind_prod: Vec<Variable>,
    /// Electricity from the solar contract in each hour (MWh)
    pub solar_prod: Option<Vec<Variable>>,
    /// Total contracted electricity in each hour (MWh)
    pub electricity_prod: Vec<Variable>,
    /// Hydrogen produced in each hour (kg)
    pub hydrogen_prod: Vec<Variable>,
    /// Tank level at the end of each hour (kg)
    pub hydrogen_stored: Vec<Variable>,
    /// Battery level at the end of each hour (MWh)
    pub electricity_stored: Option<Vec<Variable>>,
    /// Electricity sold to the grid in each hour (MWh)
    pub electricity_sold: Option<Vec<Variable>>,
    /// Electricity bought from the grid in each hour (MWh)
    pub electricity_bought: Option<Vec<Variable>>,
}

impl VariableMap {
    /// The number of hours covered by the hourly variables
    pub fn horizon_hours(&self) -> usize {
        self.hydrogen_prod.len()
    }
}

/// One instance of the sizing and dispatch optimisation, ready to hand to a solver
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    columns: Vec<Column>,
    rows: Vec<Row>,
    variables: VariableMap,
    requires_nonconvex: bool,
}

impl Problem {
    /// The columns of the problem, in declaration order
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// The rows of the problem, in the order they were emitted
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Typed access to the problem's variables
    pub fn variables(&self) -> &VariableMap {
        &self.variables
    }

    /// Whether solving requires support for non-convex quadratic constraints.
    ///
    /// Every product in this formulation is between a variable and an exogenous parameter, so
    /// this is currently always false. Solver adapters must still check it.
    pub fn requires_nonconvex(&self) -> bool {
        self.requires_nonconvex
    }

    /// Iterate over the rows of one constraint family
    pub fn iter_rows_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Row> {
        self.rows.iter().filter(move |row| row.name == name)
    }

    /// The objective value for the given column values
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.columns
            .iter()
            .zip(values)
            .map(|(column, value)| column.cost * value)
            .sum()
    }
}

/// Incrementally assembles a [`Problem`].
///
/// The [`VariableMap`] only exists once every variable has been declared, so the builder holds
/// columns and rows on their own until [`ProblemBuilder::finish`] is called.
#[derive(Debug, Default)]
pub struct ProblemBuilder {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl ProblemBuilder {
    /// Declare a new non-negative variable with zero cost
    pub fn add_column(&mut self, name: String) -> Variable {
        self.columns.push(Column {
            name,
            cost: 0.0,
            lower: 0.0,
            upper: f64::INFINITY,
        });
        Variable(self.columns.len() - 1)
    }

    /// Declare one non-negative variable per hour
    pub fn add_hourly_columns(&mut self, name: &str, hours: Range<usize>) -> Vec<Variable> {
        hours
            .map(|hour| self.add_column(format!("{name}[{hour}]")))
            .collect()
    }

    /// Add to a variable's coefficient in the objective
    pub fn add_cost(&mut self, var: Variable, cost: f64) {
        self.columns[var.index()].cost += cost;
    }

    /// Add a constraint
    pub fn add_row(
        &mut self,
        name: &'static str,
        hour: Option<usize>,
        terms: Vec<(Variable, f64)>,
        bounds: RowBounds,
    ) {
        debug_assert!(terms.iter().all(|(var, _)| var.index() < self.num_columns()));

        let (lower, upper) = bounds.limits();
        self.rows.push(Row {
            name,
            hour,
            terms,
            lower,
            upper,
        });
    }

    /// The number of variables declared so far
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Complete the problem
    pub fn finish(self, variables: VariableMap, requires_nonconvex: bool) -> Problem {
        Problem {
            columns: self.columns,
            rows: self.rows,
            variables,
            requires_nonconvex,
        }
    }
}

/// The bounds on a constraint's left-hand side
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RowBounds {
    /// Equal to a value
    Equal(f64),
    /// Less than or equal to a value
    AtMost(f64),
    /// Greater than or equal to a value
    AtLeast(f64),
}

impl RowBounds {
    /// The lower and upper limits for these bounds
    fn limits(self) -> (f64, f64) {
        match self {
            Self::Equal(value) => (value, value),
            Self::AtMost(value) => (f64::NEG_INFINITY, value),
            Self::AtLeast(value) => (value, f64::INFINITY),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::scalar_variable_map;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[test]
    fn test_problem_builder() {
        let mut builder = ProblemBuilder::default();
        let x = builder.add_column("x".into());
        let ys = builder.add_hourly_columns("y", 0..2);
        assert_eq!(x, Variable(0));
        assert_eq!(ys, [Variable(1), Variable(2)]);
        assert_eq!(builder.num_columns(), 3);

        builder.add_cost(x, 2.0);
        builder.add_cost(x, 0.5);
        builder.add_row(
            "Constr",
            Some(1),
            vec![(x, 1.0), (ys[1], -1.0)],
            RowBounds::AtMost(0.0),
        );

        assert_eq!(builder.columns[0].cost, 2.5);
        assert_eq!(builder.columns[2].name, "y[1]");
        assert_eq!(
            builder.rows[0],
            Row {
                name: "Constr",
                hour: Some(1),
                terms: vec![(x, 1.0), (ys[1], -1.0)],
                lower: f64::NEG_INFINITY,
                upper: 0.0,
            }
        );
    }

    #[rstest]
    #[case(RowBounds::Equal(3.0), (3.0, 3.0))]
    #[case(RowBounds::AtMost(3.0), (f64::NEG_INFINITY, 3.0))]
    #[case(RowBounds::AtLeast(3.0), (3.0, f64::INFINITY))]
    fn test_row_bounds_limits(#[case] bounds: RowBounds, #[case] expected: (f64, f64)) {
        assert_eq!(bounds.limits(), expected);
    }

    #[test]
    fn test_objective_value() {
        let problem = Problem {
            columns: vec![
                Column {
                    name: "a".into(),
                    cost: 2.0,
                    lower: 0.0,
                    upper: f64::INFINITY,
                },
                Column {
                    name: "b".into(),
                    cost: -1.0,
                    lower: 0.0,
                    upper: f64::INFINITY,
                },
            ],
            rows: Vec::new(),
            variables: scalar_variable_map(Variable(0), Variable(1)),
            requires_nonconvex: false,
        };
        assert_approx_eq!(f64, problem.objective_value(&[3.0, 4.0]), 2.0);
    }
}
