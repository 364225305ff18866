use std::fmt::Debug;

/// Absolute slack allowed on the constraint, in the unit of its right-hand side.
///
/// Deadlines and delays are decimal milliseconds; without a tolerance a sum such as
/// `0.1 + 0.2` would miss a deadline of `0.3`.
pub const FEASIBILITY_TOLERANCE: f64 = 1e-9;

/// An integer program over one bounded variable `x`:
///
/// ```text
/// minimize    objective * x
/// subject to  coefficient * x + constant <= rhs
///             lower <= x <= upper,  x integer
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SingleVariableProgram {
    /// Label used in log messages.
    pub name: String,
    pub lower: i64,
    pub upper: i64,
    pub objective: f64,
    pub coefficient: f64,
    pub constant: f64,
    pub rhs: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal(i64),
    Infeasible,
}

/// Solving capability consumed once per TT flow.
pub trait IntegerProgramSolver: Debug + Send + Sync {
    fn solve(&self, program: &SingleVariableProgram) -> SolveStatus;
}

/// Exact solver for [`SingleVariableProgram`].
///
/// The feasible set of one linear inequality intersected with an integer interval is
/// itself an integer interval, so the optimum is one of its two ends.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosedFormSolver;

impl IntegerProgramSolver for ClosedFormSolver {
    fn solve(&self, program: &SingleVariableProgram) -> SolveStatus {
        let Some((lower, upper)) = feasible_interval(program) else {
            log::trace!("Program {} is infeasible.", program.name);
            return SolveStatus::Infeasible;
        };

        // A zero objective accepts any feasible point; take the smallest like the minimizing case.
        let optimum = if program.objective >= 0.0 { lower } else { upper };

        log::trace!("Program {} solved: x = {} over feasible interval [{}, {}].", program.name, optimum, lower, upper);

        SolveStatus::Optimal(optimum)
    }
}

fn feasible_interval(program: &SingleVariableProgram) -> Option<(i64, i64)> {
    let mut lower = program.lower;
    let mut upper = program.upper;

    let slack = program.rhs - program.constant + FEASIBILITY_TOLERANCE;
    if slack.is_nan() || program.coefficient.is_nan() || program.objective.is_nan() {
        return None;
    }

    if program.coefficient > 0.0 {
        let bound = (slack / program.coefficient).floor();
        if bound < lower as f64 {
            return None;
        }
        if bound < upper as f64 {
            upper = bound as i64;
        }
    } else if program.coefficient < 0.0 {
        let bound = (slack / program.coefficient).ceil();
        if bound > upper as f64 {
            return None;
        }
        if bound > lower as f64 {
            lower = bound as i64;
        }
    } else if slack < 0.0 {
        return None;
    }

    if lower > upper { None } else { Some((lower, upper)) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(lower: i64, upper: i64, objective: f64, coefficient: f64, constant: f64, rhs: f64) -> SingleVariableProgram {
        SingleVariableProgram { name: "test".to_string(), lower, upper, objective, coefficient, constant, rhs }
    }

    #[test]
    fn test_minimization_returns_lower_end() {
        assert_eq!(ClosedFormSolver.solve(&program(0, 256, 1.0, 0.125, 3.0, 10.0)), SolveStatus::Optimal(0));
    }

    #[test]
    fn test_maximization_returns_largest_feasible_value() {
        // 0.125 * x + 3 <= 10  ->  x <= 56
        assert_eq!(ClosedFormSolver.solve(&program(0, 256, -1.0, 0.125, 3.0, 10.0)), SolveStatus::Optimal(56));
    }

    #[test]
    fn test_violated_constraint_is_infeasible() {
        assert_eq!(ClosedFormSolver.solve(&program(0, 256, 1.0, 0.125, 10.5, 10.0)), SolveStatus::Infeasible);
    }

    #[test]
    fn test_negative_coefficient_raises_lower_bound() {
        // -2x + 1 <= -6  ->  x >= 3.5  ->  x >= 4
        assert_eq!(ClosedFormSolver.solve(&program(0, 10, 1.0, -2.0, 1.0, -6.0)), SolveStatus::Optimal(4));
        assert_eq!(ClosedFormSolver.solve(&program(0, 3, 1.0, -2.0, 1.0, -6.0)), SolveStatus::Infeasible);
    }

    #[test]
    fn test_tolerance_absorbs_decimal_rounding() {
        assert_eq!(ClosedFormSolver.solve(&program(0, 4, 1.0, 1.0, 0.1 + 0.2, 0.3)), SolveStatus::Optimal(0));
    }

    #[test]
    fn test_empty_bounds_are_infeasible() {
        assert_eq!(ClosedFormSolver.solve(&program(5, 4, 1.0, 0.0, 0.0, 1.0)), SolveStatus::Infeasible);
    }
}
