//! # Parametric MinCut
//!
//! Parametric s-t minimum cut solver based on Hochbaum's pseudoflow
//! algorithm.
//!
//! The solver takes a directed graph whose source-adjacent and
//! sink-adjacent arc capacities are affine functions of a scalar parameter
//! lambda, `capacity = constant + multiplier * lambda`, and computes every
//! breakpoint in a lambda interval: the at most `n` parameter values at
//! which the minimum cut's source side changes, each with its source-set
//! indicator over all nodes.
//!
//! ## Quick Start
//!
//! ```rust
//! use parametric_mincut::{ParametricGraph, ParametricSolver};
//!
//! // two interior nodes trading a growing source arc against a fixed
//! // sink arc
//! let mut graph = ParametricGraph::new(4, 0, 3).unwrap();
//! graph.add_arc(0, 1, 0.0, 1.0).unwrap();
//! graph.add_arc(0, 2, 0.0, 2.0).unwrap();
//! graph.add_arc(1, 3, 5.0, 0.0).unwrap();
//! graph.add_arc(2, 3, 3.0, 0.0).unwrap();
//!
//! let solution = ParametricSolver::new(graph)
//!     .lambda_range(0.0, 10.0)
//!     .solve()
//!     .expect("solve failed");
//!
//! assert_eq!(solution.num_breakpoints(), 3);
//! assert_eq!(solution.lambdas(), &[1.5, 5.0, 10.0]);
//! assert_eq!(solution.cut(0), &[1, 0, 0, 0]);
//! ```
//!
//! ## Architecture
//!
//! - [`graph`]: the full parametric instance with ingest validation
//! - `pseudoflow`: the single-lambda engine — normalized trees with
//!   strong/weak labels, gap relabeling and highest-label root selection
//! - [`problem`]: realized sub-instances and nested-cut contraction
//! - [`breakpoint`]: the ordered breakpoint store and output packaging
//! - [`solver`]: options, statistics, timings and the public entry points
//! - [`io`]: the DIMACS-like text reader and the line-oriented writer
//!
//! ## Determinism
//!
//! The solve is single-threaded and deterministic given the arc order:
//! strong roots are processed highest label first with FIFO tie-breaking,
//! out-of-tree scans follow insertion order, and all state is local to the
//! call. Two runs over the same input yield identical breakpoints,
//! indicators and counters.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]

pub mod breakpoint;
pub mod error;
pub mod graph;
pub mod io;
pub mod problem;
pub mod solver;

mod parametric;
mod pseudoflow;

pub use breakpoint::{Breakpoint, BreakpointList};
pub use error::{ParametricCutError, Result};
pub use graph::{Capacity, NodeId, ParametricArc, ParametricGraph};
pub use io::{format_solution, parse_dimacs, write_solution};
pub use problem::CutProblem;
pub use solver::{
    solve_arc_matrix, ParametricCutSolution, ParametricSolver, SolveOptions, SolveStats,
    SolveTimings, DEFAULT_TOLERANCE,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Prelude module for convenient imports
///
/// ```rust
/// use parametric_mincut::prelude::*;
///
/// let graph = ParametricGraph::new(2, 0, 1).unwrap();
/// let solution = ParametricSolver::new(graph).solve().unwrap();
/// assert_eq!(solution.num_breakpoints(), 1);
/// ```
pub mod prelude {
    //! Prelude module with commonly used types

    pub use crate::{
        solve_arc_matrix, Breakpoint, BreakpointList, Capacity, NodeId, ParametricArc,
        ParametricCutError, ParametricCutSolution, ParametricGraph, ParametricSolver, Result,
        SolveOptions, SolveStats, SolveTimings,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_constant() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "parametric-mincut");
    }

    #[test]
    fn test_basic_workflow() {
        let mut graph = ParametricGraph::new(3, 0, 2).unwrap();
        graph.add_arc(0, 1, 1.0, 5.0).unwrap();
        graph.add_arc(1, 2, 9.0, -3.0).unwrap();

        let solution = ParametricSolver::new(graph)
            .lambda_range(0.0, 2.0)
            .solve()
            .unwrap();

        assert_eq!(solution.num_breakpoints(), 2);
        assert!((solution.lambdas()[0] - 1.0).abs() < 1e-9);
        assert!((solution.lambdas()[1] - 2.0).abs() < 1e-9);
        assert_eq!(solution.cut(0), &[1, 0, 0]);
        assert_eq!(solution.cut(1), &[1, 1, 0]);
    }

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let graph = ParametricGraph::new(2, 0, 1).unwrap();
        let solution = ParametricSolver::new(graph).solve().unwrap();
        assert_eq!(solution.num_breakpoints(), 1);
        assert_eq!(solution.lambdas(), &[0.0]);
    }

    #[test]
    fn test_solution_serializes() {
        let graph = ParametricGraph::new(2, 0, 1).unwrap();
        let solution = ParametricSolver::new(graph).solve().unwrap();
        let json = serde_json::to_string(&solution).unwrap();
        assert!(json.contains("lambdas"));
    }
}
