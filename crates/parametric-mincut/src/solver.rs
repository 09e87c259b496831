//! Top-level solver API
//!
//! [`ParametricSolver`] wraps a [`ParametricGraph`] and a set of
//! [`SolveOptions`] and produces a [`ParametricCutSolution`]: the ascending
//! breakpoint lambdas, a dense column-major indicator matrix over all
//! original nodes, the engine work counters and the phase timings. All
//! solver state lives inside the call, so repeated invocations from one
//! process are independent and reproducible.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::breakpoint::BreakpointList;
use crate::error::{ParametricCutError, Result};
use crate::graph::{NodeId, ParametricGraph};
use crate::parametric::ParametricDriver;
use crate::problem::CutProblem;

/// Default tolerance for lambda comparisons and capacity clamping
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Engine work counters for one solve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Out-of-tree arcs inspected while searching for weak nodes
    pub arc_scans: u64,
    /// Tree merges performed
    pub mergers: u64,
    /// Excess pushes, saturating or not
    pub pushes: u64,
    /// Node relabels, including label-0 promotions
    pub relabels: u64,
    /// Strong roots lifted by the gap heuristic
    pub gaps: u64,
}

impl SolveStats {
    /// The counters as a fixed array: arc scans, mergers, pushes, relabels,
    /// gaps
    pub fn as_array(&self) -> [u64; 5] {
        [self.arc_scans, self.mergers, self.pushes, self.relabels, self.gaps]
    }
}

/// Wall-clock phase durations in seconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SolveTimings {
    /// Time spent ingesting the input
    pub read: f64,
    /// Time spent building the initial instances
    pub init: f64,
    /// Time spent in the parametric driver and engine
    pub solve: f64,
}

impl SolveTimings {
    /// The durations as a fixed array: read, init, solve
    pub fn as_array(&self) -> [f64; 3] {
        [self.read, self.init, self.solve]
    }
}

/// Configuration for a parametric solve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolveOptions {
    /// Lambda interval to sweep, `[low, high]`
    pub lambda_range: [f64; 2],
    /// Clamp negative realized capacities to zero instead of failing
    pub round_negative: bool,
    /// Tolerance for lambda comparisons and near-zero capacities
    pub tolerance: f64,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self { lambda_range: [0.0, 0.0], round_negative: false, tolerance: DEFAULT_TOLERANCE }
    }
}

impl SolveOptions {
    /// Options for the given lambda range with defaults elsewhere
    pub fn with_range(lambda_low: f64, lambda_high: f64) -> Self {
        Self { lambda_range: [lambda_low, lambda_high], ..Self::default() }
    }

    /// Enable or disable negative capacity rounding
    pub fn round_negative(mut self, round: bool) -> Self {
        self.round_negative = round;
        self
    }

    /// Override the comparison tolerance
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// The complete output of one parametric solve
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParametricCutSolution {
    num_nodes: usize,
    lambdas: Vec<f64>,
    cuts: Vec<u8>,
    stats: SolveStats,
    timings: SolveTimings,
}

impl ParametricCutSolution {
    fn new(breakpoints: BreakpointList, stats: SolveStats, timings: SolveTimings) -> Self {
        Self {
            num_nodes: breakpoints.num_nodes(),
            lambdas: breakpoints.lambdas(),
            cuts: breakpoints.indicator_matrix(),
            stats,
            timings,
        }
    }

    /// Number of breakpoints K
    pub fn num_breakpoints(&self) -> usize {
        self.lambdas.len()
    }

    /// Number of original nodes N
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Ascending lambda upper bounds, one per breakpoint
    pub fn lambdas(&self) -> &[f64] {
        &self.lambdas
    }

    /// The dense `N x K` indicator matrix in column-major layout: column
    /// `j` is breakpoint `j`
    pub fn indicator_matrix(&self) -> &[u8] {
        &self.cuts
    }

    /// Indicator of `node` in breakpoint `interval`
    pub fn indicator(&self, node: NodeId, interval: usize) -> u8 {
        self.cuts[interval * self.num_nodes + node]
    }

    /// The indicator column for breakpoint `interval`
    pub fn cut(&self, interval: usize) -> &[u8] {
        let start = interval * self.num_nodes;
        &self.cuts[start..start + self.num_nodes]
    }

    /// The source-side node ids of breakpoint `interval`
    pub fn source_set(&self, interval: usize) -> Vec<NodeId> {
        self.cut(interval)
            .iter()
            .enumerate()
            .filter(|(_, &v)| v == 1)
            .map(|(i, _)| i)
            .collect()
    }

    /// Engine work counters
    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }

    /// Phase timings in seconds
    pub fn timings(&self) -> &SolveTimings {
        &self.timings
    }

    pub(crate) fn set_read_time(&mut self, seconds: f64) {
        self.timings.read = seconds;
    }
}

/// Parametric minimum cut solver over one graph
#[derive(Debug, Clone)]
pub struct ParametricSolver {
    graph: ParametricGraph,
    options: SolveOptions,
}

impl ParametricSolver {
    /// Create a solver with default options (degenerate range at 0)
    pub fn new(graph: ParametricGraph) -> Self {
        Self { graph, options: SolveOptions::default() }
    }

    /// Replace the solve options
    pub fn with_options(mut self, options: SolveOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the lambda range
    pub fn lambda_range(mut self, low: f64, high: f64) -> Self {
        self.options.lambda_range = [low, high];
        self
    }

    /// Enable negative capacity rounding
    pub fn round_negative(mut self, round: bool) -> Self {
        self.options.round_negative = round;
        self
    }

    /// The configured options
    pub fn options(&self) -> &SolveOptions {
        &self.options
    }

    /// The underlying graph
    pub fn graph(&self) -> &ParametricGraph {
        &self.graph
    }

    /// Run the parametric solve.
    ///
    /// A degenerate range (`low == high`) skips the parametric machinery
    /// and reports the single minimum cut at that lambda. Otherwise all
    /// breakpoints in the interval are discovered recursively and adjacent
    /// duplicates collapsed.
    pub fn solve(&self) -> Result<ParametricCutSolution> {
        let [lambda_low, lambda_high] = self.options.lambda_range;
        if lambda_low > lambda_high {
            return Err(ParametricCutError::InvalidLambdaRange(lambda_low, lambda_high));
        }

        let round = self.options.round_negative;
        let tolerance = self.options.tolerance;
        let mut stats = SolveStats::default();
        let mut breakpoints = BreakpointList::new(self.graph.num_nodes());

        if lambda_low == lambda_high {
            let init_start = Instant::now();
            let mut problem = CutProblem::from_graph(&self.graph, lambda_low, round, tolerance)?;
            let init = init_start.elapsed().as_secs_f64();

            let solve_start = Instant::now();
            problem.solve(false, &mut stats)?;
            breakpoints.push(problem.lambda(), problem.indicator());
            let solve = solve_start.elapsed().as_secs_f64();

            let timings = SolveTimings { read: 0.0, init, solve };
            return Ok(ParametricCutSolution::new(breakpoints, stats, timings));
        }

        let init_start = Instant::now();
        let mut low = CutProblem::from_graph(&self.graph, lambda_low, round, tolerance)?;
        let mut high = CutProblem::from_graph(&self.graph, lambda_high, round, tolerance)?;
        let init = init_start.elapsed().as_secs_f64();

        let solve_start = Instant::now();
        {
            let mut driver = ParametricDriver {
                round_negative: round,
                tolerance,
                stats: &mut stats,
                breakpoints: &mut breakpoints,
            };
            driver.solve_interval(&mut low, &mut high)?;
        }
        breakpoints.dedup_adjacent(tolerance);
        let solve = solve_start.elapsed().as_secs_f64();

        let timings = SolveTimings { read: 0.0, init, solve };
        Ok(ParametricCutSolution::new(breakpoints, stats, timings))
    }
}

/// Solve directly from a flat arc matrix.
///
/// `arc_matrix` holds `num_arcs` rows of `(from, to, constant,
/// multiplier)`. This is the array-based entry point mirroring the text
/// interface; the read timing covers graph construction.
pub fn solve_arc_matrix(
    num_nodes: usize,
    num_arcs: usize,
    source: NodeId,
    sink: NodeId,
    arc_matrix: &[f64],
    lambda_range: [f64; 2],
    round_negative: bool,
) -> Result<ParametricCutSolution> {
    let read_start = Instant::now();
    let graph = ParametricGraph::from_arc_matrix(num_nodes, num_arcs, source, sink, arc_matrix)?;
    let read = read_start.elapsed().as_secs_f64();

    let options = SolveOptions {
        lambda_range,
        round_negative,
        tolerance: DEFAULT_TOLERANCE,
    };
    let mut solution = ParametricSolver::new(graph).with_options(options).solve()?;
    solution.set_read_time(read);
    Ok(solution)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bipartite_solver(low: f64, high: f64) -> ParametricSolver {
        let mut g = ParametricGraph::new(4, 0, 3).unwrap();
        g.add_arc(0, 1, 0.0, 1.0).unwrap();
        g.add_arc(0, 2, 0.0, 2.0).unwrap();
        g.add_arc(1, 3, 5.0, 0.0).unwrap();
        g.add_arc(2, 3, 3.0, 0.0).unwrap();
        ParametricSolver::new(g).lambda_range(low, high)
    }

    #[test]
    fn test_solve_produces_ascending_breakpoints() {
        let solution = bipartite_solver(0.0, 10.0).solve().unwrap();

        assert_eq!(solution.num_breakpoints(), 3);
        assert_eq!(solution.num_nodes(), 4);
        let lambdas = solution.lambdas();
        for pair in lambdas.windows(2) {
            assert!(pair[0] < pair[1]);
        }
        assert_eq!(solution.cut(0), &[1, 0, 0, 0]);
        assert_eq!(solution.cut(1), &[1, 0, 1, 0]);
        assert_eq!(solution.cut(2), &[1, 1, 1, 0]);
        assert_eq!(solution.source_set(1), vec![0, 2]);
        assert_eq!(solution.indicator(2, 1), 1);
    }

    #[test]
    fn test_degenerate_range() {
        let solution = bipartite_solver(0.7, 0.7).solve().unwrap();
        assert_eq!(solution.num_breakpoints(), 1);
        assert_eq!(solution.lambdas(), &[0.7]);
        assert_eq!(solution.cut(0), &[1, 0, 0, 0]);
    }

    #[test]
    fn test_invalid_range() {
        let err = bipartite_solver(2.0, 1.0).solve().unwrap_err();
        assert!(matches!(err, ParametricCutError::InvalidLambdaRange(_, _)));
    }

    #[test]
    fn test_solve_arc_matrix() {
        #[rustfmt::skip]
        let matrix = [
            0.0, 1.0, 0.0, 1.0,
            0.0, 2.0, 0.0, 2.0,
            1.0, 3.0, 5.0, 0.0,
            2.0, 3.0, 3.0, 0.0,
        ];
        let solution =
            solve_arc_matrix(4, 4, 0, 3, &matrix, [0.0, 10.0], false).unwrap();
        assert_eq!(solution.num_breakpoints(), 3);
        assert_eq!(solution.stats().as_array().len(), 5);
        assert_eq!(solution.timings().as_array().len(), 3);
    }

    #[test]
    fn test_reproducible_solves() {
        let solver = bipartite_solver(0.0, 10.0);
        let a = solver.solve().unwrap();
        let b = solver.solve().unwrap();
        assert_eq!(a.lambdas(), b.lambdas());
        assert_eq!(a.indicator_matrix(), b.indicator_matrix());
        assert_eq!(a.stats(), b.stats());
    }

    #[test]
    fn test_options_builder() {
        let options = SolveOptions::with_range(0.0, 2.0).round_negative(true).tolerance(1e-6);
        assert_eq!(options.lambda_range, [0.0, 2.0]);
        assert!(options.round_negative);
        assert_eq!(options.tolerance, 1e-6);
    }
}
