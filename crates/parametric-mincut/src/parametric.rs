//! Recursive parametric driver
//!
//! Discovers every lambda breakpoint in an interval by intersecting the
//! affine cut-value functions of its endpoints. The low endpoint is solved
//! for the minimal source set and the high endpoint for the maximal one;
//! if their cut lines cross strictly inside the interval, the crossing
//! separates the interval into two halves each holding at least one
//! breakpoint, and the driver recurses on contracted sub-instances. A
//! crossing at an endpoint is itself a breakpoint and ends the recursion.

use tracing::debug;

use crate::breakpoint::BreakpointList;
use crate::error::Result;
use crate::problem::CutProblem;
use crate::solver::SolveStats;

/// Shared driver state threaded through the recursion
pub(crate) struct ParametricDriver<'a> {
    pub round_negative: bool,
    pub tolerance: f64,
    pub stats: &'a mut SolveStats,
    pub breakpoints: &'a mut BreakpointList,
}

impl ParametricDriver<'_> {
    /// Solve the interval spanned by `low` and `high`, emitting breakpoints
    /// in ascending lambda order.
    ///
    /// Only the outermost call sees both endpoints unsolved; that level
    /// additionally emits the high endpoint so the final lambda segment is
    /// represented.
    pub fn solve_interval(&mut self, low: &mut CutProblem, high: &mut CutProblem) -> Result<()> {
        let base_level = !low.solved() && !high.solved();

        if !low.solved() {
            low.solve(false, self.stats)?;
        }
        if !high.solved() {
            high.solve(true, self.stats)?;
        }

        // crossing of the two affine cut-value functions
        let slope_gap = high.cut_multiplier() - low.cut_multiplier();
        let intersect = if slope_gap.abs() > self.tolerance {
            Some((low.cut_constant() - high.cut_constant()) / slope_gap)
        } else {
            None
        };

        match intersect {
            Some(lambda) if lambda + self.tolerance < high.lambda()
                && lambda - self.tolerance > low.lambda() =>
            {
                // at least two breakpoints: split at the crossing and
                // recurse on both halves, contracting what the nested-cut
                // bounds have already decided
                debug!(
                    low = low.lambda(),
                    high = high.lambda(),
                    at = lambda,
                    "splitting interval at cut-line crossing"
                );

                let mut upper_mid = CutProblem::contract(
                    low,
                    lambda,
                    low.indicator(),
                    high.indicator(),
                    self.round_negative,
                    self.tolerance,
                )?;
                self.solve_interval(low, &mut upper_mid)?;

                let mut lower_mid = CutProblem::contract(
                    low,
                    lambda,
                    low.indicator(),
                    high.indicator(),
                    self.round_negative,
                    self.tolerance,
                )?;
                self.solve_interval(&mut lower_mid, high)?;
            }
            Some(lambda) if (lambda - high.lambda()).abs() <= self.tolerance => {
                debug!(lambda = high.lambda(), "breakpoint at interval upper bound");
                self.breakpoints.push(high.lambda(), low.indicator());
            }
            Some(lambda) if (lambda - low.lambda()).abs() <= self.tolerance => {
                debug!(lambda = low.lambda(), "breakpoint at interval lower bound");
                self.breakpoints.push(low.lambda(), low.indicator());
            }
            _ => {
                // parallel cut lines or a crossing outside the interval:
                // no interior breakpoint at this level
            }
        }

        if base_level {
            self.breakpoints.push(high.lambda(), high.indicator());
        }

        Ok(())
    }
}
