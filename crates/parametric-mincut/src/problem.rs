//! Self-contained cut sub-instances
//!
//! A [`CutProblem`] is one realized instance handed to the pseudoflow
//! engine: an interior node list whose first two slots are the artificial
//! source and sink, the sets of original nodes already contracted into
//! either terminal, and an arc list with capacities realized at the
//! instance's lambda.
//!
//! Sub-instances are derived from the super graph directly
//! ([`CutProblem::from_graph`]) or from a solved parent instance by
//! nested-cut contraction ([`CutProblem::contract`]): any node inside the
//! lower bound's minimal source set stays on the source side for every
//! larger lambda, and any node outside the upper bound's maximal source set
//! stays on the sink side for every smaller lambda, so both groups can be
//! folded into the terminals before recursing.

use tracing::debug;

use crate::error::{ParametricCutError, Result};
use crate::graph::ParametricGraph;
use crate::pseudoflow::{EngineArc, PseudoflowEngine};
use crate::solver::SolveStats;

/// What an instance slot stands for in the super graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeOrigin {
    /// The artificial source (slot 0 of every instance)
    Source,
    /// The artificial sink (slot 1 of every instance)
    Sink,
    /// An interior node carrying its original super-graph index
    Super(usize),
}

/// An instance arc: affine coefficients plus the realized capacity
#[derive(Debug, Clone, Copy)]
pub struct ProblemArc {
    /// Tail slot in the instance node list
    pub from: u32,
    /// Head slot in the instance node list
    pub to: u32,
    /// Constant capacity term
    pub constant: f64,
    /// Per-lambda capacity term
    pub multiplier: f64,
    /// Capacity realized at the instance lambda (clamped when negative and
    /// rounding applies)
    pub capacity: f64,
}

/// One realized cut instance over a sub-interval endpoint
#[derive(Debug, Clone)]
pub struct CutProblem {
    lambda: f64,
    nodes: Vec<NodeOrigin>,
    source_set: Vec<usize>,
    sink_set: Vec<usize>,
    arcs: Vec<ProblemArc>,
    solved: bool,
    indicator: Vec<u8>,
    cut_constant: f64,
    cut_multiplier: f64,
    cut_value: f64,
    num_super: usize,
}

impl CutProblem {
    /// Build the initial instance for the whole super graph at `lambda`.
    ///
    /// The artificial source takes slot 0 and the sink slot 1; every other
    /// super node follows in index order. The contracted sets start out
    /// holding exactly the super source and sink.
    pub fn from_graph(
        graph: &ParametricGraph,
        lambda: f64,
        round_negative: bool,
        tolerance: f64,
    ) -> Result<Self> {
        let num_super = graph.num_nodes();
        let mut nodes = Vec::with_capacity(num_super);
        nodes.push(NodeOrigin::Source);
        nodes.push(NodeOrigin::Sink);

        let mut node_map = vec![0u32; num_super];
        let mut next_slot = 2u32;
        for i in 0..num_super {
            if i == graph.source() {
                node_map[i] = 0;
            } else if i == graph.sink() {
                node_map[i] = 1;
            } else {
                node_map[i] = next_slot;
                nodes.push(NodeOrigin::Super(i));
                next_slot += 1;
            }
        }

        let arcs = graph
            .arcs()
            .iter()
            .map(|arc| ProblemArc {
                from: node_map[arc.from],
                to: node_map[arc.to],
                constant: arc.constant,
                multiplier: arc.multiplier,
                capacity: 0.0,
            })
            .collect();

        let mut problem = Self {
            lambda,
            nodes,
            source_set: vec![graph.source()],
            sink_set: vec![graph.sink()],
            arcs,
            solved: false,
            indicator: Vec::new(),
            cut_constant: 0.0,
            cut_multiplier: 0.0,
            cut_value: 0.0,
            num_super,
        };
        problem.evaluate_capacities(round_negative, tolerance)?;
        Ok(problem)
    }

    /// Derive a contracted instance from a solved parent.
    ///
    /// Interior nodes with `low_indicator = 1` join the source set, nodes
    /// with `high_indicator = 0` join the sink set, the rest stay interior.
    /// Arcs collapsing onto a terminal are merged per distinct interior
    /// endpoint (coefficients summed); arcs running from the new source to
    /// the new sink collapse into a single artificial arc; arcs that would
    /// leave the sink or enter the source are dropped.
    pub fn contract(
        old: &CutProblem,
        lambda: f64,
        low_indicator: &[u8],
        high_indicator: &[u8],
        round_negative: bool,
        tolerance: f64,
    ) -> Result<Self> {
        let mut source_set = old.source_set.clone();
        let mut sink_set = old.sink_set.clone();

        let mut nodes = Vec::with_capacity(old.nodes.len());
        nodes.push(NodeOrigin::Source);
        nodes.push(NodeOrigin::Sink);

        let mut node_map = vec![0u32; old.nodes.len()];
        node_map[0] = 0;
        node_map[1] = 1;

        for (slot, origin) in old.nodes.iter().enumerate().skip(2) {
            let original = match origin {
                NodeOrigin::Super(i) => *i,
                _ => {
                    return Err(ParametricCutError::Internal(
                        "artificial terminal outside the first two instance slots".into(),
                    ))
                }
            };
            if low_indicator[original] == 1 {
                node_map[slot] = 0;
                source_set.push(original);
            } else if high_indicator[original] == 0 {
                node_map[slot] = 1;
                sink_set.push(original);
            } else {
                node_map[slot] = nodes.len() as u32;
                nodes.push(NodeOrigin::Super(original));
            }
        }

        // merged-arc slots, keyed by the surviving interior endpoint
        let mut source_adjacent: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut sink_adjacent: Vec<Option<usize>> = vec![None; nodes.len()];
        let mut arcs: Vec<ProblemArc> = Vec::with_capacity(old.arcs.len());

        for arc in &old.arcs {
            let from = node_map[arc.from as usize];
            let to = node_map[arc.to as usize];
            if from == to || to == 0 || from == 1 {
                continue;
            }
            if from == 0 {
                match source_adjacent[to as usize] {
                    Some(idx) => {
                        arcs[idx].constant += arc.constant;
                        arcs[idx].multiplier += arc.multiplier;
                    }
                    None => {
                        source_adjacent[to as usize] = Some(arcs.len());
                        arcs.push(ProblemArc {
                            from,
                            to,
                            constant: arc.constant,
                            multiplier: arc.multiplier,
                            capacity: 0.0,
                        });
                    }
                }
            } else if to == 1 {
                match sink_adjacent[from as usize] {
                    Some(idx) => {
                        arcs[idx].constant += arc.constant;
                        arcs[idx].multiplier += arc.multiplier;
                    }
                    None => {
                        sink_adjacent[from as usize] = Some(arcs.len());
                        arcs.push(ProblemArc {
                            from,
                            to,
                            constant: arc.constant,
                            multiplier: arc.multiplier,
                            capacity: 0.0,
                        });
                    }
                }
            } else {
                arcs.push(ProblemArc {
                    from,
                    to,
                    constant: arc.constant,
                    multiplier: arc.multiplier,
                    capacity: 0.0,
                });
            }
        }

        let mut problem = Self {
            lambda,
            nodes,
            source_set,
            sink_set,
            arcs,
            solved: false,
            indicator: Vec::new(),
            cut_constant: 0.0,
            cut_multiplier: 0.0,
            cut_value: 0.0,
            num_super: old.num_super,
        };
        problem.evaluate_capacities(round_negative, tolerance)?;
        Ok(problem)
    }

    /// Realize every arc capacity at the instance lambda.
    ///
    /// Negative results are clamped to zero when rounding is enabled or the
    /// value sits within tolerance of zero; otherwise the instance is
    /// infeasible.
    fn evaluate_capacities(&mut self, round_negative: bool, tolerance: f64) -> Result<()> {
        for arc in &mut self.arcs {
            arc.capacity = arc.constant + arc.multiplier * self.lambda;
            if arc.capacity < 0.0 {
                if round_negative || arc.capacity > -tolerance {
                    if arc.capacity <= -tolerance {
                        debug!(
                            lambda = self.lambda,
                            capacity = arc.capacity,
                            "clamping negative capacity to zero"
                        );
                    }
                    arc.capacity = 0.0;
                } else {
                    return Err(ParametricCutError::CapacityInfeasible { lambda: self.lambda });
                }
            }
        }
        Ok(())
    }

    /// Solve the instance, writing the optimal source-set indicator over
    /// the original index space.
    ///
    /// With `maximal_source_set` the engine runs on the reversed arcs with
    /// the terminals swapped and the answer is complemented, yielding the
    /// maximum source side among the minimum cuts instead of the minimum.
    /// An instance with no interior nodes is read off the contracted sets
    /// directly.
    pub fn solve(&mut self, maximal_source_set: bool, stats: &mut SolveStats) -> Result<()> {
        self.cut_constant = 0.0;
        self.cut_multiplier = 0.0;
        self.cut_value = 0.0;

        let num_nodes = self.nodes.len();

        if num_nodes == 2 {
            let mut indicator = vec![0u8; self.num_super];
            for &i in &self.source_set {
                indicator[i] = 1;
            }
            for &i in &self.sink_set {
                indicator[i] = 0;
            }
            for arc in &self.arcs {
                if arc.from == 0 && arc.to == 1 {
                    self.cut_constant += arc.constant;
                    self.cut_multiplier += arc.multiplier;
                    self.cut_value += arc.capacity;
                }
            }
            self.indicator = indicator;
            self.solved = true;
            return Ok(());
        }

        let engine_arcs: Vec<EngineArc> = if maximal_source_set {
            self.arcs
                .iter()
                .map(|arc| EngineArc::new(arc.to, arc.from, arc.capacity))
                .collect()
        } else {
            self.arcs
                .iter()
                .map(|arc| EngineArc::new(arc.from, arc.to, arc.capacity))
                .collect()
        };
        let (source, sink) = if maximal_source_set { (1, 0) } else { (0, 1) };

        let mut engine = PseudoflowEngine::new(num_nodes, engine_arcs, source, sink);
        engine.run(stats);

        let mut indicator = vec![0u8; self.num_super];
        for (slot, origin) in self.nodes.iter().enumerate().skip(2) {
            if let NodeOrigin::Super(original) = origin {
                let on_source_side = engine.is_source_side(slot);
                indicator[*original] = if maximal_source_set {
                    u8::from(!on_source_side)
                } else {
                    u8::from(on_source_side)
                };
            }
        }
        for &i in &self.source_set {
            indicator[i] = 1;
        }
        for &i in &self.sink_set {
            indicator[i] = 0;
        }

        self.indicator = indicator;
        self.evaluate_cut();
        self.solved = true;
        Ok(())
    }

    /// Accumulate the affine cut coefficients over arcs crossing from the
    /// source side to the sink side of the solved indicator.
    fn evaluate_cut(&mut self) {
        for arc in &self.arcs {
            let from_in_source = match self.nodes[arc.from as usize] {
                NodeOrigin::Source => true,
                NodeOrigin::Sink => false,
                NodeOrigin::Super(i) => self.indicator[i] == 1,
            };
            let to_outside_source = match self.nodes[arc.to as usize] {
                NodeOrigin::Sink => true,
                NodeOrigin::Source => false,
                NodeOrigin::Super(i) => self.indicator[i] == 0,
            };
            if from_in_source && to_outside_source {
                self.cut_value += arc.capacity;
                self.cut_multiplier += arc.multiplier;
                self.cut_constant += arc.constant;
            }
        }
    }

    /// The lambda this instance is realized at
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    /// Whether the engine has run on this instance
    pub fn solved(&self) -> bool {
        self.solved
    }

    /// The optimal source-set indicator over all original nodes; empty
    /// until solved
    pub fn indicator(&self) -> &[u8] {
        &self.indicator
    }

    /// Constant coefficient of the cut-value function
    pub fn cut_constant(&self) -> f64 {
        self.cut_constant
    }

    /// Lambda coefficient of the cut-value function
    pub fn cut_multiplier(&self) -> f64 {
        self.cut_multiplier
    }

    /// Cut value realized at this instance's lambda
    pub fn cut_value(&self) -> f64 {
        self.cut_value
    }

    /// Instance node count, terminals included
    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Instance arc count after contraction
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bipartite_graph() -> ParametricGraph {
        // two interior nodes choosing between a growing source arc and a
        // constant sink arc
        let mut g = ParametricGraph::new(4, 0, 3).unwrap();
        g.add_arc(0, 1, 0.0, 1.0).unwrap();
        g.add_arc(0, 2, 0.0, 2.0).unwrap();
        g.add_arc(1, 3, 5.0, 0.0).unwrap();
        g.add_arc(2, 3, 3.0, 0.0).unwrap();
        g
    }

    #[test]
    fn test_from_graph_layout() {
        let g = bipartite_graph();
        let p = CutProblem::from_graph(&g, 1.0, false, 1e-8).unwrap();

        assert_eq!(p.num_nodes(), 4);
        assert_eq!(p.num_arcs(), 4);
        assert_eq!(p.nodes[0], NodeOrigin::Source);
        assert_eq!(p.nodes[1], NodeOrigin::Sink);
        assert_eq!(p.nodes[2], NodeOrigin::Super(1));
        assert_eq!(p.nodes[3], NodeOrigin::Super(2));
        assert!(!p.solved());
        // capacities realized at lambda = 1
        assert_eq!(p.arcs[0].capacity, 1.0);
        assert_eq!(p.arcs[1].capacity, 2.0);
    }

    #[test]
    fn test_capacity_clamping() {
        let mut g = ParametricGraph::new(3, 0, 2).unwrap();
        g.add_arc(0, 1, 1.0, 0.0).unwrap();
        g.add_arc(1, 2, 2.0, -1.0).unwrap();

        // 2 - 3 = -1: infeasible without rounding
        let err = CutProblem::from_graph(&g, 3.0, false, 1e-8).unwrap_err();
        assert!(err.is_infeasible());

        // rounded to zero with the flag on
        let p = CutProblem::from_graph(&g, 3.0, true, 1e-8).unwrap();
        assert_eq!(p.arcs[1].capacity, 0.0);

        // a tiny negative value is clamped even without the flag
        let p = CutProblem::from_graph(&g, 2.0 + 1e-12, false, 1e-8).unwrap();
        assert_eq!(p.arcs[1].capacity, 0.0);
    }

    #[test]
    fn test_solve_minimal_and_maximal() {
        let g = bipartite_graph();
        let mut stats = SolveStats::default();

        // at lambda = 1.5 node 2 is indifferent: 2 * 1.5 = 3 on either side
        let mut low = CutProblem::from_graph(&g, 1.5, false, 1e-8).unwrap();
        low.solve(false, &mut stats).unwrap();
        assert!(low.solved());
        assert_eq!(low.indicator(), &[1, 0, 0, 0]);

        let mut high = CutProblem::from_graph(&g, 1.5, false, 1e-8).unwrap();
        high.solve(true, &mut stats).unwrap();
        assert_eq!(high.indicator(), &[1, 0, 1, 0]);

        // both are minimum cuts with the same value
        assert!((low.cut_value() - high.cut_value()).abs() < 1e-9);
    }

    #[test]
    fn test_cut_coefficients() {
        let g = bipartite_graph();
        let mut stats = SolveStats::default();

        let mut p = CutProblem::from_graph(&g, 0.0, false, 1e-8).unwrap();
        p.solve(false, &mut stats).unwrap();
        // nothing joins the source side at lambda 0: cut = lambda + 2 lambda
        assert_eq!(p.indicator(), &[1, 0, 0, 0]);
        assert_eq!(p.cut_constant(), 0.0);
        assert_eq!(p.cut_multiplier(), 3.0);
        assert_eq!(p.cut_value(), 0.0);
    }

    #[test]
    fn test_contract_moves_nodes_and_merges_arcs() {
        let g = bipartite_graph();
        let mut stats = SolveStats::default();

        let mut low = CutProblem::from_graph(&g, 0.0, false, 1e-8).unwrap();
        low.solve(false, &mut stats).unwrap();
        let mut high = CutProblem::from_graph(&g, 10.0, false, 1e-8).unwrap();
        high.solve(true, &mut stats).unwrap();
        assert_eq!(high.indicator(), &[1, 1, 1, 0]);

        // node 1 contracted to the source, node 2 to the sink
        let low_ind = [1u8, 1, 0, 0];
        let high_ind = [1u8, 1, 0, 0];
        let p =
            CutProblem::contract(&low, 2.0, &low_ind, &high_ind, false, 1e-8).unwrap();

        assert_eq!(p.num_nodes(), 2);
        assert_eq!(p.source_set, vec![0, 1]);
        assert_eq!(p.sink_set, vec![3, 2]);
        // (0,1) disappears inside the source; (2,3) inside the sink;
        // (0,2) becomes source->sink, (1,3) becomes source->sink: merged
        assert_eq!(p.num_arcs(), 1);
        assert_eq!(p.arcs[0].constant, 5.0);
        assert_eq!(p.arcs[0].multiplier, 2.0);
    }

    #[test]
    fn test_solve_two_node_instance() {
        let g = bipartite_graph();
        let mut stats = SolveStats::default();

        let mut low = CutProblem::from_graph(&g, 0.0, false, 1e-8).unwrap();
        low.solve(false, &mut stats).unwrap();

        let low_ind = [1u8, 1, 0, 0];
        let high_ind = [1u8, 1, 0, 0];
        let mut p =
            CutProblem::contract(&low, 2.0, &low_ind, &high_ind, false, 1e-8).unwrap();
        p.solve(false, &mut stats).unwrap();

        assert_eq!(p.indicator(), &[1, 1, 0, 0]);
        assert_eq!(p.cut_constant(), 5.0);
        assert_eq!(p.cut_multiplier(), 2.0);
        assert_eq!(p.cut_value(), 9.0);
    }
}
