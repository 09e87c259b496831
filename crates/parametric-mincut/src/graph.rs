//! Graph model for the parametric minimum cut problem
//!
//! A [`ParametricGraph`] holds the full ("super") instance: `num_nodes`
//! nodes identified by dense indices, a designated source and sink, and a
//! list of directed arcs whose capacity is an affine function of the scalar
//! parameter lambda:
//!
//! ```text
//! capacity(arc; lambda) = constant + multiplier * lambda
//! ```
//!
//! Only source-adjacent arcs may carry a positive multiplier and only
//! sink-adjacent arcs a negative one; interior arcs are constant. These
//! sign rules are what make the optimal source set monotone in lambda,
//! which the parametric driver relies on for contraction.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ParametricCutError, Result};

/// Dense node identifier in `[0, num_nodes)`
pub type NodeId = usize;

/// Capacity / flow scalar type
pub type Capacity = f64;

/// A directed arc with affine capacity
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParametricArc {
    /// Tail node
    pub from: NodeId,
    /// Head node
    pub to: NodeId,
    /// Constant capacity term
    pub constant: f64,
    /// Per-lambda capacity term
    pub multiplier: f64,
}

impl ParametricArc {
    /// Create a new arc
    pub fn new(from: NodeId, to: NodeId, constant: f64, multiplier: f64) -> Self {
        Self { from, to, constant, multiplier }
    }

    /// Capacity realized at a particular lambda, before any clamping
    pub fn capacity_at(&self, lambda: f64) -> Capacity {
        self.constant + self.multiplier * lambda
    }
}

/// The full parametric cut instance handed to the solver
#[derive(Debug, Clone)]
pub struct ParametricGraph {
    num_nodes: usize,
    source: NodeId,
    sink: NodeId,
    arcs: Vec<ParametricArc>,
    num_discarded: usize,
}

impl ParametricGraph {
    /// Create an empty graph with `num_nodes` nodes and the given terminals
    pub fn new(num_nodes: usize, source: NodeId, sink: NodeId) -> Result<Self> {
        if source >= num_nodes {
            return Err(ParametricCutError::InvalidNode(source, num_nodes.saturating_sub(1)));
        }
        if sink >= num_nodes {
            return Err(ParametricCutError::InvalidNode(sink, num_nodes.saturating_sub(1)));
        }
        if source == sink {
            return Err(ParametricCutError::SameSourceSink(source));
        }
        Ok(Self { num_nodes, source, sink, arcs: Vec::new(), num_discarded: 0 })
    }

    /// Add an arc, validating the affine sign rules.
    ///
    /// Arcs into the source or out of the sink can never cross a minimum
    /// cut in the forward direction; they are dropped with a warning and
    /// `Ok(false)` is returned. Every accepted arc returns `Ok(true)`.
    pub fn add_arc(
        &mut self,
        from: NodeId,
        to: NodeId,
        constant: f64,
        multiplier: f64,
    ) -> Result<bool> {
        if from >= self.num_nodes {
            return Err(ParametricCutError::InvalidNode(from, self.num_nodes - 1));
        }
        if to >= self.num_nodes {
            return Err(ParametricCutError::InvalidNode(to, self.num_nodes - 1));
        }
        if from == to {
            return Err(ParametricCutError::SelfLoop(from));
        }
        if multiplier > 0.0 && from != self.source {
            return Err(ParametricCutError::MultiplierSign { from, to, multiplier });
        }
        if multiplier < 0.0 && to != self.sink {
            return Err(ParametricCutError::MultiplierSign { from, to, multiplier });
        }
        if to == self.source || from == self.sink {
            warn!(from, to, "discarding arc into the source or out of the sink");
            self.num_discarded += 1;
            return Ok(false);
        }
        self.arcs.push(ParametricArc::new(from, to, constant, multiplier));
        Ok(true)
    }

    /// Build a graph from a flat arc matrix with rows
    /// `(from, to, constant, multiplier)`, as used by the array entry point.
    pub fn from_arc_matrix(
        num_nodes: usize,
        num_arcs: usize,
        source: NodeId,
        sink: NodeId,
        arc_matrix: &[f64],
    ) -> Result<Self> {
        if arc_matrix.len() != num_arcs * 4 {
            return Err(ParametricCutError::ArcCountMismatch {
                expected: num_arcs,
                found: arc_matrix.len() / 4,
            });
        }
        let mut graph = Self::new(num_nodes, source, sink)?;
        for row in arc_matrix.chunks_exact(4) {
            let from = row[0] as usize;
            let to = row[1] as usize;
            graph.add_arc(from, to, row[2], row[3])?;
        }
        Ok(graph)
    }

    /// Number of nodes, terminals included
    pub fn num_nodes(&self) -> usize {
        self.num_nodes
    }

    /// Number of accepted arcs
    pub fn num_arcs(&self) -> usize {
        self.arcs.len()
    }

    /// Number of arcs dropped at ingest (into the source / out of the sink)
    pub fn num_discarded(&self) -> usize {
        self.num_discarded
    }

    /// The source node
    pub fn source(&self) -> NodeId {
        self.source
    }

    /// The sink node
    pub fn sink(&self) -> NodeId {
        self.sink
    }

    /// All accepted arcs, in insertion order
    pub fn arcs(&self) -> &[ParametricArc] {
        &self.arcs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_graph() {
        let g = ParametricGraph::new(4, 0, 3).unwrap();
        assert_eq!(g.num_nodes(), 4);
        assert_eq!(g.num_arcs(), 0);
        assert_eq!(g.source(), 0);
        assert_eq!(g.sink(), 3);
    }

    #[test]
    fn test_invalid_terminals() {
        assert!(matches!(
            ParametricGraph::new(4, 5, 3),
            Err(ParametricCutError::InvalidNode(5, 3))
        ));
        assert!(matches!(
            ParametricGraph::new(4, 2, 2),
            Err(ParametricCutError::SameSourceSink(2))
        ));
    }

    #[test]
    fn test_add_arc() {
        let mut g = ParametricGraph::new(4, 0, 3).unwrap();
        assert!(g.add_arc(0, 1, 1.0, 2.0).unwrap());
        assert!(g.add_arc(1, 3, 5.0, -1.0).unwrap());
        assert!(g.add_arc(1, 2, 3.0, 0.0).unwrap());
        assert_eq!(g.num_arcs(), 3);

        let arc = g.arcs()[0];
        assert_eq!(arc.capacity_at(0.0), 1.0);
        assert_eq!(arc.capacity_at(2.0), 5.0);
    }

    #[test]
    fn test_self_loop_rejected() {
        let mut g = ParametricGraph::new(4, 0, 3).unwrap();
        assert!(matches!(g.add_arc(1, 1, 1.0, 0.0), Err(ParametricCutError::SelfLoop(1))));
    }

    #[test]
    fn test_multiplier_sign_rules() {
        let mut g = ParametricGraph::new(4, 0, 3).unwrap();
        // positive multiplier off the source
        assert!(matches!(
            g.add_arc(1, 2, 1.0, 0.5),
            Err(ParametricCutError::MultiplierSign { from: 1, to: 2, .. })
        ));
        // negative multiplier not into the sink
        assert!(matches!(
            g.add_arc(1, 2, 1.0, -0.5),
            Err(ParametricCutError::MultiplierSign { from: 1, to: 2, .. })
        ));
        // source adjacent positive and sink adjacent negative are fine
        assert!(g.add_arc(0, 1, 1.0, 0.5).unwrap());
        assert!(g.add_arc(2, 3, 1.0, -0.5).unwrap());
    }

    #[test]
    fn test_discarded_arcs() {
        let mut g = ParametricGraph::new(4, 0, 3).unwrap();
        assert!(!g.add_arc(1, 0, 2.0, 0.0).unwrap()); // into the source
        assert!(!g.add_arc(3, 1, 2.0, 0.0).unwrap()); // out of the sink
        assert_eq!(g.num_arcs(), 0);
        assert_eq!(g.num_discarded(), 2);
    }

    #[test]
    fn test_from_arc_matrix() {
        #[rustfmt::skip]
        let matrix = [
            0.0, 1.0, 0.0, 1.0,
            0.0, 2.0, 0.0, 2.0,
            1.0, 3.0, 5.0, 0.0,
            2.0, 3.0, 3.0, 0.0,
        ];
        let g = ParametricGraph::from_arc_matrix(4, 4, 0, 3, &matrix).unwrap();
        assert_eq!(g.num_arcs(), 4);
        assert_eq!(g.arcs()[3].constant, 3.0);
    }

    #[test]
    fn test_from_arc_matrix_wrong_length() {
        let matrix = [0.0, 1.0, 1.0];
        assert!(matches!(
            ParametricGraph::from_arc_matrix(2, 1, 0, 1, &matrix),
            Err(ParametricCutError::ArcCountMismatch { expected: 1, found: 0 })
        ));
    }
}
