//! Error types for the parametric minimum cut solver

use thiserror::Error;

/// Result type for solver operations
pub type Result<T> = std::result::Result<T, ParametricCutError>;

/// Errors that can occur while building or solving a parametric cut instance
#[derive(Error, Debug)]
pub enum ParametricCutError {
    /// Node id outside [0, num_nodes)
    #[error("Invalid node id: {0} (nodes are labeled 0 to {1})")]
    InvalidNode(usize, usize),

    /// Arc with identical endpoints
    #[error("Node {0} has a self loop which is not allowed")]
    SelfLoop(usize),

    /// Positive multiplier on a non-source-adjacent arc, or negative
    /// multiplier on a non-sink-adjacent arc
    #[error(
        "Arc ({from}, {to}) has multiplier {multiplier}: only source adjacent arcs may have a \
         positive multiplier and only sink adjacent arcs a negative one"
    )]
    MultiplierSign {
        /// Tail of the offending arc
        from: usize,
        /// Head of the offending arc
        to: usize,
        /// The offending multiplier
        multiplier: f64,
    },

    /// Source and sink resolve to the same node
    #[error("Source and sink must be distinct nodes (both are {0})")]
    SameSourceSink(usize),

    /// Source or sink never assigned in the input
    #[error("{0} is not assigned")]
    TerminalUnassigned(&'static str),

    /// Source or sink assigned more than once
    #[error("{0} is already defined")]
    DuplicateTerminal(&'static str),

    /// Number of arc lines does not match the problem line
    #[error("Incorrect number of arcs specified: expected {expected}, found {found}")]
    ArcCountMismatch {
        /// Arc count declared on the problem line
        expected: usize,
        /// Arc lines actually seen
        found: usize,
    },

    /// Lower lambda bound exceeds the upper bound
    #[error("Invalid lambda range: [{0}, {1}]")]
    InvalidLambdaRange(f64, f64),

    /// A line of the text input could not be parsed
    #[error("Parse error on line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// Realized capacity is negative beyond tolerance and rounding is off
    #[error(
        "Negative capacity for lambda equal to {lambda}. Enable negative capacity rounding if \
         the value should be clamped to 0"
    )]
    CapacityInfeasible {
        /// Lambda value at which the negative capacity was realized
        lambda: f64,
    },

    /// An internal invariant was violated
    #[error("Internal solver error: {0}")]
    Internal(String),
}

impl From<std::io::Error> for ParametricCutError {
    fn from(err: std::io::Error) -> Self {
        ParametricCutError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for ParametricCutError {
    fn from(err: serde_json::Error) -> Self {
        ParametricCutError::Internal(err.to_string())
    }
}

impl From<String> for ParametricCutError {
    fn from(msg: String) -> Self {
        ParametricCutError::Internal(msg)
    }
}

impl ParametricCutError {
    /// Check if the error was caused by malformed input
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            ParametricCutError::InvalidNode(_, _)
                | ParametricCutError::SelfLoop(_)
                | ParametricCutError::MultiplierSign { .. }
                | ParametricCutError::SameSourceSink(_)
                | ParametricCutError::TerminalUnassigned(_)
                | ParametricCutError::DuplicateTerminal(_)
                | ParametricCutError::ArcCountMismatch { .. }
                | ParametricCutError::InvalidLambdaRange(_, _)
                | ParametricCutError::Parse { .. }
        )
    }

    /// Check if the error indicates an infeasible capacity realization
    pub fn is_infeasible(&self) -> bool {
        matches!(self, ParametricCutError::CapacityInfeasible { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParametricCutError::InvalidNode(12, 10);
        assert_eq!(err.to_string(), "Invalid node id: 12 (nodes are labeled 0 to 10)");

        let err = ParametricCutError::SelfLoop(3);
        assert_eq!(err.to_string(), "Node 3 has a self loop which is not allowed");

        let err = ParametricCutError::TerminalUnassigned("Source");
        assert_eq!(err.to_string(), "Source is not assigned");
    }

    #[test]
    fn test_error_from_string() {
        let err: ParametricCutError = "bucket invariant broken".to_string().into();
        assert!(matches!(err, ParametricCutError::Internal(_)));
    }

    #[test]
    fn test_is_input_error() {
        assert!(ParametricCutError::SelfLoop(0).is_input_error());
        assert!(ParametricCutError::Parse { line: 4, message: "bad".into() }.is_input_error());
        assert!(!ParametricCutError::CapacityInfeasible { lambda: 1.5 }.is_input_error());
        assert!(!ParametricCutError::Internal("x".into()).is_input_error());
    }

    #[test]
    fn test_is_infeasible() {
        assert!(ParametricCutError::CapacityInfeasible { lambda: 0.0 }.is_infeasible());
        assert!(!ParametricCutError::SelfLoop(1).is_infeasible());
    }
}
