//! Text input and output
//!
//! The input is a DIMACS-like format:
//!
//! ```text
//! c <free-form comment>
//! p <num nodes> <num arcs> <lambda low> <lambda high> <round negative: 0|1>
//! n <node> s
//! n <node> t
//! a <from> <to> <constant> <multiplier>
//! ```
//!
//! The problem line comes first and both terminal lines must precede every
//! arc line. Arcs into the source or out of the sink are dropped with a
//! warning but still count against the declared arc total.
//!
//! The output lists the phase timings, the work counters, the breakpoint
//! count, the ascending lambda values and one indicator row per node:
//!
//! ```text
//! t <read> <init> <solve>
//! s <arc scans> <mergers> <pushes> <relabels> <gaps>
//! p <k>
//! l <lambda 1> ... <lambda k>
//! n <node> <indicator 1> ... <indicator k>
//! ```

use std::fmt::Write as _;
use std::str::FromStr;

use crate::error::{ParametricCutError, Result};
use crate::graph::ParametricGraph;
use crate::solver::{ParametricCutSolution, SolveOptions};

fn parse_field<T: FromStr>(token: Option<&str>, line: usize, what: &str) -> Result<T> {
    token
        .ok_or_else(|| ParametricCutError::Parse {
            line,
            message: format!("missing {what}"),
        })?
        .parse()
        .map_err(|_| ParametricCutError::Parse { line, message: format!("invalid {what}") })
}

/// Parse a DIMACS-like problem description into a graph and solve options
pub fn parse_dimacs(input: &str) -> Result<(ParametricGraph, SolveOptions)> {
    let mut declared: Option<(usize, usize, f64, f64, bool)> = None;
    let mut source: Option<usize> = None;
    let mut sink: Option<usize> = None;
    let mut graph: Option<ParametricGraph> = None;
    let mut arc_lines = 0usize;

    for (index, raw_line) in input.lines().enumerate() {
        let line = index + 1;
        let text = raw_line.trim();
        if text.is_empty() {
            continue;
        }
        let mut tokens = text.split_whitespace();
        match tokens.next() {
            Some("c") => {}
            Some("p") => {
                if declared.is_some() {
                    return Err(ParametricCutError::Parse {
                        line,
                        message: "duplicate problem line".into(),
                    });
                }
                let num_nodes: usize = parse_field(tokens.next(), line, "node count")?;
                let num_arcs: usize = parse_field(tokens.next(), line, "arc count")?;
                let lambda_low: f64 = parse_field(tokens.next(), line, "lambda lower bound")?;
                let lambda_high: f64 = parse_field(tokens.next(), line, "lambda upper bound")?;
                let round: u8 = parse_field(tokens.next(), line, "round-negative flag")?;
                if round > 1 {
                    return Err(ParametricCutError::Parse {
                        line,
                        message: "round-negative flag must be 0 or 1".into(),
                    });
                }
                if lambda_low > lambda_high {
                    return Err(ParametricCutError::InvalidLambdaRange(lambda_low, lambda_high));
                }
                declared = Some((num_nodes, num_arcs, lambda_low, lambda_high, round == 1));
            }
            Some("n") => {
                let (num_nodes, ..) = declared.ok_or_else(|| ParametricCutError::Parse {
                    line,
                    message: "node line before the problem line".into(),
                })?;
                let node: usize = parse_field(tokens.next(), line, "node id")?;
                let kind: String = parse_field(tokens.next(), line, "node kind")?;
                if node >= num_nodes {
                    return Err(ParametricCutError::InvalidNode(node, num_nodes - 1));
                }
                match kind.as_str() {
                    "s" => {
                        if source.is_some() {
                            return Err(ParametricCutError::DuplicateTerminal("Source"));
                        }
                        source = Some(node);
                    }
                    "t" => {
                        if sink.is_some() {
                            return Err(ParametricCutError::DuplicateTerminal("Sink"));
                        }
                        sink = Some(node);
                    }
                    other => {
                        return Err(ParametricCutError::Parse {
                            line,
                            message: format!("unknown node kind `{other}`"),
                        });
                    }
                }
                if let (Some(s), Some(t)) = (source, sink) {
                    graph = Some(ParametricGraph::new(num_nodes, s, t)?);
                }
            }
            Some("a") => {
                let graph = graph.as_mut().ok_or_else(|| ParametricCutError::Parse {
                    line,
                    message: "arc line before source and sink assignment".into(),
                })?;
                let from: usize = parse_field(tokens.next(), line, "arc tail")?;
                let to: usize = parse_field(tokens.next(), line, "arc head")?;
                let constant: f64 = parse_field(tokens.next(), line, "arc constant")?;
                let multiplier: f64 = parse_field(tokens.next(), line, "arc multiplier")?;
                graph.add_arc(from, to, constant, multiplier)?;
                arc_lines += 1;
            }
            Some(tag) => {
                return Err(ParametricCutError::Parse {
                    line,
                    message: format!("unknown line tag `{tag}`"),
                });
            }
            None => {}
        }
    }

    let (num_nodes, num_arcs, lambda_low, lambda_high, round_negative) =
        declared.ok_or_else(|| ParametricCutError::Parse {
            line: 0,
            message: "missing problem line".into(),
        })?;
    let source = source.ok_or(ParametricCutError::TerminalUnassigned("Source"))?;
    let sink = sink.ok_or(ParametricCutError::TerminalUnassigned("Sink"))?;
    let graph = match graph {
        Some(g) => g,
        None => ParametricGraph::new(num_nodes, source, sink)?,
    };
    if arc_lines != num_arcs {
        return Err(ParametricCutError::ArcCountMismatch {
            expected: num_arcs,
            found: arc_lines,
        });
    }

    let options =
        SolveOptions::with_range(lambda_low, lambda_high).round_negative(round_negative);
    Ok((graph, options))
}

/// Format `value` with the given number of significant digits in plain
/// decimal notation.
fn format_significant(value: f64, digits: usize) -> String {
    if value == 0.0 || !value.is_finite() {
        return format!("{:.*}", digits.saturating_sub(1), value);
    }
    let magnitude = value.abs().log10().floor() as i64;
    let decimals = (digits as i64 - 1 - magnitude).max(0) as usize;
    format!("{value:.decimals$}")
}

/// Render a solution in the line-oriented output format.
///
/// Lambda values carry 12 significant digits; timings are printed with
/// millisecond precision.
pub fn format_solution(solution: &ParametricCutSolution) -> String {
    let mut out = String::new();

    let timings = solution.timings().as_array();
    let _ = writeln!(out, "t {:.3} {:.3} {:.3}", timings[0], timings[1], timings[2]);

    let stats = solution.stats().as_array();
    let _ = writeln!(
        out,
        "s {} {} {} {} {}",
        stats[0], stats[1], stats[2], stats[3], stats[4]
    );

    let _ = writeln!(out, "p {}", solution.num_breakpoints());

    let lambdas: Vec<String> =
        solution.lambdas().iter().map(|&l| format_significant(l, 12)).collect();
    let _ = writeln!(out, "l {}", lambdas.join(" "));

    for node in 0..solution.num_nodes() {
        let indicators: Vec<String> = (0..solution.num_breakpoints())
            .map(|j| solution.indicator(node, j).to_string())
            .collect();
        let _ = writeln!(out, "n {} {}", node, indicators.join(" "));
    }

    out
}

/// Write a solution to any writer in the line-oriented output format
pub fn write_solution<W: std::io::Write>(
    writer: &mut W,
    solution: &ParametricCutSolution,
) -> Result<()> {
    writer.write_all(format_solution(solution).as_bytes())?;
    Ok(())
}
