//! pmincut - parametric minimum cut solver command-line interface

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use parametric_mincut::{format_solution, parse_dimacs, ParametricSolver};

#[derive(Parser)]
#[command(name = "pmincut")]
#[command(about = "Parametric s-t minimum cut solver", long_about = None)]
#[command(version)]
struct Cli {
    /// Input file in the DIMACS-like parametric cut format
    input: PathBuf,

    /// Output file; stdout when omitted
    output: Option<PathBuf>,

    /// Suppress the summary lines on stderr
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let text = fs::read_to_string(&cli.input)
        .with_context(|| format!("cannot read {}", cli.input.display()))?;
    let (graph, options) =
        parse_dimacs(&text).with_context(|| format!("cannot parse {}", cli.input.display()))?;

    if !cli.quiet && graph.num_discarded() > 0 {
        eprintln!(
            "{} {} arc(s) into the source or out of the sink dropped",
            "warning:".yellow().bold(),
            graph.num_discarded()
        );
    }

    let solution = ParametricSolver::new(graph)
        .with_options(options)
        .solve()
        .context("solve failed")?;

    let rendered = format_solution(&solution);
    match &cli.output {
        Some(path) => fs::write(path, &rendered)
            .with_context(|| format!("cannot write {}", path.display()))?,
        None => print!("{rendered}"),
    }

    if !cli.quiet {
        eprintln!(
            "{} {} breakpoint(s) in [{}, {}], solved in {:.3}s",
            "done:".green().bold(),
            solution.num_breakpoints(),
            options.lambda_range[0],
            options.lambda_range[1],
            solution.timings().solve
        );
    }

    Ok(())
}
