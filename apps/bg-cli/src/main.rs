use bg_core::{BgError, BgResult, NodeId};
use bg_graph::{AnalysisOptions, BondGraph, CausalityReport, GraphView};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

mod dot;
mod models;

#[derive(Parser)]
#[command(name = "bg-cli")]
#[command(about = "Bond-graph causality analysis and equation generation", long_about = None)]
struct Cli {
    /// Log causality decisions (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in models
    Models,
    /// Assign causality to a model and print its equations
    Analyze {
        /// Model name (see `models`)
        model: String,
        /// Print a JSON document instead of text
        #[arg(long, conflicts_with = "dot")]
        json: bool,
        /// Print a Graphviz diagram instead of text
        #[arg(long)]
        dot: bool,
        /// Fail if a storage element ends up in derivative causality
        #[arg(long)]
        reject_derivative: bool,
        /// Fail if some bond causality has to be chosen arbitrarily
        #[arg(long)]
        reject_algebraic_loops: bool,
    },
}

#[derive(Serialize)]
struct AnalysisOutput<'a> {
    model: &'a str,
    graph: GraphView,
    inputs: Vec<String>,
    equations: Vec<String>,
    junction_equations: Vec<String>,
    state_equations: Vec<String>,
    derivative_causality: Vec<String>,
    arbitrary_bonds: Vec<u32>,
}

fn main() -> BgResult<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Models => cmd_models(),
        Commands::Analyze {
            model,
            json,
            dot,
            reject_derivative,
            reject_algebraic_loops,
        } => {
            let opts = AnalysisOptions {
                reject_derivative_causality: reject_derivative,
                reject_algebraic_loops,
            };
            cmd_analyze(&model, &opts, json, dot)
        }
    }
}

fn cmd_models() -> BgResult<()> {
    println!("Built-in models:");
    for model in models::MODELS {
        println!("  {:<8} {}", model.name, model.description);
    }
    Ok(())
}

fn cmd_analyze(name: &str, opts: &AnalysisOptions, json: bool, dot: bool) -> BgResult<()> {
    let model = models::find(name).ok_or_else(|| BgError::InvalidArg {
        what: format!("unknown model '{name}' (try `bg-cli models`)"),
    })?;
    tracing::info!(model = model.name, "building model");
    let mut graph = model.build()?;
    let report = graph.assign_causalities_with(opts)?;

    if dot {
        print!("{}", dot::render(&graph.view()));
        return Ok(());
    }
    if json {
        let output = analysis_output(name, &graph, &report)?;
        let text = serde_json::to_string_pretty(&output).map_err(|e| BgError::Invariant {
            what: format!("JSON encoding failed: {e}"),
        })?;
        println!("{text}");
        return Ok(());
    }

    print_causality(&graph, &report);
    println!();
    print!("{}", graph.equations()?);
    println!();
    println!("state equations:");
    for eq in &graph.state_equations()?.equations {
        println!("  {eq}");
    }
    Ok(())
}

fn analysis_output<'a>(
    name: &'a str,
    graph: &BondGraph,
    report: &CausalityReport,
) -> BgResult<AnalysisOutput<'a>> {
    let system = graph.equations()?;
    let model = graph.state_equations()?;
    let strings = |eqs: &[bg_symbolic::Equation]| -> Vec<String> {
        eqs.iter().map(ToString::to_string).collect()
    };
    Ok(AnalysisOutput {
        model: name,
        graph: graph.view(),
        inputs: strings(&system.inputs),
        equations: strings(&system.equations),
        junction_equations: strings(&system.junction_equations),
        state_equations: model.equations.iter().map(ToString::to_string).collect(),
        derivative_causality: report
            .derivative
            .iter()
            .filter_map(|&n| graph.node(n).map(|node| node.name.clone()))
            .collect(),
        arbitrary_bonds: report.arbitrary.iter().map(|b| b.index() + 1).collect(),
    })
}

fn print_causality(graph: &BondGraph, report: &CausalityReport) {
    println!("{:<6} {:<14} {:<14} effort in at", "bond", "from", "to");
    for bond in graph.bonds() {
        let label = |id: NodeId| graph.node(id).map_or_else(String::new, |n| n.visualization_label());
        let stroke = bond.causal_stroke().map_or_else(|| "-".to_string(), label);
        println!(
            "{:<6} {:<14} {:<14} {}",
            bond.number(),
            label(bond.from),
            label(bond.to),
            stroke
        );
    }
    if !report.derivative.is_empty() {
        println!("derivative causality:");
        for &node in &report.derivative {
            println!("  {}", graph.node(node).map_or("?", |n| n.name.as_str()));
        }
    }
    if !report.arbitrary.is_empty() {
        let bonds: Vec<String> = report
            .arbitrary
            .iter()
            .map(|b| (b.index() + 1).to_string())
            .collect();
        println!("arbitrary causality on bonds: {}", bonds.join(", "));
    }
}
