//! `scriptgraph` -- dialogue script graph toolchain.
//!
//! Thin adapter around the core engine: reads script YAML or graph JSON
//! from disk, runs the conversion, and writes the result to a file or
//! stdout. Scripts handled here are self-contained, so the conversion runs
//! with an empty name resolver.

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use scriptgraph_core::{graph_to_script, script_to_graph, MapResolver, NodeId, ScriptGraph};
use scriptgraph_interchange as interchange;

/// Dialogue script graph toolchain.
#[derive(Parser)]
#[command(name = "scriptgraph", version, about = "Dialogue script graph toolchain")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a script YAML document to a graph JSON document
    Graph {
        /// Path to the script YAML file
        script: PathBuf,
        /// File to write the graph to (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Regenerate a script YAML document from a graph JSON document
    Script {
        /// Path to the graph JSON file
        graph: PathBuf,
        /// File to write the script to (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Convert a script document and report a summary without writing output
    Check {
        /// Path to the script YAML file
        script: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match &cli.command {
        Commands::Graph { script, output } => run_graph(script, output.as_deref(), cli.quiet),
        Commands::Script { graph, output } => run_script(graph, output.as_deref(), cli.quiet),
        Commands::Check { script } => run_check(script),
    };
    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

fn run_graph(script: &Path, output: Option<&Path>, quiet: bool) -> Result<(), String> {
    let graph = convert(script)?;
    let json = interchange::save_graph(&graph).map_err(|e| e.to_string())?;
    emit(&json, output, quiet)
}

fn run_script(graph: &Path, output: Option<&Path>, quiet: bool) -> Result<(), String> {
    let text = read(graph)?;
    let graph = interchange::load_graph(&text)
        .map_err(|e| format!("{}: {}", graph.display(), e))?;
    let doc = graph_to_script(&graph).map_err(|e| e.to_string())?;
    let yaml = interchange::save_script(&doc).map_err(|e| e.to_string())?;
    emit(&yaml, output, quiet)
}

fn run_check(script: &Path) -> Result<(), String> {
    let graph = convert(script)?;

    let flows: std::collections::BTreeSet<&str> = graph
        .nodes()
        .filter_map(|(id, _)| match id {
            NodeId::Label(label) => Some(label.flow.as_str()),
            _ => None,
        })
        .collect();
    let unresolved = graph
        .edges()
        .filter(|(_, target, _)| **target == NodeId::Unresolved)
        .count();

    println!("flows: {}", flows.len());
    println!("nodes: {}", graph.node_count());
    println!("edges: {}", graph.edge_count());
    println!("unresolved destinations: {}", unresolved);
    Ok(())
}

fn convert(script: &Path) -> Result<ScriptGraph, String> {
    let text = read(script)?;
    let doc = interchange::load_script(&text)
        .map_err(|e| format!("{}: {}", script.display(), e))?;
    script_to_graph(&doc, &MapResolver::new()).map_err(|e| e.to_string())
}

fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {}", path.display(), e))
}

fn emit(text: &str, output: Option<&Path>, quiet: bool) -> Result<(), String> {
    match output {
        Some(path) => {
            fs::write(path, text)
                .map_err(|e| format!("cannot write {}: {}", path.display(), e))?;
            if !quiet {
                println!("wrote {}", path.display());
            }
            Ok(())
        }
        None => {
            println!("{text}");
            Ok(())
        }
    }
}
