use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};

use snapgraph::config::Config;
use snapgraph::core::{dispatch_order, Executor, TaskGraph};
use snapgraph::graph::dump::describe;
use snapgraph::graph::{parse_file, ParseOptions};
use snapgraph::patch::patch_from_args;
use snapgraph::{glog, glog_error, glog_warn, DryRunService, Error, Result, TaskRecords};

/// snapgraph - run processing graph descriptions task by task
#[derive(Parser, Debug)]
#[command(name = "snapgraph")]
#[command(version, about, long_about = None)]
#[command(after_help = "ENVIRONMENT:\n    SNAPGRAPH_DEBUG=1     Enable debug logging (alternative to --debug)")]
pub struct Cli {
    /// Enable debug logging (writes to ~/.snapgraph/snapgraph.log)
    #[arg(short = 'd', long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Parse, patch and execute a graph
    Run {
        #[command(flatten)]
        graph: GraphArgs,
    },

    /// Parse and patch a graph, then show its tasks and execution order
    Inspect {
        #[command(flatten)]
        graph: GraphArgs,

        /// Print the task records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(clap::Args, Debug, Clone, PartialEq)]
pub struct GraphArgs {
    /// Graph description file
    pub file: PathBuf,

    /// Parameter overrides as TASK PARAMETER VALUE triples. Everything after
    /// the graph file is an override token, so options go before it.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub overrides: Vec<String>,

    /// Task to execute (default: Write1)
    #[arg(short = 't', long)]
    pub target: Option<String>,

    /// Print every parsed task
    #[arg(short = 'p', long)]
    pub print_tasks: bool,

    /// Fail when two nodes share an identity
    #[arg(long)]
    pub strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    snapgraph::log::init_with_debug(cli.debug);
    snapgraph::log::set_console(true);

    let config = match Config::load() {
        Ok(config) => config,
        Err(Error::NoHomeDir) => Config::default(),
        Err(e) => return Err(e),
    };

    let result = match cli.command {
        Command::Run { graph } => run_graph(&graph, &config),
        Command::Inspect { graph, json } => inspect_graph(&graph, &config, json),
    };
    if let Err(e) = &result {
        glog_error!("{}", e);
    }
    result
}

fn load_records(args: &GraphArgs, config: &Config) -> Result<TaskRecords> {
    let options = ParseOptions {
        strict_identities: args.strict || config.strict_identities,
    };
    let mut records = parse_file(&args.file, options)?;

    if args.print_tasks || config.print_tasks {
        print!("{}", describe(&records));
    }

    let mut tokens = vec![path_token(&args.file)];
    tokens.extend(args.overrides.iter().cloned());
    let report = patch_from_args(&mut records, &tokens);
    if !report.is_clean() {
        glog_warn!("{} override(s) could not be applied", report.missed_count());
    }

    Ok(records)
}

fn path_token(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn target<'a>(args: &'a GraphArgs, config: &'a Config) -> &'a str {
    args.target
        .as_deref()
        .unwrap_or_else(|| config.effective_target())
}

fn run_graph(args: &GraphArgs, config: &Config) -> Result<()> {
    let records = load_records(args, config)?;
    let (mut graph, broken) = TaskGraph::materialize(&records);
    if !broken.is_empty() {
        glog_warn!("{} task link(s) could not be resolved", broken.len());
    }

    let mut service = DryRunService::new();
    let summary = Executor::new(&mut service).execute(&mut graph, target(args, config))?;
    glog!(
        "Finished {} task(s), {} left pending",
        summary.dispatched.len(),
        graph.pending_count()
    );
    Ok(())
}

fn inspect_graph(args: &GraphArgs, config: &Config, json: bool) -> Result<()> {
    let records = load_records(args, config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if !(args.print_tasks || config.print_tasks) {
        print!("{}", describe(&records));
    }

    let (graph, broken) = TaskGraph::<()>::materialize(&records);
    for edge in &broken {
        println!("Unresolved {} of {}: {}", edge.kind, edge.task, edge.missing);
    }

    let key = target(args, config);
    let index = graph
        .get_node_index(key)
        .ok_or_else(|| Error::TaskNotFound(key.to_string()))?;
    println!("Execution order for {}:", key);
    for (step, next) in dispatch_order(&graph, index)?.into_iter().enumerate() {
        let node = graph.node(next);
        let downstream: Vec<String> = graph
            .next_tasks(next)
            .into_iter()
            .map(|i| graph.node(i).key())
            .collect();
        println!(
            "{:>3}. {} ({}) -> [{}]",
            step + 1,
            node.identity(),
            node.operator,
            downstream.join(", ")
        );
    }
    Ok(())
}
