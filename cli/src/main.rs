//! VPI bridge replay CLI.
//!
//! Replays host event scenarios against the lifecycle bridge without a
//! simulator, to check how a backend configuration behaves.
//!
//! # Quick Start
//!
//! ```bash
//! # Replay a scenario
//! vpi-bridge replay scenario.json
//!
//! # Same scenario as Questa would run it
//! vpi-bridge replay scenario.json --backend vsim --finish-refires-end
//!
//! # List backends
//! vpi-bridge backends
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vpi_bridge_core_rs::model::ModelCall;
use vpi_bridge_core_rs::{Backend, BridgeEvent, HostScript, SimulatedHost};

/// Replay simulator lifecycle scenarios against the VPI bridge.
#[derive(Parser)]
#[command(name = "vpi-bridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON scenario file.
    Replay {
        /// Path to the scenario file.
        path: PathBuf,

        /// Override the scenario's backend.
        #[arg(short, long)]
        backend: Option<Backend>,

        /// Make finish directives re-fire the end-of-simulation event.
        #[arg(long)]
        finish_refires_end: bool,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List known backends and whether they get a finish directive.
    Backends,
}

/// Replay result as printed with `--json`
#[derive(Debug, Serialize)]
struct ReplaySummary {
    backend: Backend,
    calls: Vec<ModelCall>,
    allocations: usize,
    releases: usize,
    finish_directives: usize,
    delivered_events: usize,
    rejected_starts: usize,
    aborted: Option<String>,
    termination_loop: bool,
    runs: usize,
    redundant_ends: usize,
    events: Vec<BridgeEvent>,
}

impl ReplaySummary {
    fn succeeded(&self) -> bool {
        self.aborted.is_none() && !self.termination_loop
    }
}

fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            path,
            backend,
            finish_refires_end,
            json,
        } => {
            let mut script = HostScript::from_json_file(&path)
                .with_context(|| format!("failed to load scenario {}", path.display()))?;
            if let Some(backend) = backend {
                script.config.backend = backend;
            }
            script.finish_refires_end |= finish_refires_end;
            // Only the JSON output prints the event log
            script.record_task_events &= json;

            let summary = replay(&script);
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }

            Ok(if summary.succeeded() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Backends => {
            for backend in Backend::ALL {
                let directive = if backend.finish_directive_is_reentrant_safe() {
                    "issued"
                } else {
                    "omitted"
                };
                println!("{:<10} finish directive {}", backend.name(), directive);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn replay(script: &HostScript) -> ReplaySummary {
    tracing::info!(backend = %script.config.backend, steps = script.steps.len(), "replaying scenario");

    let (mut host, trace) = SimulatedHost::for_script(script);
    let report = host.run(&script.steps);
    let log = host.driver().event_log();

    ReplaySummary {
        backend: script.config.backend,
        calls: trace.calls(),
        allocations: trace.allocations(),
        releases: trace.releases(),
        finish_directives: report.finish_directives,
        delivered_events: report.delivered_events,
        rejected_starts: report.rejected_starts,
        aborted: report.aborted.map(|e| e.to_string()),
        termination_loop: report.termination_loop,
        runs: log.run_ids().len(),
        redundant_ends: log.redundant_ends(),
        events: log.events().to_vec(),
    }
}

fn print_summary(summary: &ReplaySummary) {
    println!("backend:           {}", summary.backend);
    let calls: Vec<String> = summary.calls.iter().map(|c| c.to_string()).collect();
    println!("model calls:       [{}]", calls.join(", "));
    println!("allocations:       {}", summary.allocations);
    println!("releases:          {}", summary.releases);
    println!("finish directives: {}", summary.finish_directives);
    println!("lifecycle events:  {}", summary.delivered_events);
    println!("runs:              {}", summary.runs);
    if summary.redundant_ends > 0 {
        println!("ignored ends:      {}", summary.redundant_ends);
    }
    if summary.rejected_starts > 0 {
        println!("rejected starts:   {}", summary.rejected_starts);
    }
    if summary.termination_loop {
        println!("result:            termination loop");
    } else if let Some(reason) = &summary.aborted {
        println!("result:            aborted ({})", reason);
    } else {
        println!("result:            ok");
    }
}
