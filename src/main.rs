//! u-assign CLI.
//!
//! Solves task assignment sessions and package requests, generates demo
//! sessions, and hosts the isolated solve worker.

use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use u_assign::assign::ScoreBreakdown;
use u_assign::cp::{SearchControl, SolverConfig};
use u_assign::generator::{SessionGenerator, SessionGeneratorConfig};
use u_assign::kpi::AssignmentKpi;
use u_assign::models::Session;
use u_assign::packages::{solve_packages, PackageRegistry};
use u_assign::runner::{run_worker, RunnerConfig, SolveOutcome, SolveRunner, WorkerCommand};
use u_assign::search::solve_session;

#[derive(Parser)]
#[command(name = "u-assign")]
#[command(about = "Assign tasks to agents with constraint optimization")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Search workers requested from the solver
    #[arg(long, global = true, default_value_t = u_assign::cp::DEFAULT_NUM_WORKERS)]
    workers: usize,

    /// Search time limit in seconds
    #[arg(long, global = true)]
    time_limit: Option<f64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a request read from stdin, streaming JSON lines to stdout.
    Worker,

    /// Solve a session file.
    Solve {
        /// Session JSON file
        session: PathBuf,
        /// Run the search in a separate, killable worker process
        #[arg(long)]
        isolated: bool,
        /// Cancel the isolated worker after this many seconds, keeping the
        /// best solution received so far
        #[arg(long, requires = "isolated")]
        cancel_after: Option<f64>,
        /// Write the session, with its new solution, to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Resolve package versions for a request.
    Packages {
        /// Registry JSON file
        registry: PathBuf,
        /// Requested package names
        #[arg(required = true)]
        request: Vec<String>,
    },

    /// Generate a random session.
    Generate {
        /// Session size
        #[arg(short, long, value_enum, default_value = "default")]
        size: Size,
        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Size {
    Small,
    Default,
    Large,
}

fn solver_config(cli: &Cli) -> SolverConfig {
    let config = SolverConfig::default()
        .with_num_workers(cli.workers)
        .with_log_search_progress(cli.verbose);
    match cli.time_limit {
        Some(seconds) if seconds.is_finite() && seconds > 0.0 => config.with_max_time(Duration::from_secs_f64(seconds)),
        _ => config,
    }
}

fn load_session(path: &Path) -> Result<Session> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Session::from_json(&json)?)
}

fn print_report(session: &Session, breakdown: &ScoreBreakdown) {
    println!("Assignments:");
    for assignment in &session.solution {
        println!("  {} -> {}", assignment.task, assignment.agent);
    }

    let kpi = AssignmentKpi::calculate(session, &session.solution);
    println!("\nTotal hours by agent:");
    for load in &kpi.loads {
        println!(
            "  {:<16} {:>6.2} h  {:>3} tasks",
            load.agent,
            load.units as f64 / 60.0,
            load.tasks
        );
    }
    println!(
        "  mean {:.2} h, std dev {:.2} h",
        kpi.units.mean / 60.0,
        kpi.units.std_dev / 60.0
    );

    println!("\nScore: {}", breakdown.total());
    println!("  Opportunities taken:");
    for score in breakdown.taken() {
        println!("    {:<48} {:>8}", score.name, score.value);
    }
    println!("  Opportunities missed:");
    for score in breakdown.missed() {
        println!("    {:<48} {:>8}", score.name, score.value);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; the worker's stdout carries protocol messages.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config = solver_config(&cli);
    match cli.command {
        Commands::Worker => {
            run_worker(io::stdin().lock(), io::stdout().lock())?;
        }

        Commands::Solve {
            session,
            isolated,
            cancel_after,
            output,
        } => {
            let mut session = load_session(&session)?;
            let breakdown = if isolated {
                let runner = SolveRunner::new(
                    WorkerCommand::current_exe()?,
                    RunnerConfig::default().with_solver(config),
                );
                let handle = runner.start(&session)?;
                if let Some(seconds) = cancel_after.filter(|s| s.is_finite() && *s >= 0.0) {
                    let cancel = handle.cancel_handle();
                    let delay = Duration::from_secs_f64(seconds);
                    thread::spawn(move || {
                        thread::sleep(delay);
                        if let Err(e) = cancel.cancel() {
                            warn!(error = %e, "failed to cancel worker");
                        }
                    });
                }
                let mut last = None;
                let outcome = handle.run(|event| {
                    info!(index = event.index, objective = event.objective, "solution received");
                    last = Some(event);
                })?;
                match outcome {
                    SolveOutcome::Completed { status, .. } => {
                        info!(%status, "isolated solve completed");
                    }
                    SolveOutcome::Cancelled { solutions } => {
                        info!(solutions, "isolated solve cancelled");
                    }
                }
                let event = last.context("Worker finished without a solution")?;
                session.set_solution(event.solution);
                ScoreBreakdown::new(event.scores)
            } else {
                let report = solve_session(&session, config, |event| {
                    info!(index = event.index, objective = event.objective, "solution found");
                    SearchControl::Continue
                })?;
                info!(status = %report.status, objective = report.objective, "solve completed");
                session.set_solution(report.solution);
                ScoreBreakdown::new(report.scores)
            };

            print_report(&session, &breakdown);
            if let Some(path) = output {
                std::fs::write(&path, session.to_json()?)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                info!(path = %path.display(), "session saved");
            }
        }

        Commands::Packages { registry, request } => {
            let json = std::fs::read_to_string(&registry)
                .with_context(|| format!("Failed to read {}", registry.display()))?;
            let registry = PackageRegistry::from_json(&json)?;
            let report = solve_packages(&registry, request, config, |_| SearchControl::Continue)?;
            for version in &report.solution {
                println!("{version}");
            }
        }

        Commands::Generate { size, seed } => {
            let generator_config = match size {
                Size::Small => SessionGeneratorConfig::small(),
                Size::Default => SessionGeneratorConfig::default(),
                Size::Large => SessionGeneratorConfig::large(),
            };
            let session = SessionGenerator::new(generator_config, seed).generate();
            println!("{}", session.to_json()?);
        }
    }

    Ok(())
}
