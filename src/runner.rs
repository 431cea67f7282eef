//! Cancellable out-of-process solving.
//!
//! A solve runs in a separate worker process so it can be killed at any
//! time, whatever the solver is doing. The worker reads one
//! [`WorkerRequest`] (JSON) on stdin and writes one [`WorkerMessage`] per
//! line on stdout: a `solution` for every improving solution, then a
//! final `finished` or `failed`.
//!
//! On the caller side, a reader thread forwards parsed messages into an
//! unbounded FIFO channel, and [`SolveHandle::run`] polls that channel at
//! a fixed interval, relaying events in arrival order.
//!
//! ```text
//! caller ──JSON──▶ worker stdin
//! worker stdout ──lines──▶ reader thread ──mpsc──▶ poll loop ──▶ on_solution
//! CancelHandle::cancel ──kill──▶ worker
//! ```

use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::cp::{SearchControl, SolveStatus, SolverConfig};
use crate::error::{Error, Result};
use crate::models::{Assignment, Session};
use crate::search::{solve_session, SolutionEvent};
use crate::validation::validate_session;

/// Default delay between two channel drains.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Solve request sent to a worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerRequest {
    /// Session snapshot.
    pub session: Session,
    /// Solver parameters.
    pub config: SolverConfig,
}

/// One line of worker output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// An improving solution.
    Solution(SolutionEvent<Vec<Assignment>>),
    /// The search ended with a solution.
    Finished { status: SolveStatus, objective: i64 },
    /// The search ended without a solution.
    Failed {
        status: Option<SolveStatus>,
        message: String,
    },
}

fn send<W: Write>(output: &mut W, message: &WorkerMessage) -> Result<()> {
    serde_json::to_writer(&mut *output, message)?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}

/// Worker entry point: reads a request, solves, streams messages.
///
/// Errors from the solve itself are reported as a `failed` message;
/// only I/O and protocol errors are returned.
pub fn run_worker<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let mut buffer = String::new();
    input.read_to_string(&mut buffer)?;
    let request: WorkerRequest = serde_json::from_str(&buffer)?;
    tracing::info!(
        agents = request.session.agents.len(),
        tasks = request.session.tasks.len(),
        "worker started"
    );

    let mut write_error = None;
    let result = solve_session(&request.session, request.config, |event| {
        match send(&mut output, &WorkerMessage::Solution(event)) {
            Ok(()) => SearchControl::Continue,
            Err(e) => {
                write_error = Some(e);
                SearchControl::Stop
            }
        }
    });
    if let Some(e) = write_error {
        return Err(e);
    }

    let last = match result {
        Ok(report) => WorkerMessage::Finished {
            status: report.status,
            objective: report.objective,
        },
        Err(Error::NoSolution { status }) => WorkerMessage::Failed {
            status: Some(status),
            message: Error::NoSolution { status }.to_string(),
        },
        Err(e) => WorkerMessage::Failed {
            status: None,
            message: e.to_string(),
        },
    };
    send(&mut output, &last)
}

/// How to launch a worker process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerCommand {
    program: PathBuf,
    args: Vec<String>,
}

impl WorkerCommand {
    /// A worker launched as `program` with no arguments.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Appends an argument.
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// The running executable's `worker` subcommand.
    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(std::env::current_exe()?).with_arg("worker"))
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

/// Runner parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    /// Delay between two channel drains.
    pub poll_interval: Duration,
    /// Parameters forwarded to the worker's solver.
    pub solver: SolverConfig,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            solver: SolverConfig::default(),
        }
    }
}

impl RunnerConfig {
    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the solver parameters.
    pub fn with_solver(mut self, solver: SolverConfig) -> Self {
        self.solver = solver;
        self
    }
}

/// How a run ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveOutcome {
    /// The worker finished its search.
    Completed {
        status: SolveStatus,
        objective: i64,
        solutions: usize,
    },
    /// The run was cancelled; delivered solutions remain valid.
    Cancelled { solutions: usize },
}

/// Launches solves in worker processes.
#[derive(Debug, Clone)]
pub struct SolveRunner {
    command: WorkerCommand,
    config: RunnerConfig,
}

impl SolveRunner {
    /// Creates a runner.
    pub fn new(command: WorkerCommand, config: RunnerConfig) -> Self {
        Self { command, config }
    }

    /// Runner parameters.
    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    /// Snapshots the session and starts a worker on it.
    ///
    /// # Errors
    /// - [`Error::InvalidSession`] if the session fails validation.
    /// - [`Error::Io`] if the worker cannot be spawned.
    pub fn start(&self, session: &Session) -> Result<SolveHandle> {
        validate_session(session).map_err(Error::InvalidSession)?;
        let request = serde_json::to_vec(&WorkerRequest {
            session: session.clone(),
            config: self.config.solver.clone(),
        })?;

        let mut child = self
            .command
            .command()
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()?;
        tracing::info!(pid = child.id(), program = %self.command.program.display(), "worker spawned");

        if let Some(mut stdin) = child.stdin.take() {
            // A worker that dies before reading is reported by the poll loop.
            if let Err(e) = stdin.write_all(&request) {
                if e.kind() != io::ErrorKind::BrokenPipe {
                    return Err(e.into());
                }
            }
        }

        let (sender, receiver) = mpsc::channel();
        let reader = child.stdout.take().map(|stdout| {
            thread::spawn(move || {
                for line in BufReader::new(stdout).lines() {
                    let Ok(line) = line else { break };
                    if line.trim().is_empty() {
                        continue;
                    }
                    match serde_json::from_str::<WorkerMessage>(&line) {
                        Ok(message) => {
                            if sender.send(message).is_err() {
                                break;
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "malformed worker message"),
                    }
                }
            })
        });

        Ok(SolveHandle {
            child: Arc::new(Mutex::new(child)),
            cancelled: Arc::new(AtomicBool::new(false)),
            receiver,
            reader,
            poll_interval: self.config.poll_interval,
        })
    }
}

fn lock(child: &Mutex<Child>) -> MutexGuard<'_, Child> {
    child.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Kills a running solve from any thread.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
}

impl CancelHandle {
    /// Kills the worker, then marks the run as cancelled.
    ///
    /// Solutions already buffered are still delivered by the poll loop.
    pub fn cancel(&self) -> Result<()> {
        {
            let mut child = lock(&self.child);
            match child.kill() {
                Ok(()) => tracing::info!(pid = child.id(), "worker killed"),
                // Already reaped.
                Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
                Err(e) => return Err(e.into()),
            }
        }
        self.cancelled.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Whether [`cancel`](Self::cancel) has completed.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// A running solve.
pub struct SolveHandle {
    child: Arc<Mutex<Child>>,
    cancelled: Arc<AtomicBool>,
    receiver: Receiver<WorkerMessage>,
    reader: Option<JoinHandle<()>>,
    poll_interval: Duration,
}

impl SolveHandle {
    /// A handle that can cancel this solve, e.g. from another thread or
    /// from inside the event callback.
    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle {
            child: Arc::clone(&self.child),
            cancelled: Arc::clone(&self.cancelled),
        }
    }

    /// Worker process ID.
    pub fn id(&self) -> u32 {
        lock(&self.child).id()
    }

    /// Relays events until the worker ends or the run is cancelled.
    ///
    /// Each poll reads the cancel flag, drains every buffered message in
    /// order, then either stops (cancelled, or the worker closed its
    /// output) or sleeps for the poll interval.
    ///
    /// # Errors
    /// - [`Error::NoSolution`] if the worker's search found no solution.
    /// - [`Error::Worker`] if the worker reported another failure.
    /// - [`Error::Incomplete`] if the worker exited without a final message.
    pub fn run<F>(mut self, mut on_solution: F) -> Result<SolveOutcome>
    where
        F: FnMut(SolutionEvent<Vec<Assignment>>),
    {
        let mut solutions = 0;
        let mut last = None;
        let cancelled = loop {
            let cancelled = self.cancelled.load(Ordering::SeqCst);
            let mut disconnected = false;
            loop {
                match self.receiver.try_recv() {
                    Ok(WorkerMessage::Solution(event)) => {
                        solutions += 1;
                        on_solution(event);
                    }
                    Ok(message) => last = Some(message),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }
            if cancelled {
                break true;
            }
            if disconnected {
                break false;
            }
            thread::sleep(self.poll_interval);
        };

        let exit_code = self.reap(cancelled)?;
        if cancelled {
            tracing::info!(solutions, "solve cancelled");
            return Ok(SolveOutcome::Cancelled { solutions });
        }
        match last {
            Some(WorkerMessage::Finished { status, objective }) => {
                tracing::info!(%status, objective, solutions, "solve completed");
                Ok(SolveOutcome::Completed {
                    status,
                    objective,
                    solutions,
                })
            }
            Some(WorkerMessage::Failed {
                status: Some(status),
                ..
            }) => Err(Error::NoSolution { status }),
            Some(WorkerMessage::Failed { message, .. }) => Err(Error::Worker(message)),
            _ => {
                tracing::warn!(?exit_code, "worker exited without a final status");
                Err(Error::Incomplete { exit_code })
            }
        }
    }

    /// Waits for the worker to exit without holding the lock, so that a
    /// concurrent cancel can still kill it.
    ///
    /// After a cancel the reader thread is detached instead of joined:
    /// a grandchild that inherited the worker's stdout keeps the pipe
    /// open, and the reader only sees EOF once every holder has exited.
    fn reap(&mut self, cancelled: bool) -> Result<Option<i32>> {
        let status = loop {
            if let Some(status) = lock(&self.child).try_wait()? {
                break status;
            }
            thread::sleep(self.poll_interval.min(Duration::from_millis(10)));
        };
        if let Some(reader) = self.reader.take() {
            if cancelled && !reader.is_finished() {
                tracing::debug!("detaching worker reader");
            } else if reader.join().is_err() {
                tracing::warn!("worker reader thread panicked");
            }
        }
        tracing::debug!(?status, "worker exited");
        Ok(status.code())
    }
}

impl Drop for SolveHandle {
    fn drop(&mut self) {
        let mut child = lock(&self.child);
        if let Ok(None) = child.try_wait() {
            tracing::debug!(pid = child.id(), "killing abandoned worker");
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}
