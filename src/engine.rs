//! Single-flight execution of the external transcoding engine
//!
//! Owns the one piece of mutable shared state in the pipeline: the phase of
//! the in-flight job. Submissions are checked-and-set under the phase lock,
//! so at most one job is ever `Starting`/`Running` process-wide; a second
//! submission gets [`BurnError::AlreadyRunning`] and the in-flight job is
//! untouched. Jobs run detached on the tokio runtime and report through a
//! caller-supplied [`JobObserver`]: start, zero or more verbatim console
//! lines, then exactly one terminal callback.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use once_cell::sync::OnceCell;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{BurnError, Result};

/// Console lines kept for the failure diagnostic.
const DIAG_TAIL_LINES: usize = 12;

/// Lifecycle callbacks for a transcode job.
///
/// Delivery order for one job is fixed: `on_start`, zero or more
/// `on_progress`, then exactly one of `on_success` / `on_failure`, after
/// which no further callback arrives for that job. Progress lines are the
/// engine's own console output, forwarded unparsed.
pub trait JobObserver: Send + Sync {
    fn on_start(&self);
    fn on_progress(&self, line: &str);
    fn on_success(&self, output: &Path);
    fn on_failure(&self, message: &str);
}

/// Runner state. `Idle` is the only state a new submission is accepted from;
/// terminal outcomes are delivered through the observer and the runner
/// returns to `Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    Idle,
    Starting,
    Running,
}

/// Handle to the external transcoding engine.
pub struct Engine {
    binary: String,
    available: AtomicBool,
    phase: Mutex<JobPhase>,
    cancel: Notify,
}

static ENGINE: OnceCell<Arc<Engine>> = OnceCell::new();

impl Engine {
    /// Create an engine handle for the given binary. The handle starts
    /// unverified; call [`Engine::load`] before submitting.
    #[must_use]
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            available: AtomicBool::new(false),
            phase: Mutex::new(JobPhase::Idle),
            cancel: Notify::new(),
        }
    }

    /// Process-wide engine instance. The binary path is fixed by the first
    /// call; later calls return the same handle.
    pub fn instance(binary: &str) -> Arc<Self> {
        Arc::clone(ENGINE.get_or_init(|| Arc::new(Self::new(binary))))
    }

    /// Verify the engine binary by running `<binary> -version`. Meant to run
    /// once at process start-up; may be re-run after a failure.
    ///
    /// # Errors
    ///
    /// Returns [`BurnError::EngineUnavailable`] if the binary cannot be
    /// spawned or exits non-zero. Until a successful load, all submissions
    /// fail fast with the same kind.
    pub async fn load(&self) -> Result<()> {
        info!("loading transcoding engine: {}", self.binary);
        let result = Command::new(&self.binary)
            .arg("-version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await;

        let outcome = match result {
            Ok(out) if out.status.success() => {
                let banner = String::from_utf8_lossy(&out.stdout);
                let version = banner.lines().next().unwrap_or("unknown version");
                self.available.store(true, Ordering::SeqCst);
                info!("engine ready: {version}");
                Ok(())
            }
            Ok(out) => {
                self.available.store(false, Ordering::SeqCst);
                let msg = format!("{} exited with {}", self.binary, out.status);
                warn!("engine load failed: {msg}");
                Err(BurnError::EngineUnavailable(msg))
            }
            Err(e) => {
                self.available.store(false, Ordering::SeqCst);
                warn!("engine load failed: {e}");
                Err(BurnError::EngineUnavailable(e.to_string()))
            }
        };
        debug!("engine load finished");
        outcome
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        *self.lock_phase() != JobPhase::Idle
    }

    #[must_use]
    pub fn phase(&self) -> JobPhase {
        *self.lock_phase()
    }

    /// Submit a job. Non-blocking: the job runs detached on the tokio
    /// runtime and reports through `observer`.
    ///
    /// # Errors
    ///
    /// [`BurnError::EngineUnavailable`] if [`Engine::load`] has not
    /// succeeded, [`BurnError::AlreadyRunning`] if a job is in flight.
    /// Rejected submissions are not queued; callers retry later.
    pub fn submit(
        self: &Arc<Self>,
        args: Vec<String>,
        output: PathBuf,
        observer: Arc<dyn JobObserver>,
    ) -> Result<()> {
        if !self.is_available() {
            return Err(BurnError::EngineUnavailable(
                "engine not loaded".to_string(),
            ));
        }
        {
            let mut phase = self.lock_phase();
            if *phase != JobPhase::Idle {
                return Err(BurnError::AlreadyRunning);
            }
            *phase = JobPhase::Starting;
        }

        let job = Uuid::new_v4();
        debug!(%job, "engine args: {:?}", args);

        let engine = Arc::clone(self);
        tokio::spawn(async move {
            engine.run_job(job, args, output, observer).await;
        });
        Ok(())
    }

    /// Kill the in-flight job; it terminates through the normal failure
    /// route with reason "cancelled". No-op when idle. A cancel that races
    /// ahead of the job's waiter registration is lost; the next one lands.
    pub fn cancel(&self) {
        self.cancel.notify_waiters();
    }

    async fn run_job(
        self: Arc<Self>,
        job: Uuid,
        args: Vec<String>,
        output: PathBuf,
        observer: Arc<dyn JobObserver>,
    ) {
        let reset = PhaseReset(Arc::clone(&self));
        let result = self.execute(&args, Arc::clone(&observer)).await;
        // Back to Idle before the terminal callback, so an observer may
        // resubmit from inside it.
        drop(reset);

        match result {
            Ok(()) => {
                info!(%job, "transcode complete: {}", output.display());
                observer.on_success(&output);
            }
            Err(e) => {
                warn!(%job, "transcode failed: {e}");
                observer.on_failure(&e.to_string());
            }
        }
    }

    async fn execute(&self, args: &[String], observer: Arc<dyn JobObserver>) -> Result<()> {
        let mut child = Command::new(&self.binary)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                BurnError::ExecutionFailed(format!("failed to spawn {}: {e}", self.binary))
            })?;

        let stderr = child.stderr.take().ok_or_else(|| {
            BurnError::ExecutionFailed("failed to capture engine console".to_string())
        })?;

        *self.lock_phase() = JobPhase::Running;
        observer.on_start();

        // Relay console lines verbatim, keeping a short tail for the failure
        // diagnostic.
        let tail: Arc<Mutex<VecDeque<String>>> = Arc::new(Mutex::new(VecDeque::new()));
        let relay_tail = Arc::clone(&tail);
        let relay = tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                observer.on_progress(&line);
                let mut tail = relock(&relay_tail);
                if tail.len() == DIAG_TAIL_LINES {
                    tail.pop_front();
                }
                tail.push_back(line);
            }
        });

        let waited = tokio::select! {
            status = child.wait() => Some(status),
            () = self.cancel.notified() => None,
        };

        let Some(status) = waited else {
            let _ = child.start_kill();
            let _ = child.wait().await;
            let _ = relay.await;
            return Err(BurnError::ExecutionFailed("cancelled".to_string()));
        };

        // Join the relay before reporting, so no progress line can land
        // after the terminal callback.
        let _ = relay.await;
        let status = status?;

        if status.success() {
            Ok(())
        } else {
            let tail = relock(&tail);
            let diag = if tail.is_empty() {
                format!("engine exited with {status}")
            } else {
                tail.iter().cloned().collect::<Vec<_>>().join("\n")
            };
            Err(BurnError::ExecutionFailed(diag))
        }
    }

    fn lock_phase(&self) -> MutexGuard<'_, JobPhase> {
        relock(&self.phase)
    }

    #[cfg(test)]
    pub(crate) fn force_available(&self) {
        self.available.store(true, Ordering::SeqCst);
    }
}

/// Recover a poisoned lock: a panic mid-update leaves only a stale phase,
/// and the reset guard below rewrites it anyway.
fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Resets the phase to `Idle` on drop, covering every exit path out of
/// `Starting`/`Running` including panics in observer callbacks.
struct PhaseReset(Arc<Engine>);

impl Drop for PhaseReset {
    fn drop(&mut self) {
        *relock(&self.0.phase) = JobPhase::Idle;
    }
}
