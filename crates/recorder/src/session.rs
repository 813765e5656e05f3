//! RecordingSession - start/stop lifecycle shared with sinks
//!
//! Every `start()` bumps an epoch counter. The CSV sink compares the epoch
//! it last wrote a header for against the session epoch, which yields
//! header-once-per-session without any shared mutable flag.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tracing::{debug, info};

use crate::error::RecorderError;

/// Dataset directory under the storage base
pub const DATASET_DIR: &str = "dataset_recorder";

/// Row file name inside a session directory
pub const IMU_FILE: &str = "imu.csv";

/// Point-in-time view of an active session
///
/// Sinks read one snapshot at append entry and act on it; a concurrent
/// `stop()` only gates later appends, it never truncates an in-flight row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSession {
    /// Session name (single directory component)
    pub name: String,

    /// Session epoch, incremented on every start
    pub epoch: u64,

    /// Destination CSV path for this session
    pub csv_path: PathBuf,
}

#[derive(Debug)]
enum SessionState {
    Idle,
    Active { name: String },
}

#[derive(Debug)]
struct SessionInner {
    state: SessionState,
    epoch: u64,
}

/// Recording session state machine
///
/// Transitions:
/// - `start(name)`: Idle → Active with epoch + 1; starting while already
///   Active acts as stop + start (new epoch, header is re-emitted)
/// - `stop()`: Active → Idle, epoch unchanged
///
/// While Idle, sinks skip appends silently (no error, nothing on disk).
#[derive(Debug)]
pub struct RecordingSession {
    base_dir: PathBuf,
    inner: Mutex<SessionInner>,
}

impl RecordingSession {
    /// Create an Idle session rooted at `base_dir`
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            inner: Mutex::new(SessionInner {
                state: SessionState::Idle,
                epoch: 0,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start a session, returning the new epoch
    ///
    /// Starting while Active replaces the running session: the old one ends
    /// and the new one begins under a fresh epoch.
    pub fn start(&self, name: impl Into<String>) -> Result<u64, RecorderError> {
        let name = name.into();
        validate_session_name(&name)?;

        let mut inner = self.lock();
        if let SessionState::Active { name: previous } = &inner.state {
            debug!(previous = %previous, "Active session replaced by restart");
        }
        inner.epoch += 1;
        inner.state = SessionState::Active { name: name.clone() };
        let epoch = inner.epoch;
        drop(inner);

        info!(session = %name, epoch, "Recording session started");
        Ok(epoch)
    }

    /// Stop the session, returning whether one was actually active
    pub fn stop(&self) -> bool {
        let mut inner = self.lock();
        match std::mem::replace(&mut inner.state, SessionState::Idle) {
            SessionState::Active { name } => {
                let epoch = inner.epoch;
                drop(inner);
                info!(session = %name, epoch, "Recording session stopped");
                true
            }
            SessionState::Idle => {
                drop(inner);
                debug!("Stop requested but no session is active");
                false
            }
        }
    }

    /// Whether a session is currently active
    pub fn is_active(&self) -> bool {
        matches!(self.lock().state, SessionState::Active { .. })
    }

    /// Current epoch (starts at 0, incremented on every start)
    pub fn epoch(&self) -> u64 {
        self.lock().epoch
    }

    /// Snapshot of the active session, or None while Idle
    pub fn snapshot(&self) -> Option<ActiveSession> {
        let inner = self.lock();
        match &inner.state {
            SessionState::Active { name } => Some(ActiveSession {
                name: name.clone(),
                epoch: inner.epoch,
                csv_path: csv_path(&self.base_dir, name),
            }),
            SessionState::Idle => None,
        }
    }

    /// Generate a UTC-timestamped session name for configs without one
    pub fn generate_name() -> String {
        format!("imu_{}", Utc::now().format("%Y%m%d_%H%M%S"))
    }
}

fn csv_path(base_dir: &Path, session_name: &str) -> PathBuf {
    base_dir.join(DATASET_DIR).join(session_name).join(IMU_FILE)
}

fn validate_session_name(name: &str) -> Result<(), RecorderError> {
    if name.is_empty() {
        return Err(RecorderError::invalid_session(name, "name must not be empty"));
    }
    if name.contains('/') || name.contains('\\') {
        return Err(RecorderError::invalid_session(
            name,
            "name must not contain path separators",
        ));
    }
    if name == "." || name == ".." {
        return Err(RecorderError::invalid_session(
            name,
            "name must be a plain directory name",
        ));
    }
    Ok(())
}
