//! Registry of running starnet++ processes.
//!
//! A run can be cancelled from elsewhere (a Ctrl-C handler, another task)
//! by run id; the registry maps run ids to the child's pid.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use super::RunError;

#[derive(Debug, Clone)]
pub struct RunningProcess {
    pub pid: u32,
    pub program: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ProcessRegistry {
    running: Arc<Mutex<HashMap<u64, RunningProcess>>>,
}

impl ProcessRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, RunningProcess>> {
        self.running.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn register(&self, run_id: u64, pid: u32, program: impl Into<String>) {
        self.lock().insert(
            run_id,
            RunningProcess {
                pid,
                program: program.into(),
                started_at: Utc::now(),
            },
        );
    }

    pub fn unregister(&self, run_id: u64) {
        self.lock().remove(&run_id);
    }

    pub fn get(&self, run_id: u64) -> Option<RunningProcess> {
        self.lock().get(&run_id).cloned()
    }

    /// Run ids currently registered, oldest first
    pub fn running(&self) -> Vec<u64> {
        let guard = self.lock();
        let mut ids: Vec<u64> = guard.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Kill the process registered for `run_id`.
    ///
    /// Returns false when nothing is registered under that id.
    pub fn kill(&self, run_id: u64) -> Result<bool, RunError> {
        let Some(proc) = self.get(run_id) else {
            return Ok(false);
        };
        tracing::info!("Killing run #{} (pid {})", run_id, proc.pid);
        kill_pid(proc.pid)
    }

    /// Kill every registered process, returning how many were signalled
    pub fn kill_all(&self) -> usize {
        self.running()
            .into_iter()
            .filter(|id| matches!(self.kill(*id), Ok(true)))
            .count()
    }
}

/// Force-kill a process by pid (SIGKILL on unix, `taskkill /f` on windows)
#[cfg(unix)]
pub fn kill_pid(pid: u32) -> Result<bool, RunError> {
    let pid = i32::try_from(pid).map_err(|_| RunError::Kill {
        pid,
        reason: "pid out of range".to_string(),
    })?;
    let rc = unsafe { libc::kill(pid, libc::SIGKILL) };
    Ok(rc == 0)
}

#[cfg(windows)]
pub fn kill_pid(pid: u32) -> Result<bool, RunError> {
    let status = std::process::Command::new("taskkill")
        .args(["/f", "/pid", &pid.to_string()])
        .status()
        .map_err(|e| RunError::Kill {
            pid,
            reason: e.to_string(),
        })?;
    Ok(status.success())
}

#[cfg(not(any(unix, windows)))]
pub fn kill_pid(pid: u32) -> Result<bool, RunError> {
    Err(RunError::Kill {
        pid,
        reason: "killing processes is not supported on this platform".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let registry = ProcessRegistry::new();
        registry.register(2, 4242, "starnet++");
        registry.register(1, 4241, "starnet++");
        assert_eq!(registry.running(), vec![1, 2]);
        assert_eq!(registry.get(2).map(|p| p.pid), Some(4242));

        registry.unregister(2);
        assert!(registry.get(2).is_none());
        assert_eq!(registry.running(), vec![1]);
    }

    #[test]
    fn test_kill_unknown_run_is_false() {
        let registry = ProcessRegistry::new();
        assert!(!registry.kill(99).unwrap());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = ProcessRegistry::new();
        let other = registry.clone();
        registry.register(7, 1, "x");
        assert!(other.get(7).is_some());
    }
}
