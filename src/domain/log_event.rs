use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of log event coming out of a tool run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogEventKind {
    /// A line the tool wrote to stdout
    Stdout,
    /// A line the tool wrote to stderr
    Stderr,
    /// System message (e.g., start, pid, nudge)
    System,
    /// Something went wrong around the tool (spawn, io)
    Error,
    /// The tool exited
    Terminated,
}

impl std::fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogEventKind::Stdout => write!(f, "stdout"),
            LogEventKind::Stderr => write!(f, "stderr"),
            LogEventKind::System => write!(f, "system"),
            LogEventKind::Error => write!(f, "error"),
            LogEventKind::Terminated => write!(f, "terminated"),
        }
    }
}

/// A log event from a tool run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEvent {
    /// When this event occurred
    pub timestamp: DateTime<Utc>,

    /// The kind of event
    pub kind: LogEventKind,

    /// Run this event belongs to (None for process-wide events)
    pub run_id: Option<u64>,

    /// The line or message
    pub message: String,

    /// Exit code, only set on `Terminated`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl LogEvent {
    /// Create a new log event
    pub fn new(kind: LogEventKind, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            kind,
            run_id: None,
            message: message.into(),
            exit_code: None,
        }
    }

    /// Set the run ID for this event
    pub fn for_run(mut self, run_id: u64) -> Self {
        self.run_id = Some(run_id);
        self
    }

    pub fn stdout(line: impl Into<String>) -> Self {
        Self::new(LogEventKind::Stdout, line)
    }

    pub fn stderr(line: impl Into<String>) -> Self {
        Self::new(LogEventKind::Stderr, line)
    }

    pub fn system(message: impl Into<String>) -> Self {
        Self::new(LogEventKind::System, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogEventKind::Error, message)
    }

    /// Create a terminated event carrying the exit code (None when killed by a signal)
    pub fn terminated(exit_code: Option<i32>) -> Self {
        let message = match exit_code {
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
        };
        let mut event = Self::new(LogEventKind::Terminated, message);
        event.exit_code = exit_code;
        event
    }

    /// Whether this event is tool output (counts toward stdin nudges)
    pub fn is_output(&self) -> bool {
        matches!(self.kind, LogEventKind::Stdout | LogEventKind::Stderr)
    }
}

impl std::fmt::Display for LogEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} [{}] {}",
            self.timestamp.format("%H:%M:%S"),
            self.kind,
            self.message
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_tool_lines_are_output() {
        assert!(LogEvent::stdout("Reading input image...").is_output());
        assert!(LogEvent::stderr("careful").is_output());
        assert!(!LogEvent::system("pid 42").is_output());
        assert!(!LogEvent::error("broken pipe").is_output());
        assert!(!LogEvent::terminated(Some(0)).is_output());
    }

    #[test]
    fn test_terminated_carries_exit_code() {
        let event = LogEvent::terminated(None).for_run(7);
        assert_eq!(event.exit_code, None);
        assert_eq!(event.run_id, Some(7));
        assert_eq!(event.message, "terminated by signal");
    }
}
