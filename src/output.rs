// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a non-fatal warning (suppressed in quiet mode).
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => {
                if let Some(line) = JsonEvent::line("warning", message, None) {
                    println!("{line}");
                }
            }
        }
    }

    /// Print a success message with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => match self.duration() {
                Some(secs) => println!("{message} ({secs:.1}s)"),
                None => println!("{message}"),
            },
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => {
                if let Some(line) = JsonEvent::line("success", message, self.duration()) {
                    println!("{line}");
                }
            }
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => {
                if let Some(line) = JsonEvent::line("error", message, self.duration()) {
                    eprintln!("{line}");
                }
            }
        }
    }

    /// Print structured data: one JSON line in JSON mode, YAML otherwise.
    pub fn data<T: Serialize>(&self, value: &T) -> crate::error::Result<()> {
        match self.mode {
            OutputMode::Json => println!("{}", serde_json::to_string(value)?),
            OutputMode::Normal | OutputMode::Quiet => print!("{}", serde_yaml::to_string(value)?),
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

impl<'a> JsonEvent<'a> {
    fn line(event: &'a str, message: &'a str, duration_secs: Option<f64>) -> Option<String> {
        serde_json::to_string(&JsonEvent {
            event,
            message,
            duration_secs,
        })
        .ok()
    }
}
