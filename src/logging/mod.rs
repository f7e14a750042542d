//! Diagnostic logging
//!
//! This module provides the [`Logger`] for controlling diagnostic verbosity and
//! tracking operation timing. Stdout belongs to the credential-helper protocol,
//! so every line the logger emits goes to stderr.

use std::io::{self, Write};
use std::time::{Duration, Instant};

/// Logger responsible for all diagnostic output
#[derive(Debug, Clone)]
pub struct Logger {
    pub verbose: bool,
    pub quiet: bool,
    pub start_time: Option<Instant>,
}

impl Logger {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            quiet: false,
            start_time: Some(Instant::now()),
        }
    }

    pub fn new_quiet() -> Self {
        Self {
            verbose: false,
            quiet: true,
            start_time: Some(Instant::now()),
        }
    }

    /// Logger matching the helper's debug switch: verbose when enabled,
    /// otherwise silent apart from errors.
    pub fn for_debug(debug: bool) -> Self {
        if debug { Self::new(true) } else { Self::new_quiet() }
    }

    /// Main section heading
    pub fn section(&self, title: &str) {
        if self.verbose && !self.quiet {
            self.emit(&format!("=== {} ===", title));
        }
    }

    pub fn verbose(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.emit(&format!("📝 {}", message));
        }
    }

    /// Success message
    pub fn success(&self, message: &str) {
        if !self.quiet {
            self.emit(&format!("✅ {}", message));
        }
    }

    /// Error message, only in verbose mode since the protocol already
    /// reports failures on stdout
    pub fn error(&self, message: &str) {
        if self.verbose {
            self.emit(&format!("❌ ERROR: {}", message));
        }
    }

    /// Step information
    pub fn step(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.emit(&format!("▶️  {}", message));
        }
    }

    /// Detailed information (only shown in verbose mode)
    pub fn detail(&self, message: &str) {
        if self.verbose && !self.quiet {
            self.emit(&format!("   {}", message));
        }
    }

    /// Format duration in human-readable format
    pub fn format_duration(&self, duration: Duration) -> String {
        let secs = duration.as_secs();
        if secs < 1 {
            format!("{}ms", duration.as_millis())
        } else if secs < 60 {
            format!("{:.1}s", duration.as_secs_f64())
        } else {
            format!("{}m{}s", secs / 60, secs % 60)
        }
    }

    /// Time since the logger was created
    pub fn elapsed(&self) -> Duration {
        self.start_time.map(|t| t.elapsed()).unwrap_or_default()
    }

    fn emit(&self, line: &str) {
        let timestamp = match self.start_time {
            Some(start) if self.verbose => format!("[{:8.3}s] ", start.elapsed().as_secs_f64()),
            _ => String::new(),
        };
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "{}{}", timestamp, line);
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new_quiet()
    }
}
