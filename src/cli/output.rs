//! Severity-tagged log stream for reconciliation runs
//!
//! Every line goes to stdout as `[INFO] ...`, `[VERBOSE] ...` or
//! `[ERROR] ...`. The tag is coloured only when stdout is a terminal.

use std::io::{IsTerminal, Write};
use std::sync::{Arc, Mutex};
use termcolor::{BufferWriter, Color, ColorChoice, ColorSpec, WriteColor};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Severity {
    /// Progress of the run
    Info,
    /// Detail of the run (IDs, hashes)
    Verbose,
    /// Failure (always shown)
    Error,
}

impl Severity {
    fn tag(self) -> &'static str {
        match self {
            Severity::Info => "[INFO]",
            Severity::Verbose => "[VERBOSE]",
            Severity::Error => "[ERROR]",
        }
    }

    fn color(self) -> ColorSpec {
        let mut spec = ColorSpec::new();
        match self {
            Severity::Info => spec.set_fg(Some(Color::Cyan)),
            Severity::Verbose => spec.set_fg(Some(Color::Blue)),
            Severity::Error => spec.set_fg(Some(Color::Red)).set_bold(true),
        };
        spec
    }
}

#[derive(Clone)]
enum Sink {
    Stdout(Arc<BufferWriter>),
    Memory(Arc<Mutex<Vec<String>>>),
}

impl std::fmt::Debug for Sink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sink::Stdout(_) => f.write_str("Stdout"),
            Sink::Memory(_) => f.write_str("Memory"),
        }
    }
}

/// Output manager for the severity-tagged log stream
#[derive(Debug, Clone)]
pub struct OutputManager {
    sink: Sink,
    verbose: bool,
    quiet: bool,
}

impl OutputManager {
    /// Create a new output manager writing to stdout
    pub fn new(verbose: bool, quiet: bool) -> Self {
        let choice = if std::io::stdout().is_terminal() {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self {
            sink: Sink::Stdout(Arc::new(BufferWriter::stdout(choice))),
            verbose,
            quiet,
        }
    }

    /// Output manager that keeps lines in memory, untagged by colour
    pub fn in_memory(verbose: bool, quiet: bool) -> Self {
        Self {
            sink: Sink::Memory(Arc::default()),
            verbose,
            quiet,
        }
    }

    /// Lines captured by an in-memory manager; empty for stdout
    pub fn captured(&self) -> Vec<String> {
        match &self.sink {
            Sink::Memory(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            Sink::Stdout(_) => Vec::new(),
        }
    }

    /// Print an info line
    pub fn info(&self, message: &str) {
        self.emit(Severity::Info, message);
    }

    /// Print a verbose line (hidden in brief mode)
    pub fn verbose(&self, message: &str) {
        self.emit(Severity::Verbose, message);
    }

    /// Print an error line (always shown)
    pub fn error(&self, message: &str) {
        self.emit(Severity::Error, message);
    }

    fn enabled(&self, severity: Severity) -> bool {
        match severity {
            Severity::Error => true,
            Severity::Info => !self.quiet,
            Severity::Verbose => self.verbose && !self.quiet,
        }
    }

    fn emit(&self, severity: Severity, message: &str) {
        if !self.enabled(severity) {
            return;
        }

        match &self.sink {
            Sink::Memory(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(format!("{} {}", severity.tag(), message));
                }
            }
            Sink::Stdout(bufwtr) => {
                let mut buffer = bufwtr.buffer();
                let _ = buffer.set_color(&severity.color());
                let _ = write!(&mut buffer, "{}", severity.tag());
                let _ = buffer.reset();
                let _ = writeln!(&mut buffer, " {}", message);
                if bufwtr.print(&buffer).is_err() {
                    println!("{} {}", severity.tag(), message);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_are_tagged() {
        let output = OutputManager::in_memory(true, false);
        output.info("Starting release management...");
        output.verbose("Release Tag: continuous");
        output.error("boom");
        assert_eq!(
            output.captured(),
            vec![
                "[INFO] Starting release management...",
                "[VERBOSE] Release Tag: continuous",
                "[ERROR] boom",
            ]
        );
    }

    #[test]
    fn test_quiet_keeps_errors_only() {
        let output = OutputManager::in_memory(true, true);
        output.info("hidden");
        output.verbose("hidden");
        output.error("shown");
        assert_eq!(output.captured(), vec!["[ERROR] shown"]);
    }

    #[test]
    fn test_brief_hides_verbose() {
        let output = OutputManager::in_memory(false, false);
        output.info("shown");
        output.verbose("hidden");
        assert_eq!(output.captured(), vec!["[INFO] shown"]);
    }

    #[test]
    fn test_clones_share_capture() {
        let output = OutputManager::in_memory(true, false);
        output.clone().info("from clone");
        assert_eq!(output.captured(), vec!["[INFO] from clone"]);
    }
}
