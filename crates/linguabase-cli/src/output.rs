//! Output formatting and writing utilities
//!
//! Results are written either for humans (aligned, optionally colored) or as
//! JSON/YAML for scripts.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use linguabase_core::{ReportEntry, ValidationReport};
use serde::Serialize;
use std::io::{self, Write};
use tracing::trace;

/// Trait for formatting output with specialized support for common types
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format a validation report
    fn format_report(&self, report: &ValidationReport, detailed: bool, use_color: bool)
        -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
            // pretty JSON stands in for types without a human layout
            OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
        }
    }

    fn format_report(
        &self,
        report: &ValidationReport,
        detailed: bool,
        use_color: bool,
    ) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_report_human(report, detailed, use_color)),
            _ => self.format(report),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self::with_writer(format, use_color, quiet, Box::new(io::stdout()))
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(
        format: OutputFormat,
        use_color: bool,
        quiet: bool,
        writer: Box<dyn Write>,
    ) -> Self {
        Self {
            format,
            use_color,
            quiet,
            writer,
        }
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message (human format only)
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message (human format only)
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message (human format only)
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if self.format != OutputFormat::Human {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write a validation report
    pub fn report(&mut self, report: &ValidationReport, detailed: bool) -> Result<()> {
        let formatted = self.format.format_report(report, detailed, self.use_color)?;
        trace!(bytes = formatted.len(), "writing report");
        self.writeln(formatted.trim_end())
    }
}

/// Format a validation report for human reading
fn format_report_human(report: &ValidationReport, detailed: bool, use_color: bool) -> String {
    let mut output = String::new();
    output.push_str("═══ Validation Report ═══\n\n");

    let width = report
        .iter()
        .map(|(kind, _)| kind.logical_name().len())
        .max()
        .unwrap_or(0);

    for (kind, entry) in report.iter() {
        let (mark, summary) = match entry {
            ReportEntry::Ok { count } => {
                let mark = if use_color { "✓".green().to_string() } else { "✓".to_string() };
                (mark, format!("ok ({} {})", count, plural(*count)))
            }
            ReportEntry::Invalid { kind, error, .. } => {
                let mark = if use_color { "✗".red().to_string() } else { "✗".to_string() };
                (mark, format!("{}: {}", kind, error))
            }
            ReportEntry::MissingButOptional => {
                let mark = if use_color { "-".yellow().to_string() } else { "-".to_string() };
                (mark, "missing (optional)".to_string())
            }
        };
        output.push_str(&format!(
            "  {} {:width$}  {}\n",
            mark,
            kind.logical_name(),
            summary,
            width = width
        ));

        if let (true, ReportEntry::Invalid { violations: Some(violations), .. }) = (detailed, entry) {
            for error in violations.iter() {
                output.push_str(&format!(
                    "      {} {} ({})\n",
                    error.path,
                    error.message,
                    error.violation.rule
                ));
            }
        }
    }

    let invalid = report.invalid_count();
    output.push('\n');
    if invalid == 0 {
        output.push_str("All documents are valid\n");
    } else {
        output.push_str(&format!("{} document(s) failed validation\n", invalid));
    }

    output
}

fn plural(count: usize) -> &'static str {
    if count == 1 {
        "entry"
    } else {
        "entries"
    }
}
