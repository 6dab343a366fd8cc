//! Output rendering for CLI commands.
//!
//! Text output is the library's formatter output; JSON output is the
//! serialized result, pretty-printed. Both go to stdout.

use std::io::{self, Write};
use std::time::Duration;

use clap::ValueEnum;
use serde::Serialize;

use ferryroutes_lib::QueryOutcome;

use crate::terminal::ColorPalette;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    /// Print a query outcome in this format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing to stdout fails.
    pub fn render_outcome(self, outcome: &QueryOutcome) -> io::Result<()> {
        match self {
            OutputFormat::Text => write_line(&outcome.render()),
            OutputFormat::Json => render_json(outcome),
        }
    }
}

/// Print `value` as pretty JSON followed by a newline.
pub fn render_json<T: Serialize + ?Sized>(value: &T) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)
}

fn write_line(text: &str) -> io::Result<()> {
    let mut stdout = io::stdout().lock();
    writeln!(stdout, "{text}")
}

/// Print a failed command's error chain to stderr.
pub fn print_error(err: &anyhow::Error) {
    let palette = ColorPalette::detect();
    eprintln!("{}error:{} {err:#}", palette.red, palette.reset);
}

/// Print the elapsed time to stderr.
pub fn print_footer(elapsed: Duration) {
    let palette = ColorPalette::detect();
    let elapsed_ms = elapsed.as_millis();
    let time_str = if elapsed_ms < 1000 {
        format!("{elapsed_ms}ms")
    } else {
        format!("{:.2}s", elapsed.as_secs_f64())
    };
    eprintln!("{}Completed in {}{}", palette.gray, time_str, palette.reset);
}
