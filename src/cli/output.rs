//! Console output
//!
//! Build progress, failure diagnostics and result printing.

use anyhow::Result;

use crate::config::defaults;
use crate::core::descriptor::UnitKey;
use crate::core::orchestrator::BuildReporter;
use crate::core::report::ResultTable;
use crate::error::AppTesterError;
use crate::remote::Application;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";
}

/// Prints build progress to the console
#[derive(Debug, Default)]
pub struct ConsoleReporter {
    quiet: bool,
}

impl ConsoleReporter {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl BuildReporter for ConsoleReporter {
    fn unit_started(&mut self, key: &UnitKey) {
        if !self.quiet {
            println!("Building {} ({}) for {}\n", key.application, key.language, key.platform);
        }
    }

    fn output_line(&mut self, line: &str) {
        if !self.quiet {
            println!("{line}");
        }
    }

    // Failures are reported even in quiet mode
    fn unit_failed(&mut self, key: &UnitKey, error: &AppTesterError) {
        eprintln!("{} {key}: {error}", status::ERROR);
    }
}

/// Print the applications known to the server
pub fn print_applications(applications: &[Application], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(applications)?);
        return Ok(());
    }

    let width = defaults::RESULT_COLUMN_WIDTH;
    println!("{:<width$}Token", "Application");
    for app in applications {
        println!("{:<width$}{}", app.name, app.application_token);
    }
    Ok(())
}

/// Print the result table as JSON
pub fn print_results_json(results: &ResultTable) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(results)?);
    Ok(())
}

/// Print a fatal error with its causes
pub fn display_error(error: &anyhow::Error) {
    eprintln!("{} {error}", status::ERROR);
    for cause in error.chain().skip(1) {
        eprintln!("  caused by: {cause}");
    }
}

/// Print the closing summary line
pub fn display_summary(results: &ResultTable) {
    use crate::core::report::Outcome;

    let prefix = if results.all_passed() {
        status::SUCCESS
    } else {
        status::ERROR
    };
    eprintln!(
        "{prefix} {} passed, {} failed, {} skipped",
        results.count(Outcome::Passed),
        results.count(Outcome::Failed),
        results.count(Outcome::Skipped)
    );
}
