//! Command-line interface module
//!
//! This module handles argument parsing and output formatting.
//! It contains no business logic - that belongs in the [`crate::core`] module.

pub mod output;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use crate::config::defaults;
use crate::core::orchestrator::Orchestrator;
use crate::core::settings::Settings;
use crate::infra::filesystem;
use crate::remote::RemoteClient;

use output::ConsoleReporter;

/// Kaa sample application tester
///
/// Builds every sample application in the application matrix against SDKs
/// generated by a Kaa server and reports which builds pass.
#[derive(Parser, Debug)]
#[command(name = "apptester")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path of the sample applications repository
    #[arg(required_unless_present = "list")]
    pub rootpath: Option<PathBuf>,

    /// Show applications available on the server and exit
    #[arg(short, long)]
    pub list: bool,

    /// Build only this application (matrix key or name)
    #[arg(short = 'a', value_name = "application")]
    pub application: Option<String>,

    /// Kaa server address (overrides the settings file)
    #[arg(short = 's', value_name = "server")]
    pub server: Option<String>,

    /// Kaa server port (overrides the settings file)
    #[arg(short = 'p', value_name = "port")]
    pub port: Option<u16>,

    /// Settings file
    #[arg(short, long, env = "APPTESTER_CONFIG", default_value = defaults::SETTINGS_FILE)]
    pub config: PathBuf,

    /// Enable verbose output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress build output and the result table
    #[arg(short, long)]
    pub quiet: bool,

    /// Print the result table as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Execute the run described by the arguments
    ///
    /// Returns whether every build passed or was skipped.
    pub async fn run(self) -> Result<bool> {
        let settings = Settings::load_from_path(&self.config)
            .with_context(|| format!("Failed to load settings from {}", self.config.display()))?
            .with_overrides(self.server.clone(), self.port);

        tracing::debug!("Using {:?}", settings);

        let client = RemoteClient::with_options(settings.server(), settings.client_options())
            .context("Failed to set up the management server client")?;
        let credentials = settings.credentials();

        if self.list {
            let applications = client
                .list_applications(&credentials)
                .await
                .with_context(|| format!("Failed to list applications on {}", settings.host))?;
            output::print_applications(&applications, self.json)?;
            return Ok(true);
        }

        let rootpath = self
            .rootpath
            .as_deref()
            .context("The sample applications path is required")?;

        let mut orchestrator = Orchestrator::new(client, credentials);
        let matrix_path = settings.appconfig_path(&self.config);
        orchestrator
            .load_configuration(&matrix_path, rootpath, &settings.builddir)
            .with_context(|| {
                format!(
                    "Failed to load application matrix {}",
                    matrix_path.display()
                )
            })?;

        if let Some(application) = &self.application {
            orchestrator.restrict_to(application)?;
        }

        if let Err(e) = filesystem::remove_dir_all(&settings.builddir) {
            tracing::warn!("Could not clear build directory: {e}");
        }

        let mut reporter = ConsoleReporter::new(self.quiet);
        orchestrator.build_all(&mut reporter).await;

        if orchestrator.results().is_empty() {
            tracing::warn!("Application matrix {} has no build units", matrix_path.display());
        }

        if self.json {
            output::print_results_json(orchestrator.results())?;
            return Ok(orchestrator.report_results(false));
        }

        let passed = orchestrator.report_results(!self.quiet);
        if !self.quiet {
            output::display_summary(orchestrator.results());
        }
        Ok(passed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_short_flags() {
        let cli = Cli::try_parse_from([
            "apptester", "/samples", "-a", "event_demo", "-s", "10.0.0.1", "-p", "9090",
        ])
        .unwrap();

        assert_eq!(cli.rootpath, Some(PathBuf::from("/samples")));
        assert_eq!(cli.application.as_deref(), Some("event_demo"));
        assert_eq!(cli.server.as_deref(), Some("10.0.0.1"));
        assert_eq!(cli.port, Some(9090));
        assert!(!cli.list);
    }

    #[test]
    fn test_rootpath_required_unless_listing() {
        assert!(Cli::try_parse_from(["apptester"]).is_err());
        assert!(Cli::try_parse_from(["apptester", "--list"]).is_ok());
    }

    #[test]
    fn test_invalid_port() {
        assert!(Cli::try_parse_from(["apptester", "/samples", "-p", "http"]).is_err());
    }
}
