//! Build orchestration
//!
//! Expands the application matrix into build units, runs them one after the
//! other and collects their outcomes.

use std::collections::BTreeSet;
use std::path::Path;

use crate::core::descriptor::UnitKey;
use crate::core::matrix::ApplicationMatrix;
use crate::core::report::{Outcome, ResultTable};
use crate::core::unit::BuildUnit;
use crate::error::{AppTesterError, ConfigError};
use crate::remote::{Credentials, RemoteClient};

/// Phase of an orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Parsing,
    Building,
    Reporting,
    Done,
}

/// Receives progress of a run
///
/// The CLI prints to the console; tests record what happened.
pub trait BuildReporter {
    /// A unit is about to be prepared and built
    fn unit_started(&mut self, key: &UnitKey);

    /// A line of build command output
    fn output_line(&mut self, line: &str);

    /// A unit failed
    fn unit_failed(&mut self, key: &UnitKey, error: &AppTesterError);
}

/// Runs every build unit of an application matrix
#[derive(Debug)]
pub struct Orchestrator {
    client: RemoteClient,
    credentials: Credentials,
    units: Vec<BuildUnit>,
    skipped: BTreeSet<UnitKey>,
    results: ResultTable,
    state: RunState,
}

impl Orchestrator {
    /// Create an orchestrator talking to `client` as `credentials`
    pub fn new(client: RemoteClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            units: Vec::new(),
            skipped: BTreeSet::new(),
            results: ResultTable::new(),
            state: RunState::Idle,
        }
    }

    /// Load the matrix file at `path`
    pub fn load_configuration(
        &mut self,
        path: &Path,
        root_path: &Path,
        build_root: &Path,
    ) -> Result<(), ConfigError> {
        self.state = RunState::Parsing;
        let matrix = ApplicationMatrix::load(path, root_path, build_root)?;
        self.set_matrix(matrix);
        Ok(())
    }

    /// Parse matrix TOML text
    pub fn parse_configuration(
        &mut self,
        source: &str,
        root_path: &Path,
        build_root: &Path,
    ) -> Result<(), ConfigError> {
        self.state = RunState::Parsing;
        let matrix = ApplicationMatrix::parse(source, root_path, build_root)?;
        self.set_matrix(matrix);
        Ok(())
    }

    fn set_matrix(&mut self, matrix: ApplicationMatrix) {
        self.units.clear();
        self.skipped.clear();
        self.results = ResultTable::new();

        for entry in matrix.into_entries() {
            let unit = BuildUnit::new(entry.descriptor);
            if entry.skip {
                self.skipped.insert(unit.key());
            }
            self.units.push(unit);
        }

        tracing::info!(
            "Loaded {} build units ({} skipped)",
            self.units.len(),
            self.skipped.len()
        );
    }

    /// Keep only the units of `application`
    ///
    /// Matches either the matrix key or the application name.
    pub fn restrict_to(&mut self, application: &str) -> Result<(), ConfigError> {
        self.units.retain(|unit| {
            let descriptor = unit.descriptor();
            descriptor.matrix_key() == application || descriptor.name() == application
        });
        if self.units.is_empty() {
            return Err(ConfigError::UnknownApplication {
                name: application.to_string(),
            });
        }

        let kept: BTreeSet<_> = self.units.iter().map(BuildUnit::key).collect();
        self.skipped.retain(|key| kept.contains(key));
        Ok(())
    }

    pub fn units(&self) -> &[BuildUnit] {
        &self.units
    }

    pub fn is_skipped(&self, key: &UnitKey) -> bool {
        self.skipped.contains(key)
    }

    pub fn results(&self) -> &ResultTable {
        &self.results
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Build every unit in configuration order
    ///
    /// A failing unit is recorded and the run continues with the next one.
    pub async fn build_all(&mut self, reporter: &mut dyn BuildReporter) {
        self.state = RunState::Building;
        self.results = ResultTable::new();

        for unit in &self.units {
            let key = unit.key();

            if self.skipped.contains(&key) {
                tracing::info!("Skipping {key}");
                self.results.record(key, Outcome::Skipped);
                continue;
            }

            reporter.unit_started(&key);

            let outcome = match self.run_unit(unit, reporter).await {
                Ok(()) => Outcome::Passed,
                Err(e) => {
                    tracing::error!("{key} failed: {e}");
                    reporter.unit_failed(&key, &e);
                    Outcome::Failed
                }
            };
            tracing::info!("{key}: {outcome}");
            self.results.record(key, outcome);
        }

        self.state = RunState::Reporting;
    }

    async fn run_unit(
        &self,
        unit: &BuildUnit,
        reporter: &mut dyn BuildReporter,
    ) -> Result<(), AppTesterError> {
        unit.prepare_environment(&self.client, &self.credentials)
            .await?;
        unit.build(&mut |line: &str| reporter.output_line(line))
            .await?;
        unit.test()
    }

    /// Summarize the run
    ///
    /// Returns true when no unit failed. With `verbose` the result table is
    /// printed to stdout.
    pub fn report_results(&mut self, verbose: bool) -> bool {
        self.state = RunState::Reporting;
        if verbose {
            print!("{}", self.results.render());
        }
        self.state = RunState::Done;
        self.results.all_passed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::ServerHandle;

    const MATRIX: &str = r#"
[event_demo]
name = "Event demo"
[event_demo.language.c]
src = "event/c"
[event_demo.language.c.platform.x86-64]
buildcmd = "true"
skip = true
[event_demo.language.java]
src = "event/java"
[event_demo.language.java.platform.desktop]
buildcmd = "true"

[cell_monitor]
name = "Cell monitor"
[cell_monitor.language.cpp]
src = "cell/cpp"
[cell_monitor.language.cpp.platform.x86-64]
buildcmd = "true"
"#;

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(
            RemoteClient::new(ServerHandle::new("127.0.0.1", 1)).unwrap(),
            Credentials::new("devuser", "devuser123"),
        )
    }

    fn parsed() -> Orchestrator {
        let mut orchestrator = orchestrator();
        orchestrator
            .parse_configuration(MATRIX, Path::new("/samples"), Path::new("/tmp/build"))
            .unwrap();
        orchestrator
    }

    #[test]
    fn test_parse_creates_units_and_skip_set() {
        let orchestrator = parsed();
        assert_eq!(orchestrator.units().len(), 3);
        assert_eq!(orchestrator.state(), RunState::Parsing);

        let skipped: Vec<_> = orchestrator
            .units()
            .iter()
            .map(|u| orchestrator.is_skipped(&u.key()))
            .collect();
        assert_eq!(skipped, vec![true, false, false]);
    }

    #[test]
    fn test_parse_failure_keeps_no_units() {
        let mut orchestrator = orchestrator();
        let result = orchestrator.parse_configuration(
            "[demo]\nname = \"Demo\"\n[demo.language.rust]\nsrc = \"x\"\nplatform = {}\n",
            Path::new("/samples"),
            Path::new("/tmp/build"),
        );
        assert!(matches!(result, Err(ConfigError::UnknownLanguage { .. })));
        assert!(orchestrator.units().is_empty());
    }

    #[test]
    fn test_restrict_by_key_or_name() {
        let mut by_key = parsed();
        by_key.restrict_to("event_demo").unwrap();
        assert_eq!(by_key.units().len(), 2);

        let mut by_name = parsed();
        by_name.restrict_to("Cell monitor").unwrap();
        assert_eq!(by_name.units().len(), 1);
        assert_eq!(by_name.units()[0].descriptor().matrix_key(), "cell_monitor");
    }

    #[test]
    fn test_restrict_unknown_application() {
        let mut orchestrator = parsed();
        let result = orchestrator.restrict_to("missing");
        assert!(matches!(result, Err(ConfigError::UnknownApplication { .. })));
    }

    #[test]
    fn test_report_without_run_passes() {
        let mut orchestrator = parsed();
        assert!(orchestrator.report_results(false));
        assert_eq!(orchestrator.state(), RunState::Done);
    }
}
