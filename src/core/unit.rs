//! Build units
//!
//! A [`BuildUnit`] turns one [`ApplicationDescriptor`] into a populated build
//! tree and runs its build command there.

use crate::core::descriptor::{ApplicationDescriptor, UnitKey};
use crate::error::{AppTesterError, BuildError, RemoteError};
use crate::infra::{filesystem, process};
use crate::remote::{Credentials, RemoteClient};

/// One build attempt for an (application, language, platform) triple
#[derive(Debug, Clone, PartialEq)]
pub struct BuildUnit {
    descriptor: ApplicationDescriptor,
}

impl BuildUnit {
    pub fn new(descriptor: ApplicationDescriptor) -> Self {
        Self { descriptor }
    }

    pub fn descriptor(&self) -> &ApplicationDescriptor {
        &self.descriptor
    }

    pub fn key(&self) -> UnitKey {
        self.descriptor.key()
    }

    /// Populate the build directory
    ///
    /// Copies the sources, then the dependencies, then downloads the SDK of
    /// the application's first profile. The build directory must not exist.
    pub async fn prepare_environment(
        &self,
        client: &RemoteClient,
        credentials: &Credentials,
    ) -> Result<(), AppTesterError> {
        let descriptor = &self.descriptor;
        let build_path = descriptor.build_path();

        tracing::info!(
            "Preparing {} in {}",
            descriptor.key(),
            build_path.display()
        );

        filesystem::copy_tree(descriptor.source_path(), build_path)?;

        for dependency in descriptor.dependencies() {
            let destination = build_path.join(&dependency.destination);
            tracing::debug!(
                "Copying dependency {} to {}",
                dependency.source.display(),
                destination.display()
            );
            filesystem::copy_path(&dependency.source, &destination)?;
        }

        let sdk_path = descriptor.sdk_path();
        if let Some(sdk_dir) = sdk_path.parent() {
            filesystem::create_dir_all(sdk_dir)?;
        }

        // Sample applications are published with a single SDK profile
        let profiles = client
            .get_sdk_profiles(descriptor.name(), credentials)
            .await?;
        let profile = profiles.first().ok_or_else(|| RemoteError::NoSdkProfiles {
            name: descriptor.name().to_string(),
        })?;

        if profiles.len() > 1 {
            tracing::debug!(
                "{} has {} SDK profiles, using {}",
                descriptor.name(),
                profiles.len(),
                profile.id
            );
        }

        client
            .download_sdk(&profile.id, descriptor.language(), credentials, &sdk_path)
            .await?;

        Ok(())
    }

    /// Run the build command inside the build directory
    ///
    /// Output lines are handed to `on_line` while the command runs.
    pub async fn build(&self, on_line: &mut dyn FnMut(&str)) -> Result<(), AppTesterError> {
        let descriptor = &self.descriptor;
        let command = descriptor.build_command();
        let dir = descriptor.build_path();

        let outcome = process::run_shell(command, dir, on_line).await?;

        tracing::debug!(
            "`{command}` finished with {} after {:.1?} ({} lines)",
            outcome.status,
            outcome.duration,
            outcome.lines
        );

        if !outcome.success() {
            return Err(BuildError::CommandFailed {
                command: command.to_string(),
                dir: dir.to_path_buf(),
                status: outcome.status.to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Run the application's tests
    ///
    /// Test execution for sample applications is not implemented; this always
    /// succeeds.
    pub fn test(&self) -> Result<(), AppTesterError> {
        tracing::debug!("No tests defined for {}", self.key());
        Ok(())
    }
}
