//! Application descriptors
//!
//! An [`ApplicationDescriptor`] is the immutable description of one build
//! unit: which application, in which SDK language, for which platform, and
//! where its sources and build tree live.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::defaults;

/// SDK languages the management server can generate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum SdkLanguage {
    /// C SDK
    C,
    /// C++ SDK
    Cpp,
    /// Java SDK
    Java,
    /// Objective-C SDK
    ObjectiveC,
}

impl SdkLanguage {
    /// All languages, in server order
    pub const ALL: [SdkLanguage; 4] = [Self::C, Self::Cpp, Self::Java, Self::ObjectiveC];

    /// Parse a language key from the application matrix (case-insensitive)
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "c" => Some(Self::C),
            "cpp" => Some(Self::Cpp),
            "java" => Some(Self::Java),
            "objc" => Some(Self::ObjectiveC),
            _ => None,
        }
    }

    /// Value of the `targetPlatform` query parameter
    pub fn target_platform(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::Cpp => "CPP",
            Self::Java => "JAVA",
            Self::ObjectiveC => "OBJC",
        }
    }

    /// File name of the SDK archive inside the build tree
    pub fn sdk_file_name(self) -> String {
        format!(
            "kaa-{}-sdk.tar.gz",
            self.target_platform().to_ascii_lowercase()
        )
    }
}

impl fmt::Display for SdkLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.target_platform())
    }
}

impl From<SdkLanguage> for &'static str {
    fn from(language: SdkLanguage) -> Self {
        language.target_platform()
    }
}

/// Stable identity of a build unit
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct UnitKey {
    /// Application display name
    pub application: String,
    /// SDK language
    pub language: SdkLanguage,
    /// Target platform key
    pub platform: String,
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.application, self.language, self.platform
        )
    }
}

/// File or directory copied into a build tree before building
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Absolute source path
    pub source: PathBuf,
    /// Destination relative to the build directory
    pub destination: PathBuf,
}

/// One buildable (application, language, platform) combination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationDescriptor {
    name: String,
    matrix_key: String,
    language: SdkLanguage,
    platform: String,
    source_path: PathBuf,
    build_path: PathBuf,
    build_command: String,
    dependencies: Vec<Dependency>,
}

impl ApplicationDescriptor {
    /// Create a descriptor without dependencies
    pub fn new(
        name: impl Into<String>,
        matrix_key: impl Into<String>,
        language: SdkLanguage,
        platform: impl Into<String>,
        source_path: PathBuf,
        build_path: PathBuf,
        build_command: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            matrix_key: matrix_key.into(),
            language,
            platform: platform.into(),
            source_path,
            build_path,
            build_command: build_command.into(),
            dependencies: Vec::new(),
        }
    }

    /// Attach the ordered dependency copy-list
    #[must_use]
    pub fn with_dependencies(mut self, dependencies: Vec<Dependency>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Application name as registered on the server
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Key of the application in the matrix file
    pub fn matrix_key(&self) -> &str {
        &self.matrix_key
    }

    pub fn language(&self) -> SdkLanguage {
        self.language
    }

    pub fn platform(&self) -> &str {
        &self.platform
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    pub fn build_path(&self) -> &Path {
        &self.build_path
    }

    pub fn build_command(&self) -> &str {
        &self.build_command
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Where the downloaded SDK archive is placed
    pub fn sdk_path(&self) -> PathBuf {
        self.build_path
            .join(defaults::SDK_DIR)
            .join(self.language.sdk_file_name())
    }

    /// Result table key of this descriptor
    pub fn key(&self) -> UnitKey {
        UnitKey {
            application: self.name.clone(),
            language: self.language,
            platform: self.platform.clone(),
        }
    }
}
