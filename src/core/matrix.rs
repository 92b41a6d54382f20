//! Application matrix parsing
//!
//! The matrix enumerates every application, the SDK languages it ships in and
//! the platforms each language variant is built for:
//!
//! ```toml
//! [data_collection]
//! name = "Data collection demo"
//!
//! [data_collection.language.cpp]
//! src = "data-collection/source/cpp"
//!
//! [data_collection.language.cpp.platform.x86-64]
//! buildcmd = "./build.sh"
//! dependencies = [["common/cmake", "cmake"]]
//! skip = false
//! ```
//!
//! Every platform table becomes one [`MatrixEntry`]. Entries keep the order
//! in which they appear in the document.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::descriptor::{ApplicationDescriptor, Dependency, SdkLanguage};
use crate::error::ConfigError;

#[derive(Debug, Deserialize)]
struct RawApplication {
    name: String,
    language: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawLanguage {
    src: PathBuf,
    platform: toml::Table,
}

#[derive(Debug, Deserialize)]
struct RawPlatform {
    buildcmd: String,
    #[serde(default)]
    dependencies: Vec<(PathBuf, PathBuf)>,
    #[serde(default)]
    skip: bool,
}

/// One leaf of the matrix
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixEntry {
    /// What to build
    pub descriptor: ApplicationDescriptor,
    /// Whether the matrix marks this combination as skipped
    pub skip: bool,
}

/// Parsed application matrix
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApplicationMatrix {
    entries: Vec<MatrixEntry>,
}

impl ApplicationMatrix {
    /// Load and parse the matrix file at `path`
    ///
    /// Source and dependency paths are resolved against `root_path`, build
    /// trees are laid out under `build_root`.
    pub fn load(path: &Path, root_path: &Path, build_root: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content, root_path, build_root).map_err(|e| match e {
            ConfigError::ParseError { error, .. } => ConfigError::ParseError {
                path: path.to_path_buf(),
                error,
            },
            other => other,
        })
    }

    /// Parse matrix TOML text
    pub fn parse(content: &str, root_path: &Path, build_root: &Path) -> Result<Self, ConfigError> {
        let document: toml::Table = content.parse().map_err(|e: toml::de::Error| {
            ConfigError::ParseError {
                path: PathBuf::new(),
                error: e.to_string(),
            }
        })?;

        let mut entries = Vec::new();
        let mut seen = BTreeMap::new();

        for (app_key, app_value) in document {
            let app: RawApplication = decode(app_value, &app_key)?;

            for (lang_key, lang_value) in app.language {
                let entry_name = format!("{app_key}.language.{lang_key}");
                let language = SdkLanguage::from_key(&lang_key).ok_or_else(|| {
                    ConfigError::UnknownLanguage {
                        application: app_key.clone(),
                        language: lang_key.clone(),
                    }
                })?;
                let lang: RawLanguage = decode(lang_value, &entry_name)?;
                let source_path = root_path.join(&lang.src);

                for (plat_key, plat_value) in lang.platform {
                    let leaf_name = format!("{entry_name}.platform.{plat_key}");
                    let platform: RawPlatform = decode(plat_value, &leaf_name)?;

                    let dependencies = platform
                        .dependencies
                        .into_iter()
                        .map(|(source, destination)| Dependency {
                            source: root_path.join(source),
                            destination,
                        })
                        .collect();

                    let descriptor = ApplicationDescriptor::new(
                        app.name.clone(),
                        app_key.clone(),
                        language,
                        plat_key.clone(),
                        source_path.clone(),
                        build_root.join(&app_key).join(&lang_key).join(&plat_key),
                        platform.buildcmd,
                    )
                    .with_dependencies(dependencies);

                    // Results and skip flags are keyed by unit, so two leaves
                    // must never share one
                    let key = descriptor.key();
                    if let Some(first) = seen.insert(key.clone(), leaf_name.clone()) {
                        return Err(ConfigError::DuplicateUnit {
                            unit: key.to_string(),
                            first,
                            second: leaf_name,
                        });
                    }

                    entries.push(MatrixEntry {
                        descriptor,
                        skip: platform.skip,
                    });
                }
            }
        }

        tracing::debug!("Application matrix expands to {} build units", entries.len());
        Ok(Self { entries })
    }

    /// All entries in document order
    pub fn entries(&self) -> &[MatrixEntry] {
        &self.entries
    }

    /// Number of build units
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the matrix has no build units
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consume the matrix, yielding its entries
    pub fn into_entries(self) -> Vec<MatrixEntry> {
        self.entries
    }
}

/// Deserialize one matrix table, naming it in the error
fn decode<T>(value: toml::Value, entry: &str) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    value.try_into().map_err(|e: toml::de::Error| ConfigError::InvalidEntry {
        entry: entry.to_string(),
        error: e.message().to_string(),
    })
}
