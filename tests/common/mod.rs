//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use apptester::config::urls;
use apptester::remote::{ClientOptions, RemoteClient, ServerHandle};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Test workspace
///
/// Creates a temporary directory holding a sample applications tree, the
/// settings and matrix files, and the build root.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Root of the sample applications tree
    pub fn samples(&self) -> PathBuf {
        self.dir.path().join("samples")
    }

    /// Root of all build trees
    pub fn build_root(&self) -> PathBuf {
        self.dir.path().join("build")
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Read a file from the test project
    pub fn read_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.dir.path().join(name)).expect("Failed to read file")
    }

    /// Create the sources of the event demo and cell monitor samples
    pub fn create_samples(&self) {
        self.create_file("samples/event/c/CMakeLists.txt", "project(event_demo C)");
        self.create_file("samples/event/java/build.xml", "<project name=\"event\"/>");
        self.create_file("samples/cell/cpp/CMakeLists.txt", "project(cell_monitor CXX)");
        self.create_file("samples/common/cmake/Kaa.cmake", "# kaa helpers");
    }

    /// Write the settings file pointing at `server`
    pub fn create_settings(&self, server: &MockServer) -> PathBuf {
        let address = server.address();
        let content = format!(
            r#"host = "{}"
port = {}
user = "devuser"
password = "devuser123"
builddir = "{}"
appconfig = "applications.toml"

[http]
max_retries = 1
retry_delay_ms = 10
"#,
            address.ip(),
            address.port(),
            self.build_root().display()
        );
        self.create_file("apptester.toml", &content);
        self.dir.path().join("apptester.toml")
    }

    /// Write the application matrix
    pub fn create_matrix(&self, content: &str) {
        self.create_file("applications.toml", content);
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

/// Matrix with one application built in two languages
pub const TWO_LANGUAGE_MATRIX: &str = r#"
[event_demo]
name = "Event demo"

[event_demo.language.c]
src = "event/c"

[event_demo.language.c.platform.x86-64]
buildcmd = "test -f libs/kaa/kaa-c-sdk.tar.gz && echo c build done"
dependencies = [["common/cmake", "cmake"]]

[event_demo.language.java]
src = "event/java"

[event_demo.language.java.platform.desktop]
buildcmd = "test -f libs/kaa/kaa-java-sdk.tar.gz && echo java build done"
"#;

/// Applications the mock server knows about, as (name, token)
pub const SERVER_APPLICATIONS: &[(&str, &str)] =
    &[("Event demo", "1001"), ("Cell monitor", "1002")];

/// Mount the three management server endpoints on `server`
pub async fn mount_kaa_server(server: &MockServer) {
    let applications: Vec<_> = SERVER_APPLICATIONS
        .iter()
        .map(|(name, token)| serde_json::json!({"name": name, "applicationToken": token}))
        .collect();

    Mock::given(method("GET"))
        .and(path(urls::APPLICATIONS))
        .respond_with(ResponseTemplate::new(200).set_body_json(applications))
        .mount(server)
        .await;

    for (_, token) in SERVER_APPLICATIONS {
        Mock::given(method("GET"))
            .and(path(format!("{}/{token}", urls::SDK_PROFILES)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"id": token}])),
            )
            .mount(server)
            .await;
    }

    Mock::given(method("POST"))
        .and(path(urls::SDK))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"sdk archive".to_vec()))
        .mount(server)
        .await;
}

/// Client for a mock server with a small retry budget
pub fn client_for(server: &MockServer) -> RemoteClient {
    let address = server.address();
    RemoteClient::with_options(
        ServerHandle::new(address.ip().to_string(), address.port()),
        ClientOptions {
            max_retries: 1,
            base_delay_ms: 10,
            ..ClientOptions::default()
        },
    )
    .expect("Failed to create client")
}
