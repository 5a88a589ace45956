#![allow(dead_code)]

use async_trait::async_trait;
use light_release::config::{
    FileGroup, GroupMode, HarnessConfig, PublishConfig, ReleaseConfig, RemoteConfig,
    UpstreamConfig, VersionConfig,
};
use light_release::workflow::{CommandExecutor, CommandOutput, CommandSpec};
use light_release::{AmbiguityPolicy, WorkflowError};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use tempfile::TempDir;

/// Create a temporary directory for testing
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Write a file, creating its parent directories
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dir");
    }
    fs::write(&path, content).expect("Failed to write file");
}

pub fn read_file(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).expect("Failed to read file")
}

/// Lay out a small upstream checkout under `<root>/uvvm` and the light
/// distribution next to it under `<root>/light`.
///
/// The light tree ships the UART and SPI BFMs; upstream also has an AXI
/// BFM that must not be pulled in.
pub fn init_release_tree(root: &Path) {
    write_file(root, "uvvm/uvvm_util/src/methods_pkg.vhd", METHODS_PKG);
    write_file(root, "uvvm/uvvm_util/src/types_pkg.vhd", "-- types v2");
    write_file(root, "uvvm/uvvm_util/doc/util_quick_ref.pdf", "pdf v2");
    write_file(root, "uvvm/bitvis_uart/src/uart_bfm_pkg.vhd", "-- uart v2");
    write_file(root, "uvvm/bitvis_spi/src/spi_bfm_pkg.vhd", "-- spi v1");
    write_file(root, "uvvm/bitvis_axi/src/axi_bfm_pkg.vhd", "-- axi");

    write_file(root, "light/src_util/types_pkg.vhd", "-- types v1");
    write_file(root, "light/src_util/obsolete_pkg.vhd", "-- gone upstream");
    write_file(root, "light/src_bfm/uart_bfm_pkg.vhd", "-- uart v1");
    write_file(root, "light/src_bfm/spi_bfm_pkg.vhd", "-- spi v1");
    fs::create_dir_all(root.join("light/script")).expect("Failed to create script dir");
}

pub const METHODS_PKG: &str = r#"library ieee;
package methods_pkg is
  constant C_UVVM_VERSION : string := "v2 2024.03.07";
end package methods_pkg;
"#;

/// Configuration matching [`init_release_tree`], run from `<root>/light/script`
pub fn test_config() -> ReleaseConfig {
    ReleaseConfig {
        upstream: UpstreamConfig {
            url: "https://example.com/uvvm.git".to_string(),
            checkout_dir: "../../uvvm".to_string(),
            reference: "master".to_string(),
        },
        groups: vec![
            FileGroup {
                name: "util-src".to_string(),
                mode: GroupMode::Mirror,
                source_root: "uvvm_util/src".to_string(),
                source_patterns: vec!["*.vhd".to_string()],
                exclude: Vec::new(),
                target_root: "../src_util".to_string(),
                target_patterns: vec!["*.vhd".to_string()],
                flatten: true,
                purge: true,
            },
            FileGroup {
                name: "bfm-src".to_string(),
                mode: GroupMode::Match,
                source_root: ".".to_string(),
                source_patterns: vec!["bitvis_*/src/*_bfm_pkg.vhd".to_string()],
                exclude: Vec::new(),
                target_root: "../src_bfm".to_string(),
                target_patterns: vec!["*_bfm_pkg.vhd".to_string()],
                flatten: false,
                purge: false,
            },
        ],
        ambiguity: AmbiguityPolicy::Reject,
        harness: HarnessConfig {
            steps: Vec::new(),
            confirm_result: false,
        },
        cleanup: vec!["transcript".to_string(), "*.cf".to_string()],
        version: VersionConfig {
            file: "../src_util/methods_pkg.vhd".to_string(),
            marker: "C_UVVM_VERSION".to_string(),
        },
        publish: PublishConfig {
            user_name: "Release Bot".to_string(),
            user_email: "release@example.com".to_string(),
            remotes: vec![RemoteConfig {
                name: "github".to_string(),
                url: "git@github.com:org/light.git".to_string(),
                refspec: None,
            }],
            stage: vec!["../src_util/.".to_string(), "../src_bfm/.".to_string()],
            commit_template: "Light release {{version}}".to_string(),
            clean_untracked: false,
            delete_checkout: false,
        },
    }
}

/// Records every command and answers from a queue of canned outputs.
///
/// Commands beyond the queue succeed with empty output.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    commands: Mutex<Vec<CommandSpec>>,
    responses: Mutex<Vec<(String, CommandOutput)>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the first command whose rendering contains `needle`
    pub fn respond(&self, needle: &str, output: CommandOutput) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push((needle.to_string(), output));
        }
    }

    pub fn commands(&self) -> Vec<CommandSpec> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Rendered command lines, in execution order
    pub fn command_lines(&self) -> Vec<String> {
        self.commands().iter().map(|c| c.to_string()).collect()
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput, WorkflowError> {
        let line = spec.to_string();
        if let Ok(mut commands) = self.commands.lock() {
            commands.push(spec.clone());
        }

        let mut responses = match self.responses.lock() {
            Ok(responses) => responses,
            Err(_) => return Ok(CommandOutput::default()),
        };
        match responses.iter().position(|(needle, _)| line.contains(needle.as_str())) {
            Some(idx) => Ok(responses.remove(idx).1),
            None => Ok(CommandOutput::default()),
        }
    }
}
