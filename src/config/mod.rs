use crate::reconciliation::AmbiguityPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tokio::fs;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid file group '{0}': {1}")]
    InvalidGroup(String, String),
}

/// Upstream repository the light distribution is cut from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct UpstreamConfig {
    pub url: String,
    /// Checkout directory, relative to the work dir
    pub checkout_dir: String,
    /// Branch or tag checked out after clone/pull
    pub reference: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            url: "git@github.com:UVVM/UVVM.git".to_string(),
            checkout_dir: "uvvm".to_string(),
            reference: "master".to_string(),
        }
    }
}

/// How the targets of a file group are determined
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupMode {
    /// Targets are discovered in the distribution tree and sources are
    /// matched to them by file name.
    Match,
    /// Targets are derived from the sources by re-rooting them under the
    /// target directory.
    #[default]
    Mirror,
}

/// A set of files copied from the upstream checkout into the distribution
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FileGroup {
    pub name: String,
    #[serde(default)]
    pub mode: GroupMode,
    /// Root of the source patterns, relative to the upstream checkout
    #[serde(default = "default_root")]
    pub source_root: String,
    pub source_patterns: Vec<String>,
    /// File name patterns dropped from discovery results
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclude: Vec<String>,
    /// Root of the targets, relative to the work dir
    pub target_root: String,
    /// Patterns discovering existing targets. Required in match mode,
    /// used for purging in mirror mode.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub target_patterns: Vec<String>,
    /// Mirror mode: drop the source directory structure
    #[serde(default)]
    pub flatten: bool,
    /// Mirror mode: delete targets with no upstream counterpart
    #[serde(default)]
    pub purge: bool,
}

fn default_root() -> String {
    ".".to_string()
}

impl FileGroup {
    /// Check that the group can be planned
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_patterns.is_empty() {
            return Err(ConfigError::InvalidGroup(
                self.name.clone(),
                "no source patterns".to_string(),
            ));
        }
        if self.mode == GroupMode::Match && self.target_patterns.is_empty() {
            return Err(ConfigError::InvalidGroup(
                self.name.clone(),
                "match mode needs target patterns".to_string(),
            ));
        }
        if self.purge && self.target_patterns.is_empty() {
            return Err(ConfigError::InvalidGroup(
                self.name.clone(),
                "purge needs target patterns".to_string(),
            ));
        }
        Ok(())
    }
}

/// One command of the simulation smoke test
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HarnessStep {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Working directory, relative to the work dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Regex whose first capture group is the number of passing tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passed_pattern: Option<String>,
    /// Regex whose first capture group is the number of failing tests
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed_pattern: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct HarnessConfig {
    pub steps: Vec<HarnessStep>,
    /// Ask for a human verdict after the steps ran
    pub confirm_result: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            steps: vec![
                HarnessStep {
                    name: "compile script".to_string(),
                    program: "sh".to_string(),
                    args: vec!["../script/compile.sh".to_string()],
                    cwd: None,
                    passed_pattern: None,
                    failed_pattern: None,
                },
                HarnessStep {
                    name: "demo testbench".to_string(),
                    program: "vsim".to_string(),
                    args: vec![
                        "-c".to_string(),
                        "-do".to_string(),
                        "do ../sim/compile_and_run_demo_tb.do; exit".to_string(),
                    ],
                    cwd: None,
                    passed_pattern: None,
                    failed_pattern: Some(r"Errors:\s*([1-9]\d*)".to_string()),
                },
            ],
            confirm_result: false,
        }
    }
}

/// Where the release version is read from
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct VersionConfig {
    /// File scanned for the marker, relative to the work dir
    pub file: String,
    pub marker: String,
}

impl Default for VersionConfig {
    fn default() -> Self {
        Self {
            file: "../src_util/methods_pkg.vhd".to_string(),
            marker: "C_UVVM_VERSION".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RemoteConfig {
    pub name: String,
    pub url: String,
    /// Refspec pushed to this remote; the current branch when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refspec: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PublishConfig {
    pub user_name: String,
    pub user_email: String,
    pub remotes: Vec<RemoteConfig>,
    /// Paths staged before `git add -u`, relative to the work dir
    pub stage: Vec<String>,
    /// Handlebars template with `{{version}}` and `{{date}}`
    pub commit_template: String,
    /// Run `git clean -fdx` before committing
    pub clean_untracked: bool,
    /// Delete the upstream checkout before staging
    pub delete_checkout: bool,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            user_name: "UVVM".to_string(),
            user_email: "info@bitvis.no".to_string(),
            remotes: vec![
                RemoteConfig {
                    name: "uvvm_light_remote".to_string(),
                    url: "git@github.com:UVVM/UVVM_Light.git".to_string(),
                    refspec: None,
                },
                RemoteConfig {
                    name: "uvvm_light_backup_remote".to_string(),
                    url: "git@github.com:UVVM/UVVM_Light_internal.git".to_string(),
                    refspec: None,
                },
            ],
            stage: [
                "../src_bfm/.",
                "../src_util/.",
                "../doc/.",
                "../script/.",
                "../release/.",
                "../demo_tb/.",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            commit_template:
                "Updated to UVVM Light version {{version}} - Please see CHANGES.TXT for details."
                    .to_string(),
            clean_untracked: true,
            delete_checkout: true,
        }
    }
}

/// Release configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ReleaseConfig {
    pub upstream: UpstreamConfig,
    pub groups: Vec<FileGroup>,
    /// What to do when several sources share a target's file name
    pub ambiguity: AmbiguityPolicy,
    pub harness: HarnessConfig,
    /// Simulation artifacts removed after the smoke test (glob patterns,
    /// relative to the work dir)
    pub cleanup: Vec<String>,
    pub version: VersionConfig,
    pub publish: PublishConfig,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig::default(),
            groups: default_groups(),
            ambiguity: AmbiguityPolicy::default(),
            harness: HarnessConfig::default(),
            cleanup: [
                "hdlregression",
                "modelsim.ini",
                "transcript",
                "*.cf",
                "uvvm_util",
                "../sim/uvvm_util",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            version: VersionConfig::default(),
            publish: PublishConfig::default(),
        }
    }
}

impl ReleaseConfig {
    /// Check every file group
    pub fn validate(&self) -> Result<(), ConfigError> {
        for group in &self.groups {
            group.validate()?;
        }
        Ok(())
    }
}

/// The UVVM Light layout: utility library mirrored, BFMs matched against
/// the BFM files the distribution already ships.
fn default_groups() -> Vec<FileGroup> {
    vec![
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
            name: "util-doc".to_string(),
            mode: GroupMode::Mirror,
            source_root: "uvvm_util/doc".to_string(),
            source_patterns: vec!["*.pdf".to_string(), "*.pps".to_string()],
            exclude: Vec::new(),
            target_root: "../doc".to_string(),
            target_patterns: Vec::new(),
            flatten: true,
            purge: false,
        },
        FileGroup {
            name: "bfm-src".to_string(),
            mode: GroupMode::Match,
            source_root: ".".to_string(),
            source_patterns: vec!["bitvis_*/src/*bfm*.vhd".to_string()],
            exclude: vec!["*_tb.vhd".to_string()],
            target_root: "../src_bfm".to_string(),
            target_patterns: vec!["*.vhd".to_string()],
            flatten: false,
            purge: false,
        },
        FileGroup {
            name: "doc-tree".to_string(),
            mode: GroupMode::Mirror,
            source_root: "doc".to_string(),
            source_patterns: vec!["**/*.*".to_string()],
            exclude: Vec::new(),
            target_root: "../doc".to_string(),
            target_patterns: Vec::new(),
            flatten: false,
            purge: false,
        },
    ]
}

/// Read the configuration file
pub async fn read_config(config_path: &Path) -> Result<Option<ReleaseConfig>, ConfigError> {
    if !config_path.exists() {
        return Ok(None);
    }

    let content = fs::read_to_string(config_path).await?;
    let config: ReleaseConfig = serde_json::from_str(&content)?;
    config.validate()?;
    Ok(Some(config))
}

/// Write the configuration file
pub async fn write_config(config_path: &Path, config: &ReleaseConfig) -> Result<(), ConfigError> {
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    fs::write(config_path, content).await?;
    Ok(())
}
