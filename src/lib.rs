pub mod config;
pub mod reconciliation;
pub mod template;
pub mod utils;
pub mod version;
pub mod workflow;

// Re-export commonly used types
pub use config::{ConfigError, FileGroup, GroupMode, ReleaseConfig};
pub use reconciliation::{
    base_filename, build_release_plan, copy_pairs, filter_by_filename_membership, reconcile,
    reorder_to_match, verify_one_to_one, AmbiguityPolicy, MatchedPair, PathEntry, ReconcileError,
    ReleasePlan,
};
pub use template::{CommitMessageContext, TemplateEngine, TemplateError};
pub use version::{find_version_tag, VersionError};
pub use workflow::{
    AutoConfirm, CommandExecutor, ConfirmationGate, DryRunExecutor, PromptGate, ReleaseOptions,
    ReleaseSummary, ReleaseWorkflow, SystemExecutor, WorkflowError,
};
