use super::discover::discover_all;
use super::entry::PathEntry;
use super::matching::{reconcile, AmbiguityPolicy, MatchedPair};
use super::ReconcileError;
use crate::config::{FileGroup, GroupMode, ReleaseConfig};
use crate::utils::{compute_file_hash, resolve_path};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// State of a target before the copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStatus {
    /// Target does not exist yet
    New,
    /// Target exists with different content
    Changed,
    /// Target already holds the source's bytes
    Unchanged,
}

/// A matched pair scheduled for copying
#[derive(Debug, Clone)]
pub struct PlannedCopy {
    pub pair: MatchedPair,
    pub status: CopyStatus,
}

/// The reconciled copies of one file group
#[derive(Debug, Clone)]
pub struct GroupPlan {
    pub name: String,
    pub mode: GroupMode,
    pub copies: Vec<PlannedCopy>,
    /// Existing targets without an upstream counterpart, to be purged
    pub stale: Vec<PathEntry>,
}

/// The reconciliation plan for a whole release
#[derive(Debug, Clone, Default)]
pub struct ReleasePlan {
    pub groups: Vec<GroupPlan>,
}

impl ReleasePlan {
    /// All matched pairs in group order
    pub fn pairs(&self) -> Vec<MatchedPair> {
        self.groups
            .iter()
            .flat_map(|g| g.copies.iter().map(|c| c.pair.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.groups.iter().map(|g| g.copies.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of copies with the given status
    pub fn count(&self, status: CopyStatus) -> usize {
        self.groups
            .iter()
            .flat_map(|g| &g.copies)
            .filter(|c| c.status == status)
            .count()
    }

    /// Stale targets of every group
    pub fn stale(&self) -> Vec<PathEntry> {
        self.groups.iter().flat_map(|g| g.stale.clone()).collect()
    }
}

/// Build the plan for every configured group, in configuration order.
///
/// `work_dir` anchors target roots; source roots are resolved inside the
/// upstream checkout. Fails with `DuplicateTarget` when two groups would
/// write the same file.
pub async fn build_release_plan(
    config: &ReleaseConfig,
    work_dir: &Path,
) -> Result<ReleasePlan, ReconcileError> {
    let checkout = resolve_path(work_dir, &config.upstream.checkout_dir);
    let mut plan = ReleasePlan::default();
    // Target path -> (group, source) of the copy that claimed it
    let mut claimed: HashMap<PathBuf, (String, String)> = HashMap::new();

    for group in &config.groups {
        let group_plan = plan_group(group, &checkout, work_dir, config.ambiguity)
            .await
            .map_err(|e| e.in_group(&group.name))?;

        for copy in &group_plan.copies {
            let target = copy.pair.target.as_path().to_path_buf();
            if let Some((first_group, first_source)) = claimed.get(&target) {
                return Err(ReconcileError::DuplicateTarget {
                    target: copy.pair.target.path.clone(),
                    first_group: first_group.clone(),
                    first_source: first_source.clone(),
                    second_group: group.name.clone(),
                    second_source: copy.pair.source.path.clone(),
                });
            }
            claimed.insert(target, (group.name.clone(), copy.pair.source.path.clone()));
        }

        info!(
            group = %group.name,
            files = group_plan.copies.len(),
            stale = group_plan.stale.len(),
            "Reconciled file group"
        );
        plan.groups.push(group_plan);
    }

    Ok(plan)
}

/// Discover and reconcile a single file group
pub async fn plan_group(
    group: &FileGroup,
    checkout: &Path,
    work_dir: &Path,
    policy: AmbiguityPolicy,
) -> Result<GroupPlan, ReconcileError> {
    let source_root = resolve_path(checkout, &group.source_root);
    let target_root = resolve_path(work_dir, &group.target_root);

    let sources = discover_all(&source_root, &group.source_patterns, &group.exclude)?;
    let existing = discover_all(&target_root, &group.target_patterns, &group.exclude)?;

    debug!(
        group = %group.name,
        sources = sources.len(),
        targets = existing.len(),
        "Discovered group files"
    );

    let pairs = match group.mode {
        GroupMode::Match => reconcile(&sources, &existing, policy)?,
        GroupMode::Mirror => mirror_pairs(&sources, &target_root, group.flatten, policy)?,
    };

    let stale = if group.purge && group.mode == GroupMode::Mirror {
        let planned: HashSet<PathBuf> = pairs.iter().map(|p| p.target.as_path().to_path_buf()).collect();
        existing
            .into_iter()
            .filter(|e| !planned.contains(e.as_path()))
            .collect()
    } else {
        Vec::new()
    };

    let mut copies = Vec::with_capacity(pairs.len());
    for pair in pairs {
        let status = copy_status(&pair).await?;
        copies.push(PlannedCopy { pair, status });
    }

    Ok(GroupPlan {
        name: group.name.clone(),
        mode: group.mode,
        copies,
        stale,
    })
}

/// Derive a target for every source by re-rooting it under `target_root`.
fn mirror_pairs(
    sources: &[PathEntry],
    target_root: &Path,
    flatten: bool,
    policy: AmbiguityPolicy,
) -> Result<Vec<MatchedPair>, ReconcileError> {
    let mut claimed: HashMap<PathBuf, &PathEntry> = HashMap::new();
    let mut pairs = Vec::with_capacity(sources.len());

    for source in sources {
        let relative = match source.relative_path() {
            Some(relative) if !flatten => relative.to_path_buf(),
            _ => PathBuf::from(&source.file_name),
        };
        let target_path = target_root.join(relative);

        if let Some(previous) = claimed.get(&target_path) {
            match policy {
                AmbiguityPolicy::Reject => {
                    return Err(ReconcileError::AmbiguousMatch {
                        file_name: source.file_name.clone(),
                        candidates: vec![previous.path.clone(), source.path.clone()],
                    });
                }
                AmbiguityPolicy::FirstMatch => {
                    debug!(source = %source.path, "Target already claimed, skipping");
                    continue;
                }
            }
        }

        claimed.insert(target_path.clone(), source);
        pairs.push(MatchedPair {
            source: source.clone(),
            target: PathEntry::from_path(&target_path, target_root),
        });
    }

    Ok(pairs)
}

async fn copy_status(pair: &MatchedPair) -> Result<CopyStatus, ReconcileError> {
    let target = pair.target.as_path();
    if !target.is_file() {
        return Ok(CopyStatus::New);
    }

    let source_hash = compute_file_hash(pair.source.as_path()).await?;
    let target_hash = compute_file_hash(target).await?;

    Ok(if source_hash == target_hash {
        CopyStatus::Unchanged
    } else {
        CopyStatus::Changed
    })
}
