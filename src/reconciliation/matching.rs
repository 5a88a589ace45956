//! File name matching between upstream candidates and distribution targets.
//!
//! The functions here are pure: they take path lists and return new ones,
//! leaving discovery and copying to the callers.

use super::entry::{base_filename, PathEntry};
use super::ReconcileError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Resolution rule when several candidates share a target's file name
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum AmbiguityPolicy {
    /// Fail with `AmbiguousMatch`
    #[default]
    Reject,
    /// Take the first candidate in candidate order
    FirstMatch,
}

/// A source file paired with the target it is copied over
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPair {
    pub source: PathEntry,
    pub target: PathEntry,
}

/// Positions of the candidates whose file name occurs among the reference
/// file names
fn membership_indices<C: AsRef<str>, R: AsRef<str>>(
    candidates: &[C],
    reference: &[R],
) -> Vec<usize> {
    let names: HashSet<&str> = reference.iter().map(|r| base_filename(r.as_ref())).collect();

    candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| names.contains(base_filename(c.as_ref())))
        .map(|(idx, _)| idx)
        .collect()
}

/// Keep the candidates whose file name occurs among the reference file
/// names, in their original order.
pub fn filter_by_filename_membership<C: AsRef<str>, R: AsRef<str>>(
    candidates: &[C],
    reference: &[R],
) -> Vec<String> {
    membership_indices(candidates, reference)
        .into_iter()
        .map(|idx| candidates[idx].as_ref().to_string())
        .collect()
}

fn lookup_index<S: AsRef<str>>(
    candidates: &[S],
    file_name: &str,
    policy: AmbiguityPolicy,
) -> Result<Option<usize>, ReconcileError> {
    let mut matches = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| base_filename(c.as_ref()) == file_name)
        .map(|(idx, _)| idx);

    let Some(first) = matches.next() else {
        return Ok(None);
    };

    if policy == AmbiguityPolicy::Reject {
        let rest: Vec<usize> = matches.collect();
        if !rest.is_empty() {
            let all = std::iter::once(first)
                .chain(rest)
                .map(|idx| candidates[idx].as_ref().to_string())
                .collect();
            return Err(ReconcileError::AmbiguousMatch {
                file_name: file_name.to_string(),
                candidates: all,
            });
        }
    }

    Ok(Some(first))
}

/// Find the candidate for one reference file name.
///
/// Returns `Ok(None)` when nothing matches.
pub fn lookup_candidate<'a, S: AsRef<str>>(
    candidates: &'a [S],
    file_name: &str,
    policy: AmbiguityPolicy,
) -> Result<Option<&'a str>, ReconcileError> {
    Ok(lookup_index(candidates, file_name, policy)?.map(move |idx| candidates[idx].as_ref()))
}

/// Position in `candidates` of the candidate for each reference entry
fn reorder_indices<C: AsRef<str>, R: AsRef<str>>(
    candidates: &[C],
    reference: &[R],
    policy: AmbiguityPolicy,
) -> Result<Vec<usize>, ReconcileError> {
    let mut order = Vec::with_capacity(reference.len());
    let mut missing = Vec::new();

    for target in reference {
        let target = target.as_ref();
        match lookup_index(candidates, base_filename(target), policy)? {
            Some(idx) => order.push(idx),
            None => missing.push(target.to_string()),
        }
    }

    if !missing.is_empty() {
        return Err(ReconcileError::Unmatched { targets: missing });
    }

    Ok(order)
}

/// Reorder `candidates` so position `i` holds the candidate for
/// `reference[i]`.
///
/// Every reference entry without a candidate is reported in a single
/// `Unmatched` error.
pub fn reorder_to_match<C: AsRef<str>, R: AsRef<str>>(
    candidates: &[C],
    reference: &[R],
    policy: AmbiguityPolicy,
) -> Result<Vec<String>, ReconcileError> {
    Ok(reorder_indices(candidates, reference, policy)?
        .into_iter()
        .map(|idx| candidates[idx].as_ref().to_string())
        .collect())
}

/// Fail with `CountMismatch` unless both lists have the same length
pub fn verify_one_to_one<C: AsRef<str>, R: AsRef<str>>(
    candidates: &[C],
    reference: &[R],
) -> Result<(), ReconcileError> {
    if candidates.len() != reference.len() {
        return Err(ReconcileError::CountMismatch {
            sources: candidates.iter().map(|c| c.as_ref().to_string()).collect(),
            targets: reference.iter().map(|r| r.as_ref().to_string()).collect(),
        });
    }
    Ok(())
}

/// Pair every target with its source: filter, reorder, verify.
///
/// Sources are carried through by position, so each pair holds the
/// discovered source entry itself.
pub fn reconcile(
    sources: &[PathEntry],
    targets: &[PathEntry],
    policy: AmbiguityPolicy,
) -> Result<Vec<MatchedPair>, ReconcileError> {
    let source_paths: Vec<&str> = sources.iter().map(|s| s.path.as_str()).collect();
    let target_paths: Vec<&str> = targets.iter().map(|t| t.path.as_str()).collect();

    let members: Vec<&PathEntry> = membership_indices(&source_paths, &target_paths)
        .into_iter()
        .map(|idx| &sources[idx])
        .collect();
    let member_paths: Vec<&str> = members.iter().map(|s| s.path.as_str()).collect();

    let ordered: Vec<&PathEntry> = reorder_indices(&member_paths, &target_paths, policy)?
        .into_iter()
        .map(|idx| members[idx])
        .collect();
    let ordered_paths: Vec<&str> = ordered.iter().map(|s| s.path.as_str()).collect();
    verify_one_to_one(&ordered_paths, &target_paths)?;

    Ok(ordered
        .into_iter()
        .zip(targets)
        .map(|(source, target)| MatchedPair {
            source: source.clone(),
            target: target.clone(),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_filter_keeps_order_and_members() {
        let candidates = strings(&[
            "up/bitvis_uart/src/uart_bfm_pkg.vhd",
            "up/bitvis_uart/src/uart_vvc.vhd",
            "up/bitvis_spi/src/spi_bfm_pkg.vhd",
            "up/bitvis_axi/src/axi_bfm_pkg.vhd",
        ]);
        let reference = strings(&["../src_bfm/spi_bfm_pkg.vhd", "../src_bfm/uart_bfm_pkg.vhd"]);

        let filtered = filter_by_filename_membership(&candidates, &reference);
        assert_eq!(
            filtered,
            strings(&["up/bitvis_uart/src/uart_bfm_pkg.vhd", "up/bitvis_spi/src/spi_bfm_pkg.vhd"])
        );
    }

    #[test]
    fn test_filter_with_backslash_reference() {
        let candidates = strings(&["up/a.vhd", "up/b.vhd"]);
        let reference = strings(&[r"..\src_bfm\b.vhd"]);
        assert_eq!(filter_by_filename_membership(&candidates, &reference), strings(&["up/b.vhd"]));
    }

    #[test]
    fn test_filter_keeps_duplicate_candidates() {
        let candidates = strings(&["x/a.vhd", "y/a.vhd", "z/b.vhd"]);
        let reference = strings(&["t/a.vhd", "u/a.vhd"]);
        assert_eq!(
            filter_by_filename_membership(&candidates, &reference),
            strings(&["x/a.vhd", "y/a.vhd"])
        );
    }

    #[test]
    fn test_reorder_aligns_to_reference() {
        let reference = strings(&["a.vhd", "b.vhd", "c.vhd"]);
        let candidates = strings(&["dir1/c.vhd", "dir2/a.vhd", "dir3/b.vhd"]);

        let reordered = reorder_to_match(&candidates, &reference, AmbiguityPolicy::Reject).unwrap();
        assert_eq!(reordered, strings(&["dir2/a.vhd", "dir3/b.vhd", "dir1/c.vhd"]));
    }

    #[test]
    fn test_reorder_reports_every_missing_target() {
        let reference = strings(&["t/a.vhd", "t/b.vhd", "t/c.vhd"]);
        let candidates = strings(&["s/b.vhd"]);

        let err = reorder_to_match(&candidates, &reference, AmbiguityPolicy::Reject).unwrap_err();
        match err {
            ReconcileError::Unmatched { targets } => {
                assert_eq!(targets, strings(&["t/a.vhd", "t/c.vhd"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_candidates_rejected() {
        let reference = strings(&["a.vhd"]);
        let candidates = strings(&["x/a.vhd", "y/a.vhd"]);

        let err = reorder_to_match(&candidates, &reference, AmbiguityPolicy::Reject).unwrap_err();
        match err {
            ReconcileError::AmbiguousMatch { file_name, candidates } => {
                assert_eq!(file_name, "a.vhd");
                assert_eq!(candidates, strings(&["x/a.vhd", "y/a.vhd"]));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_candidates_first_match_picks_first() {
        let reference = strings(&["a.vhd"]);
        let candidates = strings(&["x/a.vhd", "y/a.vhd"]);

        let reordered =
            reorder_to_match(&candidates, &reference, AmbiguityPolicy::FirstMatch).unwrap();
        assert_eq!(reordered, strings(&["x/a.vhd"]));
    }

    #[test]
    fn test_verify_count_mismatch_carries_both_lists() {
        let reference = strings(&["t/a.vhd", "t/b.vhd", "t/c.vhd"]);
        let candidates = strings(&["s/a.vhd", "s/b.vhd"]);

        let err = verify_one_to_one(&candidates, &reference).unwrap_err();
        match &err {
            ReconcileError::CountMismatch { sources, targets } => {
                assert_eq!(sources.len(), 2);
                assert_eq!(targets.len(), 3);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        let rendered = err.to_string();
        assert!(rendered.contains("Src 2:"));
        assert!(rendered.contains("Target 3:"));
        assert!(rendered.contains("t/c.vhd"));
    }

    #[test]
    fn test_verify_equal_lengths() {
        let reference = strings(&["t/a.vhd"]);
        let candidates = strings(&["s/a.vhd"]);
        assert!(verify_one_to_one(&candidates, &reference).is_ok());
    }

    #[test]
    fn test_reconcile_pairs_entries() {
        let sources = vec![
            PathEntry::new("up/bitvis_spi/src/spi_bfm_pkg.vhd", "up"),
            PathEntry::new("up/bitvis_uart/src/uart_vvc.vhd", "up"),
            PathEntry::new("up/bitvis_uart/src/uart_bfm_pkg.vhd", "up"),
        ];
        let targets = vec![
            PathEntry::new("light/src_bfm/uart_bfm_pkg.vhd", "light/src_bfm"),
            PathEntry::new("light/src_bfm/spi_bfm_pkg.vhd", "light/src_bfm"),
        ];

        let pairs = reconcile(&sources, &targets, AmbiguityPolicy::Reject).unwrap();
        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0].source.path, "up/bitvis_uart/src/uart_bfm_pkg.vhd");
        assert_eq!(pairs[0].target.path, "light/src_bfm/uart_bfm_pkg.vhd");
        assert_eq!(pairs[1].source.path, "up/bitvis_spi/src/spi_bfm_pkg.vhd");
        for pair in &pairs {
            assert_eq!(pair.source.file_name, pair.target.file_name);
        }
    }

    #[test]
    fn test_reconcile_keeps_discovered_source_entries() {
        let sources = vec![
            PathEntry::new("checkout/bitvis_uart/src/uart_bfm_pkg.vhd", "checkout"),
            PathEntry::new("checkout/bitvis_spi/src/spi_bfm_pkg.vhd", "checkout"),
        ];
        let targets = vec![
            PathEntry::new("light/src_bfm/spi_bfm_pkg.vhd", "light/src_bfm"),
            PathEntry::new("light/src_bfm/uart_bfm_pkg.vhd", "light/src_bfm"),
        ];

        let pairs = reconcile(&sources, &targets, AmbiguityPolicy::Reject).unwrap();
        assert_eq!(pairs[0].source, sources[1]);
        assert_eq!(pairs[1].source, sources[0]);
        for pair in &pairs {
            assert_eq!(pair.source.root, std::path::PathBuf::from("checkout"));
            assert!(pair.source.relative_path().is_some());
        }
    }

    #[test]
    fn test_reconcile_first_match_pairs_first_discovered() {
        let sources = vec![
            PathEntry::new("up/a/x.vhd", "up"),
            PathEntry::new("up/b/x.vhd", "up"),
        ];
        let targets = vec![PathEntry::new("light/x.vhd", "light")];

        let pairs = reconcile(&sources, &targets, AmbiguityPolicy::FirstMatch).unwrap();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].source, sources[0]);
    }

    #[test]
    fn test_lookup_candidate() {
        let candidates = strings(&["x/a.vhd", "y/b.vhd"]);
        assert_eq!(
            lookup_candidate(&candidates, "b.vhd", AmbiguityPolicy::Reject).unwrap(),
            Some("y/b.vhd")
        );
        assert_eq!(
            lookup_candidate(&candidates, "c.vhd", AmbiguityPolicy::Reject).unwrap(),
            None
        );
    }
}
