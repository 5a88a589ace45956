use crate::reconciliation::{CopyStatus, ReleasePlan};
use std::fmt::Write;

fn status_label(status: CopyStatus) -> &'static str {
    match status {
        CopyStatus::New => "new",
        CopyStatus::Changed => "changed",
        CopyStatus::Unchanged => "unchanged",
    }
}

/// Render the plan as the numbered listing shown before copying
pub fn render_plan(plan: &ReleasePlan) -> String {
    let mut out = String::new();

    let _ = writeln!(
        out,
        " - Files found: {} ({} new, {} changed, {} unchanged)",
        plan.len(),
        plan.count(CopyStatus::New),
        plan.count(CopyStatus::Changed),
        plan.count(CopyStatus::Unchanged)
    );

    let mut idx = 0;
    for group in &plan.groups {
        let _ = writeln!(out, "[{}] {} file(s)", group.name, group.copies.len());
        for copy in &group.copies {
            let _ = writeln!(
                out,
                "({idx}) {}   << ---- >>   {} [{}]",
                copy.pair.source,
                copy.pair.target,
                status_label(copy.status)
            );
            idx += 1;
        }
        for stale in &group.stale {
            let _ = writeln!(out, "    remove {stale}");
        }
    }

    out
}
