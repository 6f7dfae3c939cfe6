//! Branch policy for production deploys.

use std::path::Path;
use std::process::Command;

use marquee_config::DeploymentTarget;

/// The only branch production may be deployed from without confirmation.
pub const STABLE_BRANCH: &str = "stable";

/// Answers that confirm a production deploy from another branch.
pub const ACCEPTED_ANSWERS: &[&str] = &["y", "Y", "yes", "Yes", "buzz off", "screw you"];

/// Whether deploying `branch` to `target` needs an explicit confirmation.
#[must_use]
pub fn needs_confirmation(target: DeploymentTarget, branch: &str) -> bool {
    target == DeploymentTarget::Production && branch != STABLE_BRANCH
}

/// Whether `answer` confirms the deploy. Surrounding whitespace is ignored.
#[must_use]
pub fn is_accepted(answer: &str) -> bool {
    ACCEPTED_ANSWERS.contains(&answer.trim())
}

/// Question shown before deploying a non-stable branch to production.
#[must_use]
pub fn confirmation_prompt(branch: &str) -> String {
    format!(
        "You are trying to deploy the '{branch}' branch to production.\n\
         You should really only deploy a {STABLE_BRANCH} branch.\n\
         Do you know what you're doing?"
    )
}

/// Name of the branch checked out in `dir`, if it is a git work tree.
#[must_use]
pub fn current_branch(dir: &Path) -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--abbrev-ref", "HEAD"])
        .current_dir(dir)
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let branch = String::from_utf8_lossy(&output.stdout).trim().to_owned();
    (!branch.is_empty()).then_some(branch)
}
