use super::executor::{execute, CommandExecutor, CommandSpec};
use super::WorkflowError;
use crate::config::PublishConfig;
use crate::template::{CommitMessageContext, TemplateEngine};
use std::path::Path;
use tracing::info;

/// Render the commit message for a release
pub fn build_commit_message(
    publish: &PublishConfig,
    version: &str,
    date: &str,
) -> Result<String, WorkflowError> {
    let context = CommitMessageContext {
        version: version.to_string(),
        date: date.to_string(),
    };
    Ok(TemplateEngine::new().render_commit_message(&publish.commit_template, &context)?)
}

/// Stage, commit and push the distribution tree to every remote.
///
/// Adding a remote that already exists and committing with nothing to
/// commit are both tolerated.
pub async fn publish_release(
    executor: &dyn CommandExecutor,
    publish: &PublishConfig,
    work_dir: &Path,
    message: &str,
) -> Result<(), WorkflowError> {
    let git = |args: Vec<&str>| CommandSpec::new("git", args).in_dir(work_dir);

    info!("Setting up remotes");
    for remote in &publish.remotes {
        execute(
            executor,
            &git(vec!["remote", "add", remote.name.as_str(), remote.url.as_str()]).allow_fail(),
        )
        .await?;
    }

    info!(user = %publish.user_name, "Setting up git user");
    execute(executor, &git(vec!["config", "user.name", publish.user_name.as_str()])).await?;
    execute(executor, &git(vec!["config", "user.email", publish.user_email.as_str()])).await?;

    info!("Adding files and committing");
    for path in &publish.stage {
        execute(executor, &git(vec!["add", path.as_str()])).await?;
    }
    execute(executor, &git(vec!["add", "-u"])).await?;
    if publish.clean_untracked {
        execute(executor, &git(vec!["clean", "-fdx"])).await?;
    }
    execute(executor, &git(vec!["commit", "-m", message]).allow_fail()).await?;

    for remote in &publish.remotes {
        info!(remote = %remote.name, "Pushing");
        let mut args = vec!["push", remote.name.as_str()];
        if let Some(refspec) = &remote.refspec {
            args.push(refspec.as_str());
        }
        execute(executor, &git(args)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RemoteConfig;
    use crate::workflow::executor::CommandOutput;
    use crate::workflow::testing::RecordingExecutor;

    fn publish_config() -> PublishConfig {
        PublishConfig {
            user_name: "Release Bot".to_string(),
            user_email: "release@example.com".to_string(),
            remotes: vec![
                RemoteConfig {
                    name: "github".to_string(),
                    url: "git@github.com:org/light.git".to_string(),
                    refspec: Some("public:master".to_string()),
                },
                RemoteConfig {
                    name: "backup".to_string(),
                    url: "git@example.com:org/light.git".to_string(),
                    refspec: None,
                },
            ],
            stage: vec!["../src_bfm/.".to_string()],
            commit_template: "Release {{version}} ({{date}})".to_string(),
            clean_untracked: true,
            delete_checkout: false,
        }
    }

    #[test]
    fn test_build_commit_message() {
        let message = build_commit_message(&publish_config(), "v2 2024.03.07", "2024.03.08").unwrap();
        assert_eq!(message, "Release v2 2024.03.07 (2024.03.08)");
    }

    #[tokio::test]
    async fn test_publish_command_sequence() {
        let executor = RecordingExecutor::new();
        publish_release(&executor, &publish_config(), Path::new("/light/release"), "Release v2")
            .await
            .unwrap();

        assert_eq!(
            executor.command_lines(),
            vec![
                "git remote add github git@github.com:org/light.git",
                "git remote add backup git@example.com:org/light.git",
                "git config user.name \"Release Bot\"",
                "git config user.email release@example.com",
                "git add ../src_bfm/.",
                "git add -u",
                "git clean -fdx",
                "git commit -m \"Release v2\"",
                "git push github public:master",
                "git push backup",
            ]
        );
        assert!(executor
            .commands()
            .iter()
            .all(|c| c.cwd.as_deref() == Some(Path::new("/light/release"))));
    }

    #[tokio::test]
    async fn test_existing_remote_and_empty_commit_tolerated() {
        let executor = RecordingExecutor::new();
        executor.respond(
            "remote add github",
            CommandOutput {
                stdout: "error: remote github already exists.".to_string(),
                exit_code: 3,
            },
        );
        executor.respond(
            "commit -m",
            CommandOutput {
                stdout: "nothing to commit".to_string(),
                exit_code: 1,
            },
        );

        let result =
            publish_release(&executor, &publish_config(), Path::new("/light"), "Release").await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_push_failure_aborts() {
        let executor = RecordingExecutor::new();
        executor.respond(
            "push github",
            CommandOutput {
                stdout: "rejected".to_string(),
                exit_code: 1,
            },
        );

        let result =
            publish_release(&executor, &publish_config(), Path::new("/light"), "Release").await;
        assert!(matches!(result, Err(WorkflowError::CommandFailed { .. })));
        assert!(!executor.command_lines().iter().any(|l| l == "git push backup"));
    }
}
