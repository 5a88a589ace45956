use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use light_release::config::{read_config, write_config, ReleaseConfig};
use light_release::utils::get_config_path;
use light_release::workflow::{render_plan, ReleaseOptions};
use light_release::{
    AutoConfirm, CommandExecutor, ConfirmationGate, DryRunExecutor, PromptGate, ReleaseWorkflow,
    SystemExecutor,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Light Release - publish a light distribution cut from its full upstream repository
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Release configuration file, relative to the current directory
    /// (defaults to release.json in the work dir)
    #[arg(short, long, env = "LIGHT_RELEASE_CONFIG")]
    config: Option<PathBuf>,

    /// Directory the release runs from; relative paths in the
    /// configuration are resolved against it
    #[arg(short = 'C', long, env = "LIGHT_RELEASE_WORK_DIR")]
    work_dir: Option<PathBuf>,

    /// Debug logging (overridden by RUST_LOG)
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconcile the file groups and print the copy plan
    Plan {
        /// Use the upstream checkout as it is
        #[arg(long)]
        skip_sync: bool,
    },
    /// Reconcile and copy, without testing or publishing
    Sync {
        #[arg(long)]
        skip_sync: bool,
        /// Answer yes to every confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Run the full release: sync, copy, test, clean up, publish
    Release {
        #[arg(short, long)]
        yes: bool,
        /// Log git and simulator commands instead of running them
        #[arg(long)]
        dry_run: bool,
        #[arg(long)]
        skip_sync: bool,
        #[arg(long)]
        skip_harness: bool,
        #[arg(long)]
        skip_publish: bool,
        /// Commit message, instead of the configured template
        #[arg(short, long)]
        message: Option<String>,
    },
    /// Print the release version found in the distribution tree
    Version,
    /// Write the default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if args.verbose { "debug" } else { "info" }));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to initialize logging: {e}");
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Release aborted");
            eprintln!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (work_dir, config_path) =
        resolve_invocation_paths(&cwd, args.work_dir.as_deref(), args.config.as_deref());

    if let Command::Init { force } = args.command {
        if config_path.exists() && !force {
            anyhow::bail!("{} already exists (use --force)", config_path.display());
        }
        write_config(&config_path, &ReleaseConfig::default()).await?;
        info!(path = %config_path.display(), "Wrote default configuration");
        return Ok(());
    }

    let config = match read_config(&config_path)
        .await
        .with_context(|| format!("Failed to load {}", config_path.display()))?
    {
        Some(config) => config,
        None => {
            warn!(path = %config_path.display(), "No configuration file, using defaults");
            ReleaseConfig::default()
        }
    };

    let (dry_run, yes) = match &args.command {
        Command::Release { dry_run, yes, .. } => (*dry_run, *yes),
        Command::Sync { yes, .. } => (false, *yes),
        _ => (false, false),
    };
    let executor: Arc<dyn CommandExecutor> = if dry_run {
        Arc::new(DryRunExecutor)
    } else {
        Arc::new(SystemExecutor)
    };
    let gate: Arc<dyn ConfirmationGate> = if yes {
        Arc::new(AutoConfirm(true))
    } else {
        Arc::new(PromptGate)
    };

    let workflow = ReleaseWorkflow::new(config, work_dir, executor, gate);

    match args.command {
        Command::Plan { skip_sync } => {
            if !skip_sync {
                workflow.sync().await?;
            }
            let plan = workflow.plan().await?;
            println!("{}", render_plan(&plan));
        }
        Command::Sync { skip_sync, .. } => {
            if !skip_sync {
                workflow.sync().await?;
            }
            let plan = workflow.plan().await?;
            println!("{}", render_plan(&plan));
            let result = workflow.apply(&plan).await?;
            println!(
                "Copied {} file(s), {} unchanged, {} removed",
                result.copied.len(),
                result.unchanged.len(),
                result.purged.len()
            );
        }
        Command::Release {
            skip_sync,
            skip_harness,
            skip_publish,
            message,
            ..
        } => {
            let options = ReleaseOptions {
                skip_sync,
                skip_harness,
                skip_publish,
                message,
            };
            let summary = workflow.run(&options).await?;

            println!("{}", "=".repeat(74));
            println!(
                " RELEASE DONE: {} file(s) copied, version {}{}",
                summary.execution.copied.len(),
                summary.version.as_deref().unwrap_or("unknown"),
                if summary.published { ", published" } else { "" }
            );
        }
        Command::Version => {
            println!("{}", workflow.version().await?);
        }
        // Handled before the configuration is loaded
        Command::Init { .. } => {}
    }

    Ok(())
}

/// Work dir and configuration file for this invocation. Both explicit
/// paths are taken relative to the current directory.
fn resolve_invocation_paths(
    cwd: &Path,
    work_dir: Option<&Path>,
    config: Option<&Path>,
) -> (PathBuf, PathBuf) {
    let work_dir = match work_dir {
        Some(dir) => cwd.join(dir),
        None => cwd.to_path_buf(),
    };
    let config_path = match config {
        Some(path) => cwd.join(path),
        None => get_config_path(&work_dir),
    };
    (work_dir, config_path)
}
