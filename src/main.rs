//! monorel - CLI entry point.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use monorel::changelog::{summarize, write_changelog_file};
use monorel::config::{CONFIG_FILE_NAME, find_and_load_config_from, load_config, write_starter_config};
use monorel::git::GitRepo;
use monorel::release::{apply_release, prepare_release, render_options};
use monorel::{Config, Workspace};

/// Compute per-package releases and changelogs from conventional commits.
#[derive(Parser, Debug)]
#[command(name = "monorel")]
#[command(about = "Compute per-package releases and changelogs from conventional commits")]
#[command(version)]
struct Cli {
    /// Path to the configuration file (defaults to searching upwards for release.config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Plan a release for the commits in FROM..TO
    Release {
        /// Start of commit range (tag, commit hash, or branch), exclusive
        #[arg(long)]
        from: String,

        /// End of commit range (defaults to HEAD)
        #[arg(long, default_value = "HEAD")]
        to: String,

        /// Print the bumps as JSON instead of the changelog
        #[arg(long)]
        json: bool,

        /// Also write the changelog to this file
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Write new versions and package changelogs into the workspace
        #[arg(long)]
        write: bool,

        /// Skip the confirmation prompt for --write
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Create a starter release.config.json in the current directory
    Init {
        /// GitHub repository as owner/name
        #[arg(long, default_value = "owner/name")]
        repository: String,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Command::Release {
            from,
            to,
            json,
            output,
            write,
            yes,
        } => {
            run_release(
                cli.config.as_deref(),
                ReleaseArgs {
                    from,
                    to,
                    json,
                    output,
                    write,
                    yes,
                },
            )
            .await
        }
        Command::Init { repository, force } => run_init(&repository, force),
    }
}

struct ReleaseArgs {
    from: String,
    to: String,
    json: bool,
    output: Option<PathBuf>,
    write: bool,
    yes: bool,
}

async fn run_release(config_path: Option<&Path>, args: ReleaseArgs) -> Result<()> {
    // Step 1: Load configuration; the workspace root is the directory holding it
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let (config, root) = resolve_config(config_path, &cwd)?;
    let workspace = Workspace::new(&root);
    let release_config = &config.release;

    // Step 2: Open git repository
    let executor = Arc::new(
        GitRepo::discover(&root)
            .context("Not a git repository. Run monorel from within a git repository.")?,
    );

    // Step 3: Plan the release
    let date = Utc::now().date_naive();
    let context = prepare_release(
        executor,
        &args.from,
        &args.to,
        release_config,
        &workspace,
        date,
    )
    .await
    .context("Failed to plan release")?;

    for failure in &context.failures {
        error!("{}", failure);
    }

    // Step 4: Print or persist the plan
    if args.json {
        let json = serde_json::to_string_pretty(&context.bumps)
            .context("Failed to serialize bumps")?;
        println!("{}", json);
    } else {
        print!("{}", context.changelog);
    }

    if let Some(path) = &args.output {
        write_changelog_file(path, &context.changelog)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        info!("Wrote changelog to {}", path.display());
    }

    info!("{}", summarize(&context.bumps));

    if context.has_failures() {
        if args.write {
            error!("Refusing to write a release while packages failed");
        }
        bail!(
            "{} package(s) could not be released",
            context.failures.len()
        );
    }

    if !args.write || context.is_noop() {
        return Ok(());
    }

    // Step 5: Confirm and write
    if !args.yes {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Write {} package release(s) to {}?",
                context.bumps.len(),
                root.display()
            ))
            .default(true)
            .interact()
            .context("Failed to read confirmation")?;

        if !confirmed {
            println!("Aborted. Nothing written.");
            return Ok(());
        }
    }

    let written = apply_release(&workspace, &context, &render_options(release_config, date))
        .context("Failed to write release")?;
    info!("Updated {} files", written.len());

    Ok(())
}

/// Load the configuration and return it with the workspace root.
fn resolve_config(config_path: Option<&Path>, cwd: &Path) -> Result<(Config, PathBuf)> {
    match config_path {
        Some(path) => {
            let config = load_config(path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            let root = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf());
            Ok((config, root))
        }
        None => {
            let config = find_and_load_config_from(cwd).with_context(|| {
                format!("Failed to load {}. Run `monorel init` to create one.", CONFIG_FILE_NAME)
            })?;
            let root = cwd
                .ancestors()
                .find(|dir| dir.join(CONFIG_FILE_NAME).exists())
                .map(Path::to_path_buf)
                .unwrap_or_else(|| cwd.to_path_buf());
            Ok((config, root))
        }
    }
}

fn run_init(repository: &str, force: bool) -> Result<()> {
    let cwd = std::env::current_dir().context("Failed to read current directory")?;
    let path = write_starter_config(&cwd, repository, force)
        .context("Failed to create configuration")?;
    println!("Created {}", path.display());
    Ok(())
}
