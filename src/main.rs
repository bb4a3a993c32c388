use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use repowarden::audit::AuditHandler;
use repowarden::collaborators::CollaboratorsHandler;
use repowarden::merge::MergeHandler;
use repowarden::protect::ProtectHandler;
use repowarden::reconcile::{MergeMethods, TierFlags};
use repowarden::release::ReleaseHandler;
use repowarden::selector;
use repowarden::{CliOverrides, Config, FileConfig, GitHubClient, RepoHandler};

#[derive(Parser)]
#[command(name = "repowarden")]
#[command(about = "Audit and reconcile GitHub repository configuration")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// GitHub API token (defaults to the GITHUB_TOKEN environment variable)
    #[arg(short, long, global = true)]
    token: Option<String>,

    /// GitHub Enterprise base URL
    #[arg(short, long, global = true)]
    url: Option<String>,

    /// Organization to include (repeatable)
    #[arg(short, long = "org", global = true)]
    org: Vec<String>,

    /// Exclude the current user's own repositories
    #[arg(long, global = true)]
    nouser: bool,

    /// Target a single repository as owner/name
    #[arg(short, long, global = true)]
    repo: Option<String>,

    /// Report decisions without issuing mutations
    #[arg(short, long, global = true)]
    dry_run: bool,

    /// Emit structured JSON output
    #[arg(long, global = true)]
    json: bool,

    /// Configuration file path (defaults to XDG config location)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Audit collaborators, branches, hooks, deploy keys etc.
    Audit,

    /// Add a collaborator to all the repositories
    Collaborators {
        /// Login of the collaborator to add
        login: String,

        /// Collaborator can pull, push and administer the repository
        #[arg(long)]
        admin: bool,

        /// Collaborator can pull and push, but not administer
        #[arg(long)]
        push: bool,

        /// Collaborator can pull, but not push or administer
        #[arg(long)]
        pull: bool,
    },

    /// Report repositories whose allowed merge methods differ
    Merge {
        /// Allow merge commits
        #[arg(long)]
        commits: bool,

        /// Allow squash merging
        #[arg(long)]
        squash: bool,

        /// Allow rebase merging
        #[arg(long)]
        rebase: bool,
    },

    /// Protect the master branch
    Protect {
        /// Require pull request reviews before merging
        #[arg(long)]
        review: bool,
    },

    /// Rewrite release notes with install instructions
    Release {
        /// Rewrite every release instead of only the most recent
        #[arg(long)]
        all: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;
    info!("Starting RepoWarden v{}", env!("CARGO_PKG_VERSION"));

    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::load_default()?,
    };
    let overrides = CliOverrides {
        token: cli.token,
        url: cli.url,
        orgs: cli.org,
        nouser: cli.nouser,
        repo: cli.repo,
        dry_run: cli.dry_run,
        json: cli.json,
    };
    let config = Config::resolve(overrides, file)?;

    spawn_signal_listener();

    let client = GitHubClient::new(&config.token, &config.api_root())?;

    let handler: Box<dyn RepoHandler> = match cli.command {
        Commands::Audit => Box::new(AuditHandler::new(config.json)),
        Commands::Collaborators {
            login,
            admin,
            push,
            pull,
        } => Box::new(CollaboratorsHandler::new(
            &login,
            TierFlags { admin, push, pull },
            config.dry_run,
        )?),
        Commands::Merge {
            commits,
            squash,
            rebase,
        } => Box::new(MergeHandler::new(MergeMethods {
            commits,
            squash,
            rebase,
        })?),
        Commands::Protect { review } => Box::new(ProtectHandler::new(review, config.dry_run)),
        Commands::Release { all } => Box::new(ReleaseHandler::new(all, config.dry_run)),
    };

    selector::run(&client, &config, handler.as_ref()).await?;

    Ok(())
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    Ok(())
}

/// Spawn the interrupt listener. Cancellation is coarse: the process exits
/// immediately rather than unwinding in-flight work.
fn spawn_signal_listener() {
    tokio::spawn(async {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            match signal(SignalKind::terminate()) {
                Ok(mut term) => {
                    tokio::select! {
                        _ = tokio::signal::ctrl_c() => {}
                        _ = term.recv() => {}
                    }
                }
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                }
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }

        info!("Received interrupt, exiting");
        std::process::exit(130);
    });
}
