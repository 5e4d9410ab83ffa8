//! CLI for backport-bot.
//!
//! Backports a merged pull request onto release branches, then files a
//! tracking issue and a pull request per branch.

use backport_bot::{BackportConfig, BackportError, BackportReport, BackportRequest, Runner};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Backport a merged pull request onto one or more branches.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Pull request URL (https://<host>/<owner>/<repo>/pull/<number>).
    pr_url: String,

    /// Branches to backport onto.
    #[arg(required = true)]
    targets: Vec<String>,

    /// Path to the configuration file.
    #[arg(long, default_value = "backport.toml")]
    config: PathBuf,

    /// GitHub Personal Access Token.
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: String,

    /// Directory holding repository checkouts (overrides the config file).
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Inspect and plan without changing anything.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    // octocrab reaches GitHub through rustls
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    let args = Args::parse();

    match run(args).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::from(0)
        }
        Err(e) if e.is_validation() || matches!(e, BackportError::Publish { .. }) => {
            error!(error = %e, "Backport failed");
            ExitCode::from(1)
        }
        Err(e) => {
            error!(error = %e, "Critical failure");
            ExitCode::from(2)
        }
    }
}

/// Initializes tracing with environment filter support.
///
/// Sets up the global tracing subscriber with:
/// - Compact log formatting (single-line output)
/// - Log level filtering via `RUST_LOG` env var (defaults to "info")
fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().compact().with_target(false))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}

/// Main execution logic.
async fn run(args: Args) -> Result<BackportReport, BackportError> {
    let request = BackportRequest::new(&args.pr_url, args.targets)?;

    let mut config = BackportConfig::load(&args.config)?;
    if let Some(workdir) = args.workdir {
        config.workdir = workdir;
    }

    let runner = Runner::from_config(
        &config,
        &request.pull_request.repository,
        &args.token,
        args.dry_run,
    )?;
    runner.run(&request).await
}

/// Prints the final report.
fn print_report(report: &BackportReport) {
    println!("\n{report}");

    for target in &report.targets {
        if report.dry_run {
            println!("  {} -> would create {}", target.target, target.branch);
            continue;
        }

        let conflicts = if target.has_conflicts {
            " (has conflicts)"
        } else {
            ""
        };
        println!("  {} -> {}{conflicts}", target.target, target.branch);
        if let Some(issue) = &target.issue {
            println!("    Issue: #{} {}", issue.number, issue.url);
        }
        if let Some(pr) = &target.pull_request {
            println!("    PR:    #{} {}", pr.number, pr.url);
        }
        for path in &target.conflicted_paths {
            println!("    conflict: {path}");
        }
    }
}
