mod cli;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cli::build::{cmd_build, BuildArgs};
use cli::check::{cmd_check, CheckArgs};
use cli::plan::{cmd_plan, PlanArgs};

#[derive(Parser)]
#[command(
    name = "checkgen",
    version,
    about = "Generate statistical checker modules from accuracy and performance contracts"
)]
struct Cli {
    /// Emit logs to stderr, at trace level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate the checker and curve-fit module for a specification
    Build(BuildArgs),
    /// Analyze a specification and report its probability domain
    Check(CheckArgs),
    /// Estimate trial counts for the probability comparisons
    Plan(PlanArgs),
}

/// `RUST_LOG` directives when they parse, otherwise everything at trace.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("trace"))
}

fn init_tracing(verbose: bool) {
    if verbose {
        let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
        tracing_subscriber::fmt()
            .with_env_filter(log_filter(rust_log.as_deref()))
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Build(args) => cmd_build(args),
        Command::Check(args) => cmd_check(args),
        Command::Plan(args) => cmd_plan(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing::level_filters::LevelFilter;

    #[test]
    fn test_rust_log_narrows_verbose_output() {
        assert_eq!(log_filter(None).max_level_hint(), Some(LevelFilter::TRACE));
        assert_eq!(log_filter(Some("info")).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(
            log_filter(Some("checkgen=debug")).max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
    }

    #[test]
    fn test_unparsable_rust_log_falls_back_to_trace() {
        assert_eq!(
            log_filter(Some("checkgen=notalevel")).max_level_hint(),
            Some(LevelFilter::TRACE)
        );
    }
}
