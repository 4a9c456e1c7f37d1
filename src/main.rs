mod cli;
mod config;
mod exclusions;
mod git;
mod gitlab;
mod output;
mod project;
mod run;
mod scan;

use clap::Parser;
use cli::Cli;
use config::{FileConfig, Settings};
use exclusions::ExclusionList;
use gitlab::GroupClient;
use run::RunOptions;
use scan::ScanOptions;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize logging on stderr
///
/// `--verbose` sets debug level; otherwise `RUST_LOG` applies, defaulting to warnings.
fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("findlib=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("findlib=warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run_cli(&cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run_cli(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let file_config = FileConfig::load(cli.config.as_ref())?;
    let settings = Settings::resolve(cli, file_config)?;

    tracing::debug!(
        url = %settings.gitlab_url,
        group = %settings.group,
        library = %settings.library,
        exclude_file = %settings.exclude_file.display(),
        "starting run"
    );

    let client = GroupClient::new(
        &settings.gitlab_url,
        &settings.group,
        &settings.token,
        settings.protocol,
        settings.timeout,
    );
    let projects = client.discover()?;
    tracing::info!(count = projects.len(), "discovered projects");

    let exclusions = ExclusionList::load(&settings.exclude_file)?;
    tracing::info!(count = exclusions.len(), "loaded exclusions");

    let scan_options = ScanOptions {
        filename: settings.requirements_file.clone(),
        ..ScanOptions::new(settings.library.clone())
    };
    let options = RunOptions {
        json: settings.json,
        dry_run: settings.dry_run,
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run::run(
        &projects,
        &exclusions,
        |project| scan::inspect(project, &scan_options),
        options,
        &mut out,
    )?;

    Ok(())
}
