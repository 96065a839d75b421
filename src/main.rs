use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use release_post::cli::{run_release_workflow, run_scan_workflow, Cli, Command};
use release_post::{config, ui};

fn init_tracing(verbose: bool) {
    let filter = if verbose { "debug" } else { "warn" };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        ui::display_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Command::Scan {
        diff_file,
        target,
        json,
    } = &cli.command
    {
        let report = run_scan_workflow(diff_file, target)?;
        if *json {
            println!("{}", report.to_json()?);
        } else {
            ui::display_template_report(&report);
        }
        return Ok(());
    }

    let config = config::load_config(cli.config.as_deref())?;
    if let Some(args) = cli.command.release_args() {
        ui::display_status(&format!(
            "Generating release post for {}",
            args.current_version
        ));
        let report = run_release_workflow(&args, &config)?;
        ui::display_report(&report);
    }

    Ok(())
}
