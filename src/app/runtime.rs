use anyhow::Result;
use tracing::{debug, error, info, warn};
use yt_obsidian_core::{AppConfig, Interrupt, PipelineOptions, ProcessReport, RunError, Services};

use crate::ProcessExit;
use crate::app::{dry_run, exit_handler, terminal};
use crate::cli::{Cli, Command, ProcessArgs};

#[derive(Debug, Default)]
struct RunTally {
    written: usize,
    skipped: usize,
    unavailable: usize,
    failed: usize,
}

impl RunTally {
    fn add(&mut self, report: &ProcessReport) {
        self.written += report.written();
        self.skipped += report.skipped();
        self.unavailable += report.unavailable();
        self.failed += report.failed();
    }

    fn succeeded(&self) -> usize {
        self.written + self.skipped
    }
}

pub(crate) async fn run(cli: Cli) -> Result<ProcessExit> {
    // .env may carry RUST_LOG, so load it before tracing starts.
    let dotenv_path = dotenv::dotenv().ok();

    let default_level = terminal::default_log_level(&cli);
    let force_cli_log_level = terminal::should_force_cli_log_level(&cli);
    let no_color =
        terminal::should_disable_color(terminal::no_color_env_requested(), terminal::is_dumb_terminal());
    terminal::init_tracing(default_level, force_cli_log_level, no_color);

    if let Some(path) = dotenv_path {
        debug!(path = %path.display(), "Loaded .env");
    }
    debug!(?cli, "CLI arguments parsed");

    let Command::Process(args) = cli.command;
    run_process(args).await
}

async fn run_process(args: ProcessArgs) -> Result<ProcessExit> {
    let config = AppConfig::from_env()?;
    debug!(?config, "Configuration loaded");

    let interrupt = Interrupt::new();
    let interrupt_signal = interrupt.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received; stopping");
            interrupt_signal.trigger();
        }
    });

    let services = Services::build(&config, &interrupt)?;
    let options = PipelineOptions {
        output_dir: args
            .output_dir
            .clone()
            .unwrap_or_else(|| config.vault_path.clone()),
        overwrite: args.overwrite,
        max_depth: args.max_depth,
        limit: args.limit,
    };

    if args.dry_run {
        return dry_run::run_dry_run_preview(&services.resolver, &args.inputs, &options).await;
    }

    info!(
        inputs = args.inputs.len(),
        output_dir = %options.output_dir.display(),
        overwrite = options.overwrite,
        "yt-obsidian starting"
    );

    let mut tally = RunTally::default();
    for input in &args.inputs {
        if interrupt.is_triggered() {
            warn!("Interrupted. Run again to continue; existing notes are skipped.");
            return Ok(ProcessExit::Failure);
        }

        let reference = match services.resolver.resolve(input).await {
            Ok(reference) => reference,
            Err(resolve_error) if resolve_error.aborts_run() => {
                error!(%input, error = %resolve_error, "Stopping run");
                return Ok(ProcessExit::Failure);
            }
            Err(resolve_error) => {
                error!(%input, error = %resolve_error, "Could not resolve input");
                tally.failed += 1;
                continue;
            }
        };
        info!(%input, kind = %reference.kind(), id = reference.id(), "Input resolved");

        match services.pipeline.process(&reference, &options).await {
            Ok(report) => tally.add(&report),
            Err(RunError::Interrupted) => {
                warn!(
                    written = tally.written,
                    "Interrupted. Run again to continue; existing notes are skipped."
                );
                return Ok(ProcessExit::Failure);
            }
            Err(run_error) => {
                error!(error = %run_error, "Stopping run");
                return Ok(ProcessExit::Failure);
            }
        }
    }

    println!(
        "Done: {} written, {} skipped, {} unavailable, {} failed. Notes in {}",
        tally.written,
        tally.skipped,
        tally.unavailable,
        tally.failed,
        options.output_dir.display()
    );
    Ok(exit_handler::determine_exit_outcome(
        tally.succeeded(),
        tally.failed,
    ))
}
