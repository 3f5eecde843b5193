//! `stagehand run` command handler

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use stagehand_core::config::StagehandConfig;
use stagehand_core::types::RunReport;
use stagehand_fixtures::{AwsBackend, Backend, MemoryBackend};
use stagehand_runner::{RunOptions, SuiteCatalog, SuitePack, TargetRegistry};

use crate::cli::{BackendKind, RunArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, write_report};

/// Execute the `run` command.
///
/// Failed tests still exit successfully; only a fatal abort or a lifecycle
/// error produces a non-zero exit code.
pub async fn execute<P: SuitePack>(
    args: RunArgs,
    config: &StagehandConfig,
    pack: &P,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let options = RunOptions {
        suites: args.suites,
        console: writer.is_text(),
    };

    let report = match args.backend {
        BackendKind::Aws => {
            let backend =
                AwsBackend::connect(&config.aws.region, config.aws.endpoint_url.as_deref()).await;
            run_with(config, Arc::new(backend), pack, &options).await?
        }
        BackendKind::Memory => {
            run_with(config, Arc::new(MemoryBackend::new()), pack, &options).await?
        }
    };

    let report_path = args
        .report
        .or_else(|| config.general.report_path.as_ref().map(PathBuf::from));
    if let Some(path) = report_path {
        write_report(&path, &report).await?;
    }

    writer.render(&report)?;

    if let Some(fatal) = report.fatal {
        return Err(CliError::Aborted(fatal));
    }
    Ok(())
}

async fn run_with<B: Backend, P: SuitePack>(
    config: &StagehandConfig,
    backend: Arc<B>,
    pack: &P,
    options: &RunOptions,
) -> Result<RunReport, CliError> {
    let mut targets = TargetRegistry::new();
    let mut suites = SuiteCatalog::new();
    pack.register(&mut targets, &mut suites)?;
    info!(
        handlers = targets.names().count(),
        suites = suites.len(),
        "suite pack registered"
    );
    Ok(stagehand_runner::run(config, backend, &targets, suites, options).await?)
}
