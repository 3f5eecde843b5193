//! `stagehand teardown` command handler
//!
//! 이전 실행이 남긴 리소스를 설정에 명시된 이름으로 삭제합니다. 이미 없는
//! 리소스와 삭제 실패는 경고만 남깁니다.

use std::io::Write;

use serde::Serialize;
use tracing::info;

use stagehand_core::config::StagehandConfig;
use stagehand_fixtures::{AwsBackend, MemoryBackend};

use crate::cli::{BackendKind, TeardownArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

/// Execute the `teardown` command.
pub async fn execute(
    args: TeardownArgs,
    config: &StagehandConfig,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    let report = TeardownReport::from_config(config);
    info!(
        targeted = report.targeted.len(),
        skipped = report.skipped.len(),
        "explicit teardown"
    );

    match args.backend {
        BackendKind::Aws => {
            let backend =
                AwsBackend::connect(&config.aws.region, config.aws.endpoint_url.as_deref()).await;
            stagehand_runner::teardown_only(config, &backend).await?;
        }
        BackendKind::Memory => {
            stagehand_runner::teardown_only(config, &MemoryBackend::new()).await?;
        }
    }

    writer.render(&report)?;
    Ok(())
}

/// Teardown summary.
#[derive(Debug, Serialize)]
pub struct TeardownReport {
    /// `kind 'name'` of every resource that was attempted
    pub targeted: Vec<String>,
    /// Binding keys of resources declared without a name
    pub skipped: Vec<String>,
}

impl TeardownReport {
    fn from_config(config: &StagehandConfig) -> Self {
        let mut targeted = Vec::new();
        let mut skipped = Vec::new();
        for spec in config.resource_specs() {
            match spec.name {
                Some(ref name) => targeted.push(format!("{} '{}'", spec.kind(), name)),
                None => skipped.push(spec.binding.clone()),
            }
        }
        Self { targeted, skipped }
    }
}

impl Render for TeardownReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Teardown: {} resource(s)", self.targeted.len())?;
        for resource in &self.targeted {
            writeln!(w, "  {} {}", "done".green(), resource)?;
        }
        for binding in &self.skipped {
            writeln!(
                w,
                "  {} {} (declared without a name)",
                "skipped".yellow(),
                binding
            )?;
        }
        Ok(())
    }
}
