//! `stagehand config` command handler

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use stagehand_core::config::StagehandConfig;

use crate::cli::{ConfigAction, ConfigArgs};
use crate::error::CliError;
use crate::output::{OutputWriter, Render};

const SECTIONS: &str = "general, aws, readiness, assertions, queues, buckets, tables, targets";

/// Execute the `config` command.
pub async fn execute(
    args: ConfigArgs,
    config_path: &Path,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    match args.action {
        ConfigAction::Validate => execute_validate(config_path, writer).await,
        ConfigAction::Show { section } => execute_show(config_path, section, writer).await,
    }
}

/// Loads and validates the configuration file, reporting any errors.
///
/// # Errors
///
/// Returns `CliError::Config` if validation fails (parse errors, invalid values,
/// duplicate binding keys, malformed key schemas).
async fn execute_validate(config_path: &Path, writer: &OutputWriter) -> Result<(), CliError> {
    info!(path = %config_path.display(), "validating configuration");

    let report = match StagehandConfig::load(config_path).await {
        Ok(config) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: true,
            errors: Vec::new(),
            resources: config.resource_specs().len(),
            targets: config.targets.len(),
        },
        Err(e) => ConfigValidationReport {
            source: config_path.display().to_string(),
            valid: false,
            errors: vec![e.to_string()],
            resources: 0,
            targets: 0,
        },
    };

    writer.render(&report)?;

    if !report.valid {
        return Err(CliError::Config("configuration is invalid".to_owned()));
    }

    Ok(())
}

/// Displays the effective configuration (file + env overrides + defaults).
async fn execute_show(
    config_path: &Path,
    section: Option<String>,
    writer: &OutputWriter,
) -> Result<(), CliError> {
    info!(path = %config_path.display(), "loading configuration");

    let config = StagehandConfig::load(config_path).await?;
    let report = ConfigReport {
        source: config_path.display().to_string(),
        config_toml: match section.as_deref() {
            None => to_toml(&config),
            Some(name) => section_toml(&config, name)?,
        },
        section,
    };

    writer.render(&report)?;

    Ok(())
}

fn section_toml(config: &StagehandConfig, name: &str) -> Result<String, CliError> {
    let rendered = match name {
        "general" => wrapped(name, &config.general),
        "aws" => wrapped(name, &config.aws),
        "readiness" => wrapped(name, &config.readiness),
        "assertions" => wrapped(name, &config.assertions),
        "queues" => wrapped(name, &config.queues),
        "buckets" => wrapped(name, &config.buckets),
        "tables" => wrapped(name, &config.tables),
        "targets" => wrapped(name, &config.targets),
        _ => {
            return Err(CliError::Command(format!(
                "unknown section: {name} (expected: {SECTIONS})"
            )));
        }
    };
    Ok(rendered)
}

/// 섹션 이름을 최상위 키로 감싸 `[section]` 헤더가 나오도록 직렬화
fn wrapped<T: Serialize>(name: &str, value: &T) -> String {
    let mut table = BTreeMap::new();
    table.insert(name, value);
    to_toml(&table)
}

fn to_toml<T: Serialize>(value: &T) -> String {
    toml::to_string_pretty(value).unwrap_or_else(|e| format!("(serialization error: {e})"))
}

/// Configuration display report.
///
/// The `config_toml` field is skipped during JSON serialization (only used for text rendering).
#[derive(Serialize)]
pub struct ConfigReport {
    /// Configuration file path
    pub source: String,
    /// Optional section name (None = full config)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    /// Serialized TOML configuration
    #[serde(skip)]
    pub config_toml: String,
}

impl Render for ConfigReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        if let Some(ref section) = self.section {
            let section_label = format!("[{}]", section);
            writeln!(
                w,
                "Configuration {} (source: {})",
                section_label.bold(),
                self.source
            )?;
        } else {
            writeln!(w, "Configuration (source: {})", self.source.bold())?;
        }

        writeln!(w)?;
        write!(w, "{}", self.config_toml)?;

        Ok(())
    }
}

/// Configuration validation report.
#[derive(Serialize)]
pub struct ConfigValidationReport {
    /// Configuration file path
    pub source: String,
    /// Whether the configuration is valid
    pub valid: bool,
    /// Validation error messages (empty if valid)
    pub errors: Vec<String>,
    /// Number of declared resources
    pub resources: usize,
    /// Number of declared targets
    pub targets: usize,
}

impl Render for ConfigValidationReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        use colored::Colorize;

        writeln!(w, "Config Validation: {}", self.source.bold())?;

        if self.valid {
            writeln!(w, "  Result: {}", "VALID".green().bold())?;
            writeln!(w, "  Resources: {}", self.resources)?;
            writeln!(w, "  Targets: {}", self.targets)?;
        } else {
            writeln!(w, "  Result: {}", "INVALID".red().bold())?;
            for err in &self.errors {
                writeln!(w, "  Error: {}", err.red())?;
            }
        }

        Ok(())
    }
}
