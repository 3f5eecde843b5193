//! Stagehand CLI
//!
//! 테스트 대상 프로젝트는 [`SuitePack`]을 구현하고 자기 바이너리에서
//! [`launch`]를 호출합니다.
//!
//! ```ignore
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     stagehand_cli::launch(&InventorySuites).await
//! }
//! ```

pub mod cli;
pub mod commands;
pub mod error;
pub mod logging;
pub mod output;

use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use stagehand_core::config::{GeneralConfig, StagehandConfig};
use stagehand_runner::SuitePack;

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

/// 명령줄을 파싱하고 명령을 실행한 뒤 종료 코드를 반환합니다.
///
/// 에러는 stderr에 작업 컨텍스트 라벨과 메시지 두 줄로 출력됩니다.
pub async fn launch<P: SuitePack>(pack: &P) -> ExitCode {
    let cli = Cli::parse();
    match dispatch(cli, pack).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err.location().red().bold());
            eprintln!("{}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

/// 파싱된 명령을 실행합니다.
pub async fn dispatch<P: SuitePack>(cli: Cli, pack: &P) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);

    match cli.command {
        Commands::Config(args) => {
            init_logging(GeneralConfig::default(), cli.log_level.as_deref())?;
            commands::config::execute(args, &cli.config, &writer).await
        }
        Commands::Run(args) => {
            let config = StagehandConfig::load(&cli.config).await?;
            init_logging(config.general.clone(), cli.log_level.as_deref())?;
            stagehand_core::metrics::describe_all();
            commands::run::execute(args, &config, pack, &writer).await
        }
        Commands::Teardown(args) => {
            let config = StagehandConfig::load(&cli.config).await?;
            init_logging(config.general.clone(), cli.log_level.as_deref())?;
            commands::teardown::execute(args, &config, &writer).await
        }
    }
}

fn init_logging(mut general: GeneralConfig, level: Option<&str>) -> Result<(), CliError> {
    if let Some(level) = level {
        general.log_level = level.to_owned();
    }
    logging::init_tracing(&general)
}
