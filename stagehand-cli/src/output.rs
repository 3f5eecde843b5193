//! 실행 결과 출력
//!
//! 명령 결과는 [`OutputWriter`]를 거쳐 텍스트 또는 JSON으로 stdout에 쓰입니다.
//! 실행 보고서([`RunReport`])의 텍스트 요약과 `--report` 파일 저장도 여기서
//! 처리합니다.

use std::io::Write;
use std::path::Path;

use colored::{ColoredString, Colorize};
use serde::Serialize;
use tracing::info;

use stagehand_core::types::RunReport;

use crate::cli::OutputFormat;
use crate::error::CliError;

/// `--output` 형식에 따라 결과를 씁니다.
pub struct OutputWriter {
    format: OutputFormat,
}

impl OutputWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// 텍스트 모드 여부. 테스트별 실시간 콘솔 줄은 텍스트 모드에서만 나옵니다.
    pub fn is_text(&self) -> bool {
        self.format == OutputFormat::Text
    }

    pub fn render<T: Render>(&self, payload: &T) -> Result<(), CliError> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        self.render_to(payload, &mut handle)
    }

    pub fn render_to<T: Render>(&self, payload: &T, w: &mut dyn Write) -> Result<(), CliError> {
        match self.format {
            OutputFormat::Text => payload.render_text(w)?,
            OutputFormat::Json => payload.render_json(w)?,
        }
        Ok(())
    }
}

/// 명령 결과 페이로드
///
/// JSON은 기본적으로 serde 직렬화 결과를 들여쓰기해 한 덩어리로 씁니다.
pub trait Render: Serialize {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()>;

    fn render_json(&self, w: &mut dyn Write) -> Result<(), CliError> {
        serde_json::to_writer_pretty(&mut *w, self)?;
        writeln!(w)?;
        Ok(())
    }
}

/// `N passed, M failed` 집계. 실패나 중단이 있으면 빨간색입니다.
fn tally(passed: usize, failed: usize, clean: bool) -> ColoredString {
    let counts = format!("{passed} passed, {failed} failed");
    if clean && failed == 0 {
        counts.green()
    } else {
        counts.red()
    }
}

impl Render for RunReport {
    fn render_text(&self, w: &mut dyn Write) -> std::io::Result<()> {
        writeln!(w)?;
        writeln!(w, "Run {} (started {})", self.run_id.bold(), self.started_at)?;
        for suite in &self.suites {
            writeln!(
                w,
                "  {} {} ({:.3}s)",
                suite.name.bold(),
                tally(suite.passed, suite.failed, suite.aborted.is_none()),
                suite.elapsed_secs
            )?;
            if !suite.location.is_empty() {
                writeln!(w, "    at {}", suite.location)?;
            }
            for test in &suite.tests {
                if let Some(ref failure) = test.failure {
                    writeln!(w, "    {} {}: {}", "x".red(), test.name, failure)?;
                }
            }
            if let Some(ref reason) = suite.aborted {
                writeln!(w, "    {} {}", "aborted:".red().bold(), reason)?;
            }
        }
        if let Some(ref fatal) = self.fatal {
            writeln!(w, "  {} {}", "fatal:".red().bold(), fatal)?;
        }
        writeln!(
            w,
            "Total: {}, {} suite(s) aborted",
            tally(self.passed(), self.failed(), self.fatal.is_none()),
            self.aborted()
        )?;
        Ok(())
    }
}

/// 실행 보고서를 JSON 파일로 저장합니다. 상위 디렉토리가 없으면 만듭니다.
pub(crate) async fn write_report(path: &Path, report: &RunReport) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    let json = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, json).await?;
    info!(path = %path.display(), "run report written");
    Ok(())
}
