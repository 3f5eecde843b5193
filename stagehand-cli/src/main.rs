//! `stagehand` 바이너리
//!
//! 스위트가 등록되지 않은 상태로 CLI를 실행합니다. 설정 검증, 남은 리소스
//! 삭제, 리소스 생성/삭제만 확인하는 실행에 씁니다.

use std::process::ExitCode;

use stagehand_fixtures::Backend;
use stagehand_runner::{RegistryError, SuiteCatalog, SuitePack, TargetRegistry};

struct NoSuites;

impl SuitePack for NoSuites {
    fn register<B: Backend>(
        &self,
        _targets: &mut TargetRegistry<B>,
        _suites: &mut SuiteCatalog<B>,
    ) -> Result<(), RegistryError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    stagehand_cli::launch(&NoSuites).await
}
