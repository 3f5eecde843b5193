//! 재고 갱신 함수와 Stagehand 스위트
//!
//! 요청 본문의 `product`/`action`/`user`로 재고 테이블 수량을 갱신하고,
//! 변경 내역을 버킷의 날짜별 로그 파일에 덧붙인 뒤 FIFO 큐로 알립니다.
//!
//! # Module Structure
//!
//! - [`handler`]: 호출 진입점 (`update_inventory`)
//! - [`request`]: 요청 본문 해석
//! - [`stock`]: 재고 테이블 읽기/쓰기
//! - [`changelog`]: 날짜별 로그 파일
//! - [`notify`]: 변경 알림 메시지
//! - [`suites`]: "Update inventory lambda" 스위트

pub mod changelog;
pub mod handler;
pub mod notify;
pub mod request;
pub mod stock;
pub mod suites;

use stagehand_fixtures::Backend;
use stagehand_runner::{RegistryError, SuiteCatalog, SuitePack, TargetRegistry};

/// 바인딩 키
pub const BUCKET_BINDING: &str = "testBucket";
pub const TABLE_BINDING: &str = "testDynamoTable";
pub const QUEUE_BINDING: &str = "testSqsUrl";

/// 핸들러 등록 이름
pub const HANDLER_NAME: &str = "update_inventory";

/// 재고 함수 핸들러와 스위트 묶음
pub struct InventorySuites;

impl SuitePack for InventorySuites {
    fn register<B: Backend>(
        &self,
        targets: &mut TargetRegistry<B>,
        suites: &mut SuiteCatalog<B>,
    ) -> Result<(), RegistryError> {
        targets.register(HANDLER_NAME, |event, ctx| {
            Box::pin(handler::update_inventory(event, ctx))
        })?;
        suites::register(suites)
    }
}
