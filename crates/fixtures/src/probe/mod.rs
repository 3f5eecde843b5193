//! 소비형 읽기 단언
//!
//! 각 probe는 리소스를 한 번 읽어 관찰 결과(observation)를 만들고, 테스트는
//! 그 결과에 `exists`/`not_exists`/`equals`/`not_equals`를 호출합니다.
//!
//! 기본 읽기 모드는 [`ReadMode::Consume`]입니다. 관찰한 객체와 행은 읽은 직후
//! 삭제되어 다음 테스트에 남지 않습니다. 큐 메시지는 모드와 무관하게 항상
//! 삭제됩니다.
//!
//! "없음"은 에러가 아니라 관찰 결과입니다. 그 외의 서비스 에러만
//! [`CheckError::Service`]로 전달됩니다.

mod compare;
mod object;
mod queue;
mod table;

pub use compare::{ComparisonMode, ComparisonPolicy};
pub use object::{BucketProbe, ContentObservation, FileObservation};
pub use queue::{FIELD_BODY, FIELD_DEDUPLICATION_ID, FIELD_GROUP_ID, QueueProbe};
pub use table::TableProbe;

use stagehand_core::error::CheckError;
use stagehand_core::types::ObservedRecord;

use compare::{display_value, first_match, first_mismatch};

/// 읽은 뒤 관찰 대상을 삭제할지 여부
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    /// 읽은 뒤 삭제
    #[default]
    Consume,
    /// 읽기만 함
    Preserve,
}

/// 테이블 행 읽기 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Observed {
    /// 행이 존재함
    Record(ObservedRecord),
    /// 해당 키의 행이 없음
    Empty,
}

impl Observed {
    /// 비어 있는지 여부
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// 관찰된 레코드
    pub fn record(&self) -> Option<&ObservedRecord> {
        match self {
            Self::Record(record) => Some(record),
            Self::Empty => None,
        }
    }
}

/// 존재 여부 관찰 결과 (테이블, 행, 메시지)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presence {
    present: bool,
    absent_message: String,
    present_message: String,
}

impl Presence {
    pub(crate) fn new(
        present: bool,
        absent_message: impl Into<String>,
        present_message: impl Into<String>,
    ) -> Self {
        Self {
            present,
            absent_message: absent_message.into(),
            present_message: present_message.into(),
        }
    }

    /// 관찰 당시 존재했는지 여부
    pub fn is_present(&self) -> bool {
        self.present
    }

    /// 존재해야 함
    pub fn exists(&self) -> Result<(), CheckError> {
        if self.present {
            Ok(())
        } else {
            Err(CheckError::assertion(self.absent_message.as_str()))
        }
    }

    /// 존재하지 않아야 함
    pub fn not_exists(&self) -> Result<(), CheckError> {
        if self.present {
            Err(CheckError::assertion(self.present_message.as_str()))
        } else {
            Ok(())
        }
    }
}

/// 레코드를 관찰한 리소스
#[derive(Debug, Clone, PartialEq, Eq)]
enum RecordSource {
    Table(String),
    Queue(String),
}

/// 레코드 내용 관찰 결과 (테이블 행, 큐 메시지)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordObservation {
    source: RecordSource,
    expected: ObservedRecord,
    actual: ObservedRecord,
    mode: ComparisonMode,
}

impl RecordObservation {
    fn table(name: &str, expected: ObservedRecord, actual: ObservedRecord, mode: ComparisonMode) -> Self {
        Self {
            source: RecordSource::Table(name.to_owned()),
            expected,
            actual,
            mode,
        }
    }

    fn queue(url: &str, expected: ObservedRecord, actual: ObservedRecord, mode: ComparisonMode) -> Self {
        Self {
            source: RecordSource::Queue(url.to_owned()),
            expected,
            actual,
            mode,
        }
    }

    /// 관찰된 레코드
    pub fn actual(&self) -> &ObservedRecord {
        &self.actual
    }

    /// 검사 대상 필드가 모두 같아야 함
    ///
    /// 첫 번째로 다른 필드에서 실패합니다.
    pub fn equals(&self) -> Result<(), CheckError> {
        let Some(diff) = first_mismatch(&self.expected, &self.actual, self.mode) else {
            return Ok(());
        };
        let expected = display_value(diff.expected);
        let actual = display_value(diff.actual);
        let message = match &self.source {
            RecordSource::Table(table) => format!(
                "The table({table}) items is not equal to the expected items:\n\texpected value at {} is: {expected}\n\treal value is {actual}",
                diff.field
            ),
            RecordSource::Queue(url) => format!(
                "The sqs queue({url}) message is not equal to the expected message:\nexpected value at {} is:\n{expected}\nreal value is {actual}",
                diff.field
            ),
        };
        Err(CheckError::Assertion(message))
    }

    /// 검사 대상 필드 중 같은 값이 없어야 함
    ///
    /// 첫 번째로 같은 필드에서 실패합니다.
    pub fn not_equals(&self) -> Result<(), CheckError> {
        let Some(same) = first_match(&self.expected, &self.actual, self.mode) else {
            return Ok(());
        };
        let value = display_value(same.actual);
        let message = match &self.source {
            RecordSource::Table(table) => format!(
                "The table({table}) has an equal item at {}, value is:\n{value}",
                same.field
            ),
            RecordSource::Queue(url) => format!(
                "The sqs queue({url}) message is equal to the expected message:\nvalue at {} is:\n{value}",
                same.field
            ),
        };
        Err(CheckError::Assertion(message))
    }
}
