//! 날짜별 변경 로그 파일
//!
//! 파일 이름은 `Mon-Oct-19-2026.txt` 형태이고, 같은 날의 내역은 줄바꿈으로
//! 이어 붙입니다.

use anyhow::{Context, Result};
use bytes::Bytes;
use stagehand_fixtures::ObjectStore;
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// 형식이 맞지 않는 요청에 남기는 내역
pub const BAD_REQUEST_MESSAGE: &str = "The request did not have the right parameters";

/// `date`의 로그 파일 이름
pub fn log_file_name(date: Date) -> Result<String> {
    let stem = date
        .format(format_description!(
            "[weekday repr:short]-[month repr:short]-[day]-[year]"
        ))
        .context("formatting log file name")?;
    Ok(format!("{stem}.txt"))
}

/// 오늘(UTC) 로그 파일 이름
pub fn todays_log_file() -> Result<String> {
    log_file_name(OffsetDateTime::now_utc().date())
}

/// 오늘 로그 파일에 한 줄을 덧붙입니다. 파일이 없으면 새로 만듭니다.
pub async fn append<B: ObjectStore>(backend: &B, bucket: &str, line: &str) -> Result<()> {
    let file = todays_log_file()?;
    let existing = backend
        .get_object(bucket, &file)
        .await
        .with_context(|| format!("reading {file}"))?;

    let body = match existing {
        Some(previous) => format!("{}\n{line}", String::from_utf8_lossy(&previous)),
        None => line.to_owned(),
    };
    backend
        .put_object(bucket, &file, Bytes::from(body))
        .await
        .with_context(|| format!("writing {file}"))
}
