use stagehand_core::error::CheckError;
use tracing::debug;

use super::ReadMode;
use crate::backend::ObjectStore;

/// 버킷 안의 파일을 관찰합니다.
pub struct BucketProbe<'a, B: ObjectStore> {
    backend: &'a B,
    bucket: String,
}

impl<'a, B: ObjectStore> BucketProbe<'a, B> {
    pub fn new(backend: &'a B, bucket: impl Into<String>) -> Self {
        Self {
            backend,
            bucket: bucket.into(),
        }
    }

    /// 파일 존재 여부를 관찰합니다.
    ///
    /// 내용이 비어 있는 파일도 존재하는 것으로 봅니다.
    pub async fn file(&self, key: &str, mode: ReadMode) -> Result<FileObservation, CheckError> {
        let content = self.read(key, mode).await?;
        Ok(FileObservation {
            bucket: self.bucket.clone(),
            key: key.to_owned(),
            present: content.is_some(),
        })
    }

    /// 파일 내용을 관찰합니다.
    ///
    /// 파일이 없으면 바로 단언 실패를 반환합니다. 비교 전에 양쪽의 줄바꿈을 제거합니다.
    pub async fn file_content(
        &self,
        key: &str,
        expected: &str,
        mode: ReadMode,
    ) -> Result<ContentObservation, CheckError> {
        let Some(content) = self.read(key, mode).await? else {
            return Err(CheckError::Assertion(format!(
                "The Bucket {} does not have the file {key}",
                self.bucket
            )));
        };
        Ok(ContentObservation {
            bucket: self.bucket.clone(),
            expected: strip_newlines(expected),
            actual: strip_newlines(&content),
        })
    }

    async fn read(&self, key: &str, mode: ReadMode) -> Result<Option<String>, CheckError> {
        let Some(body) = self.backend.get_object(&self.bucket, key).await? else {
            debug!(bucket = self.bucket.as_str(), key, "object not found");
            return Ok(None);
        };
        if mode == ReadMode::Consume {
            self.backend.delete_object(&self.bucket, key).await?;
            debug!(bucket = self.bucket.as_str(), key, "object consumed");
        }
        Ok(Some(String::from_utf8_lossy(&body).into_owned()))
    }
}

fn strip_newlines(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\r' | '\n')).collect()
}

/// 파일 존재 관찰 결과
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileObservation {
    bucket: String,
    key: String,
    present: bool,
}

impl FileObservation {
    pub fn is_present(&self) -> bool {
        self.present
    }

    pub fn exists(&self) -> Result<(), CheckError> {
        if self.present {
            return Ok(());
        }
        Err(CheckError::Assertion(format!(
            "The Bucket {} does not have the file {}",
            self.bucket, self.key
        )))
    }

    pub fn not_exists(&self) -> Result<(), CheckError> {
        if !self.present {
            return Ok(());
        }
        Err(CheckError::Assertion(format!(
            "The Bucket {} does have the file {}",
            self.bucket, self.key
        )))
    }
}

/// 파일 내용 관찰 결과 (줄바꿈 제거 후)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentObservation {
    bucket: String,
    expected: String,
    actual: String,
}

impl ContentObservation {
    pub fn actual(&self) -> &str {
        &self.actual
    }

    pub fn equals(&self) -> Result<(), CheckError> {
        if self.actual == self.expected {
            return Ok(());
        }
        Err(CheckError::Assertion(format!(
            "The Bucket {}:\nexpected file content:\n {} \n real file content:\n {}",
            self.bucket, self.expected, self.actual
        )))
    }

    pub fn not_equals(&self) -> Result<(), CheckError> {
        if self.actual != self.expected {
            return Ok(());
        }
        Err(CheckError::Assertion(format!(
            "The Bucket {}:\nexpected file content to be different but it is the same",
            self.bucket
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use bytes::Bytes;

    async fn bucket_with(key: &str, body: &'static [u8]) -> MemoryBackend {
        let backend = MemoryBackend::new();
        backend.create_bucket("logs", "eu-central-1").await.unwrap();
        backend
            .put_object("logs", key, Bytes::from_static(body))
            .await
            .unwrap();
        backend
    }

    #[tokio::test]
    async fn consuming_read_deletes_the_file() {
        let backend = bucket_with("a.txt", b"hello").await;
        let probe = BucketProbe::new(&backend, "logs");

        probe.file("a.txt", ReadMode::Consume).await.unwrap().exists().unwrap();
        probe
            .file("a.txt", ReadMode::Consume)
            .await
            .unwrap()
            .not_exists()
            .unwrap();
    }

    #[tokio::test]
    async fn preserving_read_keeps_the_file() {
        let backend = bucket_with("a.txt", b"hello").await;
        let probe = BucketProbe::new(&backend, "logs");

        probe.file("a.txt", ReadMode::Preserve).await.unwrap().exists().unwrap();
        probe.file("a.txt", ReadMode::Preserve).await.unwrap().exists().unwrap();
    }

    #[tokio::test]
    async fn empty_file_counts_as_present() {
        let backend = bucket_with("empty.txt", b"").await;
        let observation = BucketProbe::new(&backend, "logs")
            .file("empty.txt", ReadMode::Preserve)
            .await
            .unwrap();
        assert!(observation.is_present());
        assert_eq!(
            observation.not_exists().unwrap_err().to_string(),
            "The Bucket logs does have the file empty.txt"
        );
    }

    #[tokio::test]
    async fn content_comparison_strips_newlines() {
        let backend = bucket_with("log.txt", b"line one\r\nline two\n").await;
        let observation = BucketProbe::new(&backend, "logs")
            .file_content("log.txt", "line oneline two", ReadMode::Consume)
            .await
            .unwrap();
        observation.equals().unwrap();
        assert!(observation.not_equals().is_err());
    }

    #[tokio::test]
    async fn content_of_missing_file_fails() {
        let backend = bucket_with("a.txt", b"x").await;
        let err = BucketProbe::new(&backend, "logs")
            .file_content("missing.txt", "x", ReadMode::Consume)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "The Bucket logs does not have the file missing.txt");
    }

    #[tokio::test]
    async fn missing_bucket_is_a_service_error() {
        let backend = MemoryBackend::new();
        let err = BucketProbe::new(&backend, "nope")
            .file("a.txt", ReadMode::Consume)
            .await
            .unwrap_err();
        assert!(matches!(err, CheckError::Service(_)));
    }
}
