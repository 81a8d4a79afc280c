use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::derive::extract_check;
use crate::domain::model::{
    CheckFailure, CheckRecord, ErrorPolicy, ExtractedCheck, ExtractedFile, LoadResult,
    SequenceCursor, SourceFile, TransformResult,
};
use crate::utils::error::{ExtractError, Result};
use crate::x9::{Check, X9Error, X9File, X9Reader};
use serde::Serialize;

/// Reads X9 files from disk and writes one image plus one JSON document per check.
pub struct X9Pipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> X9Pipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    async fn write_check(&self, check: &ExtractedCheck) -> Result<()> {
        let output = self.config.output_options();
        // JSON 先序列化，失敗時不留下孤立的影像檔
        let json = to_pretty_json(&check.info, output.json_indent)?;

        self.storage
            .write_file(
                &format!("{}.{}", check.info.id, output.image_extension),
                &check.image,
            )
            .await?;
        self.storage
            .write_file(&format!("{}.json", check.info.id), &json)
            .await?;
        Ok(())
    }
}

fn check_record(check: Check) -> CheckRecord {
    let detail = &check.detail;
    CheckRecord {
        payor_bank_routing_number: detail.payor_bank_routing_number.clone(),
        payor_bank_check_digit: detail.payor_bank_check_digit.clone(),
        on_us: detail.on_us.clone(),
        auxiliary_on_us: detail.auxiliary_on_us.clone(),
        image_view_data: check.into_images(),
    }
}

/// A parse task that panicked or was cancelled counts as an unreadable file.
fn parse_outcome(
    path: &str,
    task: std::result::Result<std::result::Result<X9File, X9Error>, tokio::task::JoinError>,
) -> Result<X9File> {
    task.map_err(|e| X9Error::Io(std::io::Error::other(e)))
        .and_then(|parsed| parsed)
        .map_err(|e| ExtractError::ParseError {
            path: path.to_string(),
            source: e,
        })
}

/// Pretty JSON with a configurable indent width.
pub fn to_pretty_json<T: Serialize>(value: &T, indent: usize) -> Result<Vec<u8>> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut buffer = Vec::new();
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for X9Pipeline<S, C> {
    fn sources(&self) -> Vec<SourceFile> {
        self.config
            .input_files()
            .iter()
            .map(|path| SourceFile::new(path.as_str()))
            .collect()
    }

    fn output_dir(&self) -> &str {
        self.storage.location()
    }

    fn error_policy(&self) -> ErrorPolicy {
        self.config.error_policy()
    }

    async fn prepare(&self) -> Result<()> {
        tracing::debug!("📁 Creating output directory: {}", self.storage.location());
        self.storage.create_root().await
    }

    async fn extract(&self, source: &SourceFile) -> Result<ExtractedFile> {
        let file = tokio::fs::File::open(&source.path)
            .await
            .map_err(|e| ExtractError::InputOpenError {
                path: source.path.clone(),
                source: e,
            })?
            .into_std()
            .await;

        let options = self.config.reader_options();
        tracing::debug!(
            "📖 Reading {} ({:?}, {:?} framing)",
            source.path,
            options.encoding,
            options.framing
        );

        let task = tokio::task::spawn_blocking(move || X9Reader::new(file, options).read()).await;
        let parsed = parse_outcome(&source.path, task)?;

        let mut checks = Vec::with_capacity(parsed.check_count());
        for cash_letter in parsed.cash_letters {
            tracing::info!(
                "Processing {} checks from {}",
                cash_letter.control.items_count,
                source.path
            );
            for bundle in cash_letter.bundles {
                checks.extend(bundle.checks.into_iter().map(check_record));
            }
        }

        Ok(ExtractedFile {
            source: source.clone(),
            checks,
        })
    }

    async fn transform(
        &self,
        file: ExtractedFile,
        cursor: SequenceCursor,
    ) -> Result<TransformResult> {
        let total = file.checks.len();
        let mut checks = Vec::with_capacity(total);
        let mut failures = Vec::new();

        for (index, record) in file.checks.into_iter().enumerate() {
            let position = cursor.position(index);
            match extract_check(&file.source, &position, record) {
                Ok(check) => checks.push(check),
                Err(error) => {
                    tracing::warn!(
                        "⚠️ Skipping {} ({} #{}): {}",
                        position.id(),
                        file.source.file_name,
                        position.file_seq_no,
                        error
                    );
                    failures.push(CheckFailure {
                        id: position.id(),
                        file_seq_no: position.file_seq_no,
                        error,
                    });
                    if self.error_policy() == ErrorPolicy::FailFast {
                        break;
                    }
                }
            }
        }

        Ok(TransformResult {
            source: file.source,
            checks,
            failures,
            cursor: cursor.advance(total),
        })
    }

    async fn load(&self, result: TransformResult) -> Result<LoadResult> {
        let mut loaded = LoadResult {
            written: 0,
            failures: result.failures,
        };

        for check in &result.checks {
            match self.write_check(check).await {
                Ok(()) => {
                    tracing::debug!("💾 Wrote {}", check.info.id);
                    loaded.written += 1;
                }
                Err(error) => {
                    tracing::warn!("⚠️ Could not write {}: {}", check.info.id, error);
                    loaded.failures.push(CheckFailure {
                        id: check.info.id.clone(),
                        file_seq_no: check.info.file_seq_no,
                        error,
                    });
                    if self.error_policy() == ErrorPolicy::FailFast {
                        break;
                    }
                }
            }
        }

        // 依處理順序排列：寫入失敗可能早於 transform 階段記下的失敗
        loaded.failures.sort_by_key(|failure| failure.file_seq_no);
        if self.error_policy() == ErrorPolicy::FailFast {
            // 停在第一個失敗，之後的檢查從未被處理
            loaded.failures.truncate(1);
        }

        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::OutputOptions;
    use crate::x9::{Encoding, ReaderOptions};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
        fail_on: Option<String>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
                fail_on: None,
            }
        }

        fn failing_on(name: &str) -> Self {
            Self {
                fail_on: Some(name.to_string()),
                ..Self::new()
            }
        }

        async fn get_file(&self, name: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(name).cloned()
        }

        async fn file_count(&self) -> usize {
            self.files.lock().await.len()
        }
    }

    impl Storage for MockStorage {
        async fn create_root(&self) -> Result<()> {
            Ok(())
        }

        async fn write_file(&self, name: &str, data: &[u8]) -> Result<()> {
            if self.fail_on.as_deref() == Some(name) {
                return Err(ExtractError::WriteError {
                    path: name.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                });
            }
            let mut files = self.files.lock().await;
            files.insert(name.to_string(), data.to_vec());
            Ok(())
        }

        fn location(&self) -> &str {
            "mock_output"
        }
    }

    struct MockConfig {
        output_dir: String,
        input_files: Vec<String>,
        reader: ReaderOptions,
        output: OutputOptions,
        policy: ErrorPolicy,
    }

    impl MockConfig {
        fn new(policy: ErrorPolicy) -> Self {
            Self {
                output_dir: "mock_output".to_string(),
                input_files: vec!["/in/a.x9".to_string(), "b.x9".to_string()],
                reader: ReaderOptions {
                    encoding: Encoding::Ascii,
                    ..ReaderOptions::default()
                },
                output: OutputOptions::default(),
                policy,
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn output_dir(&self) -> &str {
            &self.output_dir
        }

        fn input_files(&self) -> &[String] {
            &self.input_files
        }

        fn reader_options(&self) -> ReaderOptions {
            self.reader
        }

        fn output_options(&self) -> &OutputOptions {
            &self.output
        }

        fn error_policy(&self) -> ErrorPolicy {
            self.policy
        }
    }

    fn record(on_us: &str, image: &[u8]) -> CheckRecord {
        CheckRecord {
            payor_bank_routing_number: "07100001".to_string(),
            payor_bank_check_digit: "9".to_string(),
            on_us: on_us.to_string(),
            auxiliary_on_us: String::new(),
            image_view_data: vec![image.to_vec()],
        }
    }

    fn extracted(on_us: &[&str]) -> ExtractedFile {
        ExtractedFile {
            source: SourceFile::new("/in/a.x9"),
            checks: on_us
                .iter()
                .enumerate()
                .map(|(i, on_us)| record(on_us, format!("image-{}", i).as_bytes()))
                .collect(),
        }
    }

    #[test]
    fn test_pretty_json_uses_three_space_indent() {
        let json = to_pretty_json(&serde_json::json!({"id": "check-1"}), 3).unwrap();
        assert_eq!(String::from_utf8(json).unwrap(), "{\n   \"id\": \"check-1\"\n}");
    }

    #[test]
    fn test_sources_keep_argument_order() {
        let pipeline = X9Pipeline::new(MockStorage::new(), MockConfig::new(ErrorPolicy::Continue));
        let sources = pipeline.sources();
        assert_eq!(sources.len(), 2);
        assert_eq!(sources[0].file_name, "a.x9");
        assert_eq!(sources[1].path, "b.x9");
    }

    #[tokio::test]
    async fn test_extract_missing_file() {
        let pipeline = X9Pipeline::new(MockStorage::new(), MockConfig::new(ErrorPolicy::Continue));
        let err = pipeline
            .extract(&SourceFile::new("/definitely/not/here.x9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::InputOpenError { .. }));
        assert_eq!(err.exit_code(), 3);
    }

    #[tokio::test]
    async fn test_transform_numbers_checks_from_cursor() {
        let pipeline = X9Pipeline::new(MockStorage::new(), MockConfig::new(ErrorPolicy::Continue));
        let cursor = SequenceCursor::start().advance(3);

        let result = pipeline
            .transform(extracted(&["1/10", "2/20"]), cursor)
            .await
            .unwrap();

        assert_eq!(result.checks.len(), 2);
        assert_eq!(result.checks[0].info.id, "check-4");
        assert_eq!(result.checks[1].info.id, "check-5");
        assert_eq!(result.checks[1].info.file_seq_no, 2);
        assert_eq!(result.checks[1].info.check_number, "20");
        assert_eq!(result.cursor.checks_seen(), 5);
    }

    #[tokio::test]
    async fn test_transform_continue_skips_malformed_check() {
        let pipeline = X9Pipeline::new(MockStorage::new(), MockConfig::new(ErrorPolicy::Continue));

        let result = pipeline
            .transform(extracted(&["1/10", "2", "3/30"]), SequenceCursor::start())
            .await
            .unwrap();

        let ids: Vec<&str> = result.checks.iter().map(|c| c.info.id.as_str()).collect();
        assert_eq!(ids, vec!["check-1", "check-3"]);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].id, "check-2");
        assert_eq!(result.cursor.checks_seen(), 3);
    }

    #[tokio::test]
    async fn test_transform_fail_fast_stops_at_first_failure() {
        let pipeline = X9Pipeline::new(MockStorage::new(), MockConfig::new(ErrorPolicy::FailFast));

        let result = pipeline
            .transform(extracted(&["1/10", "2", "3/30"]), SequenceCursor::start())
            .await
            .unwrap();

        assert_eq!(result.checks.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert!(matches!(
            result.failures[0].error,
            ExtractError::MalformedOnUsField { .. }
        ));
    }

    #[tokio::test]
    async fn test_load_writes_image_and_json() {
        let storage = MockStorage::new();
        let pipeline = X9Pipeline::new(storage.clone(), MockConfig::new(ErrorPolicy::Continue));

        let result = pipeline
            .transform(extracted(&["12345/6789"]), SequenceCursor::start())
            .await
            .unwrap();
        let loaded = pipeline.load(result).await.unwrap();

        assert_eq!(loaded.written, 1);
        assert!(loaded.failures.is_empty());
        assert_eq!(storage.get_file("check-1.tiff").await.unwrap(), b"image-0");

        let json = storage.get_file("check-1.json").await.unwrap();
        let text = String::from_utf8(json).unwrap();
        assert!(text.starts_with("{\n   \"id\": \"check-1\",\n   \"fileName\": \"a.x9\","));
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["routingNumber"], "071000019");
        assert_eq!(value["accountNumber"], "12345");
        assert_eq!(value["checkNumber"], "6789");
        assert_eq!(value["fileSeqNo"], 1);
    }

    #[tokio::test]
    async fn test_load_uses_configured_extension() {
        let storage = MockStorage::new();
        let mut config = MockConfig::new(ErrorPolicy::Continue);
        config.output.image_extension = "tif".to_string();
        let pipeline = X9Pipeline::new(storage.clone(), config);

        let result = pipeline
            .transform(extracted(&["1/10"]), SequenceCursor::start())
            .await
            .unwrap();
        pipeline.load(result).await.unwrap();

        assert!(storage.get_file("check-1.tif").await.is_some());
        assert!(storage.get_file("check-1.tiff").await.is_none());
    }

    #[tokio::test]
    async fn test_load_records_write_failures() {
        let storage = MockStorage::failing_on("check-1.tiff");
        let pipeline = X9Pipeline::new(storage.clone(), MockConfig::new(ErrorPolicy::Continue));

        let result = pipeline
            .transform(extracted(&["1/10", "2/20"]), SequenceCursor::start())
            .await
            .unwrap();
        let loaded = pipeline.load(result).await.unwrap();

        assert_eq!(loaded.written, 1);
        assert_eq!(loaded.failures.len(), 1);
        assert_eq!(loaded.failures[0].error.exit_code(), 6);
        assert!(storage.get_file("check-1.json").await.is_none());
        assert_eq!(storage.file_count().await, 2);
    }

    #[tokio::test]
    async fn test_load_fail_fast_stops_writing() {
        let storage = MockStorage::failing_on("check-1.tiff");
        let pipeline = X9Pipeline::new(storage.clone(), MockConfig::new(ErrorPolicy::FailFast));

        let result = pipeline
            .transform(extracted(&["1/10", "2/20"]), SequenceCursor::start())
            .await
            .unwrap();
        let loaded = pipeline.load(result).await.unwrap();

        assert_eq!(loaded.written, 0);
        assert_eq!(loaded.failures.len(), 1);
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_fail_fast_reports_write_failure_before_later_malformed_check() {
        let storage = MockStorage::failing_on("check-1.tiff");
        let pipeline = X9Pipeline::new(storage.clone(), MockConfig::new(ErrorPolicy::FailFast));

        let result = pipeline
            .transform(extracted(&["1/10", "2/20", "3"]), SequenceCursor::start())
            .await
            .unwrap();
        let loaded = pipeline.load(result).await.unwrap();

        assert_eq!(loaded.failures.len(), 1);
        assert_eq!(loaded.failures[0].id, "check-1");
        assert_eq!(loaded.failures[0].error.exit_code(), 6);
        assert_eq!(storage.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_continue_keeps_failures_in_processing_order() {
        let storage = MockStorage::failing_on("check-1.tiff");
        let pipeline = X9Pipeline::new(storage.clone(), MockConfig::new(ErrorPolicy::Continue));

        let result = pipeline
            .transform(extracted(&["1/10", "2/20", "3"]), SequenceCursor::start())
            .await
            .unwrap();
        let loaded = pipeline.load(result).await.unwrap();

        let ids: Vec<&str> = loaded.failures.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["check-1", "check-3"]);
        assert_eq!(loaded.written, 1);

        let mut summary = crate::domain::model::ExtractionSummary::new("mock_output");
        summary.record_file(&SourceFile::new("/in/a.x9"), loaded.written, &loaded.failures);
        assert_eq!(summary.exit_code(), 6);
    }

    #[tokio::test]
    async fn test_panicked_parse_task_is_a_parse_error() {
        let task = tokio::task::spawn_blocking(|| -> std::result::Result<X9File, X9Error> {
            panic!("reader blew up")
        })
        .await;
        assert!(task.is_err());

        let err = parse_outcome("/in/a.x9", task).unwrap_err();
        assert!(matches!(err, ExtractError::ParseError { ref path, .. } if path == "/in/a.x9"));
        assert_eq!(err.exit_code(), 4);
    }
}
