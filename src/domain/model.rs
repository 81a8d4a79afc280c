use crate::utils::error::{ErrorCategory, ExtractError};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One check as handed over by the X9 reader: the raw MICR fields the output is
/// derived from plus the image payloads in record order.
#[derive(Clone, PartialEq, Eq)]
pub struct CheckRecord {
    pub payor_bank_routing_number: String,
    pub payor_bank_check_digit: String,
    pub on_us: String,
    pub auxiliary_on_us: String,
    pub image_view_data: Vec<Vec<u8>>,
}

impl std::fmt::Debug for CheckRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CheckRecord")
            .field("payor_bank_routing_number", &self.payor_bank_routing_number)
            .field("payor_bank_check_digit", &self.payor_bank_check_digit)
            .field("on_us", &self.on_us)
            .field("auxiliary_on_us", &self.auxiliary_on_us)
            .field("image_views", &self.image_view_data.len())
            .finish()
    }
}

/// Metadata written next to every extracted image as `check-<n>.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckInfo {
    pub id: String,
    pub file_name: String,
    pub file_seq_no: u64,
    pub routing_number: String,
    pub account_number: String,
    pub check_number: String,
    pub auxiliary_on_us: String,
    pub payor_bank_routing_number: String,
    pub payor_bank_check_digit: String,
    pub on_us: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: String,
    pub file_name: String,
}

impl SourceFile {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let file_name = Path::new(&path)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.clone());
        Self { path, file_name }
    }
}

/// Running count of check records seen so far in the run. Passed into each file
/// step and returned advanced, so numbering never depends on shared state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SequenceCursor {
    checks_seen: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckPosition {
    /// 1-based across the whole run.
    pub sequence: u64,
    /// 1-based within the source file.
    pub file_seq_no: u64,
}

impl SequenceCursor {
    pub fn start() -> Self {
        Self::default()
    }

    pub fn checks_seen(&self) -> u64 {
        self.checks_seen
    }

    /// Position of the check at 0-based `index` of the file that starts at this cursor.
    pub fn position(&self, index: usize) -> CheckPosition {
        CheckPosition {
            sequence: self.checks_seen + index as u64 + 1,
            file_seq_no: index as u64 + 1,
        }
    }

    pub fn advance(self, checks: usize) -> Self {
        Self {
            checks_seen: self.checks_seen + checks as u64,
        }
    }
}

impl CheckPosition {
    pub fn id(&self) -> String {
        format!("check-{}", self.sequence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// Record the failure, skip the check or file, keep going.
    #[default]
    Continue,
    /// Stop the run at the first failure.
    FailFast,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputOptions {
    pub image_extension: String,
    pub json_indent: usize,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            image_extension: "tiff".to_string(),
            json_indent: 3,
        }
    }
}

/// Result of the extract step for one input file: its checks in cash letter,
/// bundle, record order.
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    pub source: SourceFile,
    pub checks: Vec<CheckRecord>,
}

#[derive(Clone)]
pub struct ExtractedCheck {
    pub info: CheckInfo,
    pub image: Vec<u8>,
}

impl std::fmt::Debug for ExtractedCheck {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractedCheck")
            .field("info", &self.info)
            .field("image_len", &self.image.len())
            .finish()
    }
}

#[derive(Debug)]
pub struct CheckFailure {
    pub id: String,
    pub file_seq_no: u64,
    pub error: ExtractError,
}

#[derive(Debug)]
pub struct TransformResult {
    pub source: SourceFile,
    pub checks: Vec<ExtractedCheck>,
    pub failures: Vec<CheckFailure>,
    /// Cursor positioned after the last check record of this file.
    pub cursor: SequenceCursor,
}

/// `failures` are ordered by position in the file.
#[derive(Debug, Default)]
pub struct LoadResult {
    pub written: usize,
    pub failures: Vec<CheckFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub file_name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_id: Option<String>,
    pub category: ErrorCategory,
    pub exit_code: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionSummary {
    pub output_dir: String,
    pub files_processed: usize,
    pub files_failed: usize,
    pub checks_extracted: usize,
    pub checks_failed: usize,
    pub failures: Vec<FailureReport>,
}

impl ExtractionSummary {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            files_processed: 0,
            files_failed: 0,
            checks_extracted: 0,
            checks_failed: 0,
            failures: Vec::new(),
        }
    }

    pub fn record_file(&mut self, source: &SourceFile, written: usize, failures: &[CheckFailure]) {
        self.files_processed += 1;
        self.checks_extracted += written;
        self.checks_failed += failures.len();
        self.failures.extend(failures.iter().map(|failure| FailureReport {
            file_name: source.file_name.clone(),
            path: source.path.clone(),
            check_id: Some(failure.id.clone()),
            category: failure.error.category(),
            exit_code: failure.error.exit_code(),
            message: failure.error.to_string(),
        }));
    }

    pub fn record_failed_file(&mut self, source: &SourceFile, error: &ExtractError) {
        self.files_failed += 1;
        self.failures.push(FailureReport {
            file_name: source.file_name.clone(),
            path: source.path.clone(),
            check_id: None,
            category: error.category(),
            exit_code: error.exit_code(),
            message: error.to_string(),
        });
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// 0 for a clean run, otherwise the exit code of the first recorded failure.
    pub fn exit_code(&self) -> i32 {
        self.failures
            .first()
            .map(|failure| failure.exit_code)
            .unwrap_or(crate::utils::error::exit_codes::SUCCESS)
    }
}
