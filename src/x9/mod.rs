//! Reader for ANSI X9.100-187 image cash letter files.
//!
//! The reader frames the raw byte stream into records, decodes the text fields,
//! assembles the file -> cash letter -> bundle -> item tree and checks the control
//! totals carried by the 70/90/99 records.

pub mod ebcdic;
pub mod framing;
pub mod model;
pub mod reader;
pub mod records;

pub use model::{Bundle, CashLetter, Check, ImageView, ReturnItem, X9File};
pub use reader::X9Reader;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Upper bound for a single record; image view data records carry whole TIFF images.
pub const DEFAULT_MAX_RECORD_SIZE: usize = 64 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    #[default]
    Ebcdic,
    Ascii,
}

impl Encoding {
    pub fn decode(&self, bytes: &[u8]) -> String {
        match self {
            Encoding::Ebcdic => ebcdic::decode(bytes),
            Encoding::Ascii => String::from_utf8_lossy(bytes).into_owned(),
        }
    }

    pub fn encode(&self, text: &str) -> Vec<u8> {
        match self {
            Encoding::Ebcdic => ebcdic::encode(text),
            Encoding::Ascii => text.as_bytes().to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Framing {
    /// Every record is preceded by a 4 byte big-endian length.
    #[default]
    #[serde(rename = "variable")]
    VariableLength,
    /// Records are separated by line feeds.
    #[serde(rename = "line")]
    LineDelimited,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReaderOptions {
    pub encoding: Encoding,
    pub framing: Framing,
    pub max_record_size: usize,
    pub validate_control_totals: bool,
}

impl Default for ReaderOptions {
    fn default() -> Self {
        Self {
            encoding: Encoding::Ebcdic,
            framing: Framing::VariableLength,
            max_record_size: DEFAULT_MAX_RECORD_SIZE,
            validate_control_totals: true,
        }
    }
}

#[derive(Error, Debug)]
pub enum X9Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file contains no records")]
    Empty,

    #[error("record {record}: declared length {length} exceeds the {max} byte limit")]
    RecordTooLarge {
        record: usize,
        length: usize,
        max: usize,
    },

    #[error("record {record}: truncated, expected {expected} bytes but found {found}")]
    Truncated {
        record: usize,
        expected: usize,
        found: usize,
    },

    #[error("record {record} (type {record_type}): {length} bytes, at least {minimum} required")]
    ShortRecord {
        record: usize,
        record_type: String,
        length: usize,
        minimum: usize,
    },

    #[error("record {record} (type {record_type}): invalid {field} '{value}'")]
    InvalidField {
        record: usize,
        record_type: String,
        field: &'static str,
        value: String,
    },

    #[error("record {record}: unexpected type {record_type} {context}")]
    UnexpectedRecord {
        record: usize,
        record_type: String,
        context: &'static str,
    },

    #[error("file ended {0}")]
    UnexpectedEof(&'static str),

    #[error("{scope}: {field} is {expected} in the control record but {actual} was counted")]
    ControlTotalMismatch {
        scope: String,
        field: &'static str,
        expected: u64,
        actual: u64,
    },
}
