//! Typed X9.100-187 records.
//!
//! Field positions below are 0-based byte offsets into the record (the standard
//! itself counts from 1). Text fields are decoded with the file's encoding and
//! trimmed; image bytes are kept as they are.

use super::framing::RawRecord;
use super::{Encoding, X9Error};
use chrono::NaiveDate;

const FIXED_RECORD_LEN: usize = 80;
// everything in a type 52 record up to and including the image reference key length
const IMAGE_VIEW_DATA_HEADER_LEN: usize = 105;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub standard_level: String,
    pub test_file_indicator: String,
    pub immediate_destination: String,
    pub immediate_origin: String,
    pub creation_date: Option<NaiveDate>,
    pub creation_time: String,
    pub immediate_destination_name: String,
    pub immediate_origin_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashLetterHeader {
    pub collection_type_indicator: String,
    pub destination_routing_number: String,
    pub ece_institution_routing_number: String,
    pub business_date: Option<NaiveDate>,
    pub creation_date: Option<NaiveDate>,
    pub cash_letter_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleHeader {
    pub collection_type_indicator: String,
    pub destination_routing_number: String,
    pub ece_institution_routing_number: String,
    pub business_date: Option<NaiveDate>,
    pub creation_date: Option<NaiveDate>,
    pub bundle_id: String,
    pub sequence_number: String,
}

/// Type 25, one forward presentment item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckDetail {
    pub auxiliary_on_us: String,
    pub external_processing_code: String,
    pub payor_bank_routing_number: String,
    pub payor_bank_check_digit: String,
    pub on_us: String,
    /// Amount in cents.
    pub item_amount: u64,
    pub ece_institution_item_sequence_number: String,
    pub addendum_count: u64,
}

/// Type 31. Only the fields needed for control totals are kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnDetail {
    pub payor_bank_routing_number: String,
    pub payor_bank_check_digit: String,
    pub on_us: String,
    pub item_amount: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageViewDetail {
    pub image_indicator: String,
    pub image_creator_routing_number: String,
    pub image_creator_date: Option<NaiveDate>,
    pub format_indicator: String,
    pub compression_algorithm: String,
    pub data_size: u64,
    pub view_side_indicator: String,
    pub view_descriptor: String,
}

#[derive(Clone, PartialEq, Eq)]
pub struct ImageViewData {
    pub ece_institution_routing_number: String,
    pub bundle_business_date: Option<NaiveDate>,
    pub ece_institution_item_sequence_number: String,
    pub image_reference_key: String,
    pub digital_signature: Vec<u8>,
    pub image_data: Vec<u8>,
}

// image payloads are too big to be useful in debug output
impl std::fmt::Debug for ImageViewData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageViewData")
            .field("ece_institution_routing_number", &self.ece_institution_routing_number)
            .field("bundle_business_date", &self.bundle_business_date)
            .field(
                "ece_institution_item_sequence_number",
                &self.ece_institution_item_sequence_number,
            )
            .field("image_reference_key", &self.image_reference_key)
            .field("digital_signature_len", &self.digital_signature.len())
            .field("image_data_len", &self.image_data.len())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleControl {
    pub items_count: u64,
    pub total_amount: u64,
    pub micr_valid_total_amount: u64,
    pub images_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashLetterControl {
    pub bundle_count: u64,
    pub items_count: u64,
    pub total_amount: u64,
    pub images_count: u64,
    pub ece_institution_name: String,
    pub settlement_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileControl {
    pub cash_letter_count: u64,
    pub total_record_count: u64,
    pub total_item_count: u64,
    pub total_amount: u64,
    pub contact_name: String,
    pub contact_phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    FileHeader(FileHeader),
    CashLetterHeader(CashLetterHeader),
    BundleHeader(BundleHeader),
    CheckDetail(CheckDetail),
    ReturnDetail(ReturnDetail),
    /// Types 26, 27, 28 and 32 to 35. Counted, not interpreted.
    ItemAddendum(String),
    ImageViewDetail(ImageViewDetail),
    ImageViewData(ImageViewData),
    BundleControl(BundleControl),
    CashLetterControl(CashLetterControl),
    FileControl(FileControl),
    /// Anything the reader has no use for (credits, routing number summaries, ...).
    Other(String),
}

impl Record {
    pub fn parse(raw: &RawRecord, encoding: Encoding) -> Result<Self, X9Error> {
        if raw.bytes.len() < 2 {
            return Err(X9Error::ShortRecord {
                record: raw.number,
                record_type: encoding.decode(&raw.bytes),
                length: raw.bytes.len(),
                minimum: 2,
            });
        }

        let record_type = encoding.decode(&raw.bytes[..2]);
        let fields = Fields {
            bytes: &raw.bytes,
            encoding,
            record: raw.number,
            record_type: &record_type,
        };

        let record = match record_type.as_str() {
            "01" => Record::FileHeader(fields.file_header()?),
            "10" => Record::CashLetterHeader(fields.cash_letter_header()?),
            "20" => Record::BundleHeader(fields.bundle_header()?),
            "25" => Record::CheckDetail(fields.check_detail()?),
            "26" | "27" | "28" | "32" | "33" | "34" | "35" => Record::ItemAddendum(record_type.clone()),
            "31" => Record::ReturnDetail(fields.return_detail()?),
            "50" => Record::ImageViewDetail(fields.image_view_detail()?),
            "52" => Record::ImageViewData(fields.image_view_data()?),
            "70" => Record::BundleControl(fields.bundle_control()?),
            "90" => Record::CashLetterControl(fields.cash_letter_control()?),
            "99" => Record::FileControl(fields.file_control()?),
            _ => Record::Other(record_type.clone()),
        };
        Ok(record)
    }

    pub fn record_type(&self) -> &str {
        match self {
            Record::FileHeader(_) => "01",
            Record::CashLetterHeader(_) => "10",
            Record::BundleHeader(_) => "20",
            Record::CheckDetail(_) => "25",
            Record::ReturnDetail(_) => "31",
            Record::ItemAddendum(t) | Record::Other(t) => t,
            Record::ImageViewDetail(_) => "50",
            Record::ImageViewData(_) => "52",
            Record::BundleControl(_) => "70",
            Record::CashLetterControl(_) => "90",
            Record::FileControl(_) => "99",
        }
    }
}

/// Field access over one raw record.
struct Fields<'a> {
    bytes: &'a [u8],
    encoding: Encoding,
    record: usize,
    record_type: &'a str,
}

impl Fields<'_> {
    fn require_len(&self, minimum: usize) -> Result<(), X9Error> {
        if self.bytes.len() < minimum {
            return Err(X9Error::ShortRecord {
                record: self.record,
                record_type: self.record_type.to_string(),
                length: self.bytes.len(),
                minimum,
            });
        }
        Ok(())
    }

    fn text(&self, start: usize, len: usize) -> String {
        self.encoding
            .decode(&self.bytes[start..start + len])
            .trim()
            .to_string()
    }

    fn invalid(&self, field: &'static str, value: String) -> X9Error {
        X9Error::InvalidField {
            record: self.record,
            record_type: self.record_type.to_string(),
            field,
            value,
        }
    }

    /// Unsigned numeric field; blank reads as zero.
    fn number(&self, field: &'static str, start: usize, len: usize) -> Result<u64, X9Error> {
        let value = self.text(start, len);
        if value.is_empty() {
            return Ok(0);
        }
        if !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(self.invalid(field, value));
        }
        value.parse().map_err(|_| self.invalid(field, value.clone()))
    }

    /// `YYYYMMDD` date; blank reads as absent.
    fn date(
        &self,
        field: &'static str,
        start: usize,
        len: usize,
    ) -> Result<Option<NaiveDate>, X9Error> {
        let value = self.text(start, len);
        if value.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(&value, "%Y%m%d")
            .map(Some)
            .map_err(|_| self.invalid(field, value))
    }

    fn file_header(&self) -> Result<FileHeader, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(FileHeader {
            standard_level: self.text(2, 2),
            test_file_indicator: self.text(4, 1),
            immediate_destination: self.text(5, 9),
            immediate_origin: self.text(14, 9),
            creation_date: self.date("file creation date", 23, 8)?,
            creation_time: self.text(31, 4),
            immediate_destination_name: self.text(36, 18),
            immediate_origin_name: self.text(54, 18),
        })
    }

    fn cash_letter_header(&self) -> Result<CashLetterHeader, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(CashLetterHeader {
            collection_type_indicator: self.text(2, 2),
            destination_routing_number: self.text(4, 9),
            ece_institution_routing_number: self.text(13, 9),
            business_date: self.date("cash letter business date", 22, 8)?,
            creation_date: self.date("cash letter creation date", 30, 8)?,
            cash_letter_id: self.text(44, 8),
        })
    }

    fn bundle_header(&self) -> Result<BundleHeader, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(BundleHeader {
            collection_type_indicator: self.text(2, 2),
            destination_routing_number: self.text(4, 9),
            ece_institution_routing_number: self.text(13, 9),
            business_date: self.date("bundle business date", 22, 8)?,
            creation_date: self.date("bundle creation date", 30, 8)?,
            bundle_id: self.text(38, 10),
            sequence_number: self.text(48, 4),
        })
    }

    fn check_detail(&self) -> Result<CheckDetail, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(CheckDetail {
            auxiliary_on_us: self.text(2, 15),
            external_processing_code: self.text(17, 1),
            payor_bank_routing_number: self.text(18, 8),
            payor_bank_check_digit: self.text(26, 1),
            on_us: self.text(27, 20),
            item_amount: self.number("item amount", 47, 10)?,
            ece_institution_item_sequence_number: self.text(57, 15),
            addendum_count: self.number("check detail addendum count", 76, 2)?,
        })
    }

    fn return_detail(&self) -> Result<ReturnDetail, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(ReturnDetail {
            payor_bank_routing_number: self.text(2, 8),
            payor_bank_check_digit: self.text(10, 1),
            on_us: self.text(11, 20),
            item_amount: self.number("item amount", 31, 10)?,
        })
    }

    fn image_view_detail(&self) -> Result<ImageViewDetail, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(ImageViewDetail {
            image_indicator: self.text(2, 1),
            image_creator_routing_number: self.text(3, 9),
            image_creator_date: self.date("image creator date", 12, 8)?,
            format_indicator: self.text(20, 2),
            compression_algorithm: self.text(22, 2),
            data_size: self.number("image view data size", 24, 7)?,
            view_side_indicator: self.text(31, 1),
            view_descriptor: self.text(32, 2),
        })
    }

    /// Type 52 is the only variable length record: three length-prefixed trailing
    /// fields (reference key, digital signature, image data).
    fn image_view_data(&self) -> Result<ImageViewData, X9Error> {
        self.require_len(IMAGE_VIEW_DATA_HEADER_LEN)?;

        let key_len = self.number("length of image reference key", 101, 4)? as usize;
        let key_start = IMAGE_VIEW_DATA_HEADER_LEN;
        self.require_len(key_start + key_len + 5)?;
        let image_reference_key = self.text(key_start, key_len);

        let signature_len_at = key_start + key_len;
        let signature_len =
            self.number("length of digital signature", signature_len_at, 5)? as usize;
        let signature_start = signature_len_at + 5;
        self.require_len(signature_start + signature_len + 7)?;
        let digital_signature = self.bytes[signature_start..signature_start + signature_len].to_vec();

        let image_len_at = signature_start + signature_len;
        let image_len = self.number("length of image data", image_len_at, 7)? as usize;
        let image_start = image_len_at + 7;
        self.require_len(image_start + image_len)?;
        let image_data = self.bytes[image_start..image_start + image_len].to_vec();

        Ok(ImageViewData {
            ece_institution_routing_number: self.text(2, 9),
            bundle_business_date: self.date("bundle business date", 11, 8)?,
            ece_institution_item_sequence_number: self.text(21, 15),
            image_reference_key,
            digital_signature,
            image_data,
        })
    }

    fn bundle_control(&self) -> Result<BundleControl, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(BundleControl {
            items_count: self.number("items within bundle count", 2, 4)?,
            total_amount: self.number("bundle total amount", 6, 12)?,
            micr_valid_total_amount: self.number("MICR valid total amount", 18, 12)?,
            images_count: self.number("images within bundle count", 30, 5)?,
        })
    }

    fn cash_letter_control(&self) -> Result<CashLetterControl, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(CashLetterControl {
            bundle_count: self.number("bundle count", 2, 6)?,
            items_count: self.number("items within cash letter count", 8, 8)?,
            total_amount: self.number("cash letter total amount", 16, 14)?,
            images_count: self.number("images within cash letter count", 30, 9)?,
            ece_institution_name: self.text(39, 18),
            settlement_date: self.date("settlement date", 57, 8)?,
        })
    }

    fn file_control(&self) -> Result<FileControl, X9Error> {
        self.require_len(FIXED_RECORD_LEN)?;
        Ok(FileControl {
            cash_letter_count: self.number("cash letter count", 2, 6)?,
            total_record_count: self.number("total record count", 8, 8)?,
            total_item_count: self.number("total item count", 16, 8)?,
            total_amount: self.number("file total amount", 24, 16)?,
            contact_name: self.text(40, 14),
            contact_phone_number: self.text(54, 10),
        })
    }
}
