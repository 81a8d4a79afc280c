use crate::domain::model::{CheckInfo, CheckPosition, CheckRecord, ExtractedCheck, SourceFile};
use crate::utils::error::{ExtractError, Result};

const ON_US_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedFields {
    pub routing_number: String,
    pub account_number: String,
    pub check_number: String,
}

/// Routing, account and check numbers from the raw MICR fields.
///
/// The On-Us field packs `<account>/<check number>`; a non-empty Auxiliary On-Us
/// always takes precedence for the check number.
pub fn derive_fields(record: &CheckRecord) -> Result<DerivedFields> {
    let routing_number = format!(
        "{}{}",
        record.payor_bank_routing_number, record.payor_bank_check_digit
    );

    let mut on_us = record.on_us.split(ON_US_SEPARATOR);
    // split always yields at least one item
    let account_number = on_us.next().unwrap_or_default().to_string();

    let check_number = if !record.auxiliary_on_us.is_empty() {
        record.auxiliary_on_us.clone()
    } else {
        on_us
            .next()
            .ok_or_else(|| ExtractError::MalformedOnUsField {
                on_us: record.on_us.clone(),
            })?
            .to_string()
    };

    Ok(DerivedFields {
        routing_number,
        account_number,
        check_number,
    })
}

impl CheckInfo {
    pub fn new(
        source: &SourceFile,
        position: &CheckPosition,
        record: &CheckRecord,
        derived: DerivedFields,
    ) -> Self {
        Self {
            id: position.id(),
            file_name: source.file_name.clone(),
            file_seq_no: position.file_seq_no,
            routing_number: derived.routing_number,
            account_number: derived.account_number,
            check_number: derived.check_number,
            auxiliary_on_us: record.auxiliary_on_us.clone(),
            payor_bank_routing_number: record.payor_bank_routing_number.clone(),
            payor_bank_check_digit: record.payor_bank_check_digit.clone(),
            on_us: record.on_us.clone(),
        }
    }
}

/// Everything written for one check: its metadata and the first image view.
pub fn extract_check(
    source: &SourceFile,
    position: &CheckPosition,
    record: CheckRecord,
) -> Result<ExtractedCheck> {
    let derived = derive_fields(&record)?;
    let info = CheckInfo::new(source, position, &record, derived);

    let image = record
        .image_view_data
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::MissingImageData {
            id: info.id.clone(),
        })?;

    Ok(ExtractedCheck { info, image })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SequenceCursor;

    fn record(on_us: &str, auxiliary_on_us: &str) -> CheckRecord {
        CheckRecord {
            payor_bank_routing_number: "07100001".to_string(),
            payor_bank_check_digit: "9".to_string(),
            on_us: on_us.to_string(),
            auxiliary_on_us: auxiliary_on_us.to_string(),
            image_view_data: vec![b"front".to_vec(), b"back".to_vec()],
        }
    }

    #[test]
    fn test_account_and_check_number_from_on_us() {
        let derived = derive_fields(&record("12345/6789", "")).unwrap();
        assert_eq!(derived.account_number, "12345");
        assert_eq!(derived.check_number, "6789");
    }

    #[test]
    fn test_auxiliary_on_us_wins() {
        let derived = derive_fields(&record("12345/6789", "999")).unwrap();
        assert_eq!(derived.account_number, "12345");
        assert_eq!(derived.check_number, "999");
    }

    #[test]
    fn test_auxiliary_on_us_covers_missing_subfield() {
        let derived = derive_fields(&record("12345", "999")).unwrap();
        assert_eq!(derived.account_number, "12345");
        assert_eq!(derived.check_number, "999");
    }

    #[test]
    fn test_routing_number_composition() {
        let derived = derive_fields(&record("12345/6789", "")).unwrap();
        assert_eq!(derived.routing_number, "071000019");
    }

    #[test]
    fn test_on_us_without_separator_is_malformed() {
        let err = derive_fields(&record("12345", "")).unwrap_err();
        match err {
            ExtractError::MalformedOnUsField { on_us } => assert_eq!(on_us, "12345"),
            other => panic!("expected MalformedOnUsField, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_on_us_is_malformed() {
        assert!(matches!(
            derive_fields(&record("", "")),
            Err(ExtractError::MalformedOnUsField { .. })
        ));
    }

    #[test]
    fn test_extra_subfields_are_ignored() {
        let derived = derive_fields(&record("12345/6789/77", "")).unwrap();
        assert_eq!(derived.account_number, "12345");
        assert_eq!(derived.check_number, "6789");
    }

    #[test]
    fn test_derivation_is_idempotent() {
        let input = record("12345/6789", "");
        let source = SourceFile::new("a.x9");
        let position = SequenceCursor::start().position(0);

        let first = extract_check(&source, &position, input.clone()).unwrap();
        let second = extract_check(&source, &position, input.clone()).unwrap();
        assert_eq!(first.info, second.info);
        assert_eq!(first.image, second.image);
        assert_eq!(derive_fields(&input).unwrap(), derive_fields(&input).unwrap());
    }

    #[test]
    fn test_extract_check_uses_first_image_and_position() {
        let source = SourceFile::new("/in/b.x9");
        let position = SequenceCursor::start().advance(3).position(1);

        let check = extract_check(&source, &position, record("12345/6789", "")).unwrap();
        assert_eq!(check.image, b"front");
        assert_eq!(check.info.id, "check-5");
        assert_eq!(check.info.file_name, "b.x9");
        assert_eq!(check.info.file_seq_no, 2);
        assert_eq!(check.info.on_us, "12345/6789");
        assert_eq!(check.info.payor_bank_check_digit, "9");
    }

    #[test]
    fn test_check_without_images() {
        let mut input = record("12345/6789", "");
        input.image_view_data.clear();
        let position = SequenceCursor::start().position(0);

        let err = extract_check(&SourceFile::new("a.x9"), &position, input).unwrap_err();
        assert!(matches!(err, ExtractError::MissingImageData { ref id } if id == "check-1"));
    }
}
