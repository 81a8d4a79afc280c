use super::framing::RecordFramer;
use super::model::{Bundle, CashLetter, Check, ImageView, ReturnItem, X9File};
use super::records::{BundleHeader, CashLetterHeader, Record};
use super::{ReaderOptions, X9Error};
use std::io::{BufReader, Read};

/// Reads a whole X9 file into memory as a cash letter / bundle / item tree.
pub struct X9Reader<R> {
    framer: RecordFramer<BufReader<R>>,
    options: ReaderOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    None,
    Check,
    Return,
}

impl<R: Read> X9Reader<R> {
    pub fn new(reader: R, options: ReaderOptions) -> Self {
        Self {
            framer: RecordFramer::new(
                BufReader::new(reader),
                options.framing,
                options.max_record_size,
            ),
            options,
        }
    }

    pub fn read(mut self) -> Result<X9File, X9Error> {
        let header = match self.next()? {
            Some((_, Record::FileHeader(header))) => header,
            Some((number, record)) => {
                return Err(unexpected(number, &record, "where the file header (01) belongs"))
            }
            None => return Err(X9Error::Empty),
        };

        let mut cash_letters = Vec::new();
        let control = loop {
            match self.next()? {
                Some((_, Record::CashLetterHeader(cl_header))) => {
                    cash_letters.push(self.read_cash_letter(cl_header)?)
                }
                Some((_, Record::FileControl(control))) => break control,
                Some((number, record)) => {
                    return Err(unexpected(number, &record, "between cash letters"))
                }
                None => {
                    return Err(X9Error::UnexpectedEof(
                        "before the file control record (99)",
                    ))
                }
            }
        };

        if let Some((number, record)) = self.next()? {
            return Err(unexpected(number, &record, "after the file control record (99)"));
        }

        let file = X9File {
            header,
            cash_letters,
            control,
        };

        if self.options.validate_control_totals {
            let scope = "file";
            check_total(
                scope,
                "cash letter count",
                file.control.cash_letter_count,
                file.cash_letters.len() as u64,
            )?;
            check_total(
                scope,
                "total record count",
                file.control.total_record_count,
                self.framer.count() as u64,
            )?;
            check_total(
                scope,
                "total item count",
                file.control.total_item_count,
                file.item_count(),
            )?;
            check_total(
                scope,
                "file total amount",
                file.control.total_amount,
                file.total_amount(),
            )?;
        }

        tracing::debug!(
            "Read X9 file with {} cash letters, {} records",
            file.cash_letters.len(),
            self.framer.count()
        );
        Ok(file)
    }

    /// Next record the reader cares about, with its 1-based record number.
    fn next(&mut self) -> Result<Option<(usize, Record)>, X9Error> {
        while let Some(raw) = self.framer.next_record()? {
            match Record::parse(&raw, self.options.encoding)? {
                Record::Other(record_type) => {
                    tracing::debug!("Skipping record {} of type {}", raw.number, record_type);
                }
                record => return Ok(Some((raw.number, record))),
            }
        }
        Ok(None)
    }

    fn read_cash_letter(&mut self, header: CashLetterHeader) -> Result<CashLetter, X9Error> {
        let mut bundles = Vec::new();
        let control = loop {
            match self.next()? {
                Some((_, Record::BundleHeader(bundle_header))) => {
                    bundles.push(self.read_bundle(bundle_header)?)
                }
                Some((_, Record::CashLetterControl(control))) => break control,
                Some((number, record)) => {
                    return Err(unexpected(number, &record, "inside a cash letter"))
                }
                None => return Err(X9Error::UnexpectedEof("inside a cash letter")),
            }
        };

        let cash_letter = CashLetter {
            header,
            bundles,
            control,
        };

        if self.options.validate_control_totals {
            let scope = format!("cash letter '{}'", cash_letter.header.cash_letter_id);
            let control = &cash_letter.control;
            check_total(
                &scope,
                "bundle count",
                control.bundle_count,
                cash_letter.bundles.len() as u64,
            )?;
            check_total(
                &scope,
                "items count",
                control.items_count,
                cash_letter.item_count(),
            )?;
            check_total(
                &scope,
                "total amount",
                control.total_amount,
                cash_letter.total_amount(),
            )?;
            check_total(
                &scope,
                "images count",
                control.images_count,
                cash_letter.image_count(),
            )?;
        }

        Ok(cash_letter)
    }

    fn read_bundle(&mut self, header: BundleHeader) -> Result<Bundle, X9Error> {
        let mut checks: Vec<Check> = Vec::new();
        let mut returns: Vec<ReturnItem> = Vec::new();
        let mut current = Current::None;

        let control = loop {
            match self.next()? {
                Some((_, Record::CheckDetail(detail))) => {
                    checks.push(Check {
                        detail,
                        addenda: 0,
                        image_views: Vec::new(),
                    });
                    current = Current::Check;
                }
                Some((_, Record::ReturnDetail(detail))) => {
                    returns.push(ReturnItem {
                        detail,
                        addenda: 0,
                        image_views: Vec::new(),
                    });
                    current = Current::Return;
                }
                Some((number, record @ Record::ItemAddendum(_))) => {
                    let addenda = match current {
                        Current::Check => checks.last_mut().map(|c| &mut c.addenda),
                        Current::Return => returns.last_mut().map(|r| &mut r.addenda),
                        Current::None => None,
                    };
                    match addenda {
                        Some(count) => *count += 1,
                        None => return Err(unexpected(number, &record, "before any item")),
                    }
                }
                Some((number, Record::ImageViewDetail(detail))) => {
                    match current_views(&mut checks, &mut returns, current) {
                        Some(views) => views.push(ImageView { detail, data: None }),
                        None => {
                            return Err(X9Error::UnexpectedRecord {
                                record: number,
                                record_type: "50".to_string(),
                                context: "before any item",
                            })
                        }
                    }
                }
                Some((number, Record::ImageViewData(data))) => {
                    let view = current_views(&mut checks, &mut returns, current)
                        .and_then(|views| views.last_mut())
                        .filter(|view| view.data.is_none());
                    match view {
                        Some(view) => view.data = Some(data),
                        None => {
                            return Err(X9Error::UnexpectedRecord {
                                record: number,
                                record_type: "52".to_string(),
                                context: "without a preceding image view detail (50)",
                            })
                        }
                    }
                }
                Some((_, Record::BundleControl(control))) => break control,
                Some((number, record)) => {
                    return Err(unexpected(number, &record, "inside a bundle"))
                }
                None => return Err(X9Error::UnexpectedEof("inside a bundle")),
            }
        };

        let bundle = Bundle {
            header,
            checks,
            returns,
            control,
        };

        if self.options.validate_control_totals {
            let scope = format!("bundle '{}'", bundle.header.bundle_id);
            check_total(
                &scope,
                "items count",
                bundle.control.items_count,
                bundle.item_count(),
            )?;
            check_total(
                &scope,
                "total amount",
                bundle.control.total_amount,
                bundle.total_amount(),
            )?;
            check_total(
                &scope,
                "images count",
                bundle.control.images_count,
                bundle.image_count(),
            )?;
        }

        tracing::trace!(
            "Bundle '{}': {} checks, {} returns",
            bundle.header.bundle_id,
            bundle.checks.len(),
            bundle.returns.len()
        );
        Ok(bundle)
    }
}

fn current_views<'a>(
    checks: &'a mut [Check],
    returns: &'a mut [ReturnItem],
    current: Current,
) -> Option<&'a mut Vec<ImageView>> {
    match current {
        Current::Check => checks.last_mut().map(|c| &mut c.image_views),
        Current::Return => returns.last_mut().map(|r| &mut r.image_views),
        Current::None => None,
    }
}

fn unexpected(number: usize, record: &Record, context: &'static str) -> X9Error {
    X9Error::UnexpectedRecord {
        record: number,
        record_type: record.record_type().to_string(),
        context,
    }
}

fn check_total(scope: &str, field: &'static str, expected: u64, actual: u64) -> Result<(), X9Error> {
    if expected != actual {
        return Err(X9Error::ControlTotalMismatch {
            scope: scope.to_string(),
            field,
            expected,
            actual,
        });
    }
    Ok(())
}
