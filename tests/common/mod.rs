#![allow(dead_code)]

use std::path::{Path, PathBuf};
use x9_extract::x9::Encoding;

pub struct TestCheck {
    pub on_us: String,
    pub auxiliary_on_us: String,
    pub amount: u64,
    pub image: Option<Vec<u8>>,
}

pub fn check(on_us: &str, image: &[u8]) -> TestCheck {
    TestCheck {
        on_us: on_us.to_string(),
        auxiliary_on_us: String::new(),
        amount: 1000,
        image: Some(image.to_vec()),
    }
}

pub fn tiff(tag: &str) -> Vec<u8> {
    // little-endian TIFF magic followed by arbitrary non-text bytes
    let mut bytes = vec![0x49, 0x49, 0x2A, 0x00, 0xFF, 0x00, 0x80, 0x0A];
    bytes.extend_from_slice(tag.as_bytes());
    bytes
}

/// Builds a variable-length framed, EBCDIC encoded X9 file whose control
/// records agree with its content.
pub struct X9FileBuilder {
    cash_letters: Vec<Vec<Vec<TestCheck>>>,
    file_amount_offset: u64,
}

impl X9FileBuilder {
    pub fn new() -> Self {
        Self {
            cash_letters: Vec::new(),
            file_amount_offset: 0,
        }
    }

    /// One cash letter with the given bundles of checks.
    pub fn cash_letter(mut self, bundles: Vec<Vec<TestCheck>>) -> Self {
        self.cash_letters.push(bundles);
        self
    }

    /// Makes the file control total amount disagree with the items.
    pub fn with_wrong_file_total(mut self) -> Self {
        self.file_amount_offset = 1;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut records: Vec<Vec<u8>> = Vec::new();
        records.push(text(&[
            (0, "01"),
            (2, "03"),
            (4, "T"),
            (5, "071000013"),
            (14, "061000052"),
            (23, "20240315"),
            (31, "1200"),
        ]));

        let mut file_items = 0u64;
        let mut file_amount = 0u64;

        for (cl_index, bundles) in self.cash_letters.iter().enumerate() {
            records.push(text(&[
                (0, "10"),
                (22, "20240315"),
                (30, "20240315"),
                (44, &format!("CL{:06}", cl_index + 1)),
            ]));

            let mut cl_items = 0u64;
            let mut cl_amount = 0u64;
            let mut cl_images = 0u64;

            for (b_index, checks) in bundles.iter().enumerate() {
                records.push(text(&[
                    (0, "20"),
                    (22, "20240315"),
                    (30, "20240315"),
                    (38, &format!("B{:09}", b_index + 1)),
                    (48, &format!("{:04}", b_index + 1)),
                ]));

                let mut images = 0u64;
                let mut amount = 0u64;
                for check in checks {
                    records.push(text(&[
                        (0, "25"),
                        (2, &check.auxiliary_on_us),
                        (18, "07100001"),
                        (26, "9"),
                        (27, &check.on_us),
                        (47, &format!("{:010}", check.amount)),
                    ]));
                    if let Some(image) = &check.image {
                        records.push(text(&[(0, "50")]));
                        records.push(image_view_data(image));
                        images += 1;
                    }
                    amount += check.amount;
                }

                let items = checks.len() as u64;
                records.push(text(&[
                    (0, "70"),
                    (2, &format!("{:04}", items)),
                    (6, &format!("{:012}", amount)),
                    (30, &format!("{:05}", images)),
                ]));

                cl_items += items;
                cl_amount += amount;
                cl_images += images;
            }

            records.push(text(&[
                (0, "90"),
                (2, &format!("{:06}", bundles.len())),
                (8, &format!("{:08}", cl_items)),
                (16, &format!("{:014}", cl_amount)),
                (30, &format!("{:09}", cl_images)),
            ]));
            file_items += cl_items;
            file_amount += cl_amount;
        }

        let total_records = records.len() + 1;
        records.push(text(&[
            (0, "99"),
            (2, &format!("{:06}", self.cash_letters.len())),
            (8, &format!("{:08}", total_records)),
            (16, &format!("{:08}", file_items)),
            (24, &format!("{:016}", file_amount + self.file_amount_offset)),
        ]));

        let mut out = Vec::new();
        for record in records {
            out.extend_from_slice(&(record.len() as u32).to_be_bytes());
            out.extend(record);
        }
        out
    }

    pub fn write_to(&self, dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, self.build()).unwrap();
        path
    }
}

fn layout(width: usize, fields: &[(usize, &str)]) -> String {
    let mut line = vec![' '; width];
    for (start, value) in fields {
        for (i, c) in value.chars().enumerate() {
            line[start + i] = c;
        }
    }
    line.into_iter().collect()
}

fn text(fields: &[(usize, &str)]) -> Vec<u8> {
    Encoding::Ebcdic.encode(&layout(80, fields))
}

fn image_view_data(image: &[u8]) -> Vec<u8> {
    let mut header = layout(105, &[(0, "52"), (101, "0000")]);
    header.push_str("00000");
    header.push_str(&format!("{:07}", image.len()));
    let mut bytes = Encoding::Ebcdic.encode(&header);
    bytes.extend_from_slice(image);
    bytes
}
