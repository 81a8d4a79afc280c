use super::{Framing, X9Error};
use std::io::{BufRead, ErrorKind, Read};

const LENGTH_PREFIX_BYTES: usize = 4;

/// One framed record, still encoded. `number` is 1-based within the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub number: usize,
    pub bytes: Vec<u8>,
}

/// Splits a byte stream into records according to the configured framing.
pub struct RecordFramer<R> {
    reader: R,
    framing: Framing,
    max_record_size: usize,
    count: usize,
}

impl<R: BufRead> RecordFramer<R> {
    pub fn new(reader: R, framing: Framing, max_record_size: usize) -> Self {
        Self {
            reader,
            framing,
            max_record_size,
            count: 0,
        }
    }

    /// Number of records framed so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn next_record(&mut self) -> Result<Option<RawRecord>, X9Error> {
        let number = self.count + 1;
        let bytes = match self.framing {
            Framing::VariableLength => self.read_length_prefixed(number)?,
            Framing::LineDelimited => self.read_line(number)?,
        };

        Ok(bytes.map(|bytes| {
            self.count = number;
            RawRecord { number, bytes }
        }))
    }

    fn read_length_prefixed(&mut self, number: usize) -> Result<Option<Vec<u8>>, X9Error> {
        let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
        let found = read_fully(&mut self.reader, &mut prefix)?;
        if found == 0 {
            return Ok(None);
        }
        if found < LENGTH_PREFIX_BYTES {
            return Err(X9Error::Truncated {
                record: number,
                expected: LENGTH_PREFIX_BYTES,
                found,
            });
        }

        let length = u32::from_be_bytes(prefix) as usize;
        if length > self.max_record_size {
            return Err(X9Error::RecordTooLarge {
                record: number,
                length,
                max: self.max_record_size,
            });
        }

        let mut bytes = Vec::with_capacity(length);
        let found = (&mut self.reader)
            .take(length as u64)
            .read_to_end(&mut bytes)?;
        if found < length {
            return Err(X9Error::Truncated {
                record: number,
                expected: length,
                found,
            });
        }

        Ok(Some(bytes))
    }

    fn read_line(&mut self, number: usize) -> Result<Option<Vec<u8>>, X9Error> {
        loop {
            let mut bytes = Vec::new();
            // newline plus optional carriage return on top of the record itself
            let limit = self.max_record_size as u64 + 2;
            let read = (&mut self.reader)
                .take(limit)
                .read_until(b'\n', &mut bytes)?;
            if read == 0 {
                return Ok(None);
            }

            let terminated = bytes.last() == Some(&b'\n');
            if terminated {
                bytes.pop();
                if bytes.last() == Some(&b'\r') {
                    bytes.pop();
                }
            }

            if bytes.len() > self.max_record_size {
                return Err(X9Error::RecordTooLarge {
                    record: number,
                    length: bytes.len(),
                    max: self.max_record_size,
                });
            }

            // blank lines between records carry nothing
            if !bytes.is_empty() {
                return Ok(Some(bytes));
            }
        }
    }
}

/// Like `read_exact`, but reports how many bytes were available at end of stream.
fn read_fully<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, X9Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(filled)
}
