//! Variable-record buffer walk.
//!
//! The walker is a forward-only iterator over the plugin buffer. It never
//! copies name bytes; callers receive the raw UTF-16LE slice and decide how
//! to decode. Every offset is range-checked against the *valid* buffer size
//! (not the allocation) before any field read, and the chain is bounded by
//! the record count to reject cycles a hostile `next_entry_offset` could
//! otherwise introduce.

use crate::{SourceError, SourceResult};

/// Fixed-size prefix of a record, before the name bytes.
pub const RECORD_HEADER_LEN: usize = 4 + 4 + 8 + 8 + 2;

/// One decoded record header with a borrowed name.
#[derive(Debug, Clone, Copy)]
pub struct RawRecord<'a> {
    pub file_attributes: u32,
    pub last_write_time: i64,
    pub end_of_file: u64,
    /// UTF-16LE name bytes, length always even.
    pub name_utf16: &'a [u8],
}

#[inline]
fn read_u32(buf: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(buf[at..at + 4].try_into().unwrap())
}

#[inline]
fn read_u16(buf: &[u8], at: usize) -> u16 {
    u16::from_le_bytes(buf[at..at + 2].try_into().unwrap())
}

#[inline]
fn read_i64(buf: &[u8], at: usize) -> i64 {
    i64::from_le_bytes(buf[at..at + 8].try_into().unwrap())
}

#[inline]
fn read_u64(buf: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(buf[at..at + 8].try_into().unwrap())
}

/// Iterator over the record chain in `buf[..buffer_size]`.
pub struct RecordWalker<'a> {
    buf: &'a [u8],
    buffer_size: usize,
    offset: usize,
    remaining: u32,
    done: bool,
}

impl<'a> RecordWalker<'a> {
    /// `count` bounds the number of records the chain may produce; a chain
    /// still running after `count` records is invalid.
    pub fn new(buf: &'a [u8], buffer_size: usize, count: u32) -> SourceResult<Self> {
        if buffer_size > buf.len() {
            return Err(SourceError::InvalidData(
                "buffer size exceeds allocated size",
            ));
        }
        if count > 0 && buffer_size < RECORD_HEADER_LEN {
            return Err(SourceError::InvalidData("buffer too small for one record"));
        }
        Ok(Self {
            buf,
            buffer_size,
            offset: 0,
            remaining: count,
            done: count == 0,
        })
    }

    fn parse_at(&self, offset: usize) -> SourceResult<(RawRecord<'a>, u32)> {
        if offset + RECORD_HEADER_LEN > self.buffer_size {
            return Err(SourceError::InvalidData("record header escapes buffer"));
        }
        let next = read_u32(self.buf, offset);
        let attrs = read_u32(self.buf, offset + 4);
        let time = read_i64(self.buf, offset + 8);
        let size = read_u64(self.buf, offset + 16);
        let name_len = read_u16(self.buf, offset + 24) as usize;
        if name_len % 2 != 0 {
            return Err(SourceError::InvalidData("odd name byte length"));
        }
        let name_start = offset + RECORD_HEADER_LEN;
        let name_end = name_start
            .checked_add(name_len)
            .ok_or(SourceError::InvalidData("name length overflow"))?;
        if name_end > self.buffer_size {
            return Err(SourceError::InvalidData("name escapes buffer"));
        }
        let rec = RawRecord {
            file_attributes: attrs,
            last_write_time: time,
            end_of_file: size,
            name_utf16: &self.buf[name_start..name_end],
        };
        Ok((rec, next))
    }
}

impl<'a> Iterator for RecordWalker<'a> {
    type Item = SourceResult<RawRecord<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.remaining == 0 {
            // Chain longer than the advertised count.
            self.done = true;
            return Some(Err(SourceError::InvalidData("record chain exceeds count")));
        }
        let (rec, next) = match self.parse_at(self.offset) {
            Ok(v) => v,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        self.remaining -= 1;
        if next == 0 {
            self.done = true;
        } else {
            // Relative links only move forward; the count bound caps chain length.
            let next_offset = self.offset + next as usize;
            if next_offset >= self.buffer_size {
                self.done = true;
                return Some(Err(SourceError::InvalidData("next pointer escapes buffer")));
            }
            self.offset = next_offset;
        }
        Some(Ok(rec))
    }
}

/// Append one record to `out`, returning the offset it was written at.
///
/// `link_previous` patches the previous record's `next_entry_offset`; pass
/// `None` for the first record. Used by in-memory sources and tests.
pub fn write_record(
    out: &mut Vec<u8>,
    link_previous: Option<usize>,
    attributes: u32,
    last_write_time: i64,
    end_of_file: u64,
    name: &str,
) -> usize {
    let offset = out.len();
    if let Some(prev) = link_previous {
        let delta = (offset - prev) as u32;
        out[prev..prev + 4].copy_from_slice(&delta.to_le_bytes());
    }
    let utf16: Vec<u16> = name.encode_utf16().collect();
    let name_bytes = utf16.len() * 2;
    out.extend_from_slice(&0u32.to_le_bytes()); // terminator until linked
    out.extend_from_slice(&attributes.to_le_bytes());
    out.extend_from_slice(&last_write_time.to_le_bytes());
    out.extend_from_slice(&end_of_file.to_le_bytes());
    out.extend_from_slice(&(name_bytes as u16).to_le_bytes());
    for unit in utf16 {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(names: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        let mut prev = None;
        for name in names {
            let at = write_record(&mut buf, prev, 0, 1, 10, name);
            prev = Some(at);
        }
        buf
    }

    fn decode(name: &[u8]) -> String {
        let units: Vec<u16> = name
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units).unwrap()
    }

    #[test]
    fn walk_yields_all_records_in_order() {
        let buf = build(&["alpha", "beta", "gamma"]);
        let walker = RecordWalker::new(&buf, buf.len(), 3).unwrap();
        let names: Vec<String> = walker.map(|r| decode(r.unwrap().name_utf16)).collect();
        assert_eq!(names, ["alpha", "beta", "gamma"]);
    }

    #[test]
    fn empty_chain() {
        let walker = RecordWalker::new(&[], 0, 0).unwrap();
        assert_eq!(walker.count(), 0);
    }

    #[test]
    fn rejects_buffer_size_over_allocation() {
        let buf = build(&["x"]);
        assert!(matches!(
            RecordWalker::new(&buf, buf.len() + 1, 1),
            Err(SourceError::InvalidData(_))
        ));
    }

    #[test]
    fn rejects_next_pointer_escape() {
        let mut buf = build(&["alpha", "beta"]);
        // Corrupt the first next pointer to jump past the buffer.
        let bogus = (buf.len() as u32 + 8).to_le_bytes();
        buf[0..4].copy_from_slice(&bogus);
        let mut walker = RecordWalker::new(&buf, buf.len(), 2).unwrap();
        assert!(walker.next().unwrap().is_ok());
        assert!(matches!(
            walker.next().unwrap(),
            Err(SourceError::InvalidData(_))
        ));
        assert!(walker.next().is_none());
    }

    #[test]
    fn early_terminator_shortens_chain() {
        let mut buf = build(&["alpha", "beta", "gamma"]);
        // Zeroing the first link terminates the chain after one record;
        // shorter than the advertised count is legal.
        buf[0..4].copy_from_slice(&0u32.to_le_bytes());
        let walker = RecordWalker::new(&buf, buf.len(), 3).unwrap();
        assert_eq!(walker.filter(|r| r.is_ok()).count(), 1);
    }

    #[test]
    fn rejects_name_escaping_buffer() {
        let buf = build(&["alpha"]);
        // Truncate the valid size into the middle of the name.
        let walker = RecordWalker::new(&buf, RECORD_HEADER_LEN + 2, 1);
        let mut walker = walker.unwrap();
        assert!(matches!(
            walker.next().unwrap(),
            Err(SourceError::InvalidData(_))
        ));
    }

    #[test]
    fn chain_longer_than_count_is_invalid() {
        let buf = build(&["a", "b", "c"]);
        let walker = RecordWalker::new(&buf, buf.len(), 2).unwrap();
        let results: Vec<_> = walker.collect();
        assert_eq!(results.len(), 3);
        assert!(results[2].is_err());
    }

    #[test]
    fn non_ascii_names_survive() {
        let buf = build(&["héllo wörld", "日本語"]);
        let walker = RecordWalker::new(&buf, buf.len(), 2).unwrap();
        let names: Vec<String> = walker.map(|r| decode(r.unwrap().name_utf16)).collect();
        assert_eq!(names, ["héllo wörld", "日本語"]);
    }
}
