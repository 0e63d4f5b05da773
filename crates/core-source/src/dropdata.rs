//! "Internal file drop" clipboard/drag payload codec.
//!
//! Little-endian layout, version 1:
//!
//! ```text
//! u32 version          (= 1)
//! u32 plugin_id_chars
//! u32 instance_context_chars
//! u32 path_count
//! u16 plugin_id[plugin_id_chars + 1]          // NUL-terminated UTF-16
//! u16 instance_context[instance_context_chars + 1]
//! repeat path_count times:
//!     u32 chars
//!     u16 path[chars + 1]
//! ```
//!
//! The blob crosses process boundaries, so every length is range-checked
//! before the read and every terminator verified. A single violation
//! rejects the whole payload.

use crate::{SourceError, SourceResult};

pub const DROP_PAYLOAD_VERSION: u32 = 1;

/// Character counts are bounded well below any real path or identifier so a
/// hostile length cannot force a huge allocation before validation.
const MAX_CHARS: u32 = 1 << 20;
const MAX_PATHS: u32 = 1 << 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropPayload {
    pub plugin_id: String,
    pub instance_context: String,
    pub paths: Vec<String>,
}

fn push_utf16z(out: &mut Vec<u8>, s: &str) -> u32 {
    let start = out.len();
    for unit in s.encode_utf16() {
        out.extend_from_slice(&unit.to_le_bytes());
    }
    let chars = ((out.len() - start) / 2) as u32;
    out.extend_from_slice(&0u16.to_le_bytes());
    chars
}

pub fn encode_drop_payload(payload: &DropPayload) -> Vec<u8> {
    let mut strings = Vec::new();
    let plugin_chars = push_utf16z(&mut strings, &payload.plugin_id);
    let context_chars = push_utf16z(&mut strings, &payload.instance_context);
    let mut path_block = Vec::new();
    for path in &payload.paths {
        let mut bytes = Vec::new();
        let chars = push_utf16z(&mut bytes, path);
        path_block.extend_from_slice(&chars.to_le_bytes());
        path_block.extend_from_slice(&bytes);
    }

    let mut out = Vec::with_capacity(16 + strings.len() + path_block.len());
    out.extend_from_slice(&DROP_PAYLOAD_VERSION.to_le_bytes());
    out.extend_from_slice(&plugin_chars.to_le_bytes());
    out.extend_from_slice(&context_chars.to_le_bytes());
    out.extend_from_slice(&(payload.paths.len() as u32).to_le_bytes());
    out.extend_from_slice(&strings);
    out.extend_from_slice(&path_block);
    out
}

struct Reader<'a> {
    buf: &'a [u8],
    at: usize,
}

impl<'a> Reader<'a> {
    fn u32(&mut self) -> SourceResult<u32> {
        if self.at + 4 > self.buf.len() {
            return Err(SourceError::InvalidData("drop payload truncated"));
        }
        let v = u32::from_le_bytes(self.buf[self.at..self.at + 4].try_into().unwrap());
        self.at += 4;
        Ok(v)
    }

    /// Read `chars` UTF-16 units plus the mandatory NUL terminator.
    fn utf16z(&mut self, chars: u32) -> SourceResult<String> {
        if chars > MAX_CHARS {
            return Err(SourceError::InvalidData("drop payload length too large"));
        }
        let total = (chars as usize + 1) * 2;
        if self.at + total > self.buf.len() {
            return Err(SourceError::InvalidData("drop payload string escapes blob"));
        }
        let bytes = &self.buf[self.at..self.at + chars as usize * 2];
        let term = &self.buf[self.at + chars as usize * 2..self.at + total];
        if term != [0, 0] {
            return Err(SourceError::InvalidData("missing NUL terminator"));
        }
        self.at += total;
        let units: Vec<u16> = bytes
            .chunks_exact(2)
            .map(|c| u16::from_le_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units)
            .map_err(|_| SourceError::InvalidData("drop payload string is not UTF-16"))
    }
}

pub fn decode_drop_payload(blob: &[u8]) -> SourceResult<DropPayload> {
    let mut r = Reader { buf: blob, at: 0 };
    let version = r.u32()?;
    if version != DROP_PAYLOAD_VERSION {
        return Err(SourceError::InvalidData("unsupported drop payload version"));
    }
    let plugin_chars = r.u32()?;
    let context_chars = r.u32()?;
    let path_count = r.u32()?;
    if path_count > MAX_PATHS {
        return Err(SourceError::InvalidData("drop payload path count too large"));
    }
    let plugin_id = r.utf16z(plugin_chars)?;
    let instance_context = r.utf16z(context_chars)?;
    let mut paths = Vec::with_capacity(path_count.min(1024) as usize);
    for _ in 0..path_count {
        let chars = r.u32()?;
        paths.push(r.utf16z(chars)?);
    }
    if r.at != blob.len() {
        return Err(SourceError::InvalidData("trailing bytes after drop payload"));
    }
    Ok(DropPayload { plugin_id, instance_context, paths })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> DropPayload {
        DropPayload {
            plugin_id: "local-fs".into(),
            instance_context: "pane:left".into(),
            paths: vec!["/home/u/a.txt".into(), "/home/u/ö folder".into()],
        }
    }

    #[test]
    fn round_trip_identity() {
        let p = sample();
        assert_eq!(decode_drop_payload(&encode_drop_payload(&p)).unwrap(), p);
    }

    #[test]
    fn empty_paths_round_trip() {
        let p = DropPayload {
            plugin_id: String::new(),
            instance_context: String::new(),
            paths: Vec::new(),
        };
        assert_eq!(decode_drop_payload(&encode_drop_payload(&p)).unwrap(), p);
    }

    #[test]
    fn rejects_wrong_version() {
        let mut blob = encode_drop_payload(&sample());
        blob[0] = 9;
        assert!(decode_drop_payload(&blob).is_err());
    }

    #[test]
    fn rejects_clobbered_terminator() {
        let mut blob = encode_drop_payload(&sample());
        // plugin_id terminator sits right after the 16-byte header + id chars.
        let term_at = 16 + "local-fs".len() * 2;
        blob[term_at] = b'!';
        assert!(decode_drop_payload(&blob).is_err());
    }

    #[test]
    fn rejects_truncation_anywhere() {
        let blob = encode_drop_payload(&sample());
        for cut in 0..blob.len() {
            assert!(
                decode_drop_payload(&blob[..cut]).is_err(),
                "cut at {cut} must not decode"
            );
        }
    }

    #[test]
    fn rejects_trailing_garbage() {
        let mut blob = encode_drop_payload(&sample());
        blob.push(0);
        assert!(decode_drop_payload(&blob).is_err());
    }

    #[test]
    fn rejects_hostile_path_count() {
        let mut blob = encode_drop_payload(&DropPayload {
            plugin_id: "p".into(),
            instance_context: String::new(),
            paths: Vec::new(),
        });
        blob[12..16].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(decode_drop_payload(&blob).is_err());
    }

    proptest! {
        #[test]
        fn round_trip_arbitrary(
            plugin_id in "\\PC{0,40}",
            instance_context in "\\PC{0,40}",
            paths in proptest::collection::vec("\\PC{0,80}", 0..8),
        ) {
            let p = DropPayload { plugin_id, instance_context, paths };
            prop_assert_eq!(decode_drop_payload(&encode_drop_payload(&p)).unwrap(), p);
        }
    }
}
