//! Low-level helpers shared by the format parsers

use std::io::{self, Seek, SeekFrom};
use encoding_rs::{UTF_8, WINDOWS_1252};

use super::types::error::{Result, SelafinError};

/// Decode a fixed-width text field and strip its NUL/space padding.
///
/// Fields are plain ASCII in most files, but titles and variable names
/// written by French TELEMAC setups may carry Latin-1 accents, so anything
/// that is not valid UTF-8 is read as Windows-1252.
pub fn decode_text(bytes: &[u8]) -> String {
    let text = match UTF_8.decode_without_bom_handling_and_without_replacement(bytes) {
        Some(text) => text,
        None => WINDOWS_1252.decode_without_bom_handling(bytes).0,
    };
    text.trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_owned()
}

/// Total length of a seekable stream. The current position is preserved.
pub fn stream_len<S: Seek>(stream: &mut S) -> io::Result<u64> {
    let position = stream.stream_position()?;
    let len = stream.seek(SeekFrom::End(0))?;
    if position != len {
        stream.seek(SeekFrom::Start(position))?;
    }
    Ok(len)
}

/// Byte length of `count` items of `width` bytes, checked against the bytes
/// left in the stream.
///
/// Corrupt counts are rejected here, before anything is allocated for them.
pub fn checked_len(count: u64, width: u64, available: u64, record: &'static str) -> Result<usize> {
    count
        .checked_mul(width)
        .filter(|&bytes| bytes <= available)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or(SelafinError::AllocationOrCount { record, count })
}
