//! Fortran unformatted sequential record framing.
//!
//! # Record Structure
//! ```text
//! [4 bytes] Payload length (big-endian u32)
//! [N bytes] Payload
//! [4 bytes] Payload length again (must equal the first marker)
//! ```
//!
//! The payload length is dictated by the caller's schema. The markers are only
//! compared with each other, which catches reads that drifted out of alignment.
//! No endian conversion is applied to the payload.

use std::io::{self, Read};

use byteorder::{NativeEndian, ReadBytesExt};
use log::{debug, trace, warn};

use super::endian::be_to_native_u32;
use crate::selafin::types::error::{Result, SelafinError};

/// What to do when the two length markers of a record disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    /// Fail with [`SelafinError::RecordFraming`].
    Strict,
    /// Log a warning and keep the payload that was read.
    Lenient,
}

/// Reads one record of exactly `len` payload bytes.
///
/// `record` names the logical field being read and is carried into errors.
pub fn read_record<R: Read>(
    reader: &mut R,
    len: usize,
    record: &'static str,
    framing: Framing,
) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    read_record_into(reader, &mut buf, len, record, framing)?;
    Ok(buf)
}

/// Reads one record into `buf`, replacing its contents.
///
/// On failure `buf` is left empty, never holding a partial payload.
pub fn read_record_into<R: Read>(
    reader: &mut R,
    buf: &mut Vec<u8>,
    len: usize,
    record: &'static str,
    framing: Framing,
) -> Result<()> {
    buf.clear();
    let start = read_marker(reader, record)?;

    buf.resize(len, 0);
    if let Err(e) = reader.read_exact(buf) {
        buf.clear();
        return Err(eof_as(e, record));
    }

    let end = match read_marker(reader, record) {
        Ok(end) => end,
        Err(e) => {
            buf.clear();
            return Err(e);
        }
    };

    let (start, end) = (be_to_native_u32(start), be_to_native_u32(end));
    if start != end {
        match framing {
            Framing::Strict => {
                buf.clear();
                return Err(SelafinError::RecordFraming { record, start, end });
            }
            Framing::Lenient => warn!(
                "Record framing mismatch in {}: start={}, end={}. Continuing with the data read.",
                record, start, end
            ),
        }
    } else if start as usize != len {
        debug!(
            "{} record declares {} bytes but {} bytes were expected",
            record, start, len
        );
    }

    trace!("Read {} record: {} bytes", record, len);
    Ok(())
}

/// Reads a length marker without conversion, as it appears on disk.
fn read_marker<R: Read>(reader: &mut R, record: &'static str) -> Result<u32> {
    reader
        .read_u32::<NativeEndian>()
        .map_err(|e| eof_as(e, record))
}

/// Tags a short read with the record it interrupted.
pub(crate) fn eof_as(err: io::Error, record: &'static str) -> SelafinError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SelafinError::UnexpectedEof { record }
    } else {
        SelafinError::Io(err)
    }
}
