//! SELAFIN header parsing.
//!
//! This module handles:
//! - Validating the `SERAFIN` format tag
//! - Reading variable counts and names
//! - Reading the IPARAM block and the optional start date
//! - Reading the mesh dimensions that close the header
//!
//! # Header Structure
//! ```text
//! R1  [80 bytes]      72-byte title + 8-byte format tag
//! R2  [8 bytes]       NBV(1), NBV(2)
//! R3  [32 bytes] x NBV(1)  variable name (16 chars) and unit (16 chars)
//! R4  [40 bytes]      IPARAM(1..10)
//! R5  [24 bytes]      year, month, day, hour, minute, second (only if IPARAM(10) == 1)
//! R6  [16 bytes]      NELEM, NPOIN, NDP, 1
//! ```

use std::io::Read;

use byteorder::{BigEndian, ByteOrder};
use log::{debug, info, trace, warn};

use crate::selafin::codec::record::{self, Framing};
use crate::selafin::types::error::{Result, SelafinError};
use crate::selafin::types::models::{DateTime, Header, MeshDims, SERAFIN_TAG};
use crate::selafin::utils;

const TITLE_LEN: usize = 72;
const R1_LEN: usize = 80;
const R2_LEN: usize = 8;
const NAME_LEN: usize = 32;
const IPARAM_LEN: usize = 40;
const DATE_LEN: usize = 24;
const R6_LEN: usize = 16;

/// Everything the header records describe.
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderSection {
    pub header: Header,
    pub dims: MeshDims,
}

/// Parses the header records from the beginning of the file.
///
/// # Parameters
/// * `reader` - Reader positioned at offset 0
/// * `framing` - Policy for mismatched record markers
/// * `max_variables` - Upper bound on `NBV(1) + NBV(2)`
/// * `file_len` - Total file length, used to reject impossible counts
pub fn parse<R: Read>(
    reader: &mut R,
    framing: Framing,
    max_variables: u32,
    file_len: u64,
) -> Result<HeaderSection> {
    info!("Parsing SELAFIN header");

    // Step 1: Title and format tag
    let r1 = record::read_record(reader, R1_LEN, "title record (R1)", framing)?;
    let title = utils::decode_text(&r1[..TITLE_LEN]);
    let format = utils::decode_text(&r1[TITLE_LEN..]);
    debug!("Title: '{}', format: '{}'", title, format);
    if format != SERAFIN_TAG {
        return Err(SelafinError::UnsupportedFormat(format));
    }

    // Step 2: Variable counts
    let r2 = record::read_record(reader, R2_LEN, "variable counts (R2)", framing)?;
    let nbv_1 = BigEndian::read_u32(&r2[0..4]);
    let nbv_2 = BigEndian::read_u32(&r2[4..8]);
    debug!("NBV(1)={}, NBV(2)={}", nbv_1, nbv_2);

    let total = u64::from(nbv_1) + u64::from(nbv_2);
    if total > u64::from(max_variables) {
        return Err(SelafinError::AllocationOrCount {
            record: "variable counts (R2)",
            count: total,
        });
    }
    // Each name record occupies 40 bytes on disk including its markers
    utils::checked_len(u64::from(nbv_1), NAME_LEN as u64 + 8, file_len, "variable names")?;

    // Step 3: Variable names
    let mut var_names = Vec::with_capacity(nbv_1 as usize);
    for i in 0..nbv_1 {
        let raw = record::read_record(reader, NAME_LEN, "variable name (R3)", framing)?;
        let name = utils::decode_text(&raw);
        trace!("Variable {}: '{}'", i, name);
        var_names.push(name);
    }

    // Step 4: IPARAM
    let r4 = record::read_record(reader, IPARAM_LEN, "IPARAM (R4)", framing)?;
    let mut iparam = [0u32; 10];
    BigEndian::read_u32_into(&r4, &mut iparam);
    debug!("IPARAM: {:?}", iparam);

    // Step 5: Optional start date
    let date = if iparam[9] == 1 {
        let r5 = record::read_record(reader, DATE_LEN, "start date (R5)", framing)?;
        let mut fields = [0u32; 6];
        BigEndian::read_u32_into(&r5, &mut fields);
        let [year, month, day, hour, minute, second] = fields;
        let date = DateTime { year, month, day, hour, minute, second };
        debug!("Simulation start: {}", date);
        Some(date)
    } else {
        None
    };

    // Step 6: Mesh dimensions
    let r6 = record::read_record(reader, R6_LEN, "mesh dimensions (R6)", framing)?;
    let mut fields = [0u32; 4];
    BigEndian::read_u32_into(&r6, &mut fields);
    let [nelem, npoin, ndp, one] = fields;
    if one != 1 {
        warn!(
            "R6 sentinel is {} instead of 1. The file may not be parsed correctly.",
            one
        );
    }
    if !matches!(ndp, 3 | 4 | 6) {
        warn!("Unusual number of nodes per element: {}", ndp);
    }

    info!(
        "Header parsed: title='{}', variables={}+{}, elements={}, nodes={}, nodes per element={}",
        title, nbv_1, nbv_2, nelem, npoin, ndp
    );

    Ok(HeaderSection {
        header: Header {
            title,
            format,
            nbv_1,
            nbv_2,
            var_names,
            iparam,
            date,
        },
        dims: MeshDims { nelem, npoin, ndp },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn frame(out: &mut Vec<u8>, payload: &[u8]) {
        let len = (payload.len() as u32).to_be_bytes();
        out.extend_from_slice(&len);
        out.extend_from_slice(payload);
        out.extend_from_slice(&len);
    }

    fn u32s(values: &[u32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    fn padded(text: &str, width: usize) -> Vec<u8> {
        let mut bytes = text.as_bytes().to_vec();
        bytes.resize(width, b' ');
        bytes
    }

    fn header_bytes(tag: &str, names: &[&str], iparam: [u32; 10], r6: [u32; 4]) -> Vec<u8> {
        let mut out = Vec::new();
        let mut r1 = padded("TEST CASE", TITLE_LEN);
        r1.extend(padded(tag, 8));
        frame(&mut out, &r1);
        frame(&mut out, &u32s(&[names.len() as u32, 0]));
        for name in names {
            frame(&mut out, &padded(name, NAME_LEN));
        }
        frame(&mut out, &u32s(&iparam));
        if iparam[9] == 1 {
            frame(&mut out, &u32s(&[2016, 3, 7, 12, 30, 15]));
        }
        frame(&mut out, &u32s(&r6));
        out
    }

    fn parse_bytes(data: Vec<u8>) -> Result<HeaderSection> {
        let len = data.len() as u64;
        parse(&mut Cursor::new(data), Framing::Strict, 4096, len)
    }

    #[test]
    fn test_parse_variable_names_in_order() {
        let data = header_bytes("SERAFIN", &["H", "U", "V"], [0; 10], [1, 3, 3, 1]);
        let section = parse_bytes(data).unwrap();
        assert_eq!(section.header.title, "TEST CASE");
        assert_eq!(section.header.format, "SERAFIN");
        assert_eq!(section.header.var_names, vec!["H", "U", "V"]);
        assert_eq!(section.header.nbv_1, 3);
        assert_eq!(section.header.date, None);
        assert_eq!(section.dims, MeshDims { nelem: 1, npoin: 3, ndp: 3 });
    }

    #[test]
    fn test_reject_other_format_tags() {
        for tag in ["SERAFIN2", "SERAFIND", "NETCDF"] {
            let data = header_bytes(tag, &["H"], [0; 10], [1, 3, 3, 1]);
            match parse_bytes(data) {
                Err(SelafinError::UnsupportedFormat(found)) => assert_eq!(found, tag),
                other => panic!("expected UnsupportedFormat for {tag}, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_start_date_present() {
        let mut iparam = [0; 10];
        iparam[0] = 1;
        iparam[9] = 1;
        let data = header_bytes("SERAFIN", &["H"], iparam, [1, 3, 3, 1]);
        let section = parse_bytes(data).unwrap();
        assert_eq!(section.header.iparam, iparam);
        assert_eq!(section.header.date.unwrap().to_string(), "2016-03-07 12:30:15");
    }

    #[test]
    fn test_bad_sentinel_is_not_fatal() {
        let data = header_bytes("SERAFIN", &["H"], [0; 10], [2, 4, 3, 7]);
        let section = parse_bytes(data).unwrap();
        assert_eq!(section.dims, MeshDims { nelem: 2, npoin: 4, ndp: 3 });
    }

    #[test]
    fn test_absurd_variable_count() {
        let mut data = Vec::new();
        let mut r1 = padded("T", TITLE_LEN);
        r1.extend(padded("SERAFIN", 8));
        frame(&mut data, &r1);
        frame(&mut data, &u32s(&[1_000_000, 0]));
        let err = parse_bytes(data).unwrap_err();
        assert!(matches!(err, SelafinError::AllocationOrCount { count: 1_000_000, .. }));
    }

    #[test]
    fn test_names_larger_than_file() {
        let mut data = Vec::new();
        let mut r1 = padded("T", TITLE_LEN);
        r1.extend(padded("SERAFIN", 8));
        frame(&mut data, &r1);
        frame(&mut data, &u32s(&[50, 0]));
        let err = parse_bytes(data).unwrap_err();
        assert!(matches!(err, SelafinError::AllocationOrCount { record: "variable names", .. }));
    }

    #[test]
    fn test_framing_error_names_the_record() {
        let mut data = header_bytes("SERAFIN", &["H"], [0; 10], [1, 3, 3, 1]);
        // Corrupt the trailing marker of R2 (80 + 8 bytes for R1, then 4 + 8)
        data[88 + 12..88 + 16].copy_from_slice(&9u32.to_be_bytes());
        let err = parse_bytes(data).unwrap_err();
        assert!(matches!(
            err,
            SelafinError::RecordFraming { record: "variable counts (R2)", start: 8, end: 9 }
        ));
    }

    #[test]
    fn test_lenient_framing_continues() {
        let mut data = header_bytes("SERAFIN", &["H"], [0; 10], [1, 3, 3, 1]);
        data[88 + 12..88 + 16].copy_from_slice(&9u32.to_be_bytes());
        let len = data.len() as u64;
        let section = parse(&mut Cursor::new(data), Framing::Lenient, 4096, len).unwrap();
        assert_eq!(section.header.var_names, vec!["H"]);
    }

    #[test]
    fn test_truncated_header() {
        let mut data = header_bytes("SERAFIN", &["H"], [0; 10], [1, 3, 3, 1]);
        data.truncate(data.len() - 6);
        let err = parse_bytes(data).unwrap_err();
        assert!(matches!(err, SelafinError::UnexpectedEof { record: "mesh dimensions (R6)" }));
    }
}
