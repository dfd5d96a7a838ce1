//! Random-access timestep decoding.
//!
//! # Timestep Structure
//! ```text
//! [4 bytes]           Simulation time (f32)
//! [NPOIN * 4 bytes]   Variable 1 values (f32)
//! ...
//! [NPOIN * 4 bytes]   Variable NBV(1)+NBV(2) values (f32)
//! ```
//!
//! Every timestep has the same size, so its offset is computed from the
//! [`Layout`] and reached with an absolute seek. Reads never depend on where
//! the previous read left the stream.
//!
//! Framing is always checked here: a mismatch inside the data section means the
//! layout is wrong and every value read from it would be garbage.

use std::io::{Read, Seek, SeekFrom};

use byteorder::{ByteOrder, NativeEndian};
use log::trace;

use crate::selafin::codec::endian;
use crate::selafin::codec::record::{self, Framing};
use crate::selafin::types::error::{Result, SelafinError};
use crate::selafin::types::models::{Layout, Timestep};

/// Reads the time and all variable arrays of timestep `index`.
///
/// `buf` is scratch space reused across calls. On failure nothing decoded so
/// far is returned.
pub fn read<R: Read + Seek>(
    reader: &mut R,
    layout: &Layout,
    npoin: u32,
    variables: usize,
    index: u32,
    buf: &mut Vec<u8>,
) -> Result<Timestep> {
    let time = read_time(reader, layout, index, buf)?;

    let len = npoin as usize * 4;
    let mut values = Vec::with_capacity(variables);
    for _ in 0..variables {
        record::read_record_into(reader, buf, len, "field values", Framing::Strict)?;
        values.push(endian::decode_f32s(buf));
    }

    Ok(Timestep { index, time, values })
}

/// Reads only the time of timestep `index`, leaving the stream at its first
/// variable record.
pub fn read_time<R: Read + Seek>(
    reader: &mut R,
    layout: &Layout,
    index: u32,
    buf: &mut Vec<u8>,
) -> Result<f32> {
    if index >= layout.timestep_count {
        return Err(SelafinError::TimestepOutOfRange {
            index,
            count: layout.timestep_count,
        });
    }

    let offset = layout.timestep_offset(index);
    reader.seek(SeekFrom::Start(offset))?;
    record::read_record_into(reader, buf, 4, "timestamp", Framing::Strict)?;

    let time = endian::be_to_native_f32(NativeEndian::read_f32(buf));
    trace!("Timestep {} at {:#x}: t = {}", index, offset, time);
    Ok(time)
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

    fn floats(values: &[f32]) -> Vec<u8> {
        values.iter().flat_map(|v| v.to_be_bytes()).collect()
    }

    /// Two variables on two nodes, three timesteps, starting at offset 8.
    fn data_section() -> (Vec<u8>, Layout) {
        let mut out = vec![0xAA; 8];
        for t in 0..3 {
            let base = t as f32 * 10.0;
            frame(&mut out, &floats(&[base * 0.5]));
            frame(&mut out, &floats(&[base + 1.0, base + 2.0]));
            frame(&mut out, &floats(&[-base, -base - 1.0]));
        }
        let layout = Layout {
            mesh_start: 0,
            data_start: 8,
            stride: Layout::stride_for(2, 2),
            timestep_count: 3,
        };
        (out, layout)
    }

    #[test]
    fn test_read_timestep() {
        let (data, layout) = data_section();
        let mut cursor = Cursor::new(data);
        let step = read(&mut cursor, &layout, 2, 2, 1, &mut Vec::new()).unwrap();
        assert_eq!(step.index, 1);
        assert_eq!(step.time, 5.0);
        assert_eq!(step.values, vec![vec![11.0, 12.0], vec![-10.0, -11.0]]);
    }

    #[test]
    fn test_read_order_does_not_matter() {
        let (data, layout) = data_section();
        let mut cursor = Cursor::new(data);
        let mut buf = Vec::new();

        let sequential: Vec<_> = (0..3)
            .map(|t| read(&mut cursor, &layout, 2, 2, t, &mut buf).unwrap())
            .collect();
        let last = read(&mut cursor, &layout, 2, 2, 2, &mut buf).unwrap();
        let first = read(&mut cursor, &layout, 2, 2, 0, &mut buf).unwrap();

        assert_eq!(last, sequential[2]);
        assert_eq!(first, sequential[0]);
    }

    #[test]
    fn test_read_time_only() {
        let (data, layout) = data_section();
        let mut cursor = Cursor::new(data);
        assert_eq!(read_time(&mut cursor, &layout, 2, &mut Vec::new()).unwrap(), 10.0);
        assert_eq!(cursor.position(), layout.timestep_offset(2) + 12);
    }

    #[test]
    fn test_out_of_range() {
        let (data, layout) = data_section();
        let mut cursor = Cursor::new(data);
        let err = read(&mut cursor, &layout, 2, 2, 3, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, SelafinError::TimestepOutOfRange { index: 3, count: 3 }));
    }

    #[test]
    fn test_wrong_layout_is_detected() {
        let (data, mut layout) = data_section();
        layout.data_start += 4;
        let mut cursor = Cursor::new(data);
        let err = read(&mut cursor, &layout, 2, 2, 0, &mut Vec::new()).unwrap_err();
        assert!(matches!(err, SelafinError::RecordFraming { .. }));
    }
}
