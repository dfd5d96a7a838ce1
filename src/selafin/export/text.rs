//! Flat-file dump of a SELAFIN file.
//!
//! # Output Files
//! ```text
//! <base>.x.txt            NPOIN, then "i\tx" per node
//! <base>.y.txt            NPOIN, then "i\ty" per node
//! <base>.conn.txt         "NELEM\tNDP", then "e\tnode" per element node (0-based)
//! <base>.vars.txt         NBV(1), then "i\tname" per variable
//! <base>.var<i>.t<t>.txt  "k\tvalue" per node (or .dat: NPOIN native-endian f64)
//! <base>.times.txt        NT, then "t\ttime" per timestep
//! ```

use std::io::{Read, Seek, Write};
use std::path::PathBuf;

use byteorder::{NativeEndian, WriteBytesExt};
use log::{debug, info};

use super::{create, output_path};
use crate::selafin::reader::SelafinReader;
use crate::selafin::types::error::Result;

/// Where and how to write the dump.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpOptions {
    pub output_dir: PathBuf,
    /// Write variable arrays as raw `f64` instead of text.
    pub binary: bool,
}

impl Default for DumpOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            binary: false,
        }
    }
}

/// Writes coordinates, connectivity, variable names, every primary variable
/// of every timestep and the timestamps as separate files.
///
/// Returns the paths written, in order.
pub fn dump<R: Read + Seek>(
    reader: &mut SelafinReader<R>,
    base_name: &str,
    opts: &DumpOptions,
) -> Result<Vec<PathBuf>> {
    let dir = opts.output_dir.as_path();
    let mut written = Vec::new();
    info!("Dumping to {}/{}.*", dir.display(), base_name);

    // Coordinates
    let mesh = reader.mesh();
    for (suffix, coords) in [("x.txt", &mesh.x), ("y.txt", &mesh.y)] {
        let path = output_path(dir, base_name, suffix);
        let mut out = create(&path)?;
        writeln!(out, "{}", mesh.npoin)?;
        for (i, c) in coords.iter().enumerate() {
            writeln!(out, "{}\t{:.10}", i, c)?;
        }
        out.flush()?;
        written.push(path);
    }

    // Connectivity
    let path = output_path(dir, base_name, "conn.txt");
    let mut out = create(&path)?;
    writeln!(out, "{}\t{}", mesh.nelem, mesh.ndp)?;
    for (e, nodes) in mesh.elements().enumerate() {
        for node in nodes {
            writeln!(out, "{}\t{}", e, i64::from(*node) - 1)?;
        }
    }
    out.flush()?;
    written.push(path);

    // Variable names
    let header = reader.header();
    let path = output_path(dir, base_name, "vars.txt");
    let mut out = create(&path)?;
    writeln!(out, "{}", header.nbv_1)?;
    for (i, name) in header.var_names.iter().enumerate() {
        writeln!(out, "{}\t{}", i, name)?;
    }
    out.flush()?;
    written.push(path);

    // Values
    let primary = header.nbv_1 as usize;
    let mut times = Vec::with_capacity(reader.timestep_count() as usize);
    for step in reader.iter_timesteps() {
        let step = step?;
        debug!("Writing timestep {} (t = {})", step.index, step.time);
        for (i, values) in step.values.iter().take(primary).enumerate() {
            let suffix = if opts.binary {
                format!("var{}.t{}.dat", i, step.index)
            } else {
                format!("var{}.t{}.txt", i, step.index)
            };
            let path = output_path(dir, base_name, &suffix);
            let mut out = create(&path)?;
            for (k, v) in values.iter().enumerate() {
                if opts.binary {
                    out.write_f64::<NativeEndian>(f64::from(*v))?;
                } else {
                    writeln!(out, "{}\t{:+.10}", k, v)?;
                }
            }
            out.flush()?;
            written.push(path);
        }
        times.push(step.time);
    }

    // Timestamps
    let path = output_path(dir, base_name, "times.txt");
    let mut out = create(&path)?;
    writeln!(out, "{}", times.len())?;
    for (t, time) in times.iter().enumerate() {
        writeln!(out, "{}\t{:+.10}", t, time)?;
    }
    out.flush()?;
    written.push(path);

    info!("Wrote {} files", written.len());
    Ok(written)
}
