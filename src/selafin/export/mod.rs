//! Conversions of a decoded file into formats other tools read.
//!
//! - [`text`]: flat text (or raw `f64`) files, one per array
//! - [`vtu`]: VTK `UnstructuredGrid` files plus a ParaView `.pvd` collection

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use log::trace;

use super::types::error::Result;

pub mod text;
pub mod vtu;

/// `<dir>/<base>.<suffix>`
pub(crate) fn output_path(dir: &Path, base: &str, suffix: &str) -> PathBuf {
    dir.join(format!("{}.{}", base, suffix))
}

pub(crate) fn create(path: &Path) -> Result<BufWriter<File>> {
    trace!("Creating {}", path.display());
    Ok(BufWriter::new(File::create(path)?))
}
