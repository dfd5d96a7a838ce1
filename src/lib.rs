//! # selafin-reader
//!
//! A reader for TELEMAC SELAFIN results files (`.slf`, `.res`).
//! Decodes the header, the finite-element mesh and individual timesteps of
//! single-precision `SERAFIN` files, with O(1) random access to any timestep.
//!
//! ```no_run
//! use selafin_reader::SelafinReader;
//!
//! let mut reader = SelafinReader::open("results.slf").unwrap();
//! println!("{} ({} nodes)", reader.header().title, reader.mesh().npoin);
//!
//! let last = reader.timestep_count() - 1;
//! let step = reader.read_timestep(last).unwrap();
//! println!("t = {}: {} variables", step.time, step.values.len());
//! ```
pub mod selafin;

// Re-export the main types for convenience
pub use selafin::{
    OpenOptions,
    SelafinDecoder,
    SelafinReader,
    TimestepIter,
    types::{
        error::{Result, SelafinError},
        models::{BoundingBox, DateTime, Header, Layout, LoadState, Mesh, MeshDims, Timestep},
    },
};
