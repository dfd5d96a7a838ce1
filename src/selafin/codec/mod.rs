//! Codec layer for record framing and byte-order conversion.
//!
//! # Submodules
//!
//! - [`endian`][]: Big-endian/native conversion of 32-bit integers and floats
//! - [`record`][]: Fortran unformatted sequential record framing

pub mod endian;
pub mod record;
