//! File format parsing layer for SELAFIN results files.
//!
//! This module provides the mid-level parsing layer that bridges between
//! raw record I/O ([`codec`](crate::selafin::codec)) and the staged
//! [`SelafinDecoder`](crate::selafin::decoder::SelafinDecoder).
//!
//! # Module Organization
//!
//! - [`header`]: Title, format tag, variables, IPARAM, start date, mesh sizes
//! - [`mesh`]: Connectivity, boundary nodes, coordinates and the data layout
//! - [`timestep`]: Random-access decoding of one timestep

pub mod header;
pub mod mesh;
pub mod timestep;
