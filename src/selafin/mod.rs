//! Core SELAFIN reader module.
//!
//! ```text
//! File Structure:
//! ┌─────────────────┐
//! │  Header records │ ← format::header::parse()
//! │  (title, vars,  │
//! │   IPARAM, R6)   │
//! ├─────────────────┤
//! │  Mesh records   │ ← format::mesh::parse()
//! │  (IKLE, IPOBO,  │
//! │   X, Y)         │
//! ├─────────────────┤
//! │  Timestep 0..nt │ ← format::timestep::read()
//! │  (time + one    │
//! │   record per    │
//! │   variable)     │
//! └─────────────────┘
//! ```
//!
//! Every section is a run of Fortran unformatted records, see [`codec::record`].

pub mod codec;
pub mod decoder;
pub mod export;
pub mod format;
pub mod iter;
pub mod reader;
pub mod types;
mod utils;

pub use decoder::SelafinDecoder;
pub use iter::TimestepIter;
pub use reader::{OpenOptions, SelafinReader};
