//! Sequential access to timesteps.
//!
//! # Example
//! ```no_run
//! # use selafin_reader::SelafinReader;
//! # let mut reader = SelafinReader::open("results.slf").unwrap();
//! for step in reader.iter_timesteps() {
//!     let step = step.unwrap();
//!     println!("t = {}", step.time);
//! }
//! ```

use std::io::{Read, Seek};

use super::reader::SelafinReader;
use super::types::error::Result;
use super::types::models::Timestep;

/// Iterator over the timesteps of a [`SelafinReader`], in file order.
///
/// Yields `Result<Timestep>`. After the first error the iterator is exhausted.
///
/// Created by [`SelafinReader::iter_timesteps()`](crate::SelafinReader::iter_timesteps).
pub struct TimestepIter<'a, R> {
    reader: &'a mut SelafinReader<R>,
    next: u32,
    end: u32,
}

impl<'a, R: Read + Seek> TimestepIter<'a, R> {
    pub(super) fn new(reader: &'a mut SelafinReader<R>) -> Self {
        let end = reader.timestep_count();
        Self { reader, next: 0, end }
    }
}

impl<R: Read + Seek> Iterator for TimestepIter<'_, R> {
    type Item = Result<Timestep>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let result = self.reader.read_timestep(self.next);
        self.next = if result.is_ok() { self.next + 1 } else { self.end };
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}
