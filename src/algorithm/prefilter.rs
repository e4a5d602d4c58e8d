use crate::io::error::{Result, configuration_error};
use crate::math::codec::PatternCode;
use bitvec::prelude::*;
use std::fmt;

/// Hashed membership table guarding exact pattern lookups
///
/// Each allowed code sets the bit at `code mod table_size`. A clear bit proves
/// the code is not allowed; a set bit only makes it a candidate.
#[derive(Clone, Debug)]
pub struct PrefilterIndex {
    bits: BitVec,
    table_size: usize,
}

impl PrefilterIndex {
    /// Create a table with no candidate slot
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for a zero table size.
    pub fn new(table_size: usize) -> Result<Self> {
        if table_size == 0 {
            return Err(configuration_error(
                "prefilter_size",
                &table_size,
                &"must be at least 1",
            ));
        }

        Ok(Self {
            bits: bitvec![0; table_size],
            table_size,
        })
    }

    /// Build a table from the allowed codes
    ///
    /// # Errors
    ///
    /// Returns `Configuration` for a zero table size.
    pub fn from_codes<I>(codes: I, table_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = PatternCode>,
    {
        let mut index = Self::new(table_size)?;
        for code in codes {
            index.insert(code);
        }
        Ok(index)
    }

    fn slot(&self, code: PatternCode) -> usize {
        // table_size fits usize, so the remainder does too
        (code % self.table_size as u64) as usize
    }

    /// Mark the slot of a code
    pub fn insert(&mut self, code: PatternCode) {
        let slot = self.slot(code);
        if slot < self.bits.len() {
            self.bits.set(slot, true);
        }
    }

    /// Whether a code may be allowed
    pub fn may_contain(&self, code: PatternCode) -> bool {
        self.bits.get(self.slot(code)).is_some_and(|bit| *bit)
    }

    /// Number of slots
    pub const fn table_size(&self) -> usize {
        self.table_size
    }

    /// Number of marked slots
    pub fn occupied(&self) -> usize {
        self.bits.count_ones()
    }

    /// Whether no slot is marked
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }
}

impl fmt::Display for PrefilterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} slots", self.occupied(), self.table_size)
    }
}
