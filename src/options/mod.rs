//! The option/TLV parser framework (§4.4): three flavors unified by the
//! "type-then-length-then-value" pattern: TCP options, LLDP TLVs, IEEE
//! 802.11 information elements, and radiotap/PPI field records.
//!
//! Every flavor re-parses its region from scratch on each access (the
//! region is cheap: a handful of options at most, and re-parsing means a
//! setter never has to worry about invalidating a cached list).
pub mod drda;
pub mod ie80211;
pub mod lldp;
pub mod radiotap;
pub mod tcp;

use crate::byte_slice::ByteSlice;
use crate::error::{Error, Result};

/// A byte cursor over a single TLV region, shared by every flavor's
/// iterator. Tracks only a position; flavors decide for themselves how
/// many header bytes a record has and how to read its length.
#[derive(Clone)]
pub(crate) struct Cursor {
    region: ByteSlice,
    pos: usize,
}

impl Cursor {
    pub(crate) fn new(region: ByteSlice) -> Self {
        Cursor { region, pos: 0 }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.region.length().saturating_sub(self.pos)
    }

    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    pub(crate) fn byte(&self, offset: usize) -> Result<u8> {
        self.region.byte_at(self.pos + offset)
    }

    pub(crate) fn advance(&mut self, n: usize) -> Result<()> {
        let new_pos = self.pos.checked_add(n).ok_or(Error::InvariantViolated)?;
        if new_pos > self.region.length() {
            return Err(Error::InvariantViolated);
        }
        self.pos = new_pos;
        Ok(())
    }

    /// A sub-slice of `len` bytes starting at the cursor's current
    /// position, without advancing.
    pub(crate) fn peek_slice(&self, local_start: usize, len: usize) -> Result<ByteSlice> {
        let start = self.pos + local_start;
        if start.checked_add(len).ok_or(Error::InvariantViolated)? > self.region.length() {
            return Err(Error::InvariantViolated);
        }
        // `ByteSlice` has no public "sub-slice at arbitrary start" outside
        // of `encapsulated`, which only ever starts right after the
        // current window -- build one by walking through a zero-length
        // prefix slice.
        let mut prefix = self.region.clone();
        prefix.set_length(start)?;
        let mut sub = prefix.encapsulated(Some(len));
        sub.set_length(len)?;
        Ok(sub)
    }

    pub(crate) fn region(&self) -> &ByteSlice {
        &self.region
    }
}
