//! The `ByteSlice`: a `(buffer, offset, length)` window into a shared,
//! mutable byte container, and the basis of every layer in the tree.
//!
//! Cloning a `ByteSlice` never clones the underlying buffer; mutations
//! through any clone are visible through all others, by design (§3 of the
//! design doc: "cloning a ByteSlice does not clone the buffer").
use alloc::rc::Rc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::error::{Error, Result};

/// The root byte container shared by every layer parsed from it.
pub type SharedBuffer = Rc<RefCell<Vec<u8>>>;

/// A logical window `[offset, offset + length)` into a `SharedBuffer`.
#[derive(Clone, Debug)]
pub struct ByteSlice {
    buffer: SharedBuffer,
    offset: usize,
    length: usize,
}

impl ByteSlice {
    /// Wrap an existing buffer as a root slice spanning its whole length.
    pub fn from_vec(bytes: Vec<u8>) -> Self {
        let length = bytes.len();
        ByteSlice {
            buffer: Rc::new(RefCell::new(bytes)),
            offset: 0,
            length,
        }
    }

    /// Allocate a fresh zeroed buffer of `len` bytes as a root slice.
    pub fn zeroed(len: usize) -> Self {
        Self::from_vec(vec![0u8; len])
    }

    /// Build a slice over an existing shared buffer, checking bounds.
    pub fn with_buffer(buffer: SharedBuffer, offset: usize, length: usize) -> Result<Self> {
        let end = offset.checked_add(length).ok_or(Error::ShortBuffer)?;
        if end > buffer.borrow().len() {
            return Err(Error::ShortBuffer);
        }
        Ok(ByteSlice { buffer, offset, length })
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn length(&self) -> usize {
        self.length
    }

    /// The length of the whole owning buffer, not just this window.
    pub fn buffer_len(&self) -> usize {
        self.buffer.borrow().len()
    }

    /// Whether `self` and `other` are views into the very same buffer.
    pub fn same_buffer(&self, other: &ByteSlice) -> bool {
        Rc::ptr_eq(&self.buffer, &other.buffer)
    }

    pub(crate) fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    /// The `length` bytes starting at `offset`, copied out.
    pub fn actual(&self) -> Vec<u8> {
        let buf = self.buffer.borrow();
        buf[self.offset..self.offset + self.length].to_vec()
    }

    /// `self.actual()` followed by `following_len` more bytes from the same
    /// buffer, clamped to whatever is actually present. Used by checksum
    /// routines that need header-plus-payload as one contiguous region.
    pub fn actual_with_following(&self, following_len: usize) -> Vec<u8> {
        let buf = self.buffer.borrow();
        let start = self.offset;
        let avail_after_start = buf.len().saturating_sub(start);
        let take = (self.length + following_len).min(avail_after_start);
        buf[start..start + take].to_vec()
    }

    /// A sub-slice starting right after this one, running to the end of the
    /// buffer (or `cap` bytes, whichever is shorter). Never copies.
    pub fn encapsulated(&self, cap: Option<usize>) -> ByteSlice {
        let buf_len = self.buffer.borrow().len();
        let start = self.offset + self.length;
        let rest = buf_len.saturating_sub(start);
        let length = match cap {
            Some(c) => c.min(rest),
            None => rest,
        };
        ByteSlice {
            buffer: Rc::clone(&self.buffer),
            offset: start,
            length,
        }
    }

    /// Reassign the logical length of this window.
    ///
    /// Fails if `offset + new_length` would run past the buffer (spec
    /// names this condition `InvalidSliceBounds`; it is folded into
    /// [`Error::ShortBuffer`] here, the crate's single "not enough room"
    /// variant).
    pub fn set_length(&mut self, new_length: usize) -> Result<()> {
        let end = self.offset.checked_add(new_length).ok_or(Error::ShortBuffer)?;
        if end > self.buffer.borrow().len() {
            return Err(Error::ShortBuffer);
        }
        self.length = new_length;
        Ok(())
    }

    pub fn byte_at(&self, i: usize) -> Result<u8> {
        if i >= self.length {
            return Err(Error::ShortBuffer);
        }
        Ok(self.buffer.borrow()[self.offset + i])
    }

    pub fn set_byte_at(&self, i: usize, value: u8) -> Result<()> {
        if i >= self.length {
            return Err(Error::ShortBuffer);
        }
        self.buffer.borrow_mut()[self.offset + i] = value;
        Ok(())
    }

    /// Run `f` over this window as an immutable slice.
    pub(crate) fn with_slice<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        let buf = self.buffer.borrow();
        f(&buf[self.offset..self.offset + self.length])
    }

    /// Run `f` over this window as a mutable slice.
    pub(crate) fn with_slice_mut<R>(&self, f: impl FnOnce(&mut [u8]) -> R) -> R {
        let mut buf = self.buffer.borrow_mut();
        f(&mut buf[self.offset..self.offset + self.length])
    }

    /// Overwrite this window's bytes from `src`. `src.len()` must equal
    /// `self.length()`.
    pub fn copy_from_slice(&self, src: &[u8]) -> Result<()> {
        if src.len() != self.length {
            return Err(Error::InvariantViolated);
        }
        self.with_slice_mut(|dst| dst.copy_from_slice(src));
        Ok(())
    }

    /// Replace the sub-range `[local_start, local_end)` of *this slice's*
    /// bytes with `replacement`, growing or shrinking the owning buffer in
    /// place to fit.
    ///
    /// This is how a TLV/option setter (§4.4) grows or shrinks its value in
    /// place: the buffer's identity (the `Rc`) never changes, so every
    /// other `ByteSlice` over the same buffer and positioned at or before
    /// `local_start` keeps referring to the right bytes. A slice positioned
    /// *after* the splice point would be shifted by `replacement.len() -
    /// (local_end - local_start)` and is not auto-corrected (this crate's
    /// only splicing users, LLDP TLV lists and 802.11 information elements,
    /// are always the last/terminal layer in their tree), so no descendant
    /// slice ever needs re-deriving after a splice.
    pub fn splice_local(&mut self, local_start: usize, local_end: usize, replacement: &[u8]) -> Result<()> {
        if local_start > local_end || local_end > self.length {
            return Err(Error::InvariantViolated);
        }
        let abs_start = self.offset + local_start;
        let abs_end = self.offset + local_end;
        let delta = replacement.len() as isize - (local_end - local_start) as isize;
        self.buffer.borrow_mut().splice(abs_start..abs_end, replacement.iter().copied());
        self.length = (self.length as isize + delta) as usize;
        Ok(())
    }
}
