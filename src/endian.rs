//! Endian-aware integer access into a [`ByteSlice`](crate::ByteSlice).
//!
//! All protocol header fields route through here. Big-endian is used by
//! Ethernet/IP/TCP/UDP/ICMP/ARP/PPP/LLDP/OSPF; little-endian by IEEE 802.11
//! and radiotap (§6 of the design doc).
use byteorder::ByteOrder;

use crate::byte_slice::ByteSlice;
use crate::error::{Error, Result};

/// Big-endian marker, re-exported for readability at call sites.
pub type BigEndian = byteorder::BigEndian;
/// Little-endian marker, re-exported for readability at call sites.
pub type LittleEndian = byteorder::LittleEndian;

fn read_bytes(slice: &ByteSlice, at: usize, width: usize) -> Result<[u8; 8]> {
    let end = at.checked_add(width).ok_or(Error::ShortBuffer)?;
    if end > slice.length() {
        return Err(Error::ShortBuffer);
    }
    let mut tmp = [0u8; 8];
    slice.with_slice(|s| tmp[..width].copy_from_slice(&s[at..end]));
    Ok(tmp)
}

fn write_bytes(slice: &ByteSlice, at: usize, bytes: &[u8]) -> Result<()> {
    let end = at.checked_add(bytes.len()).ok_or(Error::ShortBuffer)?;
    if end > slice.length() {
        return Err(Error::ShortBuffer);
    }
    slice.with_slice_mut(|s| s[at..end].copy_from_slice(bytes));
    Ok(())
}

pub fn read_u16<E: ByteOrder>(slice: &ByteSlice, at: usize) -> Result<u16> {
    let tmp = read_bytes(slice, at, 2)?;
    Ok(E::read_u16(&tmp[..2]))
}

pub fn write_u16<E: ByteOrder>(slice: &ByteSlice, at: usize, value: u16) -> Result<()> {
    let mut tmp = [0u8; 2];
    E::write_u16(&mut tmp, value);
    write_bytes(slice, at, &tmp)
}

pub fn read_i16<E: ByteOrder>(slice: &ByteSlice, at: usize) -> Result<i16> {
    let tmp = read_bytes(slice, at, 2)?;
    Ok(E::read_i16(&tmp[..2]))
}

pub fn write_i16<E: ByteOrder>(slice: &ByteSlice, at: usize, value: i16) -> Result<()> {
    let mut tmp = [0u8; 2];
    E::write_i16(&mut tmp, value);
    write_bytes(slice, at, &tmp)
}

pub fn read_u32<E: ByteOrder>(slice: &ByteSlice, at: usize) -> Result<u32> {
    let tmp = read_bytes(slice, at, 4)?;
    Ok(E::read_u32(&tmp[..4]))
}

pub fn write_u32<E: ByteOrder>(slice: &ByteSlice, at: usize, value: u32) -> Result<()> {
    let mut tmp = [0u8; 4];
    E::write_u32(&mut tmp, value);
    write_bytes(slice, at, &tmp)
}

pub fn read_i32<E: ByteOrder>(slice: &ByteSlice, at: usize) -> Result<i32> {
    let tmp = read_bytes(slice, at, 4)?;
    Ok(E::read_i32(&tmp[..4]))
}

pub fn write_i32<E: ByteOrder>(slice: &ByteSlice, at: usize, value: i32) -> Result<()> {
    let mut tmp = [0u8; 4];
    E::write_i32(&mut tmp, value);
    write_bytes(slice, at, &tmp)
}

pub fn read_u64<E: ByteOrder>(slice: &ByteSlice, at: usize) -> Result<u64> {
    let tmp = read_bytes(slice, at, 8)?;
    Ok(E::read_u64(&tmp))
}

pub fn write_u64<E: ByteOrder>(slice: &ByteSlice, at: usize, value: u64) -> Result<()> {
    let mut tmp = [0u8; 8];
    E::write_u64(&mut tmp, value);
    write_bytes(slice, at, &tmp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn big_endian_roundtrip() {
        let slice = ByteSlice::zeroed(4);
        write_u16::<BigEndian>(&slice, 0, 0x0102).unwrap();
        assert_eq!(slice.actual(), vec![0x01, 0x02, 0, 0]);
        assert_eq!(read_u16::<BigEndian>(&slice, 0).unwrap(), 0x0102);
    }

    #[test]
    fn little_endian_roundtrip() {
        let slice = ByteSlice::zeroed(4);
        write_u16::<LittleEndian>(&slice, 0, 0x0102).unwrap();
        assert_eq!(slice.actual(), vec![0x02, 0x01, 0, 0]);
        assert_eq!(read_u16::<LittleEndian>(&slice, 0).unwrap(), 0x0102);
    }

    #[test]
    fn out_of_bounds_read_is_short_buffer() {
        let slice = ByteSlice::zeroed(2);
        assert_eq!(read_u32::<BigEndian>(&slice, 0), Err(Error::ShortBuffer));
    }
}
