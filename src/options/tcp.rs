//! TCP options (§4.4): a one-byte kind at offset 0. `EndOfOptionList` (0)
//! and `NoOperation` (1) are exactly one byte with no length field; every
//! other kind stores its total length (including the kind and length
//! bytes themselves) at offset 1.
//!
//! Earlier revisions of this parser refused to run at all when the TCP
//! header's URG flag was set. URG does not affect option layout (it is a
//! flag on the segment, unrelated to the options region), so that gate has
//! been removed, see `DESIGN.md`. Options are now parsed independently of
//! any TCP flag.
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};

use super::Cursor;

/// The recognized TCP option kinds (§4.4's "Recognized kinds" list).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TcpOptionKind {
    EndOfOptionList,
    NoOperation,
    MaximumSegmentSize,
    WindowScale,
    SackPermitted,
    Sack,
    Echo,
    EchoReply,
    Timestamp,
    AltChecksumRequest,
    AltChecksumData,
    Md5Signature,
    UserTimeout,
}

/// Kinds that are explicitly rejected as experimental and unsupported
/// (§4.4): Partial-Order Connection Permitted/Service Profile, the three
/// Connection Count variants, and Quick-Start Response.
const EXPERIMENTAL_KINDS: [u8; 6] = [9, 10, 11, 12, 13, 27];

fn classify(raw_kind: u8) -> Result<TcpOptionKind> {
    use TcpOptionKind::*;
    Ok(match raw_kind {
        0 => EndOfOptionList,
        1 => NoOperation,
        2 => MaximumSegmentSize,
        3 => WindowScale,
        4 => SackPermitted,
        5 => Sack,
        6 => Echo,
        7 => EchoReply,
        8 => Timestamp,
        14 => AltChecksumRequest,
        15 => AltChecksumData,
        19 => Md5Signature,
        28 => UserTimeout,
        k if EXPERIMENTAL_KINDS.contains(&k) => return Err(Error::UnsupportedOption),
        _ => return Err(Error::UnknownOption),
    })
}

/// A fully decoded TCP option.
#[derive(Clone, Debug, PartialEq)]
pub enum TcpOption {
    EndOfOptionList,
    NoOperation,
    MaximumSegmentSize(u16),
    WindowScale(u8),
    SackPermitted,
    /// Each block is `(left_edge, right_edge)` of an out-of-order range.
    Sack(Vec<(u32, u32)>),
    Echo(u32),
    EchoReply(u32),
    Timestamp { value: u32, echo_reply: u32 },
    AltChecksumRequest(u8),
    AltChecksumData(Vec<u8>),
    Md5Signature([u8; 16]),
    UserTimeout(u16),
}

impl TcpOption {
    pub fn kind(&self) -> TcpOptionKind {
        match self {
            TcpOption::EndOfOptionList => TcpOptionKind::EndOfOptionList,
            TcpOption::NoOperation => TcpOptionKind::NoOperation,
            TcpOption::MaximumSegmentSize(_) => TcpOptionKind::MaximumSegmentSize,
            TcpOption::WindowScale(_) => TcpOptionKind::WindowScale,
            TcpOption::SackPermitted => TcpOptionKind::SackPermitted,
            TcpOption::Sack(_) => TcpOptionKind::Sack,
            TcpOption::Echo(_) => TcpOptionKind::Echo,
            TcpOption::EchoReply(_) => TcpOptionKind::EchoReply,
            TcpOption::Timestamp { .. } => TcpOptionKind::Timestamp,
            TcpOption::AltChecksumRequest(_) => TcpOptionKind::AltChecksumRequest,
            TcpOption::AltChecksumData(_) => TcpOptionKind::AltChecksumData,
            TcpOption::Md5Signature(_) => TcpOptionKind::Md5Signature,
            TcpOption::UserTimeout(_) => TcpOptionKind::UserTimeout,
        }
    }
}

fn decode_value(kind: TcpOptionKind, value: &ByteSlice) -> Result<TcpOption> {
    Ok(match kind {
        TcpOptionKind::EndOfOptionList | TcpOptionKind::NoOperation => unreachable!(),
        TcpOptionKind::MaximumSegmentSize => {
            TcpOption::MaximumSegmentSize(endian::read_u16::<BigEndian>(value, 0)?)
        }
        TcpOptionKind::WindowScale => TcpOption::WindowScale(value.byte_at(0)?),
        TcpOptionKind::SackPermitted => TcpOption::SackPermitted,
        TcpOptionKind::Sack => {
            if value.length() % 8 != 0 {
                return Err(Error::InvariantViolated);
            }
            let mut blocks = Vec::with_capacity(value.length() / 8);
            let mut at = 0;
            while at < value.length() {
                let left = endian::read_u32::<BigEndian>(value, at)?;
                let right = endian::read_u32::<BigEndian>(value, at + 4)?;
                blocks.push((left, right));
                at += 8;
            }
            TcpOption::Sack(blocks)
        }
        TcpOptionKind::Echo => TcpOption::Echo(endian::read_u32::<BigEndian>(value, 0)?),
        TcpOptionKind::EchoReply => TcpOption::EchoReply(endian::read_u32::<BigEndian>(value, 0)?),
        TcpOptionKind::Timestamp => TcpOption::Timestamp {
            value: endian::read_u32::<BigEndian>(value, 0)?,
            echo_reply: endian::read_u32::<BigEndian>(value, 4)?,
        },
        TcpOptionKind::AltChecksumRequest => TcpOption::AltChecksumRequest(value.byte_at(0)?),
        TcpOptionKind::AltChecksumData => TcpOption::AltChecksumData(value.actual()),
        TcpOptionKind::Md5Signature => {
            if value.length() != 16 {
                return Err(Error::InvariantViolated);
            }
            let mut bytes = [0u8; 16];
            let raw = value.actual();
            bytes.copy_from_slice(&raw);
            TcpOption::Md5Signature(bytes)
        }
        TcpOptionKind::UserTimeout => TcpOption::UserTimeout(endian::read_u16::<BigEndian>(value, 0)?),
    })
}

/// Iterates the options region of a TCP header, decoding one option per
/// step until `EndOfOptionList`, the region is exhausted, or an error.
pub struct TcpOptionsIter {
    cursor: Cursor,
    done: bool,
}

/// Start iterating the options bytes (TCP header bytes 20..DataOffset*4).
pub fn iter(region: ByteSlice) -> TcpOptionsIter {
    TcpOptionsIter { cursor: Cursor::new(region), done: false }
}

impl Iterator for TcpOptionsIter {
    type Item = Result<TcpOption>;

    fn next(&mut self) -> Option<Result<TcpOption>> {
        if self.done || self.cursor.remaining() == 0 {
            return None;
        }
        let raw_kind = match self.cursor.byte(0) {
            Ok(b) => b,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let kind = match classify(raw_kind) {
            Ok(k) => k,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        match kind {
            TcpOptionKind::EndOfOptionList => {
                self.done = true;
                Some(Ok(TcpOption::EndOfOptionList))
            }
            TcpOptionKind::NoOperation => {
                if self.cursor.advance(1).is_err() {
                    self.done = true;
                    return Some(Err(Error::InvariantViolated));
                }
                Some(Ok(TcpOption::NoOperation))
            }
            _ => {
                let length = match self.cursor.byte(1) {
                    Ok(b) => b as usize,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                };
                if length < 2 {
                    self.done = true;
                    return Some(Err(Error::InvariantViolated));
                }
                let value = match self.cursor.peek_slice(2, length - 2) {
                    Ok(v) => v,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                };
                let decoded = match decode_value(kind, &value) {
                    Ok(o) => o,
                    Err(e) => {
                        self.done = true;
                        return Some(Err(e));
                    }
                };
                if self.cursor.advance(length).is_err() {
                    self.done = true;
                    return Some(Err(Error::InvariantViolated));
                }
                Some(Ok(decoded))
            }
        }
    }
}

/// Collect every option in `region`, stopping (and propagating the error)
/// at the first one that fails to parse.
pub fn parse_all(region: ByteSlice) -> Result<Vec<TcpOption>> {
    iter(region).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mss_nop_window_scale_eol() {
        // 02 04 05 B4 01 03 03 07 00
        let region = ByteSlice::from_vec(alloc::vec![
            0x02, 0x04, 0x05, 0xB4, 0x01, 0x03, 0x03, 0x07, 0x00,
        ]);
        let parsed = parse_all(region).unwrap();
        assert_eq!(
            parsed,
            alloc::vec![
                TcpOption::MaximumSegmentSize(1460),
                TcpOption::NoOperation,
                TcpOption::WindowScale(7),
                TcpOption::EndOfOptionList,
            ]
        );
    }

    #[test]
    fn unsupported_experimental_kind() {
        let region = ByteSlice::from_vec(alloc::vec![9, 2]);
        assert_eq!(parse_all(region), Err(Error::UnsupportedOption));
    }

    #[test]
    fn unknown_kind() {
        let region = ByteSlice::from_vec(alloc::vec![200, 2]);
        assert_eq!(parse_all(region), Err(Error::UnknownOption));
    }

    #[test]
    fn sack_blocks() {
        let mut bytes = alloc::vec![5u8, 18];
        bytes.extend_from_slice(&1u32.to_be_bytes());
        bytes.extend_from_slice(&2u32.to_be_bytes());
        bytes.extend_from_slice(&3u32.to_be_bytes());
        bytes.extend_from_slice(&4u32.to_be_bytes());
        let region = ByteSlice::from_vec(bytes);
        let parsed = parse_all(region).unwrap();
        assert_eq!(parsed, alloc::vec![TcpOption::Sack(alloc::vec![(1, 2), (3, 4)])]);
    }
}
