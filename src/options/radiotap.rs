//! Radiotap / PPI field sets (§4.4): length-delimited field records within
//! a link-layer radio metadata envelope, little-endian throughout (as all
//! 802.11-adjacent framing is, per §6). Each record is `type_number(u16 LE)
//! | length(u16 LE) | value(length bytes)`. Unknown field types are kept
//! verbatim, with [`RadiotapField::known`] set to `None`, so a radiotap/PPI
//! envelope round-trips losslessly even through fields this crate does not
//! interpret.
use crate::byte_slice::ByteSlice;
use crate::endian::{self, LittleEndian};
use crate::error::{Error, Result};

use super::Cursor;

/// The radio metadata fields this crate names; anything else surfaces as
/// `None` on [`RadiotapField::known`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnownField {
    Flags,
    Rate,
    Channel,
    AntennaSignalDbm,
    AntennaNoiseDbm,
    Antenna,
    RxFlags,
}

fn classify(type_number: u16) -> Option<KnownField> {
    use KnownField::*;
    Some(match type_number {
        0 => Flags,
        1 => Rate,
        2 => Channel,
        3 => AntennaSignalDbm,
        4 => AntennaNoiseDbm,
        5 => Antenna,
        6 => RxFlags,
        _ => return None,
    })
}

/// One decoded field record.
#[derive(Clone, Debug)]
pub struct RadiotapField {
    pub type_number: u16,
    pub known: Option<KnownField>,
    pub value: ByteSlice,
}

pub struct RadiotapFieldIter {
    cursor: Cursor,
}

pub fn iter(region: ByteSlice) -> RadiotapFieldIter {
    RadiotapFieldIter { cursor: Cursor::new(region) }
}

impl Iterator for RadiotapFieldIter {
    type Item = Result<RadiotapField>;

    fn next(&mut self) -> Option<Result<RadiotapField>> {
        if self.cursor.remaining() < 4 {
            return None;
        }
        let region = self.cursor.region().clone();
        let pos = self.cursor.pos();
        let type_number = match endian::read_u16::<LittleEndian>(&region, pos) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let length = match endian::read_u16::<LittleEndian>(&region, pos + 2) {
            Ok(v) => v as usize,
            Err(e) => return Some(Err(e)),
        };
        if self.cursor.advance(4).is_err() {
            return Some(Err(Error::InvariantViolated));
        }
        let value = match self.cursor.peek_slice(0, length) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if self.cursor.advance(length).is_err() {
            return Some(Err(Error::InvariantViolated));
        }
        Some(Ok(RadiotapField { type_number, known: classify(type_number), value }))
    }
}

pub fn parse_all(region: ByteSlice) -> Result<alloc::vec::Vec<RadiotapField>> {
    iter(region).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(type_number: u16, value: &[u8]) -> alloc::vec::Vec<u8> {
        let mut out = alloc::vec::Vec::new();
        out.extend_from_slice(&type_number.to_le_bytes());
        out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn known_and_unknown_fields_round_trip() {
        let mut bytes = field(0, &[0x02]);
        bytes.extend(field(9999, &[0xAA, 0xBB, 0xCC]));
        let region = ByteSlice::from_vec(bytes);
        let fields = parse_all(region).unwrap();
        assert_eq!(fields[0].known, Some(KnownField::Flags));
        assert_eq!(fields[1].known, None);
        assert_eq!(fields[1].type_number, 9999);
        assert_eq!(fields[1].value.actual(), alloc::vec![0xAA, 0xBB, 0xCC]);
    }
}
