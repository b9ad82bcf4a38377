//! DRDA/DDM records (§4.4 supplement, glossary "DDM"): Distributed Data
//! Management objects as carried by DRDA, a TCP application payload rather
//! than a link/network/transport header. Each DSS (Data Stream Structure)
//! is `ddm_length(u16 BE) | magic(0xD0) | format(u8) | correlation_id(u16
//! BE) | object_length(u16 BE) | code_point(u16 BE) | parameters`, where
//! `object_length` covers its own 4-byte header plus the parameter bytes,
//! and `ddm_length` covers the whole 10-byte record plus parameters, the
//! same type-then-length-then-value shape as every other option flavor in
//! this module, just with DRDA's own two-tier length encoding.
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};

use super::Cursor;

/// The fixed byte that marks a DSS header (DRDA's "magic number").
pub const DSS_MAGIC: u8 = 0xD0;

/// One decoded DSS/DDM record.
#[derive(Clone, Debug)]
pub struct DrdaDdm {
    pub ddm_length: u16,
    pub format: u8,
    pub correlation_id: u16,
    pub code_point: u16,
    /// The parameter bytes following the code point, a view into the
    /// payload (not copied).
    pub parameters: ByteSlice,
}

impl DrdaDdm {
    /// Bit 0x20 of the format byte: this DSS continues in a following one.
    pub fn chained(&self) -> bool {
        self.format & 0x20 != 0
    }
}

pub struct DrdaDdmIter {
    cursor: Cursor,
}

pub fn iter(region: ByteSlice) -> DrdaDdmIter {
    DrdaDdmIter { cursor: Cursor::new(region) }
}

const DSS_HEADER_LEN: usize = 6;
const OBJECT_HEADER_LEN: usize = 4;
const RECORD_HEADER_LEN: usize = DSS_HEADER_LEN + OBJECT_HEADER_LEN;

impl Iterator for DrdaDdmIter {
    type Item = Result<DrdaDdm>;

    fn next(&mut self) -> Option<Result<DrdaDdm>> {
        if self.cursor.remaining() < RECORD_HEADER_LEN {
            return None;
        }
        let region = self.cursor.region().clone();
        let pos = self.cursor.pos();
        let ddm_length = match endian::read_u16::<BigEndian>(&region, pos) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let magic = match self.cursor.byte(2) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if magic != DSS_MAGIC {
            return Some(Err(Error::InvariantViolated));
        }
        let format = match self.cursor.byte(3) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let correlation_id = match endian::read_u16::<BigEndian>(&region, pos + 4) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        let object_length = match endian::read_u16::<BigEndian>(&region, pos + 6) {
            Ok(v) => v as usize,
            Err(e) => return Some(Err(e)),
        };
        let code_point = match endian::read_u16::<BigEndian>(&region, pos + 8) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if object_length < OBJECT_HEADER_LEN || (ddm_length as usize) < RECORD_HEADER_LEN {
            return Some(Err(Error::InvariantViolated));
        }
        let param_len = object_length - OBJECT_HEADER_LEN;
        let parameters = match self.cursor.peek_slice(RECORD_HEADER_LEN, param_len) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if self.cursor.advance(ddm_length as usize).is_err() {
            return Some(Err(Error::InvariantViolated));
        }
        Some(Ok(DrdaDdm { ddm_length, format, correlation_id, code_point, parameters }))
    }
}

pub fn parse_all(region: ByteSlice) -> Result<Vec<DrdaDdm>> {
    iter(region).collect()
}

/// The glossary's "DDM heuristic": does `bytes` look like the start of a
/// DRDA conversation? Checked (not parsed) so a caller can decide whether
/// to treat a TCP payload as DRDA without committing to a full parse of an
/// unrelated application protocol that happens to share a port.
pub fn looks_like_drda(bytes: &ByteSlice) -> bool {
    bytes.length() >= RECORD_HEADER_LEN && bytes.byte_at(2) == Ok(DSS_MAGIC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ddm(format: u8, correlation_id: u16, code_point: u16, params: &[u8]) -> Vec<u8> {
        let object_length = (OBJECT_HEADER_LEN + params.len()) as u16;
        let ddm_length = (RECORD_HEADER_LEN + params.len()) as u16;
        let mut out = Vec::new();
        out.extend_from_slice(&ddm_length.to_be_bytes());
        out.push(DSS_MAGIC);
        out.push(format);
        out.extend_from_slice(&correlation_id.to_be_bytes());
        out.extend_from_slice(&object_length.to_be_bytes());
        out.extend_from_slice(&code_point.to_be_bytes());
        out.extend_from_slice(params);
        out
    }

    #[test]
    fn heuristic_rejects_non_drda_bytes() {
        let region = ByteSlice::from_vec(alloc::vec![0x47, 0x45, 0x54, 0x20]); // "GET "
        assert!(!looks_like_drda(&region));
    }

    #[test]
    fn parses_a_single_ddm_record() {
        let bytes = ddm(0x00, 1, 0x2001, &[1, 2, 3]);
        let region = ByteSlice::from_vec(bytes);
        assert!(looks_like_drda(&region));
        let records = parse_all(region).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].code_point, 0x2001);
        assert_eq!(records[0].correlation_id, 1);
        assert!(!records[0].chained());
        assert_eq!(records[0].parameters.actual(), alloc::vec![1, 2, 3]);
    }

    #[test]
    fn parses_two_chained_records() {
        let mut bytes = ddm(0x20, 1, 0x2001, &[9]);
        bytes.extend(ddm(0x00, 1, 0x2002, &[]));
        let region = ByteSlice::from_vec(bytes);
        let records = parse_all(region).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records[0].chained());
        assert_eq!(records[1].code_point, 0x2002);
        assert_eq!(records[1].parameters.length(), 0);
    }
}
