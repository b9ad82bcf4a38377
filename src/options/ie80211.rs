//! IEEE 802.11 information elements (§4.4): a one-byte id, a one-byte
//! length, then `length` value bytes (max 255). Carried by management
//! frames. Same resize discipline as LLDP TLVs (§4.4).
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::error::{Error, Result};

use super::Cursor;

/// The information element ids this crate interprets by name; anything
/// else round-trips as [`InformationElementId::Unknown`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InformationElementId {
    Ssid,
    SupportedRates,
    DsParameterSet,
    TrafficIndicationMap,
    CountryInformation,
    ErpInformation,
    ExtendedSupportedRates,
    HtCapabilities,
    RsnInformation,
    VendorSpecific,
    Unknown(u8),
}

fn classify(raw: u8) -> InformationElementId {
    use InformationElementId::*;
    match raw {
        0 => Ssid,
        1 => SupportedRates,
        3 => DsParameterSet,
        5 => TrafficIndicationMap,
        7 => CountryInformation,
        42 => ErpInformation,
        45 => HtCapabilities,
        48 => RsnInformation,
        50 => ExtendedSupportedRates,
        221 => VendorSpecific,
        other => Unknown(other),
    }
}

fn id_code(id: InformationElementId) -> u8 {
    use InformationElementId::*;
    match id {
        Ssid => 0,
        SupportedRates => 1,
        DsParameterSet => 3,
        TrafficIndicationMap => 5,
        CountryInformation => 7,
        ErpInformation => 42,
        HtCapabilities => 45,
        RsnInformation => 48,
        ExtendedSupportedRates => 50,
        VendorSpecific => 221,
        Unknown(n) => n,
    }
}

/// One decoded information element.
#[derive(Clone, Debug)]
pub struct InformationElement {
    pub id: InformationElementId,
    pub value: ByteSlice,
    header_start: usize,
}

pub struct InformationElementIter {
    cursor: Cursor,
}

pub fn iter(region: ByteSlice) -> InformationElementIter {
    InformationElementIter { cursor: Cursor::new(region) }
}

impl Iterator for InformationElementIter {
    type Item = Result<InformationElement>;

    fn next(&mut self) -> Option<Result<InformationElement>> {
        if self.cursor.remaining() < 2 {
            return None;
        }
        let header_start = self.cursor.pos();
        let raw_id = match self.cursor.byte(0) {
            Ok(b) => b,
            Err(e) => return Some(Err(e)),
        };
        let length = match self.cursor.byte(1) {
            Ok(b) => b as usize,
            Err(e) => return Some(Err(e)),
        };
        if self.cursor.advance(2).is_err() {
            return Some(Err(Error::InvariantViolated));
        }
        let value = match self.cursor.peek_slice(0, length) {
            Ok(v) => v,
            Err(e) => return Some(Err(e)),
        };
        if self.cursor.advance(length).is_err() {
            return Some(Err(Error::InvariantViolated));
        }
        Some(Ok(InformationElement { id: classify(raw_id), value, header_start }))
    }
}

pub fn parse_all(region: ByteSlice) -> Result<Vec<InformationElement>> {
    iter(region).collect()
}

/// Replace `ie`'s value with `new_value` (at most 255 bytes), growing or
/// shrinking the information-element region in place. Mirrors
/// [`crate::options::lldp::set_value`]'s discipline.
pub fn set_value(region: &mut ByteSlice, ie: &InformationElement, new_value: &[u8]) -> Result<()> {
    if new_value.len() > 255 {
        return Err(Error::ValueTooLarge);
    }
    let value_start = ie.header_start + 2;
    let value_end = value_start + ie.value.length();
    region.splice_local(value_start, value_end, new_value)?;
    region.set_byte_at(ie.header_start, id_code(ie.id))?;
    region.set_byte_at(ie.header_start + 1, new_value.len() as u8)?;
    Ok(())
}
