//! LLDP TLVs (§4.4): a 16-bit big-endian header, `type` in the top 7 bits
//! and `length` in the low 9 bits, followed by `length` value bytes.
//! `type == 0` marks the end of the LLDPDU.
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};

use super::Cursor;

/// The recognized LLDP TLV types.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LldpTlvType {
    EndOfLldpdu,
    ChassisId,
    PortId,
    TimeToLive,
    PortDescription,
    SystemName,
    SystemDescription,
    SystemCapabilities,
    ManagementAddress,
    OrganizationSpecific,
    /// A type code this crate does not interpret; the raw value bytes are
    /// still preserved.
    Unknown(u8),
}

fn classify(raw: u8) -> LldpTlvType {
    use LldpTlvType::*;
    match raw {
        0 => EndOfLldpdu,
        1 => ChassisId,
        2 => PortId,
        3 => TimeToLive,
        4 => PortDescription,
        5 => SystemName,
        6 => SystemDescription,
        7 => SystemCapabilities,
        8 => ManagementAddress,
        127 => OrganizationSpecific,
        other => Unknown(other),
    }
}

fn type_code(ty: LldpTlvType) -> u8 {
    use LldpTlvType::*;
    match ty {
        EndOfLldpdu => 0,
        ChassisId => 1,
        PortId => 2,
        TimeToLive => 3,
        PortDescription => 4,
        SystemName => 5,
        SystemDescription => 6,
        SystemCapabilities => 7,
        ManagementAddress => 8,
        OrganizationSpecific => 127,
        Unknown(n) => n,
    }
}

/// One decoded TLV: its type, its value bytes (a view into the LLDPDU
/// region, not copied), and where its 2-byte header begins (needed by
/// [`set_value`] to rewrite the header after a resize).
#[derive(Clone, Debug)]
pub struct LldpTlv {
    pub ty: LldpTlvType,
    pub value: ByteSlice,
    header_start: usize,
}

pub struct LldpTlvIter {
    cursor: Cursor,
    done: bool,
}

/// Start iterating an LLDPDU's TLV list.
pub fn iter(region: ByteSlice) -> LldpTlvIter {
    LldpTlvIter { cursor: Cursor::new(region), done: false }
}

impl Iterator for LldpTlvIter {
    type Item = Result<LldpTlv>;

    fn next(&mut self) -> Option<Result<LldpTlv>> {
        if self.done || self.cursor.remaining() < 2 {
            return None;
        }
        let header_start = self.cursor.pos();
        let b0 = match self.cursor.byte(0) {
            Ok(b) => b,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let b1 = match self.cursor.byte(1) {
            Ok(b) => b,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        let word = u16::from_be_bytes([b0, b1]);
        let ty = classify((word >> 9) as u8 & 0x7F);
        let length = (word & 0x1FF) as usize;

        if self.cursor.advance(2).is_err() {
            self.done = true;
            return Some(Err(Error::InvariantViolated));
        }
        let value = match self.cursor.peek_slice(0, length) {
            Ok(v) => v,
            Err(e) => {
                self.done = true;
                return Some(Err(e));
            }
        };
        if self.cursor.advance(length).is_err() {
            self.done = true;
            return Some(Err(Error::InvariantViolated));
        }
        if ty == LldpTlvType::EndOfLldpdu {
            self.done = true;
        }
        Some(Ok(LldpTlv { ty, value, header_start }))
    }
}

pub fn parse_all(region: ByteSlice) -> Result<Vec<LldpTlv>> {
    iter(region).collect()
}

/// Replace `tlv`'s value with `new_value`, growing or shrinking the
/// LLDPDU region in place (§4.4). The region's own length is updated by
/// the underlying splice; the TLV's length field is rewritten to match.
/// All TLVs after this one keep their byte content, just shifted; the
/// caller must re-run [`iter`]/[`parse_all`] to see them at their new
/// positions (this module never caches the list).
pub fn set_value(region: &mut ByteSlice, tlv: &LldpTlv, new_value: &[u8]) -> Result<()> {
    if new_value.len() > 0x1FF {
        return Err(Error::ValueTooLarge);
    }
    let value_start = tlv.header_start + 2;
    let value_end = value_start + tlv.value.length();
    region.splice_local(value_start, value_end, new_value)?;
    let packed = (u16::from(type_code(tlv.ty)) << 9) | (new_value.len() as u16 & 0x1FF);
    endian::write_u16::<BigEndian>(region, tlv.header_start, packed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Ipv4Address;

    fn chassis_id_tlv(value: &[u8]) -> Vec<u8> {
        let header = (1u16 << 9) | value.len() as u16;
        let mut out = header.to_be_bytes().to_vec();
        out.extend_from_slice(value);
        out
    }

    fn management_address_tlv(addr: &[u8]) -> Vec<u8> {
        let header = (8u16 << 9) | addr.len() as u16;
        let mut out = header.to_be_bytes().to_vec();
        out.extend_from_slice(addr);
        out
    }

    fn end_tlv() -> Vec<u8> {
        0u16.to_be_bytes().to_vec()
    }

    #[test]
    fn parses_fixed_and_end_tlv() {
        let mut bytes = chassis_id_tlv(&[1, 2, 3]);
        bytes.extend(end_tlv());
        let region = ByteSlice::from_vec(bytes);
        let tlvs = parse_all(region).unwrap();
        assert_eq!(tlvs.len(), 2);
        assert_eq!(tlvs[0].ty, LldpTlvType::ChassisId);
        assert_eq!(tlvs[0].value.actual(), alloc::vec![1, 2, 3]);
        assert_eq!(tlvs[1].ty, LldpTlvType::EndOfLldpdu);
    }

    #[test]
    fn resize_management_address_tlv_preserves_following_tlv() {
        let ipv4 = Ipv4Address::new([10, 0, 0, 1]).octets();
        let mut bytes = management_address_tlv(&ipv4);
        let following = chassis_id_tlv(&[9, 9]);
        bytes.extend(following.clone());
        bytes.extend(end_tlv());

        let mut region = ByteSlice::from_vec(bytes);
        let tlvs = parse_all(region.clone()).unwrap();
        let mgmt = &tlvs[0];
        assert_eq!(mgmt.value.length(), 4);

        let ipv6_like = [0u8; 16];
        set_value(&mut region, mgmt, &ipv6_like).unwrap();

        let tlvs_after = parse_all(region).unwrap();
        assert_eq!(tlvs_after[0].ty, LldpTlvType::ManagementAddress);
        assert_eq!(tlvs_after[0].value.length(), 16);
        assert_eq!(tlvs_after[0].value.actual(), alloc::vec![0u8; 16]);
        assert_eq!(tlvs_after[1].ty, LldpTlvType::ChassisId);
        assert_eq!(tlvs_after[1].value.actual(), alloc::vec![9, 9]);
        assert_eq!(tlvs_after[2].ty, LldpTlvType::EndOfLldpdu);
    }
}
