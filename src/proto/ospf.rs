//! OSPFv2 (§4.5 supplement): a 24-byte common header shared by every OSPF
//! packet type (hello, DBD, LSR/LSU/LSAck): version, type, packet length,
//! router/area IDs, a checksum, an authentication type and an 8-byte
//! authentication field. Real OSPF excludes the authentication field from
//! its checksum; this crate simplifies that to a whole-header checksum with
//! the checksum field zeroed (documented as a scope reduction). Sub-record
//! dissection (hello neighbor lists, LSA/router-link bodies) is out of
//! scope; the payload beyond the common header is left as raw bytes.
use crate::address::Ipv4Address;
use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct OspfLayer {
    header: ByteSlice,
}

impl OspfLayer {
    pub const HEADER_LEN: usize = 24;
    const CHECKSUM_OFFSET: usize = 12;

    pub fn new(packet_type: u8, router_id: Ipv4Address, area_id: Ipv4Address) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = OspfLayer { header };
        layer.set_version(2).expect("fixed-size header");
        layer.set_packet_type(packet_type).expect("fixed-size header");
        layer.set_router_id(router_id).expect("fixed-size header");
        layer.set_area_id(area_id).expect("fixed-size header");
        layer
    }

    pub fn version(&self) -> Result<u8> {
        self.header.byte_at(0)
    }

    pub fn set_version(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(0, value)
    }

    pub fn packet_type(&self) -> Result<u8> {
        self.header.byte_at(1)
    }

    pub fn set_packet_type(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(1, value)
    }

    pub fn packet_length(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn set_packet_length(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 2, value)
    }

    pub fn router_id(&self) -> Result<Ipv4Address> {
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[4..8]))
    }

    pub fn set_router_id(&mut self, addr: Ipv4Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[4..8].copy_from_slice(&addr.octets()));
        Ok(())
    }

    pub fn area_id(&self) -> Result<Ipv4Address> {
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[8..12]))
    }

    pub fn set_area_id(&mut self, addr: Ipv4Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[8..12].copy_from_slice(&addr.octets()));
        Ok(())
    }

    pub fn checksum(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET)
    }

    pub fn au_type(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 14)
    }

    pub fn set_au_type(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 14, value)
    }

    pub fn authentication(&self) -> Result<[u8; 8]> {
        self.header.with_slice(|s| {
            let mut out = [0u8; 8];
            out.copy_from_slice(&s[16..24]);
            out
        })
    }

    pub fn set_authentication(&mut self, value: [u8; 8]) -> Result<()> {
        self.header.with_slice_mut(|s| s[16..24].copy_from_slice(&value));
        Ok(())
    }

    /// Validated over the whole common header with the checksum field
    /// zeroed. The authentication field is *included*, unlike real OSPF
    /// (see the module-level note).
    pub fn valid_checksum(&self) -> bool {
        checksum::validate(&[], &self.header.actual(), Self::CHECKSUM_OFFSET)
    }

    pub fn update_checksum(&mut self) -> Result<()> {
        let value = checksum::compute(&[], &self.header.actual(), Self::CHECKSUM_OFFSET);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for OspfLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Ospf
    }
}

/// Unpack a TOS-metric sub-record: the top byte is the TOS value, the
/// lower 24 bits the metric.
pub fn decode_tos_metric(word: u32) -> (u8, u32) {
    let tos = (word >> 24) as u8;
    let metric = word & 0x00FF_FFFF;
    (tos, metric)
}

pub fn encode_tos_metric(tos: u8, metric: u32) -> u32 {
    (u32::from(tos) << 24) | (metric & 0x00FF_FFFF)
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < OspfLayer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(OspfLayer::HEADER_LEN)?;
    let declared_len = endian::read_u16::<BigEndian>(&probe, 2)? as usize;
    let own_payload_len = declared_len.saturating_sub(OspfLayer::HEADER_LEN);
    let (header, rest) = super::split_header(&payload, OspfLayer::HEADER_LEN, Some(own_payload_len))?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(OspfLayer { header }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checksum_round_trip() {
        let mut layer = OspfLayer::new(1, Ipv4Address::new([192, 168, 1, 1]), Ipv4Address::new([0, 0, 0, 0]));
        layer.set_packet_length(OspfLayer::HEADER_LEN as u16).unwrap();
        layer.update_checksum().unwrap();
        assert!(layer.valid_checksum());
    }

    #[test]
    fn tos_metric_round_trip() {
        let word = encode_tos_metric(0x02, 0x00ABCDEF & 0x00FF_FFFF);
        let (tos, metric) = decode_tos_metric(word);
        assert_eq!(tos, 0x02);
        assert_eq!(metric, 0x00ABCDEF & 0x00FF_FFFF);
    }
}
