//! ICMPv6 (§4.5 supplement): same framing as ICMPv4, but the checksum
//! covers an IPv6 pseudo-header (RFC 4443), unlike ICMPv4. Neighbor
//! Discovery option lists within the message body are not dissected
//! (out of scope, see SPEC_FULL.md §4.5).
use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct Icmpv6Layer {
    header: ByteSlice,
}

impl Icmpv6Layer {
    pub const HEADER_LEN: usize = 8;
    const CHECKSUM_OFFSET: usize = 2;

    pub fn new(icmp_type: u8, code: u8) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = Icmpv6Layer { header };
        layer.set_icmp_type(icmp_type).expect("fixed-size header");
        layer.set_code(code).expect("fixed-size header");
        layer
    }

    pub fn icmp_type(&self) -> Result<u8> {
        self.header.byte_at(0)
    }

    pub fn set_icmp_type(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(0, value)
    }

    pub fn code(&self) -> Result<u8> {
        self.header.byte_at(1)
    }

    pub fn set_code(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(1, value)
    }

    pub fn checksum(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET)
    }

    fn segment_bytes(&self, upper_layer_payload: &[u8]) -> alloc::vec::Vec<u8> {
        let mut segment = self.header.actual();
        segment.extend_from_slice(upper_layer_payload);
        segment
    }

    pub fn valid_checksum(&self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> bool {
        checksum::validate(pseudo_header, &self.segment_bytes(upper_layer_payload), Self::CHECKSUM_OFFSET)
    }

    pub fn update_checksum(&mut self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> Result<()> {
        let value = checksum::compute(pseudo_header, &self.segment_bytes(upper_layer_payload), Self::CHECKSUM_OFFSET);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for Icmpv6Layer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Icmpv6
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < Icmpv6Layer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let (header, rest) = super::split_header(&payload, Icmpv6Layer::HEADER_LEN, None)?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(Icmpv6Layer { header }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Ipv6Address;

    #[test]
    fn checksum_needs_pseudo_header_to_validate() {
        let mut layer = Icmpv6Layer::new(128, 0);
        let pseudo = checksum::pseudo_header_ipv6(Ipv6Address::UNSPECIFIED, Ipv6Address::UNSPECIFIED, 58, 8);
        layer.update_checksum(&pseudo, &[]).unwrap();
        assert!(layer.valid_checksum(&pseudo, &[]));
        assert!(!layer.valid_checksum(&[], &[]));
    }
}
