//! ICMPv4 (§4.5): type, code, a checksum over the ICMP message alone (no
//! pseudo-header, unlike ICMPv6, per RFC 792), and a 4-byte "rest of header"
//! whose meaning depends on the message type. Terminal: message-body
//! parsing beyond byte-accurate framing is out of scope.
use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct Icmpv4Layer {
    header: ByteSlice,
}

impl Icmpv4Layer {
    pub const HEADER_LEN: usize = 8;
    const CHECKSUM_OFFSET: usize = 2;

    pub fn new(icmp_type: u8, code: u8) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = Icmpv4Layer { header };
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

    /// Echo request/reply identifier (bytes 4-5 of the rest-of-header).
    pub fn identifier(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 4)
    }

    /// Echo request/reply sequence number (bytes 6-7 of the rest-of-header).
    pub fn sequence(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 6)
    }

    pub fn valid_checksum(&self, upper_layer_payload: &[u8]) -> bool {
        let mut segment = self.header.actual();
        segment.extend_from_slice(upper_layer_payload);
        checksum::validate(&[], &segment, Self::CHECKSUM_OFFSET)
    }

    pub fn update_checksum(&mut self, upper_layer_payload: &[u8]) -> Result<()> {
        let mut segment = self.header.actual();
        segment.extend_from_slice(upper_layer_payload);
        let value = checksum::compute(&[], &segment, Self::CHECKSUM_OFFSET);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for Icmpv4Layer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Icmpv4
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < Icmpv4Layer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let (header, rest) = super::split_header(&payload, Icmpv4Layer::HEADER_LEN, None)?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(Icmpv4Layer { header }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_request_checksum_round_trip() {
        let mut layer = Icmpv4Layer::new(8, 0);
        layer.update_checksum(&[]).unwrap();
        assert!(layer.valid_checksum(&[]));
    }
}
