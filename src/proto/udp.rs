//! UDP (§4.5): an 8-byte header (source port, destination port, a length
//! covering header+payload) and a checksum computed over a pseudo-header.
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct UdpLayer {
    header: ByteSlice,
}

impl UdpLayer {
    pub const HEADER_LEN: usize = 8;
    const CHECKSUM_OFFSET: usize = 6;

    pub fn new(source_port: u16, destination_port: u16) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = UdpLayer { header };
        layer.set_source_port(source_port).expect("fixed-size header");
        layer.set_destination_port(destination_port).expect("fixed-size header");
        layer.set_length(Self::HEADER_LEN as u16).expect("fixed-size header");
        layer
    }

    pub fn source_port(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 0)
    }

    pub fn set_source_port(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 0, value)
    }

    pub fn destination_port(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn set_destination_port(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 2, value)
    }

    /// Header-plus-payload length, as declared by this datagram.
    pub fn length(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 4)
    }

    pub fn set_length(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 4, value)
    }

    pub fn checksum(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET)
    }

    fn segment_bytes(&self, upper_layer_payload: &[u8]) -> Vec<u8> {
        let mut segment = self.header.actual();
        segment.extend_from_slice(upper_layer_payload);
        segment
    }

    pub fn valid_checksum(&self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> bool {
        checksum::validate(pseudo_header, &self.segment_bytes(upper_layer_payload), Self::CHECKSUM_OFFSET)
    }

    pub fn calculate_checksum(&self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> u16 {
        checksum::compute(pseudo_header, &self.segment_bytes(upper_layer_payload), Self::CHECKSUM_OFFSET)
    }

    pub fn update_checksum(&mut self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> Result<()> {
        let value = self.calculate_checksum(pseudo_header, upper_layer_payload);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for UdpLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Udp
    }

    fn update_calculated_values(&mut self, payload: &[u8]) {
        let _ = self.set_length(Self::HEADER_LEN as u16 + payload.len() as u16);
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < UdpLayer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(UdpLayer::HEADER_LEN)?;
    let declared_len = endian::read_u16::<BigEndian>(&probe, 4)? as usize;
    if declared_len < UdpLayer::HEADER_LEN {
        return Err(Error::InvariantViolated);
    }
    let own_payload_len = declared_len - UdpLayer::HEADER_LEN;
    let (header, rest) = super::split_header(&payload, UdpLayer::HEADER_LEN, Some(own_payload_len))?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(UdpLayer { header }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Ipv6Address;

    #[test]
    fn checksum_valid_over_ipv6_pseudo_header() {
        let mut layer = UdpLayer::new(53, 53);
        let payload = [0xAAu8; 8];
        layer.set_length(UdpLayer::HEADER_LEN as u16 + payload.len() as u16).unwrap();
        let pseudo = checksum::pseudo_header_ipv6(Ipv6Address::UNSPECIFIED, Ipv6Address::UNSPECIFIED, 17, layer.length().unwrap() as u32);
        layer.update_checksum(&pseudo, &payload).unwrap();
        assert!(layer.valid_checksum(&pseudo, &payload));
    }
}
