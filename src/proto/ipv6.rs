//! IPv6 (§4.5): a fixed 40-byte header; payload length and next-header are
//! explicit fields, so unlike IPv4 there is no IHL to read first. No
//! layer-3 checksum.
use alloc::vec::Vec;

use crate::address::Ipv6Address;
use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::dispatch;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct Ipv6Layer {
    header: ByteSlice,
}

impl Ipv6Layer {
    pub const HEADER_LEN: usize = 40;

    pub fn new(source: Ipv6Address, destination: Ipv6Address, next_header: u8, hop_limit: u8) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = Ipv6Layer { header };
        layer.header.set_byte_at(0, 0x60).expect("fixed-size header"); // version 6
        layer.set_next_header(next_header).expect("fixed-size header");
        layer.set_hop_limit(hop_limit).expect("fixed-size header");
        layer.set_source(source).expect("fixed-size header");
        layer.set_destination(destination).expect("fixed-size header");
        layer
    }

    fn first_word(&self) -> Result<u32> {
        endian::read_u32::<BigEndian>(&self.header, 0)
    }

    pub fn version(&self) -> Result<u8> {
        Ok((self.first_word()? >> 28) as u8)
    }

    pub fn traffic_class(&self) -> Result<u8> {
        Ok((self.first_word()? >> 20) as u8)
    }

    pub fn flow_label(&self) -> Result<u32> {
        Ok(self.first_word()? & 0x000F_FFFF)
    }

    pub fn payload_length(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 4)
    }

    pub fn set_payload_length(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 4, value)
    }

    pub fn next_header(&self) -> Result<u8> {
        self.header.byte_at(6)
    }

    pub fn set_next_header(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(6, value)
    }

    pub fn hop_limit(&self) -> Result<u8> {
        self.header.byte_at(7)
    }

    pub fn set_hop_limit(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(7, value)
    }

    pub fn source(&self) -> Result<Ipv6Address> {
        self.header.with_slice(|s| Ipv6Address::from_slice(&s[8..24]))
    }

    pub fn set_source(&mut self, addr: Ipv6Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[8..24].copy_from_slice(&addr.octets()));
        Ok(())
    }

    pub fn destination(&self) -> Result<Ipv6Address> {
        self.header.with_slice(|s| Ipv6Address::from_slice(&s[24..40]))
    }

    pub fn set_destination(&mut self, addr: Ipv6Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[24..40].copy_from_slice(&addr.octets()));
        Ok(())
    }

    /// The IPv6 pseudo-header for this datagram's addresses (§4.3).
    pub fn pseudo_header(&self, next_header: u8, upper_layer_length: u32) -> Result<Vec<u8>> {
        Ok(checksum::pseudo_header_ipv6(self.source()?, self.destination()?, next_header, upper_layer_length))
    }
}

impl Layer for Ipv6Layer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Ipv6
    }

    fn update_calculated_values(&mut self, payload: &[u8]) {
        let _ = self.set_payload_length(payload.len() as u16);
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < Ipv6Layer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(Ipv6Layer::HEADER_LEN)?;
    let declared_payload_len = endian::read_u16::<BigEndian>(&probe, 4)? as usize;
    let next_header = probe.byte_at(6)?;
    let (header, rest) = super::split_header(&payload, Ipv6Layer::HEADER_LEN, Some(declared_payload_len))?;
    let idx = packet.attach_child(parent, alloc::boxed::Box::new(Ipv6Layer { header }));
    dispatch::by_ip_protocol(packet, idx, next_header, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_fields_round_trip() {
        let layer = Ipv6Layer::new(Ipv6Address::UNSPECIFIED, Ipv6Address::UNSPECIFIED, 17, 64);
        assert_eq!(layer.version().unwrap(), 6);
        assert_eq!(layer.next_header().unwrap(), 17);
        assert_eq!(layer.hop_limit().unwrap(), 64);
    }

    #[test]
    fn attach_udp_with_declared_payload_length() {
        let mut bytes = alloc::vec![0x60, 0, 0, 0, 0, 16, 17, 64];
        bytes.extend(alloc::vec![0u8; 16]); // source
        bytes.extend(alloc::vec![0u8; 16]); // destination
        bytes.extend(alloc::vec![0x00, 53, 0, 53, 0, 16, 0, 0]); // UDP header, len=16
        bytes.extend(alloc::vec![0u8; 8]); // UDP payload
        let packet = crate::proto::ipv6::attach;
        let stub = ByteSlice::zeroed(Ipv6Layer::HEADER_LEN);
        let mut tree = Packet::new(alloc::boxed::Box::new(Ipv6Layer { header: stub }));
        packet(&mut tree, 0, ByteSlice::from_vec(bytes)).unwrap();
        assert_eq!(tree.len(), 3);
    }
}
