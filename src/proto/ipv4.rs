//! IPv4 (§4.5): version/IHL nibbles in byte 0, a big-endian TotalLength,
//! fragment flags/offset packed into one 16-bit field, and a header-only
//! checksum. `HeaderLength` is in 32-bit words; `PayloadLength` is derived
//! (`TotalLength - HeaderLength*4`).
use alloc::vec::Vec;

use crate::address::Ipv4Address;
use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::dispatch;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct Ipv4Layer {
    header: ByteSlice,
}

impl Ipv4Layer {
    pub const MIN_HEADER_LEN: usize = 20;
    const CHECKSUM_OFFSET: usize = 10;

    pub fn new(source: Ipv4Address, destination: Ipv4Address, protocol: u8, ttl: u8) -> Self {
        let header = ByteSlice::zeroed(Self::MIN_HEADER_LEN);
        let mut layer = Ipv4Layer { header };
        layer.header.set_byte_at(0, 0x45).expect("fixed-size header"); // version 4, IHL 5
        layer.set_total_length(Self::MIN_HEADER_LEN as u16).expect("fixed-size header");
        layer.set_ttl(ttl).expect("fixed-size header");
        layer.set_protocol(protocol).expect("fixed-size header");
        layer.set_source(source).expect("fixed-size header");
        layer.set_destination(destination).expect("fixed-size header");
        layer
    }

    pub fn version(&self) -> Result<u8> {
        Ok(self.header.byte_at(0)? >> 4)
    }

    pub fn header_length_words(&self) -> Result<u8> {
        Ok(self.header.byte_at(0)? & 0x0F)
    }

    pub fn header_length_bytes(&self) -> Result<usize> {
        Ok(self.header_length_words()? as usize * 4)
    }

    pub fn total_length(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn set_total_length(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 2, value)
    }

    pub fn payload_length(&self) -> Result<u16> {
        Ok(self.total_length()?.saturating_sub(self.header_length_bytes()? as u16))
    }

    pub fn identification(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 4)
    }

    fn flags_and_offset(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 6)
    }

    /// Top 3 bits of the flags/fragment-offset word: reserved, don't-fragment, more-fragments.
    pub fn flags(&self) -> Result<u8> {
        Ok((self.flags_and_offset()? >> 13) as u8)
    }

    pub fn fragment_offset(&self) -> Result<u16> {
        Ok(self.flags_and_offset()? & 0x1FFF)
    }

    pub fn ttl(&self) -> Result<u8> {
        self.header.byte_at(8)
    }

    pub fn set_ttl(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(8, value)
    }

    pub fn protocol(&self) -> Result<u8> {
        self.header.byte_at(9)
    }

    pub fn set_protocol(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(9, value)
    }

    pub fn checksum(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET)
    }

    pub fn source(&self) -> Result<Ipv4Address> {
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[12..16]))
    }

    pub fn set_source(&mut self, addr: Ipv4Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[12..16].copy_from_slice(&addr.octets()));
        Ok(())
    }

    pub fn destination(&self) -> Result<Ipv4Address> {
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[16..20]))
    }

    pub fn set_destination(&mut self, addr: Ipv4Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[16..20].copy_from_slice(&addr.octets()));
        Ok(())
    }

    /// The IPv4 pseudo-header for this datagram's addresses (§4.3).
    pub fn pseudo_header(&self, protocol: u8, upper_layer_length: u16) -> Result<Vec<u8>> {
        Ok(checksum::pseudo_header_ipv4(self.source()?, self.destination()?, protocol, upper_layer_length))
    }

    /// Header-only checksum: no pseudo-header, no payload (§4.3, §6).
    pub fn valid_checksum(&self) -> Result<bool> {
        let header_bytes = self.header.actual();
        Ok(checksum::validate(&[], &header_bytes, Self::CHECKSUM_OFFSET))
    }

    pub fn update_checksum(&mut self) -> Result<()> {
        let header_bytes = self.header.actual();
        let value = checksum::compute(&[], &header_bytes, Self::CHECKSUM_OFFSET);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for Ipv4Layer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Ipv4
    }

    fn update_calculated_values(&mut self, payload: &[u8]) {
        let header_len = self.header.length() as u16;
        let _ = self.set_total_length(header_len + payload.len() as u16);
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < Ipv4Layer::MIN_HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(Ipv4Layer::MIN_HEADER_LEN)?;
    let ihl_words = probe.byte_at(0)? & 0x0F;
    let header_len = ihl_words as usize * 4;
    if header_len < Ipv4Layer::MIN_HEADER_LEN {
        return Err(Error::InvariantViolated);
    }
    probe.set_length(header_len.min(payload.length()))?;
    if probe.length() < header_len {
        return Err(Error::ShortBuffer);
    }
    let total_length = endian::read_u16::<BigEndian>(&probe, 2)? as usize;
    if total_length < header_len {
        return Err(Error::InvariantViolated);
    }
    let own_payload_len = total_length - header_len;
    let (header, rest) = super::split_header(&payload, header_len, Some(own_payload_len))?;
    let protocol = header.byte_at(9)?;
    let idx = packet.attach_child(parent, alloc::boxed::Box::new(Ipv4Layer { header }));
    dispatch::by_ip_protocol(packet, idx, protocol, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_header() -> Ipv4Layer {
        Ipv4Layer::new(Ipv4Address::new([10, 0, 0, 1]), Ipv4Address::new([10, 0, 0, 2]), 6, 64)
    }

    #[test]
    fn header_length_and_payload_length() {
        let layer = sample_header();
        assert_eq!(layer.header_length_bytes().unwrap(), 20);
        assert_eq!(layer.payload_length().unwrap(), 0);
    }

    #[test]
    fn checksum_round_trip() {
        let mut layer = sample_header();
        layer.update_checksum().unwrap();
        assert!(layer.valid_checksum().unwrap());
    }

    #[test]
    fn attach_rejects_short_buffer() {
        let stub_header = ByteSlice::zeroed(Ipv4Layer::MIN_HEADER_LEN);
        let mut packet = Packet::new(alloc::boxed::Box::new(Ipv4Layer { header: stub_header }));
        let payload = ByteSlice::from_vec(alloc::vec![0u8; 10]);
        assert_eq!(attach(&mut packet, 0, payload), Err(Error::ShortBuffer));
    }
}
