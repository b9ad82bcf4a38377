//! ARP (§4.5): an 8-byte fixed portion (hardware/protocol type, address
//! lengths, opcode) followed by sender/target hardware and protocol
//! addresses whose widths the fixed portion declares. Terminal: ARP
//! carries no further encapsulated layer.
use crate::address::{Ipv4Address, MacAddress};
use crate::byte_slice::ByteSlice;
use crate::endian::{self, BigEndian};
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct ArpLayer {
    header: ByteSlice,
}

impl ArpLayer {
    pub const FIXED_LEN: usize = 8;

    /// Build an Ethernet/IPv4 ARP packet (hardware type 1, protocol type
    /// 0x0800, 6/4-byte addresses), the overwhelmingly common case.
    pub fn new_ethernet_ipv4(operation: u16, sender_hw: MacAddress, sender_proto: Ipv4Address, target_hw: MacAddress, target_proto: Ipv4Address) -> Self {
        let header = ByteSlice::zeroed(Self::FIXED_LEN + 2 * (6 + 4));
        let mut layer = ArpLayer { header };
        endian::write_u16::<BigEndian>(&layer.header, 0, 1).unwrap();
        endian::write_u16::<BigEndian>(&layer.header, 2, 0x0800).unwrap();
        layer.header.set_byte_at(4, 6).unwrap();
        layer.header.set_byte_at(5, 4).unwrap();
        endian::write_u16::<BigEndian>(&layer.header, 6, operation).unwrap();
        layer.header.with_slice_mut(|s| {
            s[8..14].copy_from_slice(&sender_hw.octets());
            s[14..18].copy_from_slice(&sender_proto.octets());
            s[18..24].copy_from_slice(&target_hw.octets());
            s[24..28].copy_from_slice(&target_proto.octets());
        });
        layer
    }

    pub fn hardware_type(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 0)
    }

    pub fn protocol_type(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn hardware_address_length(&self) -> Result<u8> {
        self.header.byte_at(4)
    }

    pub fn protocol_address_length(&self) -> Result<u8> {
        self.header.byte_at(5)
    }

    pub fn operation(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 6)
    }

    pub fn set_operation(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 6, value)
    }

    fn address_offsets(&self) -> Result<(usize, usize, usize, usize)> {
        let hw_len = self.hardware_address_length()? as usize;
        let proto_len = self.protocol_address_length()? as usize;
        let sender_hw = Self::FIXED_LEN;
        let sender_proto = sender_hw + hw_len;
        let target_hw = sender_proto + proto_len;
        let target_proto = target_hw + hw_len;
        Ok((sender_hw, sender_proto, target_hw, target_proto))
    }

    pub fn sender_hardware_address(&self) -> Result<MacAddress> {
        let (sender_hw, sender_proto, ..) = self.address_offsets()?;
        self.header.with_slice(|s| MacAddress::from_slice(&s[sender_hw..sender_proto]))
    }

    pub fn sender_protocol_address(&self) -> Result<Ipv4Address> {
        let (_, sender_proto, target_hw, _) = self.address_offsets()?;
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[sender_proto..target_hw]))
    }

    pub fn target_hardware_address(&self) -> Result<MacAddress> {
        let (_, _, target_hw, target_proto) = self.address_offsets()?;
        self.header.with_slice(|s| MacAddress::from_slice(&s[target_hw..target_proto]))
    }

    pub fn target_protocol_address(&self) -> Result<Ipv4Address> {
        let (.., target_proto) = self.address_offsets()?;
        let end = target_proto + self.protocol_address_length()? as usize;
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[target_proto..end]))
    }
}

impl Layer for ArpLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Arp
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < ArpLayer::FIXED_LEN {
        return Err(crate::error::Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(ArpLayer::FIXED_LEN)?;
    let hw_len = probe.byte_at(4)? as usize;
    let proto_len = probe.byte_at(5)? as usize;
    let total_len = ArpLayer::FIXED_LEN + 2 * (hw_len + proto_len);
    let (header, rest) = super::split_header(&payload, total_len, Some(0))?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(ArpLayer { header }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_and_reads_ethernet_ipv4_request() {
        let layer = ArpLayer::new_ethernet_ipv4(
            1,
            MacAddress::new([0, 1, 2, 3, 4, 5]),
            Ipv4Address::new([10, 0, 0, 1]),
            MacAddress::ZERO,
            Ipv4Address::new([10, 0, 0, 2]),
        );
        assert_eq!(layer.hardware_type().unwrap(), 1);
        assert_eq!(layer.operation().unwrap(), 1);
        assert_eq!(layer.sender_protocol_address().unwrap(), Ipv4Address::new([10, 0, 0, 1]));
        assert_eq!(layer.target_protocol_address().unwrap(), Ipv4Address::new([10, 0, 0, 2]));
    }

    #[test]
    fn too_short_for_fixed_portion_fails() {
        let stub_header = ByteSlice::zeroed(ArpLayer::FIXED_LEN);
        let mut packet = Packet::new(alloc::boxed::Box::new(ArpLayer { header: stub_header }));
        let payload = ByteSlice::from_vec(alloc::vec![0, 1, 2]);
        assert_eq!(attach(&mut packet, 0, payload), Err(crate::error::Error::ShortBuffer));
    }
}
