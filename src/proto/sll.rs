//! Linux "cooked capture" (SLL, §4.5 supplement): the pseudo link-layer
//! header `tcpdump -i any` prepends. 16 bytes: packet type, ARPHRD type,
//! link-address length/bytes, and an EtherType-shaped protocol field.
use crate::byte_slice::ByteSlice;
use crate::dispatch;
use crate::endian::{self, BigEndian};
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct LinuxSllLayer {
    header: ByteSlice,
}

impl LinuxSllLayer {
    pub const HEADER_LEN: usize = 16;

    pub fn packet_type(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 0)
    }

    pub fn arphrd_type(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn link_address_length(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 4)
    }

    /// The up-to-8 valid bytes of the link address (only the first
    /// `link_address_length()` are meaningful).
    pub fn link_address(&self) -> Result<[u8; 8]> {
        let mut out = [0u8; 8];
        self.header.with_slice(|s| out.copy_from_slice(&s[6..14]));
        Ok(out)
    }

    pub fn protocol_type(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 14)
    }

    pub fn set_protocol_type(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 14, value)
    }
}

impl Layer for LinuxSllLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::LinuxSll
    }
}

pub(crate) fn parse_root(bytes: ByteSlice) -> Result<Packet> {
    let (header, rest) = super::split_header(&bytes, LinuxSllLayer::HEADER_LEN, None)?;
    let layer = LinuxSllLayer { header };
    let protocol_type = layer.protocol_type()?;
    let mut packet = Packet::new(alloc::boxed::Box::new(layer));
    let root = packet.root();
    dispatch::by_ethertype(&mut packet, root, protocol_type, rest)?;
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_fixed_header_fields() {
        let mut bytes = alloc::vec![0x00u8, 0x00, 0x03, 0x04, 0x00, 0x06];
        bytes.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x00, 0x00]);
        bytes.extend_from_slice(&[0xBE, 0xEF]);
        let packet = parse_root(ByteSlice::from_vec(bytes)).unwrap();
        let sll = crate::layer::downcast_layer::<LinuxSllLayer>(packet.layer(packet.root())).unwrap();
        assert_eq!(sll.arphrd_type().unwrap(), 0x0304);
        assert_eq!(sll.link_address_length().unwrap(), 6);
        assert_eq!(sll.protocol_type().unwrap(), 0xBEEF);
    }
}
