//! PPP (§4.5): a single big-endian protocol field drives encapsulation.
//! Address/control bytes are assumed already stripped, matching the common
//! `DLT_PPP_SERIAL`-style capture this crate targets.
use crate::byte_slice::ByteSlice;
use crate::dispatch;
use crate::endian::{self, BigEndian};
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct PppLayer {
    header: ByteSlice,
}

impl PppLayer {
    pub const HEADER_LEN: usize = 2;

    pub fn new(protocol: u16) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = PppLayer { header };
        layer.set_protocol(protocol).expect("fixed-size header");
        layer
    }

    pub fn protocol(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 0)
    }

    pub fn set_protocol(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 0, value)
    }
}

impl Layer for PppLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Ppp
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    let (header, rest) = super::split_header(&payload, PppLayer::HEADER_LEN, None)?;
    let layer = PppLayer { header };
    let protocol = layer.protocol()?;
    let idx = packet.attach_child(parent, alloc::boxed::Box::new(layer));
    dispatch::by_ppp_protocol(packet, idx, protocol, rest)
}

pub(crate) fn parse_root(bytes: ByteSlice) -> Result<Packet> {
    let (header, rest) = super::split_header(&bytes, PppLayer::HEADER_LEN, None)?;
    let layer = PppLayer { header };
    let protocol = layer.protocol()?;
    let mut packet = Packet::new(alloc::boxed::Box::new(layer));
    let root = packet.root();
    dispatch::by_ppp_protocol(&mut packet, root, protocol, rest)?;
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_field_drives_ipv4_dispatch() {
        let mut bytes = alloc::vec![0x00u8, 0x21];
        bytes.extend(alloc::vec![0x45, 0, 0, 20, 0, 0, 0, 0, 64, 253, 0, 0, 10, 0, 0, 1, 10, 0, 0, 2]);
        let packet = parse_root(ByteSlice::from_vec(bytes)).unwrap();
        assert_eq!(packet.len(), 2);
    }
}
