//! Radiotap envelope (§4.4 supplement): a 4-byte fixed prefix (version,
//! a pad byte, and a little-endian total-length covering the prefix plus
//! the field records that follow it, encoded the way
//! [`crate::options::radiotap`] describes), wrapping a nested IEEE 802.11
//! frame.
use crate::byte_slice::ByteSlice;
use crate::endian::{self, LittleEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};
use crate::options::radiotap::RadiotapField;

use super::Ieee80211Layer;

pub struct RadiotapLayer {
    header: ByteSlice,
}

impl RadiotapLayer {
    const FIXED_LEN: usize = 4;

    pub fn version(&self) -> Result<u8> {
        self.header.byte_at(0)
    }

    pub fn length(&self) -> Result<u16> {
        endian::read_u16::<LittleEndian>(&self.header, 2)
    }

    pub fn fields(&self) -> Result<alloc::vec::Vec<RadiotapField>> {
        let mut prefix = self.header.clone();
        prefix.set_length(Self::FIXED_LEN)?;
        let region = prefix.encapsulated(None);
        crate::options::radiotap::parse_all(region)
    }
}

impl Layer for RadiotapLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Radiotap
    }
}

fn parse(bytes: &ByteSlice) -> Result<(RadiotapLayer, ByteSlice)> {
    if bytes.length() < RadiotapLayer::FIXED_LEN {
        return Err(Error::ShortBuffer);
    }
    let mut probe = bytes.clone();
    probe.set_length(RadiotapLayer::FIXED_LEN)?;
    let declared_len = endian::read_u16::<LittleEndian>(&probe, 2)? as usize;
    if declared_len < RadiotapLayer::FIXED_LEN {
        return Err(Error::InvariantViolated);
    }
    let (header, rest) = super::super::split_header(bytes, declared_len, None)?;
    Ok((RadiotapLayer { header }, rest))
}

pub(crate) fn parse_root(bytes: ByteSlice) -> Result<Packet> {
    let (layer, rest) = parse(&bytes)?;
    let mut packet = Packet::new(alloc::boxed::Box::new(layer));
    let root = packet.root();
    super::attach(&mut packet, root, rest)?;
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(type_number: u16, value: &[u8]) -> alloc::vec::Vec<u8> {
        let mut out = alloc::vec::Vec::new();
        out.extend_from_slice(&type_number.to_le_bytes());
        out.extend_from_slice(&(value.len() as u16).to_le_bytes());
        out.extend_from_slice(value);
        out
    }

    #[test]
    fn envelope_wraps_fields_and_nested_frame() {
        let fields = field(0, &[0x02]);
        let total_len = RadiotapLayer::FIXED_LEN + fields.len();
        let mut bytes = alloc::vec![0u8, 0];
        bytes.extend_from_slice(&(total_len as u16).to_le_bytes());
        bytes.extend_from_slice(&fields);
        // minimal control frame body (ACK)
        bytes.extend_from_slice(&[0xB4, 0x00, 0, 0]);
        bytes.extend_from_slice(&[0xEEu8; 6]);

        let packet = parse_root(ByteSlice::from_vec(bytes)).unwrap();
        let layer = crate::layer::downcast_layer::<RadiotapLayer>(packet.layer(packet.root())).unwrap();
        assert_eq!(layer.length().unwrap(), total_len as u16);
        assert_eq!(layer.fields().unwrap().len(), 1);
        assert_eq!(packet.len(), 2);
        let inner = crate::layer::downcast_layer::<Ieee80211Layer>(packet.layer(1)).unwrap();
        assert_eq!(inner.address1().unwrap(), crate::address::MacAddress::new([0xEE; 6]));
    }
}
