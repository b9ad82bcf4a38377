//! PPPoE (§4.5): a 6-byte discovery/session header (version/type nibbles,
//! code, session id, length), dispatched from Ethernet by EtherType.
//! Session frames (`0x8864`) carry a nested [`crate::proto::ppp`] header;
//! discovery frames (`0x8863`) carry TLV tags this crate does not dissect.
use crate::byte_slice::ByteSlice;
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

use super::ppp;

pub struct PppoeLayer {
    header: ByteSlice,
    kind: ProtocolKind,
}

impl PppoeLayer {
    pub const HEADER_LEN: usize = 6;

    pub fn version(&self) -> Result<u8> {
        Ok(self.header.byte_at(0)? >> 4)
    }

    pub fn type_field(&self) -> Result<u8> {
        Ok(self.header.byte_at(0)? & 0x0F)
    }

    pub fn code(&self) -> Result<u8> {
        self.header.byte_at(1)
    }

    pub fn session_id(&self) -> Result<u16> {
        crate::endian::read_u16::<crate::endian::BigEndian>(&self.header, 2)
    }

    /// The payload length this header declares (excludes these 6 bytes).
    pub fn length(&self) -> Result<u16> {
        crate::endian::read_u16::<crate::endian::BigEndian>(&self.header, 4)
    }

    pub fn set_length(&mut self, value: u16) -> Result<()> {
        crate::endian::write_u16::<crate::endian::BigEndian>(&self.header, 4, value)
    }
}

impl Layer for PppoeLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        self.kind
    }

    fn update_calculated_values(&mut self, payload: &[u8]) {
        let _ = self.set_length(payload.len() as u16);
    }
}

fn parse(payload: &ByteSlice) -> Result<(PppoeLayer, ByteSlice)> {
    let (header, _) = super::split_header(payload, PppoeLayer::HEADER_LEN, None)?;
    let declared_len = crate::endian::read_u16::<crate::endian::BigEndian>(&header, 4)? as usize;
    let (header, rest) = super::split_header(payload, PppoeLayer::HEADER_LEN, Some(declared_len))?;
    Ok((PppoeLayer { header, kind: ProtocolKind::PppoeSession }, rest))
}

pub(crate) fn attach_session(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    let (mut layer, rest) = parse(&payload)?;
    layer.kind = ProtocolKind::PppoeSession;
    let idx = packet.attach_child(parent, alloc::boxed::Box::new(layer));
    ppp::attach(packet, idx, rest)
}

pub(crate) fn attach_discovery(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    let (mut layer, rest) = parse(&payload)?;
    layer.kind = ProtocolKind::PppoeDiscovery;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(layer), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_header_nests_ppp() {
        let mut bytes = alloc::vec![0x11u8, 0x00, 0x00, 0x07, 0x00, 0x02];
        bytes.extend_from_slice(&[0x00, 0x21]);
        let payload = ByteSlice::from_vec(bytes);
        let mut packet = Packet::new(alloc::boxed::Box::new(PppoeLayer {
            header: payload.clone(),
            kind: ProtocolKind::PppoeSession,
        }));
        attach_session(&mut packet, 0, payload).unwrap();
        // root stub + PPPoE session header + nested PPP header
        assert_eq!(packet.len(), 3);
    }
}
