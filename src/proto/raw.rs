//! Raw link-layer (§4.5 supplement): no dissection at all, the whole
//! buffer becomes a terminal bytes payload.
use crate::byte_slice::ByteSlice;
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct RawLayer {
    header: ByteSlice,
}

impl Layer for RawLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Raw
    }
}

pub(crate) fn parse_root(bytes: ByteSlice) -> Result<Packet> {
    let (header, rest) = super::split_header(&bytes, 0, None)?;
    let mut packet = Packet::new(alloc::boxed::Box::new(RawLayer { header }));
    let root = packet.root();
    packet.set_payload_bytes(root, rest);
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whole_buffer_is_raw_payload() {
        let packet = parse_root(ByteSlice::from_vec(alloc::vec![1, 2, 3, 4])).unwrap();
        assert_eq!(packet.bytes(), alloc::vec![1, 2, 3, 4]);
        assert_eq!(packet.payload_len(packet.root()), 4);
    }
}
