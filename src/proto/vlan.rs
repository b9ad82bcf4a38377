//! IEEE 802.1Q (§4.5): a 16-bit big-endian TCI (`PCP:3 | DEI:1 | VID:12`)
//! followed by the inner EtherType. Recurses through the same EtherType
//! table as Ethernet, including back into another `Dot1QLayer` for
//! stacked (Q-in-Q) tags.
use crate::byte_slice::ByteSlice;
use crate::dispatch;
use crate::endian::{self, BigEndian};
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct Dot1QLayer {
    header: ByteSlice,
}

impl Dot1QLayer {
    pub const HEADER_LEN: usize = 4;

    pub fn new(pcp: u8, dei: bool, vid: u16, child_kind: ProtocolKind) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = Dot1QLayer { header };
        layer.set_pcp(pcp).expect("fixed-size header");
        layer.set_dei(dei).expect("fixed-size header");
        layer.set_vid(vid).expect("fixed-size header");
        layer.set_ethertype(dispatch::ethertype_for_kind(child_kind)).expect("fixed-size header");
        layer
    }

    fn tci(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 0)
    }

    fn set_tci(&mut self, tci: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 0, tci)
    }

    pub fn pcp(&self) -> Result<u8> {
        Ok((self.tci()? >> 13) as u8)
    }

    pub fn set_pcp(&mut self, pcp: u8) -> Result<()> {
        let tci = self.tci()?;
        self.set_tci((tci & 0x1FFF) | (u16::from(pcp & 0x7) << 13))
    }

    pub fn dei(&self) -> Result<bool> {
        Ok(self.tci()? & 0x1000 != 0)
    }

    pub fn set_dei(&mut self, dei: bool) -> Result<()> {
        let tci = self.tci()?;
        let tci = if dei { tci | 0x1000 } else { tci & !0x1000 };
        self.set_tci(tci)
    }

    pub fn vid(&self) -> Result<u16> {
        Ok(self.tci()? & 0x0FFF)
    }

    pub fn set_vid(&mut self, vid: u16) -> Result<()> {
        let tci = self.tci()?;
        self.set_tci((tci & 0xF000) | (vid & 0x0FFF))
    }

    pub fn ethertype(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn set_ethertype(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 2, value)
    }
}

impl Layer for Dot1QLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Dot1Q
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    let (header, rest) = super::split_header(&payload, Dot1QLayer::HEADER_LEN, None)?;
    let layer = Dot1QLayer { header };
    let ethertype = layer.ethertype()?;
    let idx = packet.attach_child(parent, alloc::boxed::Box::new(layer));
    dispatch::by_ethertype(packet, idx, ethertype, rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tci_fields_pack_and_unpack() {
        let layer = Dot1QLayer::new(5, true, 100, ProtocolKind::Ipv4);
        assert_eq!(layer.pcp().unwrap(), 5);
        assert!(layer.dei().unwrap());
        assert_eq!(layer.vid().unwrap(), 100);
        assert_eq!(layer.ethertype().unwrap(), 0x0800);
    }

    #[test]
    fn set_vid_preserves_pcp_and_dei() {
        let mut layer = Dot1QLayer::new(7, false, 1, ProtocolKind::Ipv4);
        layer.set_vid(42).unwrap();
        assert_eq!(layer.pcp().unwrap(), 7);
        assert!(!layer.dei().unwrap());
        assert_eq!(layer.vid().unwrap(), 42);
    }
}
