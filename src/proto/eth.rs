//! Ethernet II (§4.5): destination MAC, source MAC, a big-endian EtherType
//! that doubles as the next-layer discriminator.
use crate::address::MacAddress;
use crate::byte_slice::ByteSlice;
use crate::dispatch;
use crate::endian::{self, BigEndian};
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct EthernetLayer {
    header: ByteSlice,
}

impl EthernetLayer {
    pub const HEADER_LEN: usize = 14;

    /// Allocate a fresh header and set it up to carry `child_kind`'s
    /// protocol as payload. The EtherType is derived from `child_kind` via
    /// [`dispatch::ethertype_for_kind`], matching the "auto-update"
    /// behavior §4.5 describes.
    pub fn new(destination: MacAddress, source: MacAddress, child_kind: ProtocolKind) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = EthernetLayer { header };
        layer.set_destination(destination).expect("fixed-size header");
        layer.set_source(source).expect("fixed-size header");
        layer.set_ethertype(dispatch::ethertype_for_kind(child_kind)).expect("fixed-size header");
        layer
    }

    pub fn destination(&self) -> Result<MacAddress> {
        self.header.with_slice(|s| MacAddress::from_slice(&s[0..6]))
    }

    pub fn set_destination(&mut self, mac: MacAddress) -> Result<()> {
        self.header.with_slice_mut(|s| s[0..6].copy_from_slice(&mac.octets()));
        Ok(())
    }

    pub fn source(&self) -> Result<MacAddress> {
        self.header.with_slice(|s| MacAddress::from_slice(&s[6..12]))
    }

    pub fn set_source(&mut self, mac: MacAddress) -> Result<()> {
        self.header.with_slice_mut(|s| s[6..12].copy_from_slice(&mac.octets()));
        Ok(())
    }

    pub fn ethertype(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 12)
    }

    pub fn set_ethertype(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 12, value)
    }
}

impl Layer for EthernetLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Ethernet
    }
}

pub(crate) fn parse_root(bytes: ByteSlice) -> Result<Packet> {
    let (header, rest) = super::split_header(&bytes, EthernetLayer::HEADER_LEN, None)?;
    let layer = EthernetLayer { header };
    let ethertype = layer.ethertype()?;
    let mut packet = Packet::new(alloc::boxed::Box::new(layer));
    let root = packet.root();
    dispatch::by_ethertype(&mut packet, root, ethertype, rest)?;
    Ok(packet)
}
