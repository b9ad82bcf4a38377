//! IGMP (§4.5): type, max-response-time, a checksum over the IGMP message
//! alone (no pseudo-header, like ICMPv4), and a group address. IGMPv3
//! group-record lists beyond the 8-byte fixed portion are preserved as raw
//! bytes rather than dissected (out of scope).
use crate::address::Ipv4Address;
use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct IgmpLayer {
    header: ByteSlice,
}

impl IgmpLayer {
    pub const HEADER_LEN: usize = 8;
    const CHECKSUM_OFFSET: usize = 2;

    pub fn new(message_type: u8, max_response_time: u8, group_address: Ipv4Address) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = IgmpLayer { header };
        layer.set_message_type(message_type).expect("fixed-size header");
        layer.set_max_response_time(max_response_time).expect("fixed-size header");
        layer.set_group_address(group_address).expect("fixed-size header");
        layer
    }

    pub fn message_type(&self) -> Result<u8> {
        self.header.byte_at(0)
    }

    pub fn set_message_type(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(0, value)
    }

    pub fn max_response_time(&self) -> Result<u8> {
        self.header.byte_at(1)
    }

    pub fn set_max_response_time(&mut self, value: u8) -> Result<()> {
        self.header.set_byte_at(1, value)
    }

    pub fn checksum(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET)
    }

    pub fn group_address(&self) -> Result<Ipv4Address> {
        self.header.with_slice(|s| Ipv4Address::from_slice(&s[4..8]))
    }

    pub fn set_group_address(&mut self, addr: Ipv4Address) -> Result<()> {
        self.header.with_slice_mut(|s| s[4..8].copy_from_slice(&addr.octets()));
        Ok(())
    }

    pub fn valid_checksum(&self) -> bool {
        checksum::validate(&[], &self.header.actual(), Self::CHECKSUM_OFFSET)
    }

    pub fn update_checksum(&mut self) -> Result<()> {
        let value = checksum::compute(&[], &self.header.actual(), Self::CHECKSUM_OFFSET);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for IgmpLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Igmp
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < IgmpLayer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let (header, rest) = super::split_header(&payload, IgmpLayer::HEADER_LEN, None)?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(IgmpLayer { header }), rest);
    Ok(())
}
