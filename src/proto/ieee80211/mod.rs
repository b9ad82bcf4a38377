//! IEEE 802.11 (§4.5): management/control/data frames sharing a Frame
//! Control field, a Duration, up to four addresses, a Sequence Control
//! field, an optional QoS Control field, then a body. Unlike every other
//! link/network layer in this crate, every multi-byte 802.11 field
//! (including radiotap/PPI envelopes, see the `radiotap`/`ppi` submodules)
//! is little-endian.
//!
//! Management frame bodies are the Information Element list (fixed
//! per-subtype fields that precede the IEs in real Beacon/Probe frames,
//! such as timestamp, beacon interval, and capability info, are not split
//! out; the whole body is left as raw bytes for the caller to feed to
//! [`crate::options::ie80211::parse_all`]). Control frames are simplified
//! to their common `FrameControl | Duration | Receiver Address` prefix;
//! RTS's Transmitter Address and other subtype-specific trailing fields
//! are left in the raw payload rather than dissected.
pub mod ppi;
pub mod radiotap;

use crate::address::MacAddress;
use crate::byte_slice::ByteSlice;
use crate::endian::{self, LittleEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

/// The three 802.11 frame categories this crate distinguishes (the fourth,
/// reserved, type code falls back to the same minimal framing as Control).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameType {
    Management,
    Control,
    Data,
    Reserved,
}

fn classify_type(raw: u8) -> FrameType {
    match raw {
        0 => FrameType::Management,
        1 => FrameType::Control,
        2 => FrameType::Data,
        _ => FrameType::Reserved,
    }
}

fn type_code(ty: FrameType) -> u8 {
    match ty {
        FrameType::Management => 0,
        FrameType::Control => 1,
        FrameType::Data => 2,
        FrameType::Reserved => 3,
    }
}

const ADDR1: usize = 4;
const ADDR2: usize = 10;
const ADDR3: usize = 16;
const SEQ_CONTROL: usize = 22;
const ADDR4: usize = 24;

pub struct Ieee80211Layer {
    header: ByteSlice,
    frame_type: FrameType,
    addr4_present: bool,
    qos_present: bool,
}

impl Ieee80211Layer {
    /// Header length for a non-QoS, non-WDS Management or Data frame.
    pub const BASE_HEADER_LEN: usize = 24;
    /// Header length this crate uses for Control (and Reserved) frames:
    /// Frame Control, Duration, and the Receiver Address only.
    pub const CONTROL_HEADER_LEN: usize = 10;

    /// Build a Management or Data frame header with three addresses, no
    /// WDS fourth address and no QoS Control (§ module doc: the common
    /// case). `to_ds`/`from_ds` still get written into Frame Control even
    /// though this constructor never emits an Address 4 field, matching
    /// real APs that leave WDS unset.
    pub fn new(
        frame_type: FrameType,
        subtype: u8,
        to_ds: bool,
        from_ds: bool,
        addr1: MacAddress,
        addr2: MacAddress,
        addr3: MacAddress,
        sequence_number: u16,
    ) -> Self {
        let header = ByteSlice::zeroed(Self::BASE_HEADER_LEN);
        let mut layer = Ieee80211Layer { header, frame_type, addr4_present: false, qos_present: false };
        layer.set_frame_type(frame_type).expect("fixed-size header");
        layer.set_subtype(subtype).expect("fixed-size header");
        layer.set_to_ds(to_ds).expect("fixed-size header");
        layer.set_from_ds(from_ds).expect("fixed-size header");
        layer.set_address1(addr1).expect("fixed-size header");
        layer.set_address2(addr2).expect("fixed-size header");
        layer.set_address3(addr3).expect("fixed-size header");
        layer.set_sequence_number(sequence_number).expect("fixed-size header");
        layer
    }

    fn frame_control(&self) -> Result<u16> {
        endian::read_u16::<LittleEndian>(&self.header, 0)
    }

    fn set_frame_control(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<LittleEndian>(&self.header, 0, value)
    }

    pub fn protocol_version(&self) -> Result<u8> {
        Ok((self.frame_control()? & 0x03) as u8)
    }

    pub fn frame_type(&self) -> Result<FrameType> {
        Ok(classify_type(((self.frame_control()? >> 2) & 0x03) as u8))
    }

    fn set_frame_type(&mut self, ty: FrameType) -> Result<()> {
        let fc = self.frame_control()?;
        self.set_frame_control((fc & !0x000C) | (u16::from(type_code(ty)) << 2))
    }

    pub fn subtype(&self) -> Result<u8> {
        Ok(((self.frame_control()? >> 4) & 0x0F) as u8)
    }

    pub fn set_subtype(&mut self, subtype: u8) -> Result<()> {
        let fc = self.frame_control()?;
        self.set_frame_control((fc & !0x00F0) | (u16::from(subtype & 0x0F) << 4))
    }

    fn flag(&self, bit: u16) -> Result<bool> {
        Ok(self.frame_control()? & bit != 0)
    }

    fn set_flag(&mut self, bit: u16, value: bool) -> Result<()> {
        let fc = self.frame_control()?;
        let fc = if value { fc | bit } else { fc & !bit };
        self.set_frame_control(fc)
    }

    pub fn to_ds(&self) -> Result<bool> {
        self.flag(0x0100)
    }
    pub fn set_to_ds(&mut self, v: bool) -> Result<()> {
        self.set_flag(0x0100, v)
    }
    pub fn from_ds(&self) -> Result<bool> {
        self.flag(0x0200)
    }
    pub fn set_from_ds(&mut self, v: bool) -> Result<()> {
        self.set_flag(0x0200, v)
    }
    pub fn more_fragments(&self) -> Result<bool> {
        self.flag(0x0400)
    }
    pub fn retry(&self) -> Result<bool> {
        self.flag(0x0800)
    }
    pub fn power_management(&self) -> Result<bool> {
        self.flag(0x1000)
    }
    pub fn more_data(&self) -> Result<bool> {
        self.flag(0x2000)
    }
    pub fn protected(&self) -> Result<bool> {
        self.flag(0x4000)
    }
    pub fn order(&self) -> Result<bool> {
        self.flag(0x8000)
    }

    pub fn duration(&self) -> Result<u16> {
        endian::read_u16::<LittleEndian>(&self.header, 2)
    }

    pub fn set_duration(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<LittleEndian>(&self.header, 2, value)
    }

    fn address_at(&self, offset: usize) -> Result<MacAddress> {
        self.header.with_slice(|s| {
            if offset + 6 > s.len() {
                return Err(Error::ShortBuffer);
            }
            MacAddress::from_slice(&s[offset..offset + 6])
        })
    }

    fn set_address_at(&mut self, offset: usize, addr: MacAddress) -> Result<()> {
        self.header.with_slice_mut(|s| {
            if offset + 6 > s.len() {
                return Err(Error::ShortBuffer);
            }
            s[offset..offset + 6].copy_from_slice(&addr.octets());
            Ok(())
        })
    }

    pub fn address1(&self) -> Result<MacAddress> {
        self.address_at(ADDR1)
    }
    pub fn set_address1(&mut self, addr: MacAddress) -> Result<()> {
        self.set_address_at(ADDR1, addr)
    }
    pub fn address2(&self) -> Result<MacAddress> {
        self.address_at(ADDR2)
    }
    pub fn set_address2(&mut self, addr: MacAddress) -> Result<()> {
        self.set_address_at(ADDR2, addr)
    }
    pub fn address3(&self) -> Result<MacAddress> {
        self.address_at(ADDR3)
    }
    pub fn set_address3(&mut self, addr: MacAddress) -> Result<()> {
        self.set_address_at(ADDR3, addr)
    }

    /// The WDS fourth address, present only when both `to_ds` and
    /// `from_ds` are set on a Data frame.
    pub fn address4(&self) -> Result<Option<MacAddress>> {
        if !self.addr4_present {
            return Ok(None);
        }
        self.address_at(ADDR4).map(Some)
    }

    fn sequence_control(&self) -> Result<u16> {
        endian::read_u16::<LittleEndian>(&self.header, SEQ_CONTROL)
    }

    fn set_sequence_control(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<LittleEndian>(&self.header, SEQ_CONTROL, value)
    }

    pub fn fragment_number(&self) -> Result<u8> {
        Ok((self.sequence_control()? & 0x000F) as u8)
    }

    pub fn sequence_number(&self) -> Result<u16> {
        Ok(self.sequence_control()? >> 4)
    }

    pub fn set_sequence_number(&mut self, value: u16) -> Result<()> {
        let sc = self.sequence_control().unwrap_or(0);
        self.set_sequence_control((sc & 0x000F) | (value << 4))
    }

    fn qos_offset(&self) -> usize {
        if self.addr4_present {
            ADDR4 + 6
        } else {
            ADDR4
        }
    }

    /// The QoS Control field, present only on Data-frame subtypes with the
    /// QoS bit (`0x08`) set in their subtype nibble.
    pub fn qos_control(&self) -> Result<Option<u16>> {
        if !self.qos_present {
            return Ok(None);
        }
        endian::read_u16::<LittleEndian>(&self.header, self.qos_offset()).map(Some)
    }
}

impl Layer for Ieee80211Layer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Ieee80211
    }
}

fn header_len(frame_type: FrameType, to_ds: bool, from_ds: bool, subtype: u8) -> usize {
    match frame_type {
        FrameType::Management => Ieee80211Layer::BASE_HEADER_LEN,
        FrameType::Data => {
            let mut len = Ieee80211Layer::BASE_HEADER_LEN;
            if to_ds && from_ds {
                len += 6;
            }
            if subtype & 0x08 != 0 {
                len += 2;
            }
            len
        }
        FrameType::Control | FrameType::Reserved => Ieee80211Layer::CONTROL_HEADER_LEN,
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < 2 {
        return Err(Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(2)?;
    let fc = endian::read_u16::<LittleEndian>(&probe, 0)?;
    let frame_type = classify_type(((fc >> 2) & 0x03) as u8);
    let subtype = ((fc >> 4) & 0x0F) as u8;
    let to_ds = fc & 0x0100 != 0;
    let from_ds = fc & 0x0200 != 0;
    let len = header_len(frame_type, to_ds, from_ds, subtype);
    if payload.length() < len {
        return Err(Error::ShortBuffer);
    }
    let (header, rest) = super::split_header(&payload, len, None)?;
    let addr4_present = frame_type == FrameType::Data && to_ds && from_ds;
    let qos_present = frame_type == FrameType::Data && subtype & 0x08 != 0;
    let layer = Ieee80211Layer { header, frame_type, addr4_present, qos_present };
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(layer), rest);
    Ok(())
}

pub(crate) fn parse_root(bytes: ByteSlice) -> Result<Packet> {
    if bytes.length() < 2 {
        return Err(Error::ShortBuffer);
    }
    let mut probe = bytes.clone();
    probe.set_length(2)?;
    let fc = endian::read_u16::<LittleEndian>(&probe, 0)?;
    let frame_type = classify_type(((fc >> 2) & 0x03) as u8);
    let subtype = ((fc >> 4) & 0x0F) as u8;
    let to_ds = fc & 0x0100 != 0;
    let from_ds = fc & 0x0200 != 0;
    let len = header_len(frame_type, to_ds, from_ds, subtype);
    if bytes.length() < len {
        return Err(Error::ShortBuffer);
    }
    let (header, rest) = super::split_header(&bytes, len, None)?;
    let addr4_present = frame_type == FrameType::Data && to_ds && from_ds;
    let qos_present = frame_type == FrameType::Data && subtype & 0x08 != 0;
    let layer = Ieee80211Layer { header, frame_type, addr4_present, qos_present };
    let mut packet = Packet::new(alloc::boxed::Box::new(layer));
    let root = packet.root();
    packet.set_payload_bytes(root, rest);
    Ok(packet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer::Payload;

    #[test]
    fn builds_and_reads_management_frame_fields() {
        let addr1 = MacAddress::new([1, 1, 1, 1, 1, 1]);
        let addr2 = MacAddress::new([2, 2, 2, 2, 2, 2]);
        let addr3 = MacAddress::new([3, 3, 3, 3, 3, 3]);
        let mut layer = Ieee80211Layer::new(FrameType::Management, 8, false, false, addr1, addr2, addr3, 42);
        assert_eq!(layer.frame_type().unwrap(), FrameType::Management);
        assert_eq!(layer.subtype().unwrap(), 8);
        assert_eq!(layer.address1().unwrap(), addr1);
        assert!(layer.address4().unwrap().is_none());
        layer.set_sequence_number(123).unwrap();
        assert_eq!(layer.sequence_number().unwrap(), 123);
        assert_eq!(layer.fragment_number().unwrap(), 0);
    }

    #[test]
    fn data_frame_with_wds_and_qos_gets_extended_header() {
        // FC: type=Data(2)<<2=0x08, subtype=QoS Data(8)<<4=0x80, ToDS|FromDS bits set.
        let mut bytes = alloc::vec![0x88u8, 0x03];
        bytes.extend_from_slice(&[0, 0]); // duration
        bytes.extend_from_slice(&[0xAAu8; 6]); // addr1
        bytes.extend_from_slice(&[0xBBu8; 6]); // addr2
        bytes.extend_from_slice(&[0xCCu8; 6]); // addr3
        bytes.extend_from_slice(&[0, 0]); // seq control
        bytes.extend_from_slice(&[0xDDu8; 6]); // addr4 (WDS)
        bytes.extend_from_slice(&[0x01, 0x00]); // qos control
        bytes.extend_from_slice(&[9, 9, 9]); // body (LLC/SNAP, not dissected)
        let packet = parse_root(ByteSlice::from_vec(bytes)).unwrap();
        let layer = crate::layer::downcast_layer::<Ieee80211Layer>(packet.layer(packet.root())).unwrap();
        assert!(layer.to_ds().unwrap());
        assert!(layer.from_ds().unwrap());
        assert_eq!(layer.address4().unwrap(), Some(MacAddress::new([0xDD; 6])));
        assert_eq!(layer.qos_control().unwrap(), Some(1));
        match packet.payload_of(packet.root()) {
            Payload::Bytes(b) => assert_eq!(b.actual(), alloc::vec![9, 9, 9]),
            _ => panic!("expected raw body bytes"),
        }
    }

    #[test]
    fn control_frame_uses_minimal_header() {
        let mut bytes = alloc::vec![0xB4u8, 0x00]; // type=Control(1), subtype=ACK(0xB)
        bytes.extend_from_slice(&[0, 0]); // duration
        bytes.extend_from_slice(&[0xEEu8; 6]); // receiver address
        let packet = parse_root(ByteSlice::from_vec(bytes)).unwrap();
        let layer = crate::layer::downcast_layer::<Ieee80211Layer>(packet.layer(packet.root())).unwrap();
        assert_eq!(layer.frame_type().unwrap(), FrameType::Control);
        assert_eq!(layer.address1().unwrap(), MacAddress::new([0xEE; 6]));
        assert!(matches!(layer.address2(), Err(Error::ShortBuffer)));
    }
}
