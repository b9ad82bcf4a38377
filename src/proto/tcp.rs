//! TCP (§4.5): a 20-byte minimum header. `DataOffset` (top 4 bits of the
//! word at byte 12) times 4 is the actual header length; the low 9 bits of
//! that same 16-bit word carry the flags (URG/ACK/PSH/RST/SYN/FIN plus the
//! ECN/CWR/NS bits above them). Checksum needs a caller-supplied
//! pseudo-header (§3: no layer stores a reference to its parent).
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::checksum;
use crate::endian::{self, BigEndian};
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};
use crate::options::tcp::TcpOption;

const FLAG_FIN: u16 = 0x001;
const FLAG_SYN: u16 = 0x002;
const FLAG_RST: u16 = 0x004;
const FLAG_PSH: u16 = 0x008;
const FLAG_ACK: u16 = 0x010;
const FLAG_URG: u16 = 0x020;
const FLAG_ECE: u16 = 0x040;
const FLAG_CWR: u16 = 0x080;
const FLAG_NS: u16 = 0x100;

pub struct TcpLayer {
    header: ByteSlice,
}

impl TcpLayer {
    pub const MIN_HEADER_LEN: usize = 20;
    const CHECKSUM_OFFSET: usize = 16;

    pub fn new(source_port: u16, destination_port: u16, sequence_number: u32) -> Self {
        let header = ByteSlice::zeroed(Self::MIN_HEADER_LEN);
        let mut layer = TcpLayer { header };
        layer.set_source_port(source_port).expect("fixed-size header");
        layer.set_destination_port(destination_port).expect("fixed-size header");
        layer.set_sequence_number(sequence_number).expect("fixed-size header");
        layer.set_data_offset(5).expect("fixed-size header");
        layer
    }

    pub fn source_port(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 0)
    }

    pub fn set_source_port(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 0, value)
    }

    pub fn destination_port(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 2)
    }

    pub fn set_destination_port(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 2, value)
    }

    pub fn sequence_number(&self) -> Result<u32> {
        endian::read_u32::<BigEndian>(&self.header, 4)
    }

    pub fn set_sequence_number(&mut self, value: u32) -> Result<()> {
        endian::write_u32::<BigEndian>(&self.header, 4, value)
    }

    pub fn acknowledgment_number(&self) -> Result<u32> {
        endian::read_u32::<BigEndian>(&self.header, 8)
    }

    pub fn set_acknowledgment_number(&mut self, value: u32) -> Result<()> {
        endian::write_u32::<BigEndian>(&self.header, 8, value)
    }

    fn offset_and_flags(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 12)
    }

    fn set_offset_and_flags(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 12, value)
    }

    pub fn data_offset(&self) -> Result<u8> {
        Ok((self.offset_and_flags()? >> 12) as u8)
    }

    pub fn set_data_offset(&mut self, words: u8) -> Result<()> {
        let word = self.offset_and_flags()?;
        self.set_offset_and_flags((word & 0x0FFF) | (u16::from(words) << 12))
    }

    pub fn header_length_bytes(&self) -> Result<usize> {
        Ok(self.data_offset()? as usize * 4)
    }

    fn flag(&self, mask: u16) -> Result<bool> {
        Ok(self.offset_and_flags()? & mask != 0)
    }

    fn set_flag(&mut self, mask: u16, value: bool) -> Result<()> {
        let word = self.offset_and_flags()?;
        let word = if value { word | mask } else { word & !mask };
        self.set_offset_and_flags(word)
    }

    pub fn fin(&self) -> Result<bool> {
        self.flag(FLAG_FIN)
    }
    pub fn set_fin(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_FIN, v)
    }
    pub fn syn(&self) -> Result<bool> {
        self.flag(FLAG_SYN)
    }
    pub fn set_syn(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_SYN, v)
    }
    pub fn rst(&self) -> Result<bool> {
        self.flag(FLAG_RST)
    }
    pub fn set_rst(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_RST, v)
    }
    pub fn psh(&self) -> Result<bool> {
        self.flag(FLAG_PSH)
    }
    pub fn set_psh(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_PSH, v)
    }
    pub fn ack(&self) -> Result<bool> {
        self.flag(FLAG_ACK)
    }
    pub fn set_ack(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_ACK, v)
    }
    pub fn urg(&self) -> Result<bool> {
        self.flag(FLAG_URG)
    }
    pub fn set_urg(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_URG, v)
    }
    pub fn ece(&self) -> Result<bool> {
        self.flag(FLAG_ECE)
    }
    pub fn set_ece(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_ECE, v)
    }
    pub fn cwr(&self) -> Result<bool> {
        self.flag(FLAG_CWR)
    }
    pub fn set_cwr(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_CWR, v)
    }
    pub fn ns(&self) -> Result<bool> {
        self.flag(FLAG_NS)
    }
    pub fn set_ns(&mut self, v: bool) -> Result<()> {
        self.set_flag(FLAG_NS, v)
    }

    pub fn window_size(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 14)
    }

    pub fn set_window_size(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 14, value)
    }

    pub fn checksum(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET)
    }

    pub fn urgent_pointer(&self) -> Result<u16> {
        endian::read_u16::<BigEndian>(&self.header, 18)
    }

    pub fn set_urgent_pointer(&mut self, value: u16) -> Result<()> {
        endian::write_u16::<BigEndian>(&self.header, 18, value)
    }

    /// The options region (bytes 20..header_length), if any. Parsed
    /// independently of the URG flag (§9 open question, resolved).
    fn options_region(&self) -> Result<ByteSlice> {
        let header_len = self.header_length_bytes()?;
        let mut fixed = self.header.clone();
        fixed.set_length(Self::MIN_HEADER_LEN)?;
        Ok(fixed.encapsulated(Some(header_len - Self::MIN_HEADER_LEN)))
    }

    pub fn options(&self) -> Result<Vec<TcpOption>> {
        crate::options::tcp::parse_all(self.options_region()?)
    }

    fn segment_bytes(&self, upper_layer_payload: &[u8]) -> Vec<u8> {
        let mut segment = self.header.actual();
        segment.extend_from_slice(upper_layer_payload);
        segment
    }

    pub fn valid_checksum(&self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> bool {
        checksum::validate(pseudo_header, &self.segment_bytes(upper_layer_payload), Self::CHECKSUM_OFFSET)
    }

    pub fn calculate_checksum(&self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> u16 {
        checksum::compute(pseudo_header, &self.segment_bytes(upper_layer_payload), Self::CHECKSUM_OFFSET)
    }

    pub fn update_checksum(&mut self, pseudo_header: &[u8], upper_layer_payload: &[u8]) -> Result<()> {
        let value = self.calculate_checksum(pseudo_header, upper_layer_payload);
        endian::write_u16::<BigEndian>(&self.header, Self::CHECKSUM_OFFSET, value)
    }
}

impl Layer for TcpLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Tcp
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < TcpLayer::MIN_HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let mut probe = payload.clone();
    probe.set_length(TcpLayer::MIN_HEADER_LEN)?;
    let data_offset = endian::read_u16::<BigEndian>(&probe, 12)? >> 12;
    let header_len = data_offset as usize * 4;
    if header_len < TcpLayer::MIN_HEADER_LEN {
        return Err(Error::InvariantViolated);
    }
    let (header, rest) = super::split_header(&payload, header_len, None)?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(TcpLayer { header }), rest);
    Ok(())
}
