//! LLDP (§4.4): the proto-layer wrapper around an LLDPDU. The layer itself
//! has no fixed header of its own; the whole remaining buffer is the TLV
//! list, re-parsed lazily through [`crate::options::lldp`] rather than
//! cached, so edits via `set_value` are always seen on the next read.
use crate::byte_slice::ByteSlice;
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};
use crate::options::lldp::LldpTlv;

pub struct LldpLayer {
    region: ByteSlice,
}

impl LldpLayer {
    pub fn new(region: ByteSlice) -> Self {
        LldpLayer { region }
    }

    pub fn tlvs(&self) -> Result<alloc::vec::Vec<LldpTlv>> {
        crate::options::lldp::parse_all(self.region.clone())
    }

    pub fn set_tlv_value(&mut self, tlv: &LldpTlv, new_value: &[u8]) -> Result<()> {
        crate::options::lldp::set_value(&mut self.region, tlv, new_value)
    }
}

impl Layer for LldpLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.region
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Lldp
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    let (region, rest) = super::split_header(&payload, payload.length(), Some(0))?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(LldpLayer { region }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::lldp::LldpTlvType;

    fn chassis_id_tlv(value: &[u8]) -> alloc::vec::Vec<u8> {
        let header = (1u16 << 9) | value.len() as u16;
        let mut out = header.to_be_bytes().to_vec();
        out.extend_from_slice(value);
        out
    }

    fn end_tlv() -> alloc::vec::Vec<u8> {
        0u16.to_be_bytes().to_vec()
    }

    #[test]
    fn lazily_reflects_edits_through_set_tlv_value() {
        let mut bytes = chassis_id_tlv(&[1, 2, 3]);
        bytes.extend(end_tlv());
        let mut layer = LldpLayer::new(ByteSlice::from_vec(bytes));

        let first = layer.tlvs().unwrap();
        assert_eq!(first[0].ty, LldpTlvType::ChassisId);
        layer.set_tlv_value(&first[0], &[9, 9]).unwrap();

        let second = layer.tlvs().unwrap();
        assert_eq!(second[0].value.actual(), alloc::vec![9, 9]);
    }
}
