//! DRDA (§1 purpose: one of the "selected application/control-plane
//! payloads"), carried as a TCP payload. Unlike Ethernet's ethertype or
//! IP's protocol number, TCP's port is explicitly *not* an encapsulation
//! discriminator (glossary), so DRDA is never auto-attached by
//! [`crate::dispatch`] the way VLAN/PPPoE/LLDP are: a caller holding a
//! parsed [`crate::proto::tcp::TcpLayer`] and its payload bytes decides for
//! itself, via [`crate::options::drda::looks_like_drda`] (the "DDM magic
//! byte" heuristic), whether to additionally view those bytes as DRDA.
use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::error::Result;
use crate::layer::{Layer, Packet, ProtocolKind};
use crate::options::drda::DrdaDdm;

/// A DRDA conversation's DDM record list, viewed as a single layer whose
/// "header" is the whole region (there is no separate fixed header:
/// the DSS records are the packet's primary content, as LLDP's TLV list
/// is for LLDPDUs).
pub struct DrdaLayer {
    region: ByteSlice,
}

impl DrdaLayer {
    pub fn records(&self) -> Result<Vec<DrdaDdm>> {
        crate::options::drda::parse_all(self.region.clone())
    }
}

impl Layer for DrdaLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.region
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::Drda
    }
}

/// Attempt to view `payload` (a TCP segment's payload bytes) as DRDA. On a
/// heuristic match, attaches a [`DrdaLayer`] as `parent`'s child the same
/// way a discriminator-dispatched protocol would; on a mismatch, leaves
/// `payload` as the parent's raw-bytes payload and returns `Ok(false)` (not
/// an error, an unrecognized TCP payload is exactly as expected for every
/// TCP connection that is not carrying DRDA).
pub fn attach_if_drda(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<bool> {
    if !crate::options::drda::looks_like_drda(&payload) {
        packet.set_payload_bytes(parent, payload);
        return Ok(false);
    }
    if crate::options::drda::parse_all(payload.clone()).is_err() {
        packet.set_payload_bytes(parent, payload);
        return Ok(false);
    }
    super::attach_leaf(packet, parent, Box::new(DrdaLayer { region: payload.clone() }), payload.encapsulated(Some(0)));
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    fn ddm(code_point: u16, params: &[u8]) -> Vec<u8> {
        let object_length = (4 + params.len()) as u16;
        let ddm_length = (10 + params.len()) as u16;
        let mut out = Vec::new();
        out.extend_from_slice(&ddm_length.to_be_bytes());
        out.push(crate::options::drda::DSS_MAGIC);
        out.push(0);
        out.extend_from_slice(&1u16.to_be_bytes());
        out.extend_from_slice(&object_length.to_be_bytes());
        out.extend_from_slice(&code_point.to_be_bytes());
        out.extend_from_slice(params);
        out
    }

    #[test]
    fn attaches_when_heuristic_matches() {
        let bytes = ddm(0x2001, &[5, 6]);
        let payload = ByteSlice::from_vec(bytes);
        let mut packet = Packet::new(Box::new(DrdaLayer { region: payload.clone() }));
        let root = packet.root();
        let attached = attach_if_drda(&mut packet, root, payload).unwrap();
        assert!(attached);
        let child = match packet.payload_of(root) {
            crate::layer::Payload::Child(c) => *c,
            _ => panic!("expected a DRDA child layer"),
        };
        let layer = crate::layer::downcast_layer::<DrdaLayer>(packet.layer(child)).unwrap();
        assert_eq!(layer.records().unwrap()[0].code_point, 0x2001);
    }

    #[test]
    fn leaves_raw_bytes_when_heuristic_fails() {
        let payload = ByteSlice::from_vec(alloc::vec![0x16, 0x03, 0x01, 0x00, 0x05]); // TLS-ish, not DRDA
        let mut packet = Packet::new(Box::new(DrdaLayer { region: payload.clone() }));
        let root = packet.root();
        let attached = attach_if_drda(&mut packet, root, payload).unwrap();
        assert!(!attached);
        assert!(matches!(packet.payload_of(root), crate::layer::Payload::Bytes(_)));
    }
}
