//! One module per protocol layer (§4.5), each exposing typed field
//! accessors over its own header slice plus an `attach`/`parse_root`
//! constructor pair that builds a [`Packet`](crate::layer::Packet) node
//! and recurses into [`crate::dispatch`] for whatever follows.
pub mod arp;
pub mod drda;
pub mod eth;
pub mod icmpv4;
pub mod icmpv6;
pub mod ieee80211;
pub mod igmp;
pub mod ipv4;
pub mod ipv6;
pub mod lldp;
pub mod ospf;
pub mod ppp;
pub mod pppoe;
pub mod raw;
pub mod sll;
pub mod tcp;
pub mod udp;
pub mod vlan;
pub mod wol;

use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::byte_slice::ByteSlice;
use crate::error::{Error, Result};
use crate::layer::Packet;

/// The kinds of bytes [`parse_link_layer`] knows how to start from (§6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LinkKind {
    Ethernet,
    Ppp,
    LinuxSll,
    Raw,
    Ieee80211,
    Ieee80211Radiotap,
    Ieee80211Ppi,
}

/// Wrap `bytes` as the root buffer and dissect it starting from `kind`.
pub fn parse_link_layer(kind: LinkKind, bytes: Vec<u8>) -> Result<Packet> {
    let root = ByteSlice::from_vec(bytes);
    match kind {
        LinkKind::Ethernet => eth::parse_root(root),
        LinkKind::Ppp => ppp::parse_root(root),
        LinkKind::LinuxSll => sll::parse_root(root),
        LinkKind::Raw => raw::parse_root(root),
        LinkKind::Ieee80211 => ieee80211::parse_root(root),
        LinkKind::Ieee80211Radiotap => ieee80211::radiotap::parse_root(root),
        LinkKind::Ieee80211Ppi => ieee80211::ppi::parse_root(root),
    }
}

/// Split `payload` into a `header_len`-byte header and whatever follows it,
/// bounding the follow-on region both by what the buffer actually holds
/// (`payload.length()`, itself possibly inherited from an ancestor's own
/// declared length), or, when the protocol being parsed declares its own
/// length (IPv4 TotalLength, UDP Length, PPPoE Length, ...),
/// `own_payload_len`. A declared length is taken at face value: if it
/// claims more bytes than the buffer actually has left, that is the
/// `InvariantViolated` condition (§4.7), not something to silently narrow.
/// With no declared length at all (`None`), the layer simply gets whatever
/// bytes remain (§4.5's TCP-in-IPv4 truncation works the other way around:
/// IPv4 narrows what it hands to TCP via its own `Some(own_payload_len)`
/// call, so by the time TCP parses, the buffer it sees is already bounded).
pub(crate) fn split_header(
    payload: &ByteSlice,
    header_len: usize,
    own_payload_len: Option<usize>,
) -> Result<(ByteSlice, ByteSlice)> {
    if payload.length() < header_len {
        return Err(Error::ShortBuffer);
    }
    let mut header = payload.clone();
    header.set_length(header_len)?;
    let inherited_remaining = payload.length() - header_len;
    let remaining = match own_payload_len {
        Some(declared) => {
            if declared > inherited_remaining {
                return Err(Error::InvariantViolated);
            }
            declared
        }
        None => inherited_remaining,
    };
    let rest = header.encapsulated(Some(remaining));
    Ok((header, rest))
}

pub(crate) fn attach_leaf(packet: &mut Packet, parent: usize, layer: Box<dyn crate::layer::Layer>, rest: ByteSlice) {
    let idx = packet.attach_child(parent, layer);
    packet.set_payload_bytes(idx, rest);
}
