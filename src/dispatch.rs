//! Encapsulation-type -> next-layer constructor tables (§4.6). Each table
//! is a plain `match`; an unrecognized discriminator is not an error, the
//! bytes become the parent's raw-bytes payload instead (§4.7).
use crate::byte_slice::ByteSlice;
use crate::error::Result;
use crate::layer::{Packet, ProtocolKind};
use crate::proto;

/// EtherType values this crate recognizes (IEEE 802 / RFC assignments).
pub const ETHERTYPE_IPV4: u16 = 0x0800;
pub const ETHERTYPE_ARP: u16 = 0x0806;
pub const ETHERTYPE_WAKE_ON_LAN: u16 = 0x0842;
pub const ETHERTYPE_DOT1Q: u16 = 0x8100;
pub const ETHERTYPE_IPV6: u16 = 0x86DD;
pub const ETHERTYPE_PPPOE_DISCOVERY: u16 = 0x8863;
pub const ETHERTYPE_PPPOE_SESSION: u16 = 0x8864;
pub const ETHERTYPE_LLDP: u16 = 0x88CC;

/// Dispatch on an EtherType (Ethernet, 802.1Q inner type, Linux SLL
/// protocol type all share this table).
pub(crate) fn by_ethertype(packet: &mut Packet, parent: usize, ethertype: u16, payload: ByteSlice) -> Result<()> {
    match ethertype {
        ETHERTYPE_IPV4 => proto::ipv4::attach(packet, parent, payload),
        ETHERTYPE_IPV6 => proto::ipv6::attach(packet, parent, payload),
        ETHERTYPE_ARP => proto::arp::attach(packet, parent, payload),
        ETHERTYPE_LLDP => proto::lldp::attach(packet, parent, payload),
        ETHERTYPE_PPPOE_DISCOVERY => proto::pppoe::attach_discovery(packet, parent, payload),
        ETHERTYPE_PPPOE_SESSION => proto::pppoe::attach_session(packet, parent, payload),
        ETHERTYPE_DOT1Q => proto::vlan::attach(packet, parent, payload),
        ETHERTYPE_WAKE_ON_LAN => proto::wol::attach(packet, parent, payload),
        _ => {
            packet.set_payload_bytes(parent, payload);
            Ok(())
        }
    }
}

/// The mapping the other direction: what EtherType a freshly built
/// [`crate::proto::eth::EthernetLayer`] or
/// [`crate::proto::vlan::Dot1QLayer`] should carry for a given child
/// protocol (§4.5: "setting the payload packet auto-updates the type").
pub fn ethertype_for_kind(kind: ProtocolKind) -> u16 {
    match kind {
        ProtocolKind::Ipv4 => ETHERTYPE_IPV4,
        ProtocolKind::Ipv6 => ETHERTYPE_IPV6,
        ProtocolKind::Arp => ETHERTYPE_ARP,
        ProtocolKind::Lldp => ETHERTYPE_LLDP,
        ProtocolKind::PppoeDiscovery => ETHERTYPE_PPPOE_DISCOVERY,
        ProtocolKind::PppoeSession => ETHERTYPE_PPPOE_SESSION,
        ProtocolKind::Dot1Q => ETHERTYPE_DOT1Q,
        ProtocolKind::WakeOnLan => ETHERTYPE_WAKE_ON_LAN,
        _ => 0,
    }
}

/// IP protocol numbers (IANA) this crate recognizes, shared by IPv4's
/// Protocol field and IPv6's Next Header field.
pub const IP_PROTO_ICMPV4: u8 = 1;
pub const IP_PROTO_IGMP: u8 = 2;
pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;
pub const IP_PROTO_OSPF: u8 = 89;
pub const IP_PROTO_ICMPV6: u8 = 58;

/// Dispatch on an IP protocol/next-header number. `pseudo` is the
/// IPv4-or-IPv6 pseudo-header bytes the transport layer's checksum methods
/// will need later; it is not consumed here (no layer stores a reference
/// to another layer, see `DESIGN.md`), just threaded through so callers
/// that built it don't have to rebuild it.
pub(crate) fn by_ip_protocol(packet: &mut Packet, parent: usize, protocol: u8, payload: ByteSlice) -> Result<()> {
    match protocol {
        IP_PROTO_TCP => proto::tcp::attach(packet, parent, payload),
        IP_PROTO_UDP => proto::udp::attach(packet, parent, payload),
        IP_PROTO_ICMPV4 => proto::icmpv4::attach(packet, parent, payload),
        IP_PROTO_ICMPV6 => proto::icmpv6::attach(packet, parent, payload),
        IP_PROTO_IGMP => proto::igmp::attach(packet, parent, payload),
        IP_PROTO_OSPF => proto::ospf::attach(packet, parent, payload),
        _ => {
            packet.set_payload_bytes(parent, payload);
            Ok(())
        }
    }
}

/// PPP protocol field values (RFC 1661 / RFC 3817 assignments) this crate
/// recognizes.
pub const PPP_PROTOCOL_IPV4: u16 = 0x0021;
pub const PPP_PROTOCOL_IPV6: u16 = 0x0057;

pub(crate) fn by_ppp_protocol(packet: &mut Packet, parent: usize, protocol: u16, payload: ByteSlice) -> Result<()> {
    match protocol {
        PPP_PROTOCOL_IPV4 => proto::ipv4::attach(packet, parent, payload),
        PPP_PROTOCOL_IPV6 => proto::ipv6::attach(packet, parent, payload),
        _ => {
            packet.set_payload_bytes(parent, payload);
            Ok(())
        }
    }
}
