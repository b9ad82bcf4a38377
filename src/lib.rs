//! Zero-copy dissection and construction of layered network protocol frames.
//!
//! A captured or synthesized byte buffer is exposed as a tree of protocol
//! [`Layer`](layer::Layer)s: a link-layer frame, a network-layer datagram,
//! a transport-layer segment, and selected application/control-plane
//! payloads. Every layer is a thin view (header slice + parent + payload
//! slot) over one shared, growable buffer; reading or writing a field
//! writes through to that buffer, and serializing the tree reproduces the
//! bytes, consistent with whatever mutations were made.
//!
//! This crate performs no I/O, no reassembly, and no flow tracking. It is
//! the dissection/construction core only: capture-file reading, live
//! capture, pretty-printing and random-packet generation are left to other
//! crates.
#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "alloc")]
extern crate alloc;

#[cfg(not(feature = "alloc"))]
compile_error!("netdissect currently requires the `alloc` feature (enabled by default)");

pub mod address;
pub mod byte_slice;
pub mod checksum;
pub mod dispatch;
pub mod endian;
pub mod error;
pub mod layer;
pub mod options;
pub mod proto;

pub use crate::byte_slice::ByteSlice;
pub use crate::error::Error;
pub use crate::layer::{Layer, Packet, Payload, ProtocolKind};
pub use crate::proto::{parse_link_layer, LinkKind};

/// Whole-tree round-trip and checksum scenarios (design doc §8, E1/E2):
/// these exercise the full Ethernet/IPv4/TCP dissection path the way a
/// caller actually would, rather than one layer's accessors in isolation.
#[cfg(test)]
mod integration_tests {
    use alloc::vec;

    use crate::address::{Ipv4Address, MacAddress};
    use crate::layer::{downcast_layer, downcast_layer_mut, Payload, ProtocolKind};
    use crate::proto::eth::EthernetLayer;
    use crate::proto::ipv4::Ipv4Layer;
    use crate::proto::tcp::TcpLayer;
    use crate::{parse_link_layer, LinkKind};

    /// E1: Ethernet/IPv4/TCP SYN, checksums left zeroed in the capture.
    fn syn_frame() -> alloc::vec::Vec<u8> {
        let mut bytes = vec![0xFFu8; 6]; // broadcast destination
        bytes.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]); // source
        bytes.extend_from_slice(&[0x08, 0x00]); // EtherType IPv4
        bytes.extend_from_slice(&[
            0x45, 0x00, 0x00, 0x28, // version/IHL, ToS, total length 40
            0x00, 0x01, 0x00, 0x00, // identification, flags/frag
            0x40, 0x06, 0x00, 0x00, // TTL 64, protocol TCP, checksum placeholder
            0x0A, 0x00, 0x00, 0x01, // source 10.0.0.1
            0x0A, 0x00, 0x00, 0x02, // destination 10.0.0.2
        ]);
        bytes.extend_from_slice(&[
            0x04, 0xD2, 0x16, 0x2E, // src port 1234, dst port 5678
            0x00, 0x00, 0x00, 0x00, // sequence number 0
            0x00, 0x00, 0x00, 0x00, // ack number 0
            0x50, 0x02, 0x20, 0x00, // data offset 5, SYN only, window 0x2000
            0x00, 0x00, 0x00, 0x00, // checksum placeholder, urgent pointer 0
        ]);
        bytes
    }

    #[test]
    fn e1_parses_full_ethernet_ipv4_tcp_tree() {
        let packet = parse_link_layer(LinkKind::Ethernet, syn_frame()).unwrap();

        let eth = downcast_layer::<EthernetLayer>(packet.layer(packet.root())).unwrap();
        assert!(eth.destination().unwrap().is_broadcast());
        assert_eq!(eth.source().unwrap(), MacAddress::new([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]));
        assert_eq!(eth.ethertype().unwrap(), 0x0800);

        let ip_idx = match packet.payload_of(packet.root()) {
            Payload::Child(i) => *i,
            _ => panic!("expected an IPv4 child layer"),
        };
        let ip = downcast_layer::<Ipv4Layer>(packet.layer(ip_idx)).unwrap();
        assert_eq!(ip.source().unwrap(), Ipv4Address::new([10, 0, 0, 1]));
        assert_eq!(ip.destination().unwrap(), Ipv4Address::new([10, 0, 0, 2]));
        assert_eq!(ip.ttl().unwrap(), 64);
        assert_eq!(ip.protocol().unwrap(), crate::dispatch::IP_PROTO_TCP);

        let tcp_idx = match packet.payload_of(ip_idx) {
            Payload::Child(i) => *i,
            _ => panic!("expected a TCP child layer"),
        };
        let tcp = downcast_layer::<TcpLayer>(packet.layer(tcp_idx)).unwrap();
        assert_eq!(tcp.source_port().unwrap(), 1234);
        assert_eq!(tcp.destination_port().unwrap(), 5678);
        assert_eq!(tcp.sequence_number().unwrap(), 0);
        assert!(tcp.syn().unwrap());
        for flag in [tcp.fin(), tcp.ack(), tcp.rst(), tcp.psh(), tcp.urg()] {
            assert_eq!(flag.unwrap(), false);
        }

        assert!(matches!(packet.payload_of(tcp_idx), Payload::Bytes(b) if b.length() == 0));
        assert_eq!(packet.layer(packet.root()).protocol_kind(), ProtocolKind::Ethernet);

        // Invariant 1 (§8): parsing without mutating reproduces the bytes.
        assert_eq!(packet.bytes(), syn_frame());
    }

    /// E2: zero both checksum fields, recompute, and confirm both validate.
    #[test]
    fn e2_recomputed_checksums_validate() {
        let mut packet = parse_link_layer(LinkKind::Ethernet, syn_frame()).unwrap();
        let ip_idx = match packet.payload_of(packet.root()) {
            Payload::Child(i) => *i,
            _ => panic!("expected an IPv4 child layer"),
        };
        let tcp_idx = match packet.payload_of(ip_idx) {
            Payload::Child(i) => *i,
            _ => panic!("expected a TCP child layer"),
        };

        downcast_layer_mut::<Ipv4Layer>(packet.layer_mut(ip_idx)).unwrap().update_checksum().unwrap();

        let pseudo = downcast_layer::<Ipv4Layer>(packet.layer(ip_idx))
            .unwrap()
            .pseudo_header(crate::dispatch::IP_PROTO_TCP, 20)
            .unwrap();
        downcast_layer_mut::<TcpLayer>(packet.layer_mut(tcp_idx)).unwrap().update_checksum(&pseudo, &[]).unwrap();

        let ip = downcast_layer::<Ipv4Layer>(packet.layer(ip_idx)).unwrap();
        assert!(ip.valid_checksum().unwrap());
        let tcp = downcast_layer::<TcpLayer>(packet.layer(tcp_idx)).unwrap();
        assert!(tcp.valid_checksum(&pseudo, &[]));
    }

    /// E3: a TCP options list mixing MSS, NOP, WindowScale, and EOL.
    #[test]
    fn e3_tcp_options_parse_mixed_list() {
        use crate::options::tcp::TcpOption;

        let mut bytes = vec![0xFFu8; 6];
        bytes.extend_from_slice(&[0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        bytes.extend_from_slice(&[0x08, 0x00]);
        bytes.extend_from_slice(&[
            0x45, 0x00, 0x00, 0x30, // total length 48: 20 (IP) + 28 (TCP w/ options)
            0x00, 0x01, 0x00, 0x00,
            0x40, 0x06, 0x00, 0x00,
            0x0A, 0x00, 0x00, 0x01,
            0x0A, 0x00, 0x00, 0x02,
        ]);
        bytes.extend_from_slice(&[
            0x04, 0xD2, 0x16, 0x2E, // ports
            0x00, 0x00, 0x00, 0x00, // sequence
            0x00, 0x00, 0x00, 0x00, // ack
            0x70, 0x02, 0x20, 0x00, // data offset 7 words = 28 bytes, SYN
            0x00, 0x00, 0x00, 0x00, // checksum, urgent pointer
        ]);
        bytes.extend_from_slice(&[0x02, 0x04, 0x05, 0xB4, 0x01, 0x03, 0x03, 0x07, 0x00]);

        let packet = parse_link_layer(LinkKind::Ethernet, bytes).unwrap();
        let ip_idx = match packet.payload_of(packet.root()) {
            Payload::Child(i) => *i,
            _ => panic!("expected an IPv4 child layer"),
        };
        let tcp_idx = match packet.payload_of(ip_idx) {
            Payload::Child(i) => *i,
            _ => panic!("expected a TCP child layer"),
        };
        let tcp = downcast_layer::<TcpLayer>(packet.layer(tcp_idx)).unwrap();
        let opts = tcp.options().unwrap();
        assert_eq!(
            opts,
            vec![
                TcpOption::MaximumSegmentSize(1460),
                TcpOption::NoOperation,
                TcpOption::WindowScale(7),
                TcpOption::EndOfOptionList,
            ]
        );
    }

    /// E6: an unrecognized EtherType yields a raw-bytes payload, not an error.
    #[test]
    fn e6_unknown_ethertype_is_not_an_error() {
        let mut bytes = vec![0u8; 12];
        bytes.extend_from_slice(&[0xBE, 0xEF]);
        bytes.extend_from_slice(&[1, 2, 3, 4, 5]);
        let packet = parse_link_layer(LinkKind::Ethernet, bytes).unwrap();
        match packet.payload_of(packet.root()) {
            Payload::Bytes(b) => assert_eq!(b.actual(), vec![1, 2, 3, 4, 5]),
            _ => panic!("expected raw bytes, got a dissected child layer"),
        }
    }
}
