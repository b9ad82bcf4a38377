//! The recursive "packet tree" container, and the small capability set
//! every concrete protocol layer implements.
//!
//! REDESIGN FLAGS (design doc §9): rather than a deep inheritance chain
//! (`Packet -> TransportPacket -> TcpPacket`, ...), every protocol layer
//! implements one small object-safe trait, [`Layer`]. Rather than owned
//! parent references (which would form reference cycles), the tree is a
//! flat arena (`Vec` of nodes) with parent/child relationships expressed
//! as indices.
use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;

use crate::byte_slice::ByteSlice;

/// Discriminates the concrete protocol a layer represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtocolKind {
    Ethernet,
    LinuxSll,
    Ppp,
    PppoeDiscovery,
    PppoeSession,
    Dot1Q,
    Arp,
    Ipv4,
    Ipv6,
    Tcp,
    Udp,
    Icmpv4,
    Icmpv6,
    Igmp,
    Ospf,
    Lldp,
    Drda,
    WakeOnLan,
    Ieee80211,
    Radiotap,
    Ppi,
    Raw,
}

/// The capability set common to every layer: its header bytes, what
/// protocol it is, and how to fold its own length/checksum fields once the
/// bytes of whatever follows it are known.
///
/// Object-safe by construction (`Self: 'static`, no generic methods) so
/// that a [`Packet`]'s arena can hold `Box<dyn Layer>` for heterogeneous
/// protocol layers.
pub trait Layer: 'static {
    /// The header's own slice; never includes the payload.
    fn header_slice(&self) -> &ByteSlice;

    /// Which protocol this layer represents.
    fn protocol_kind(&self) -> ProtocolKind;

    /// Recompute any length field this layer is responsible for, given the
    /// serialized bytes of whatever follows its header (a child layer's
    /// full subtree, or raw trailing bytes). The default does nothing;
    /// most layers (Ethernet, ARP, UDP-without-checksum, ...) have nothing
    /// to recompute here. Checksums that need a pseudo-header are *not*
    /// handled through this method, see [`crate::proto::ipv4::Ipv4Layer`]
    /// and the transport layers' own `update_checksum` methods, which the
    /// caller wires together explicitly (no layer stores a reference to
    /// another layer, so there is nothing to downcast-and-dispatch here).
    fn update_calculated_values(&mut self, payload: &[u8]) {
        let _ = payload;
    }

    /// Type-erased access, used by [`Packet`] callers that need a concrete
    /// protocol's extra accessors (e.g. reading an `Ipv4Layer`'s addresses
    /// to build a TCP pseudo-header).
    fn as_any(&self) -> &dyn Any {
        self
    }

    /// Mutable counterpart of [`Layer::as_any`].
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Downcast a `&dyn Layer` to a concrete protocol layer type.
pub fn downcast_layer<T: Layer>(layer: &dyn Layer) -> Option<&T> {
    layer.as_any().downcast_ref::<T>()
}

/// Downcast a `&mut dyn Layer` to a concrete protocol layer type.
pub fn downcast_layer_mut<T: Layer>(layer: &mut dyn Layer) -> Option<&mut T> {
    layer.as_any_mut().downcast_mut::<T>()
}

/// What follows a layer's header.
pub enum Payload {
    /// A parsed child layer, by arena index into the owning [`Packet`].
    Child(usize),
    /// Bytes that were not recognized (or deliberately left undissected).
    Bytes(ByteSlice),
    /// No payload at all.
    None,
}

struct Node {
    layer: Box<dyn Layer>,
    parent: Option<usize>,
    payload: Payload,
}

/// The recursive container producing a fully typed tree from raw bytes (or
/// holding one assembled from field values).
///
/// Internally a flat arena: every layer is a `Node` in `self.nodes`, and
/// parent/child relationships are indices rather than owned references, so
/// there is never a reference cycle to reason about.
pub struct Packet {
    nodes: Vec<Node>,
}

impl Packet {
    /// Start a new tree with `root` as the single, parentless node.
    pub(crate) fn new(root: Box<dyn Layer>) -> Self {
        Packet {
            nodes: alloc::vec![Node { layer: root, parent: None, payload: Payload::None }],
        }
    }

    /// The arena index of the root (link) layer.
    pub fn root(&self) -> usize {
        0
    }

    pub fn layer(&self, index: usize) -> &dyn Layer {
        &*self.nodes[index].layer
    }

    pub fn layer_mut(&mut self, index: usize) -> &mut dyn Layer {
        &mut *self.nodes[index].layer
    }

    pub fn parent_of(&self, index: usize) -> Option<usize> {
        self.nodes[index].parent
    }

    pub fn payload_of(&self, index: usize) -> &Payload {
        &self.nodes[index].payload
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach `child` as the payload of `parent_index`; returns the new
    /// node's arena index.
    pub(crate) fn attach_child(&mut self, parent_index: usize, child: Box<dyn Layer>) -> usize {
        let child_index = self.nodes.len();
        self.nodes.push(Node {
            layer: child,
            parent: Some(parent_index),
            payload: Payload::None,
        });
        self.nodes[parent_index].payload = Payload::Child(child_index);
        child_index
    }

    pub(crate) fn set_payload_bytes(&mut self, index: usize, bytes: ByteSlice) {
        self.nodes[index].payload = Payload::Bytes(bytes);
    }

    /// Find the nearest ancestor of `index` (searching `index` itself
    /// first) whose protocol is `kind`.
    pub fn find_ancestor(&self, index: usize, kind: ProtocolKind) -> Option<usize> {
        let mut cur = Some(index);
        while let Some(i) = cur {
            if self.nodes[i].layer.protocol_kind() == kind {
                return Some(i);
            }
            cur = self.nodes[i].parent;
        }
        None
    }

    /// The byte length of whatever follows `index`'s own header: a child
    /// subtree's total extent, or a raw bytes payload's length, or zero.
    pub fn payload_len(&self, index: usize) -> usize {
        match &self.nodes[index].payload {
            Payload::Child(c) => self.nodes[*c].layer.header_slice().length() + self.payload_len(*c),
            Payload::Bytes(b) => b.length(),
            Payload::None => 0,
        }
    }

    /// The serialized bytes of whatever follows `index`'s own header.
    pub fn payload_bytes(&self, index: usize) -> Vec<u8> {
        let len = self.payload_len(index);
        self.nodes[index].layer.header_slice().encapsulated(Some(len)).actual()
    }

    /// Recompute length fields in header order from innermost layer
    /// outward (§6). Children are always appended after their parent, so
    /// walking the arena back-to-front already visits leaves before roots.
    pub fn update_calculated_values(&mut self) {
        for i in (0..self.nodes.len()).rev() {
            let payload = self.payload_bytes(i);
            self.nodes[i].layer.update_calculated_values(&payload);
        }
    }

    /// The serialized byte image of the whole tree: every layer shares one
    /// buffer, so this is simply that buffer's current contents.
    pub fn bytes(&self) -> Vec<u8> {
        self.nodes[0].layer.header_slice().buffer().borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_slice::ByteSlice;

    struct Stub {
        slice: ByteSlice,
        kind: ProtocolKind,
    }

    impl Layer for Stub {
        fn header_slice(&self) -> &ByteSlice {
            &self.slice
        }
        fn protocol_kind(&self) -> ProtocolKind {
            self.kind
        }
    }

    #[test]
    fn arena_tracks_parent_child_and_payload_len() {
        let root_bytes = ByteSlice::from_vec(alloc::vec![1, 2, 3, 4, 5, 6]);
        let mut header = root_bytes.clone();
        header.set_length(2).unwrap();
        let mut tree = Packet::new(Box::new(Stub { slice: header, kind: ProtocolKind::Ethernet }));

        let mut child_header = root_bytes.encapsulated(None);
        child_header.set_length(2).unwrap();
        let child_index = tree.attach_child(0, Box::new(Stub { slice: child_header, kind: ProtocolKind::Ipv4 }));

        let trailing = tree.layer(child_index).header_slice().encapsulated(None);
        tree.set_payload_bytes(child_index, trailing);

        assert_eq!(tree.find_ancestor(child_index, ProtocolKind::Ethernet), Some(0));
        assert_eq!(tree.payload_len(0), 2 + 2); // child header + its trailing bytes
        assert_eq!(tree.bytes(), alloc::vec![1, 2, 3, 4, 5, 6]);
    }
}
