//! Wake-on-LAN magic packet (§4.5 supplement): six 0xFF sync bytes
//! followed by the target's MAC address repeated 16 times, a fixed
//! 102-byte header, no further payload. Trailing SecureOn password bytes
//! (if present) are preserved as raw bytes after the header.
use crate::address::MacAddress;
use crate::byte_slice::ByteSlice;
use crate::error::{Error, Result};
use crate::layer::{Layer, Packet, ProtocolKind};

pub struct WakeOnLanLayer {
    header: ByteSlice,
}

impl WakeOnLanLayer {
    const SYNC_LEN: usize = 6;
    const REPETITIONS: usize = 16;
    pub const HEADER_LEN: usize = Self::SYNC_LEN + Self::REPETITIONS * 6;

    pub fn new(target: MacAddress) -> Self {
        let header = ByteSlice::zeroed(Self::HEADER_LEN);
        let mut layer = WakeOnLanLayer { header };
        layer.header.with_slice_mut(|s| s[0..Self::SYNC_LEN].fill(0xFF));
        layer.set_target(target).expect("fixed-size header");
        layer
    }

    pub fn has_valid_sync(&self) -> Result<bool> {
        self.header.with_slice(|s| Ok(s[0..Self::SYNC_LEN].iter().all(|&b| b == 0xFF)))
    }

    /// The target MAC, read from the first of the 16 repetitions. Returns
    /// `Err(Error::InvariantViolated)` if the 16 repetitions disagree.
    pub fn target(&self) -> Result<MacAddress> {
        self.header.with_slice(|s| {
            let first = &s[Self::SYNC_LEN..Self::SYNC_LEN + 6];
            for i in 1..Self::REPETITIONS {
                let start = Self::SYNC_LEN + i * 6;
                if &s[start..start + 6] != first {
                    return Err(Error::InvariantViolated);
                }
            }
            MacAddress::from_slice(first)
        })
    }

    pub fn set_target(&mut self, target: MacAddress) -> Result<()> {
        self.header.with_slice_mut(|s| {
            for i in 0..Self::REPETITIONS {
                let start = Self::SYNC_LEN + i * 6;
                s[start..start + 6].copy_from_slice(&target.octets());
            }
        });
        Ok(())
    }
}

impl Layer for WakeOnLanLayer {
    fn header_slice(&self) -> &ByteSlice {
        &self.header
    }

    fn protocol_kind(&self) -> ProtocolKind {
        ProtocolKind::WakeOnLan
    }
}

pub(crate) fn attach(packet: &mut Packet, parent: usize, payload: ByteSlice) -> Result<()> {
    if payload.length() < WakeOnLanLayer::HEADER_LEN {
        return Err(Error::ShortBuffer);
    }
    let (header, rest) = super::split_header(&payload, WakeOnLanLayer::HEADER_LEN, None)?;
    super::attach_leaf(packet, parent, alloc::boxed::Box::new(WakeOnLanLayer { header }), rest);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_valid_magic_packet() {
        let target = MacAddress::new([0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        let layer = WakeOnLanLayer::new(target);
        assert!(layer.has_valid_sync().unwrap());
        assert_eq!(layer.target().unwrap(), target);
    }

    #[test]
    fn mismatched_repetition_is_rejected() {
        let target = MacAddress::new([1, 2, 3, 4, 5, 6]);
        let mut layer = WakeOnLanLayer::new(target);
        layer.header.with_slice_mut(|s| s[6] = 0x00);
        assert_eq!(layer.target(), Err(Error::InvariantViolated));
    }
}
