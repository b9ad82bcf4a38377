//! The error type shared by every layer of this crate.
//!
//! Kept as a plain enum rather than pulling in an error-derive crate: the
//! crate is `no_std` by default and every variant here is a leaf condition
//! (a short buffer, a bad field value) with nothing further upstream to
//! chain to.
use core::fmt;

/// Everything that can go wrong while parsing or mutating a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Error {
    /// The buffer is too short for the protocol's fixed-size header, or a
    /// field read/write would fall outside the slice.
    ShortBuffer,
    /// A declared length field (e.g. IPv4 total length, an option's length
    /// byte) is inconsistent with the bytes actually available.
    InvariantViolated,
    /// An address setter received a value of the wrong length for the
    /// protocol (e.g. 5 bytes for a MAC address).
    InvalidAddress,
    /// An option/TLV value does not fit in the width of its length field.
    ValueTooLarge,
    /// A TCP option kind was recognized as experimental and is explicitly
    /// unsupported.
    UnsupportedOption,
    /// A TCP option kind is not recognized at all.
    UnknownOption,
    /// The requested operation is not implemented for this configuration.
    NotImplemented,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::ShortBuffer => "buffer too short for protocol header",
            Error::InvariantViolated => "declared length exceeds available bytes",
            Error::InvalidAddress => "address value has the wrong length",
            Error::ValueTooLarge => "value does not fit in its length field",
            Error::UnsupportedOption => "option kind is experimental and unsupported",
            Error::UnknownOption => "unrecognized option kind",
            Error::NotImplemented => "operation not implemented",
        };
        f.write_str(msg)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// A shortened result type for layer operations.
pub type Result<T> = core::result::Result<T, Error>;
