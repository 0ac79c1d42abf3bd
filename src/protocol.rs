//! Protocol version policy and wire-integer primitives.
//!
//! The constants below identify the wire-format revision this build
//! speaks. Negotiation clamps the active version into
//! [`MIN_PROTOCOL_VERSION`]..=[`MAX_PROTOCOL_VERSION`]; peers older than
//! [`OLD_PROTOCOL_VERSION`] still work but get an upgrade notice.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Protocol version this build advertises when not overridden.
pub const PROTOCOL_VERSION: i32 = 32;

/// Pre-release revision of [`PROTOCOL_VERSION`]. Zero means final.
pub const SUBPROTOCOL_VERSION: i32 = 0;

/// Oldest protocol version we can interoperate with.
pub const MIN_PROTOCOL_VERSION: i32 = 20;

/// Remote versions below this trigger an upgrade notice.
pub const OLD_PROTOCOL_VERSION: i32 = 25;

/// Newest protocol version we will accept from a peer.
pub const MAX_PROTOCOL_VERSION: i32 = 40;

/// Closed range of versions one build can negotiate, plus the advisory
/// threshold and pre-release revision.
///
/// Every check in the handshake reads these through a `VersionBounds`
/// value rather than the constants directly, so the negotiation engine
/// can serve other protocol families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionBounds {
    /// Oldest negotiable version.
    pub min: i32,
    /// Newest version accepted from a peer.
    pub max: i32,
    /// Remote versions below this are legal but get an upgrade notice.
    pub old: i32,
    /// Version this build speaks natively; also the cap for a local
    /// `--protocol` override.
    pub current: i32,
    /// Pre-release revision of `current`. Zero means final.
    pub subprotocol: i32,
}

impl Default for VersionBounds {
    fn default() -> Self {
        Self {
            min: MIN_PROTOCOL_VERSION,
            max: MAX_PROTOCOL_VERSION,
            old: OLD_PROTOCOL_VERSION,
            current: PROTOCOL_VERSION,
            subprotocol: SUBPROTOCOL_VERSION,
        }
    }
}

impl VersionBounds {
    /// Whether `version` is inside the negotiable range.
    pub fn contains(&self, version: i32) -> bool {
        (self.min..=self.max).contains(&version)
    }
}

/// Write one 4-byte little-endian integer to the peer.
pub async fn write_int<W: AsyncWrite + Unpin>(writer: &mut W, value: i32) -> io::Result<()> {
    writer.write_i32_le(value).await
}

/// Read one 4-byte little-endian integer from the peer.
pub async fn read_int<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<i32> {
    reader.read_i32_le().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_contains() {
        let bounds = VersionBounds::default();
        assert!(bounds.contains(MIN_PROTOCOL_VERSION));
        assert!(bounds.contains(PROTOCOL_VERSION));
        assert!(bounds.contains(MAX_PROTOCOL_VERSION));
        assert!(!bounds.contains(MIN_PROTOCOL_VERSION - 1));
        assert!(!bounds.contains(MAX_PROTOCOL_VERSION + 1));
    }

    #[tokio::test]
    async fn test_int_roundtrip() {
        let (mut near, mut far) = tokio::io::duplex(64);

        write_int(&mut near, PROTOCOL_VERSION).await.unwrap();
        write_int(&mut near, -1).await.unwrap();

        assert_eq!(read_int(&mut far).await.unwrap(), PROTOCOL_VERSION);
        assert_eq!(read_int(&mut far).await.unwrap(), -1);
    }
}
