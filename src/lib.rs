//! Protocol negotiation and compatibility layer for resync.
//!
//! Before any file data moves, the two peers must agree on a single
//! protocol version, settle which optional features that version can
//! carry, and derive the shared per-entry attribute layout and checksum
//! seed. [`Handshake::run`] performs that exchange exactly once per
//! connection and returns an immutable [`NegotiationContext`] that the
//! file-list and delta-transfer layers consume.
//!
//! Any incompatibility detected here is fatal for the connection: the
//! error names the offending option and the negotiated version, and
//! [`ProtocolError::exit_code`] gives the process exit status to use.

pub mod error;
pub mod filter;
pub mod handshake;
pub mod options;
pub mod protocol;

pub use error::{ProtocolError, EXIT_PROTOCOL_ERROR, EXIT_STREAM_ERROR};
pub use filter::{FilterList, FilterRule, RuleFlags};
pub use handshake::gate::EffectiveOptions;
pub use handshake::slots::AttrSlots;
pub use handshake::{Handshake, NegotiationContext};
pub use options::{DeleteTiming, Role, SyncOptions};
pub use protocol::{
    VersionBounds, MAX_PROTOCOL_VERSION, MIN_PROTOCOL_VERSION, OLD_PROTOCOL_VERSION,
    PROTOCOL_VERSION, SUBPROTOCOL_VERSION,
};
