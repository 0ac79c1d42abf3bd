//! Connection handshake: version negotiation, feature gating, shared
//! attribute layout, and checksum-seed exchange.
//!
//! Runs exactly once per connection, synchronously, before any file
//! data. The two peers execute it independently with no coordination
//! beyond the two wire integers (version, seed); everything else in the
//! resulting [`NegotiationContext`] is derived deterministically from
//! values both sides already agree on.

pub mod gate;
pub mod slots;
pub mod subprotocol;
pub mod version;

use std::time::{SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;
use crate::filter::{FilterList, RuleFlags};
use crate::options::{Role, SyncOptions};
use crate::protocol::{self, VersionBounds};

use gate::EffectiveOptions;
use slots::AttrSlots;

/// Everything later stages need from the handshake. Immutable once
/// built; no component writes to it after `Handshake::run` returns.
#[derive(Debug, Clone)]
pub struct NegotiationContext {
    /// Version the peer advertised.
    pub remote_protocol: i32,
    /// Version both sides speak.
    pub protocol: i32,
    /// Options after version-dependent downgrades.
    pub effective: EffectiveOptions,
    /// Per-entry attribute slot layout shared with the peer.
    pub slots: AttrSlots,
    /// Seed mixed into rolling-checksum computation.
    pub checksum_seed: i32,
}

/// One connection handshake.
#[derive(Debug)]
pub struct Handshake<'a> {
    opts: &'a SyncOptions,
    role: Role,
    bounds: VersionBounds,
    remote_protocol: Option<i32>,
}

impl<'a> Handshake<'a> {
    pub fn new(opts: &'a SyncOptions, role: Role) -> Self {
        Self {
            opts,
            role,
            bounds: VersionBounds::default(),
            remote_protocol: None,
        }
    }

    /// Override the version policy, for speaking an older protocol
    /// family.
    pub fn with_bounds(mut self, bounds: VersionBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Record a peer version learned before the handshake. The daemon
    /// greeting exchanges versions in text before the binary stream
    /// starts; the handshake must not exchange them again.
    pub fn with_remote_protocol(mut self, version: i32) -> Self {
        self.remote_protocol = Some(version);
        self
    }

    /// Run the handshake. On error the connection is unusable and the
    /// process should terminate with
    /// [`exit_code`](ProtocolError::exit_code).
    pub async fn run<R, W>(
        self,
        reader: &mut R,
        writer: &mut W,
        filters: &mut FilterList,
    ) -> Result<NegotiationContext, ProtocolError>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let outcome = version::negotiate(
            self.opts,
            &self.role,
            &self.bounds,
            self.remote_protocol,
            reader,
            writer,
        )
        .await?;

        let effective = gate::validate(outcome.protocol, self.opts, &self.role)?;
        let slots = slots::allocate(&effective, &self.role);

        install_partial_rule(self.opts, &self.role, outcome.protocol, filters);

        let checksum_seed = exchange_seed(self.opts, &self.role, reader, writer).await?;

        Ok(NegotiationContext {
            remote_protocol: outcome.remote,
            protocol: outcome.protocol,
            effective,
            slots,
            checksum_seed,
        })
    }
}

/// Keep a relative partial-transfer directory out of normal matching.
///
/// Only ends that touch the destination directory tree directly install
/// the rule; a networked server gets it from the client's filter list
/// instead.
fn install_partial_rule(opts: &SyncOptions, role: &Role, protocol: i32, filters: &mut FilterList) {
    let Some(dir) = &opts.partial_dir else {
        return;
    };
    if dir.is_absolute() || (role.server && !role.local) {
        return;
    }

    let mut flags = RuleFlags::NO_PREFIXES | RuleFlags::DIRECTORY;
    if !role.sender || protocol >= 30 {
        flags |= RuleFlags::PERISHABLE;
    }
    filters.add_rule(dir.to_string_lossy(), flags);
}

/// The server picks the seed and sends it; everyone else reads it.
async fn exchange_seed<R, W>(
    opts: &SyncOptions,
    role: &Role,
    reader: &mut R,
    writer: &mut W,
) -> Result<i32, ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    if role.server {
        let seed = match opts.checksum_seed {
            Some(seed) => seed,
            None => SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs() as i32)
                .unwrap_or(0),
        };
        protocol::write_int(writer, seed).await?;
        writer.flush().await?;
        Ok(seed)
    } else {
        Ok(protocol::read_int(reader).await?)
    }
}
