//! Version exchange and range policy.
//!
//! Each side advertises the version it wants to speak as one wire
//! integer; both then independently settle on the smaller of the two.
//! Everything later in the connection keys off that single number, so
//! every range check here is fatal.

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

use crate::error::ProtocolError;
use crate::options::{Role, SyncOptions};
use crate::protocol::{self, VersionBounds};

use super::subprotocol;

/// Result of the version exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionOutcome {
    /// Version the peer advertised.
    pub remote: i32,
    /// Version both sides will speak.
    pub protocol: i32,
}

/// Exchange version numbers with the peer and clamp the result.
///
/// `prior_remote` carries a peer version learned before the binary
/// stream started (the daemon greeting); when set, the wire exchange is
/// skipped and only the range policy runs.
pub(super) async fn negotiate<R, W>(
    opts: &SyncOptions,
    role: &Role,
    bounds: &VersionBounds,
    prior_remote: Option<i32>,
    reader: &mut R,
    writer: &mut W,
) -> Result<VersionOutcome, ProtocolError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut local = opts.protocol_version;

    let remote = match prior_remote {
        Some(remote) => remote,
        None => {
            // A networked server is the one end that can see the
            // client's pre-release marker, so it adjusts before
            // advertising.
            if role.server && !role.local {
                local = subprotocol::resolve(opts.shell_version.as_deref(), local, bounds);
            }
            if !opts.read_batch {
                protocol::write_int(writer, local).await?;
                writer.flush().await?;
            }
            let remote = protocol::read_int(reader).await?;
            if local > remote {
                local = remote;
            }
            remote
        }
    };

    if opts.read_batch && remote > local {
        return Err(ProtocolError::BatchTooNew {
            remote,
            local,
        });
    }

    tracing::debug!(
        "({}) Protocol versions: remote={}, negotiated={}",
        role.name(),
        remote,
        local
    );

    if !bounds.contains(remote) {
        return Err(ProtocolError::VersionOutOfRange { remote });
    }
    if remote < bounds.old {
        tracing::info!(
            "{} is a very old protocol version, upgrade recommended.",
            role.peer_name()
        );
    }
    if local < bounds.min {
        return Err(ProtocolError::LocalVersionTooLow {
            min: bounds.min,
            role: role.name(),
        });
    }
    if local > bounds.current {
        return Err(ProtocolError::LocalVersionTooHigh {
            max: bounds.current,
            role: role.name(),
        });
    }

    Ok(VersionOutcome {
        remote,
        protocol: local,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::PROTOCOL_VERSION;
    use proptest::prelude::*;

    fn client() -> Role {
        Role {
            server: false,
            sender: true,
            local: false,
        }
    }

    /// Run one side of the exchange against a scripted peer that
    /// advertises `remote`.
    async fn negotiate_against(opts: &SyncOptions, role: &Role, remote: i32) -> Result<VersionOutcome, ProtocolError> {
        let (near, mut far) = tokio::io::duplex(64);
        protocol::write_int(&mut far, remote).await.unwrap();

        let (mut reader, mut writer) = tokio::io::split(near);
        negotiate(
            opts,
            role,
            &VersionBounds::default(),
            None,
            &mut reader,
            &mut writer,
        )
        .await
    }

    #[tokio::test]
    async fn test_negotiates_minimum_of_both() {
        let opts = SyncOptions::default();
        let out = negotiate_against(&opts, &client(), 28).await.unwrap();
        assert_eq!(out.remote, 28);
        assert_eq!(out.protocol, 28);

        let opts = SyncOptions {
            protocol_version: 27,
            ..SyncOptions::default()
        };
        let out = negotiate_against(&opts, &client(), 31).await.unwrap();
        assert_eq!(out.remote, 31);
        assert_eq!(out.protocol, 27);
    }

    #[tokio::test]
    async fn test_remote_out_of_range_is_fatal() {
        let opts = SyncOptions::default();
        let err = negotiate_against(&opts, &client(), 19).await.unwrap_err();
        assert!(matches!(err, ProtocolError::VersionOutOfRange { remote: 19 }));

        let err = negotiate_against(&opts, &client(), 41).await.unwrap_err();
        assert!(matches!(err, ProtocolError::VersionOutOfRange { remote: 41 }));
    }

    #[tokio::test]
    async fn test_old_remote_is_accepted() {
        // Below the advisory threshold but inside the range.
        let opts = SyncOptions::default();
        let out = negotiate_against(&opts, &client(), 24).await.unwrap();
        assert_eq!(out.protocol, 24);
    }

    #[tokio::test]
    async fn test_local_override_out_of_range() {
        let opts = SyncOptions {
            protocol_version: PROTOCOL_VERSION + 1,
            ..SyncOptions::default()
        };
        // Peer claims something even newer, so the min() keeps ours.
        let err = negotiate_against(&opts, &client(), 40).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::LocalVersionTooHigh { max: PROTOCOL_VERSION, role: "Client" }
        ));
    }

    #[tokio::test]
    async fn test_batch_too_new() {
        let opts = SyncOptions {
            read_batch: true,
            ..SyncOptions::default()
        };
        // read_batch skips the write; the recorded stream claims 35.
        let err = negotiate_against(&opts, &client(), 35).await.unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BatchTooNew { remote: 35, local: PROTOCOL_VERSION }
        ));
    }

    #[tokio::test]
    async fn test_prior_remote_skips_exchange() {
        let opts = SyncOptions {
            protocol_version: 29,
            ..SyncOptions::default()
        };
        // No scripted peer at all: nothing may touch the wire.
        let (near, _far) = tokio::io::duplex(64);
        let (mut reader, mut writer) = tokio::io::split(near);
        let out = negotiate(
            &opts,
            &client(),
            &VersionBounds::default(),
            Some(29),
            &mut reader,
            &mut writer,
        )
        .await
        .unwrap();
        assert_eq!(out.remote, 29);
        assert_eq!(out.protocol, 29);
    }

    proptest! {
        #[test]
        fn test_negotiated_is_min_of_advertised(
            local in 20i32..=PROTOCOL_VERSION,
            remote in 20i32..=PROTOCOL_VERSION,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .build()
                .unwrap();
            let out = rt.block_on(async {
                let opts = SyncOptions {
                    protocol_version: local,
                    ..SyncOptions::default()
                };
                negotiate_against(&opts, &client(), remote).await.unwrap()
            });
            prop_assert_eq!(out.protocol, local.min(remote));
            prop_assert_eq!(out.remote, remote);
        }
    }
}
