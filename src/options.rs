//! Local configuration consumed by the handshake.
//!
//! Built once by option parsing (CLI or config file) before the
//! connection starts and passed read-only into
//! [`Handshake`](crate::Handshake). The handshake never mutates it; the
//! version-adjusted view it derives lives in
//! [`EffectiveOptions`](crate::EffectiveOptions).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::protocol::PROTOCOL_VERSION;

/// When deletions run relative to the transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeleteTiming {
    /// Deletion disabled.
    #[default]
    Disabled,
    /// Deletion requested without choosing a phase; the negotiated
    /// protocol version picks the default.
    Unspecified,
    /// Delete extraneous files before the transfer starts.
    Before,
    /// Delete incrementally as directories are processed.
    During,
    /// Delete after the transfer completes.
    After,
}

impl DeleteTiming {
    /// Whether deletion is requested at all.
    pub fn is_enabled(&self) -> bool {
        *self != DeleteTiming::Disabled
    }
}

/// Which end of the connection this process plays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Started as the server end of the connection.
    pub server: bool,
    /// Supplies file data (as opposed to receiving it).
    pub sender: bool,
    /// Both ends run on this machine over a local pipe.
    pub local: bool,
}

impl Role {
    /// This end's name as it appears in user-facing messages.
    pub fn name(&self) -> &'static str {
        if self.server {
            "Server"
        } else {
            "Client"
        }
    }

    /// The other end's name as it appears in user-facing messages.
    pub fn peer_name(&self) -> &'static str {
        if self.server {
            "Client"
        } else {
            "Server"
        }
    }
}

/// Every locally-configured option the handshake gates or consumes.
///
/// Field defaults mirror the option parser's: everything off except
/// `implied_dirs`, and `protocol_version` at this build's native version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncOptions {
    /// Desired protocol version, normally [`PROTOCOL_VERSION`] unless
    /// overridden with `--protocol`.
    pub protocol_version: i32,

    /// `VER.SUB` marker seen on the remote-shell command line when the
    /// invoking client is a pre-release build.
    pub shell_version: Option<String>,

    /// Replaying a previously recorded batch instead of talking to a
    /// live peer.
    pub read_batch: bool,

    /// Recurse into directories.
    pub recurse: bool,

    /// Local policy allows incremental recursion when the negotiated
    /// version and option set can carry it.
    pub allow_inc_recurse: bool,

    /// Requested deletion phase.
    pub delete: DeleteTiming,

    /// Cap on deletions; `Some(0)` means refuse to delete anything.
    pub max_delete: Option<u32>,

    /// Preserve file ownership.
    pub preserve_uid: bool,

    /// Preserve file group.
    pub preserve_gid: bool,

    /// Preserve POSIX ACLs.
    pub preserve_acls: bool,

    /// Preserve extended attributes.
    pub preserve_xattrs: bool,

    /// Preserve hard links.
    pub preserve_hard_links: bool,

    /// Look for a similarly-named basis file when the destination file
    /// is missing.
    pub fuzzy_basis: bool,

    /// Number of `--compare-dest`-style basis directories configured.
    pub basis_dir_count: usize,

    /// Update destination files in place.
    pub inplace: bool,

    /// Skip creating directories that would end up empty.
    pub prune_empty_dirs: bool,

    /// Use relative path names rooted at the source arguments.
    pub relative_paths: bool,

    /// Send implied directories along with relative paths.
    pub implied_dirs: bool,

    /// Delay all updates until the end of the transfer.
    pub delay_updates: bool,

    /// Force a full pre-sort of the file list instead of the default
    /// incremental-friendly order.
    pub forced_sort: bool,

    /// Directory holding partial transfers kept across interrupted runs.
    pub partial_dir: Option<PathBuf>,

    /// Fixed checksum seed; `None` lets the server pick a time-based one.
    pub checksum_seed: Option<i32>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            shell_version: None,
            read_batch: false,
            recurse: false,
            allow_inc_recurse: false,
            delete: DeleteTiming::Disabled,
            max_delete: None,
            preserve_uid: false,
            preserve_gid: false,
            preserve_acls: false,
            preserve_xattrs: false,
            preserve_hard_links: false,
            fuzzy_basis: false,
            basis_dir_count: 0,
            inplace: false,
            prune_empty_dirs: false,
            relative_paths: false,
            implied_dirs: true,
            delay_updates: false,
            forced_sort: false,
            partial_dir: None,
            checksum_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = SyncOptions::default();
        assert_eq!(opts.protocol_version, PROTOCOL_VERSION);
        assert!(opts.implied_dirs);
        assert!(!opts.delete.is_enabled());
        assert_eq!(opts.max_delete, None);
    }

    #[test]
    fn test_role_names() {
        let server = Role {
            server: true,
            sender: true,
            local: false,
        };
        assert_eq!(server.name(), "Server");
        assert_eq!(server.peer_name(), "Client");

        let client = Role {
            server: false,
            sender: false,
            local: false,
        };
        assert_eq!(client.name(), "Client");
        assert_eq!(client.peer_name(), "Server");
    }
}
