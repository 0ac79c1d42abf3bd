//! Version-gated option matrix.
//!
//! Each table row ties one option to the minimum protocol version that
//! can carry it. A violation is fatal: silently dropping an option the
//! user asked for would leave the two file lists out of sync. The
//! non-fatal resolutions (deletion-timing default, incremental
//! recursion, generator messages) follow the table.

use crate::error::ProtocolError;
use crate::options::{DeleteTiming, Role, SyncOptions};

/// Options after version-dependent downgrades have been applied.
///
/// Derived from [`SyncOptions`] by [`validate`]; immutable for the rest
/// of the connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectiveOptions {
    /// Deletion phase with the version-dependent default resolved.
    pub delete_timing: DeleteTiming,
    /// Directory traversal interleaved with transfer instead of a full
    /// up-front scan.
    pub incremental_recursion: bool,
    /// The receiving side must accept out-of-band messages from the
    /// generator.
    pub need_messages_from_generator: bool,
    pub preserve_uid: bool,
    pub preserve_gid: bool,
    pub preserve_acls: bool,
    pub preserve_xattrs: bool,
}

/// One row of the gate table.
struct GateRule {
    /// Option name as the user spells it, for the error message.
    option: &'static str,
    /// Minimum protocol version able to carry the option.
    min: i32,
    /// Whether the option is in effect for this configuration.
    applies: fn(&SyncOptions, &Role) -> bool,
}

const GATES: &[GateRule] = &[
    GateRule {
        option: "--max-delete=0",
        min: 30,
        applies: |opts, role| opts.max_delete == Some(0) && role.sender,
    },
    GateRule {
        option: "--acls",
        min: 30,
        applies: |opts, role| opts.preserve_acls && !role.local,
    },
    GateRule {
        option: "--xattrs",
        min: 30,
        applies: |opts, role| opts.preserve_xattrs && !role.local,
    },
    GateRule {
        option: "--fuzzy",
        min: 29,
        applies: |opts, _| opts.fuzzy_basis,
    },
    GateRule {
        option: "--inplace with a basis directory",
        min: 29,
        applies: |opts, _| opts.inplace && opts.basis_dir_count > 0,
    },
    GateRule {
        option: "multiple basis directories",
        min: 29,
        applies: |opts, _| opts.basis_dir_count > 1,
    },
    GateRule {
        option: "--prune-empty-dirs",
        min: 29,
        applies: |opts, _| opts.prune_empty_dirs,
    },
];

/// Check every gated option against the negotiated version and resolve
/// the version-dependent defaults.
pub(crate) fn validate(
    protocol: i32,
    opts: &SyncOptions,
    role: &Role,
) -> Result<EffectiveOptions, ProtocolError> {
    for gate in GATES {
        if protocol < gate.min && (gate.applies)(opts, role) {
            return Err(ProtocolError::FeatureRequiresNewerProtocol {
                option: gate.option,
                min: gate.min,
                negotiated: protocol,
            });
        }
    }

    let delete_timing = match opts.delete {
        DeleteTiming::Unspecified if protocol < 30 => DeleteTiming::Before,
        DeleteTiming::Unspecified => DeleteTiming::During,
        timing => timing,
    };

    let mut incremental_recursion = false;
    let mut need_messages_from_generator = false;
    if protocol >= 30 {
        incremental_recursion = opts.recurse
            && opts.allow_inc_recurse
            && !opts.preserve_hard_links
            && delete_timing != DeleteTiming::Before
            && delete_timing != DeleteTiming::After
            && !opts.delay_updates
            && (!opts.relative_paths || opts.implied_dirs)
            && !opts.forced_sort
            && !opts.prune_empty_dirs;
        need_messages_from_generator = true;
    }

    Ok(EffectiveOptions {
        delete_timing,
        incremental_recursion,
        need_messages_from_generator,
        preserve_uid: opts.preserve_uid,
        preserve_gid: opts.preserve_gid,
        preserve_acls: opts.preserve_acls,
        preserve_xattrs: opts.preserve_xattrs,
    })
}
