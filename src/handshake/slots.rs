//! Per-entry attribute slot layout.
//!
//! File-list entries carry a shared extensible record for optional
//! metadata. Slot positions are never transmitted: both peers derive
//! the same layout from the negotiated option set, claiming slots in a
//! fixed order, so an index computed here means the same thing on the
//! other end.

use std::mem;

use crate::options::Role;

use super::gate::EffectiveOptions;

/// Units the sending side reserves at the base of every record to carry
/// a pointer-sized reference alongside the entry.
const PTR_SLOT_WIDTH: usize = (mem::size_of::<usize>() + 3) / 4;

/// Ordered slot indices for optional per-entry attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttrSlots {
    /// Owner id slot, when preserving ownership.
    pub uid: Option<usize>,
    /// Group id slot, when preserving group.
    pub gid: Option<usize>,
    /// ACL slot; never present on the sending side.
    pub acls: Option<usize>,
    /// Extended-attribute slot.
    pub xattrs: Option<usize>,
    /// Total record units claimed, including the role-dependent base.
    pub extra_count: usize,
}

/// Assign slot positions in fixed claim order: uid, gid, acls, xattrs.
pub(crate) fn allocate(effective: &EffectiveOptions, role: &Role) -> AttrSlots {
    let mut next = if role.sender { PTR_SLOT_WIDTH } else { 1 };
    let mut claim = |active: bool| {
        if active {
            next += 1;
            Some(next)
        } else {
            None
        }
    };

    let uid = claim(effective.preserve_uid);
    let gid = claim(effective.preserve_gid);
    let acls = claim(effective.preserve_acls && !role.sender);
    let xattrs = claim(effective.preserve_xattrs);

    AttrSlots {
        uid,
        gid,
        acls,
        xattrs,
        extra_count: next,
    }
}
