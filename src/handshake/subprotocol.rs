//! Pre-release build compatibility.
//!
//! A pre-release client advertises a `VER.SUB` marker through the
//! remote-shell invocation. Two pre-release builds of the same upcoming
//! version are only trusted to interoperate when their sub-revisions
//! match exactly; any mismatch negotiates down to the last fully
//! released version.

use crate::protocol::VersionBounds;

/// Adjust the version this end is about to advertise, given the peer's
/// optional `VER.SUB` marker. Returns the (possibly decremented)
/// version to advertise.
pub(super) fn resolve(marker: Option<&str>, local_version: i32, bounds: &VersionBounds) -> i32 {
    // Our own sub-revision only matters when we'd advertise the version
    // it belongs to.
    let our_sub = if local_version < bounds.current {
        0
    } else {
        bounds.subprotocol
    };

    let Some((their_protocol, their_sub)) = marker.and_then(parse_marker) else {
        // Nothing usable from the peer. If we are pre-release ourselves,
        // claim one version older than we'd like.
        if our_sub != 0 {
            return local_version - 1;
        }
        return local_version;
    };

    if their_protocol < local_version {
        if their_sub != 0 {
            return their_protocol - 1;
        }
        return local_version;
    }

    // A peer that is ahead of us counts as final.
    let their_sub = if their_protocol > local_version {
        0
    } else {
        their_sub
    };

    if their_sub != our_sub {
        local_version - 1
    } else {
        local_version
    }
}

/// Parse a `VER.SUB` marker. Both fields must lead with a positive
/// decimal integer; anything else is treated as no marker at all.
fn parse_marker(marker: &str) -> Option<(i32, i32)> {
    let (ver, sub) = marker.split_once('.')?;
    Some((leading_int(ver)?, leading_int(sub)?))
}

fn leading_int(s: &str) -> Option<i32> {
    let digits: String = s.chars().take_while(|c| c.is_ascii_digit()).collect();
    match digits.parse::<i32>() {
        Ok(v) if v > 0 => Some(v),
        _ => None,
    }
}
