//! Handshake failure classification.
//!
//! Nothing here is retryable on the same connection: the caller reports
//! the message, terminates with [`ProtocolError::exit_code`], and a new
//! connection must be established.

use std::io;

use thiserror::Error;

/// Exit status for protocol incompatibilities.
pub const EXIT_PROTOCOL_ERROR: i32 = 2;

/// Exit status for transport failures during the handshake.
pub const EXIT_STREAM_ERROR: i32 = 12;

/// Fatal handshake errors.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The peer advertised a version outside the supported range. The
    /// usual cause is a shell startup file printing to stdout and
    /// corrupting the stream.
    #[error("protocol version mismatch -- is your shell clean?")]
    VersionOutOfRange {
        /// Version the peer advertised.
        remote: i32,
    },

    /// The local `--protocol` override is below the supported range.
    #[error("--protocol must be at least {min} on the {role}")]
    LocalVersionTooLow { min: i32, role: &'static str },

    /// The local `--protocol` override is above what this build speaks.
    #[error("--protocol must be no more than {max} on the {role}")]
    LocalVersionTooHigh { max: i32, role: &'static str },

    /// A replayed batch was recorded by a newer build.
    #[error("the protocol version in the batch file is too new ({remote} > {local})")]
    BatchTooNew { remote: i32, local: i32 },

    /// A requested option needs a newer protocol than was negotiated.
    /// Upgrading the peer is the fix; the local configuration is fine.
    #[error("{option} requires protocol {min} or higher (negotiated {negotiated})")]
    FeatureRequiresNewerProtocol {
        option: &'static str,
        min: i32,
        negotiated: i32,
    },

    /// The transport failed mid-handshake.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ProtocolError {
    /// Process exit status matching this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProtocolError::Io(_) => EXIT_STREAM_ERROR,
            _ => EXIT_PROTOCOL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = ProtocolError::VersionOutOfRange { remote: 99 };
        assert_eq!(err.exit_code(), EXIT_PROTOCOL_ERROR);

        let err = ProtocolError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "eof"));
        assert_eq!(err.exit_code(), EXIT_STREAM_ERROR);
    }

    #[test]
    fn test_feature_message_names_option_and_version() {
        let err = ProtocolError::FeatureRequiresNewerProtocol {
            option: "--acls",
            min: 30,
            negotiated: 29,
        };
        assert_eq!(
            err.to_string(),
            "--acls requires protocol 30 or higher (negotiated 29)"
        );
    }
}
