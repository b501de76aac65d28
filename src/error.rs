use crate::format::TrackType;
use thiserror::Error;

/// Result type alias for track operations
pub type Result<T> = std::result::Result<T, TrackError>;

/// Errors that can occur when decoding or regenerating tracks
#[derive(Debug, Error)]
pub enum TrackError {
    /// I/O error occurred while reading or writing
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unrecognized bitcell dump
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// Invalid track number specified
    #[error("Invalid track {track} (max: {max})")]
    InvalidTrack {
        /// Track number
        track: usize,
        /// Maximum allowed track number
        max: usize,
    },

    /// Track type identifier not known to the registry
    #[error("Unknown track type: {0}")]
    UnknownTrackType(String),

    /// Every revolution of the capture was scanned without an accepted candidate
    #[error("No {track_type} track found: stream exhausted")]
    NoMatch {
        /// Track type that was searched for
        track_type: TrackType,
    },

    /// A candidate was found but the revolution is too short for the protection
    #[error("{track_type} track too short: {measured} bits (min: {minimum})")]
    TrackTooShort {
        /// Track type that was searched for
        track_type: TrackType,
        /// Measured revolution length in bitcells
        measured: u32,
        /// Minimum length the protection requires
        minimum: u32,
    },

    /// Track has no decoded data to regenerate
    #[error("Track {track} is unformatted")]
    Unformatted {
        /// Track number
        track: usize,
    },
}

impl TrackError {
    /// Create an invalid format error
    pub fn invalid_format<S: Into<String>>(message: S) -> Self {
        TrackError::InvalidFormat(message.into())
    }

    /// Create a no-match error for a track type
    pub fn no_match(track_type: TrackType) -> Self {
        TrackError::NoMatch { track_type }
    }

    /// Check whether another handler may still recognise the track
    pub fn is_unrecognised(&self) -> bool {
        matches!(
            self,
            TrackError::NoMatch { .. } | TrackError::TrackTooShort { .. }
        )
    }
}
