/// Sync scanning and candidate validation
///
/// Every decoder runs the same loop: advance one bitcell at a time until the
/// most recent cells match a sync mark, validate the candidate, and either
/// accept it, reject it and keep scanning from the current position, or give
/// up on the track. Running out of revolutions ends the scan.

use crate::error::{Result, TrackError};
use crate::format::TrackType;
use crate::mfm;
use crate::stream::Stream;
use log::{debug, trace};
use std::fmt;

/// A sync mark matched against the most recent bitcells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncMark {
    /// Expected bitcells, right-aligned
    pub value: u32,
    /// Number of bitcells compared
    pub bits: u32,
}

impl SyncMark {
    /// A 16-bitcell sync mark
    pub const fn word(value: u16) -> Self {
        Self {
            value: value as u32,
            bits: 16,
        }
    }

    /// A 32-bitcell sync mark
    pub const fn long(value: u32) -> Self {
        Self { value, bits: 32 }
    }

    /// Check the most recent bitcells of `word` against the mark
    #[inline]
    pub fn matches(&self, word: u32) -> bool {
        let mask = if self.bits >= 32 {
            u32::MAX
        } else {
            (1u32 << self.bits) - 1
        };
        word & mask == self.value
    }
}

impl fmt::Display for SyncMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = (self.bits as usize).div_ceil(4);
        write!(f, "0x{:0width$x}", self.value, width = width)
    }
}

/// Why a sync candidate was turned down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Fill pattern broke before the required repeat count
    Pattern {
        /// Slot where the mismatch occurred
        at: u32,
        /// Byte that was read
        found: u8,
    },
    /// Decoded signature after the sync did not match
    Signature,
    /// Marker byte after the sync was not zero
    Marker(u8),
    /// Embedded checksum disagrees with the data
    Checksum {
        /// Checksum stored on the track
        stored: u32,
        /// Checksum computed over the decoded data
        computed: u32,
    },
    /// CRC over the block is not the expected key
    Crc(u16),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::Pattern { at, found } => {
                write!(f, "pattern broken at slot {} by {:02x}", at, found)
            }
            Rejection::Signature => write!(f, "signature mismatch"),
            Rejection::Marker(byte) => write!(f, "marker byte {:02x}", byte),
            Rejection::Checksum { stored, computed } => {
                write!(f, "checksum {:08x} != {:08x}", stored, computed)
            }
            Rejection::Crc(crc) => write!(f, "crc {:04x}", crc),
        }
    }
}

/// Outcome of validating one sync candidate
#[derive(Debug)]
pub enum Verdict<T> {
    /// Candidate is good; the scan ends with this value
    Accept(T),
    /// Candidate is bad; keep scanning
    Reject(Rejection),
    /// The track cannot be recognised; the scan ends with this error
    Fail(TrackError),
}

impl<T> From<std::result::Result<T, Rejection>> for Verdict<T> {
    fn from(result: std::result::Result<T, Rejection>) -> Self {
        match result {
            Ok(value) => Verdict::Accept(value),
            Err(rejection) => Verdict::Reject(rejection),
        }
    }
}

/// Advance to the next position where `sync` matches
///
/// Returns `None` once the stream is exhausted. Calling again after a rejected
/// candidate resumes from wherever validation left the stream.
pub fn next_candidate(s: &mut Stream<'_>, sync: SyncMark) -> Option<()> {
    loop {
        s.next_bit()?;
        if sync.matches(s.word()) {
            return Some(());
        }
    }
}

/// Run the scan loop for `track_type`
///
/// `validate` is called with the stream positioned just after each sync
/// candidate.
pub fn scan<T, F>(s: &mut Stream<'_>, track_type: TrackType, sync: SyncMark, mut validate: F) -> Result<T>
where
    F: FnMut(&mut Stream<'_>) -> Verdict<T>,
{
    let mut candidates = 0u32;
    while next_candidate(s, sync).is_some() {
        candidates += 1;
        let offset = s.word_offset(sync.bits);
        match validate(s) {
            Verdict::Accept(value) => {
                debug!(
                    "{}: accepted sync {} at bit {} after {} candidate(s)",
                    track_type, sync, offset, candidates
                );
                return Ok(value);
            }
            Verdict::Reject(why) => {
                trace!("{}: rejected sync {} at bit {}: {}", track_type, sync, offset, why);
            }
            Verdict::Fail(err) => {
                debug!("{}: giving up at bit {}: {}", track_type, offset, err);
                return Err(err);
            }
        }
    }

    debug!(
        "{}: stream exhausted after {} candidate(s)",
        track_type, candidates
    );
    Err(TrackError::no_match(track_type))
}

/// Check that the next `count - 1` MFM words all decode to `byte`
///
/// The final slot of the run is never read, so a run that ends in a partial
/// or damaged byte is still accepted.
pub fn check_sequence(s: &mut Stream<'_>, count: u32, byte: u8) -> std::result::Result<(), Rejection> {
    for at in 1..count {
        let found = match s.next_bits(16) {
            Some(word) => mfm::decode_word(word as u16),
            None => return Err(Rejection::Pattern { at, found: 0 }),
        };
        if found != byte {
            return Err(Rejection::Pattern { at, found });
        }
    }
    Ok(())
}

/// Advance to the next index pulse and check the measured revolution length
///
/// Tracks longer than `min_bits` are always accepted.
pub fn check_length(s: &mut Stream<'_>, track_type: TrackType, min_bits: u32) -> Result<u32> {
    // Exhaustion still leaves the last revolution measured
    let _ = s.next_index();
    let measured = s.track_len();
    if measured >= min_bits {
        Ok(measured)
    } else {
        Err(TrackError::TrackTooShort {
            track_type,
            measured,
            minimum: min_bits,
        })
    }
}
