/// Track geometry constants

/// Bitcells in a standard double-density Amiga track
pub const DEFAULT_BITS_PER_TRACK: u32 = 100_150;

/// Revolutions a decode may replay before giving up
pub const DEFAULT_REVOLUTIONS: u32 = 3;

/// Nominal bitcell rate, in kbit/s, of a double-density drive
pub const NOMINAL_KBPS: u32 = 500;

/// Total bitcells emitted for long tracks that are only measured, never scanned
pub const LONG_TRACK_BITS: u32 = 110_000;

/// Total bitcells emitted for tracks written slightly longer than standard
pub const EXTENDED_TRACK_BITS: u32 = 105_500;

/// Nominal time for one revolution in microseconds at `bits` bitcells
#[inline]
pub fn revolution_micros(bits: u32) -> u64 {
    (bits as u64 * 1000) / NOMINAL_KBPS as u64
}
