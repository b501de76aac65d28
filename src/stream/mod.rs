/// Positioned bit/word access to a captured track
///
/// A [`Stream`] is a cursor over an immutable [`FluxSource`]. The source holds
/// a single revolution which the stream replays a bounded number of times, so
/// a decode may start anywhere on the track and still see every sync mark
/// once. Crossing the index pulse records the length of the revolution that
/// just ended.

/// In-memory revolution of bitcells
pub mod bitcells;

pub use bitcells::Bitcells;

use crate::checksum::crc16_ccitt;
use crate::format::constants::DEFAULT_REVOLUTIONS;
use crate::mfm;

/// A captured revolution of bitcells, already reduced from flux timings
pub trait FluxSource {
    /// Number of bitcells between successive index pulses
    fn bitcell_count(&self) -> u32;

    /// Value of the bitcell at `pos`, counted from the index pulse
    fn bit(&self, pos: u32) -> bool;
}

/// Read cursor over a [`FluxSource`]
pub struct Stream<'a> {
    source: &'a dyn FluxSource,
    max_revolutions: u32,
    /// Next bitcell to read
    pos: u32,
    /// Index pulses crossed so far
    revolution: u32,
    /// Most recent 32 bitcells, newest in bit 0
    word: u32,
    /// Bitcells read since the last index pulse
    index_offset: u32,
    /// Length of the most recently completed revolution
    track_len: u32,
    crc16: u16,
    crc_bitoff: u32,
}

impl<'a> Stream<'a> {
    /// Create a stream replaying the source for the default number of revolutions
    pub fn new(source: &'a dyn FluxSource) -> Self {
        Self::with_revolutions(source, DEFAULT_REVOLUTIONS)
    }

    /// Create a stream replaying the source for `revolutions` revolutions
    pub fn with_revolutions(source: &'a dyn FluxSource, revolutions: u32) -> Self {
        Self {
            source,
            max_revolutions: revolutions,
            pos: 0,
            revolution: 0,
            word: 0,
            index_offset: 0,
            track_len: 0,
            crc16: 0xFFFF,
            crc_bitoff: 0,
        }
    }

    /// Rewind to the start of the first revolution
    pub fn reset(&mut self) {
        *self = Self::with_revolutions(self.source, self.max_revolutions);
    }

    /// Advance by one bitcell
    ///
    /// Returns `None` once every revolution has been read.
    pub fn next_bit(&mut self) -> Option<bool> {
        let len = self.source.bitcell_count();
        if len == 0 {
            return None;
        }

        if self.pos == 0 {
            if self.revolution > 0 {
                self.track_len = self.index_offset;
            }
            if self.revolution >= self.max_revolutions {
                return None;
            }
            self.revolution += 1;
            self.index_offset = 0;
        }

        let bit = self.source.bit(self.pos);
        self.pos = (self.pos + 1) % len;
        self.index_offset += 1;
        self.word = (self.word << 1) | bit as u32;

        self.crc_bitoff += 1;
        if self.crc_bitoff == 16 {
            let byte = mfm::decode_word(self.word as u16);
            self.crc16 = crc16_ccitt(&[byte], self.crc16);
            self.crc_bitoff = 0;
        }

        Some(bit)
    }

    /// Advance by `bits` bitcells and return the updated word
    pub fn next_bits(&mut self, bits: u32) -> Option<u32> {
        for _ in 0..bits {
            self.next_bit()?;
        }
        Some(self.word)
    }

    /// Fill `buf` with raw bytes, eight bitcells each, without decoding
    pub fn next_bytes(&mut self, buf: &mut [u8]) -> Option<()> {
        for byte in buf.iter_mut() {
            *byte = self.next_bits(8)? as u8;
        }
        Some(())
    }

    /// Advance to just past the next index pulse
    ///
    /// On return [`Stream::track_len`] holds the length of the revolution that
    /// ended at that pulse. Returns `None` if the stream ran out first; the
    /// final revolution length is still recorded in that case.
    pub fn next_index(&mut self) -> Option<()> {
        loop {
            self.next_bit()?;
            if self.index_offset == 1 && self.revolution > 1 {
                return Some(());
            }
        }
    }

    /// Most recent 32 bitcells, newest in bit 0
    pub fn word(&self) -> u32 {
        self.word
    }

    /// Restart CRC16 accumulation over subsequently read bitcells
    ///
    /// One MFM-decoded byte is folded into the CRC for every 16 bitcells.
    pub fn start_crc(&mut self) {
        self.crc16 = 0xFFFF;
        self.crc_bitoff = 0;
    }

    /// CRC16-CCITT accumulated since [`Stream::start_crc`]
    pub fn crc16(&self) -> u16 {
        self.crc16
    }

    /// Bitcells read since the last index pulse
    pub fn index_offset(&self) -> u32 {
        self.index_offset
    }

    /// Offset from the index pulse of the first cell of the most recent
    /// `bits`-cell word
    pub fn word_offset(&self, bits: u32) -> u32 {
        let len = self.source.bitcell_count().max(1);
        (self.index_offset + len - bits % len) % len
    }

    /// Length of the most recently completed revolution, or 0 if none has completed
    pub fn track_len(&self) -> u32 {
        self.track_len
    }

    /// Check whether every revolution has been read
    pub fn is_exhausted(&self) -> bool {
        self.pos == 0 && self.revolution >= self.max_revolutions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(pattern: &[u8], len: u32) -> Bitcells {
        Bitcells::from_bytes(pattern.to_vec(), len).unwrap()
    }

    #[test]
    fn test_next_bits() {
        let source = cells(&[0x44, 0x89, 0x55, 0x55], 32);
        let mut s = Stream::new(&source);
        assert_eq!(s.next_bits(16).map(|w| w as u16), Some(0x4489));
        assert_eq!(s.index_offset(), 16);
        assert_eq!(s.word_offset(16), 0);
        assert_eq!(s.next_bits(16), Some(0x4489_5555));
    }

    #[test]
    fn test_exhaustion_after_revolutions() {
        let source = cells(&[0xFF], 8);
        let mut s = Stream::with_revolutions(&source, 2);
        for _ in 0..16 {
            assert_eq!(s.next_bit(), Some(true));
        }
        assert_eq!(s.next_bit(), None);
        assert!(s.is_exhausted());
        assert_eq!(s.track_len(), 8);
    }

    #[test]
    fn test_next_index_measures_revolution() {
        let source = cells(&[0u8; 4], 30);
        let mut s = Stream::new(&source);
        s.next_bits(5);
        assert_eq!(s.track_len(), 0);
        assert_eq!(s.next_index(), Some(()));
        assert_eq!(s.track_len(), 30);
        assert_eq!(s.index_offset(), 1);
    }

    #[test]
    fn test_word_offset_wraps() {
        let source = cells(&[0u8; 2], 16);
        let mut s = Stream::new(&source);
        s.next_bits(20);
        assert_eq!(s.index_offset(), 4);
        assert_eq!(s.word_offset(8), 12);
    }

    #[test]
    fn test_crc_over_decoded_bytes() {
        // 0x31 0x32 0x33 MFM encoded
        let source = cells(&[0xA5, 0x29, 0x25, 0x24, 0xA5, 0x25], 48);
        let mut s = Stream::new(&source);
        s.start_crc();
        s.next_bits(48);
        assert_eq!(s.crc16(), crc16_ccitt(b"123", 0xFFFF));
    }

    #[test]
    fn test_reset() {
        let source = cells(&[0x80], 8);
        let mut s = Stream::new(&source);
        s.next_bits(12);
        s.reset();
        assert_eq!(s.next_bit(), Some(true));
        assert_eq!(s.index_offset(), 1);
    }

    #[test]
    fn test_empty_source() {
        let source = Bitcells::new();
        let mut s = Stream::new(&source);
        assert_eq!(s.next_bit(), None);
        assert_eq!(s.next_index(), None);
    }
}
