/// Track buffer: regenerates a revolution of bitcells from logical emissions

use crate::format::constants::NOMINAL_KBPS;
use crate::mfm::BitcellEncoding;
use crate::stream::Bitcells;
use log::{debug, warn};

/// Collects emitted bitcells for one track
///
/// Emission starts at `data_bitoff` and wraps around the index pulse. Whatever
/// is left of the revolution once the handler is done is filled with
/// MFM-encoded zeroes.
#[derive(Debug, Clone)]
pub struct TrackBuffer {
    total_bits: u32,
    data_bitoff: u32,
    kbps: u32,
    cells: Vec<bool>,
    prev_data_bit: bool,
}

impl TrackBuffer {
    /// Create a buffer for a revolution of `total_bits` cells at the nominal rate
    pub fn new(total_bits: u32, data_bitoff: u32) -> Self {
        Self {
            total_bits,
            data_bitoff,
            kbps: NOMINAL_KBPS,
            cells: Vec::with_capacity(total_bits as usize),
            prev_data_bit: false,
        }
    }

    /// Declared bitcell rate in kbit/s
    pub fn kbps(&self) -> u32 {
        self.kbps
    }

    /// Total bitcells in the regenerated revolution
    pub fn total_bits(&self) -> u32 {
        self.total_bits
    }

    /// Bitcells emitted so far
    pub fn emitted(&self) -> u32 {
        self.cells.len() as u32
    }

    /// Emit the low `bits` bits of `value`, most significant first
    pub fn bits(&mut self, enc: BitcellEncoding, bits: u32, value: u32) {
        match enc {
            BitcellEncoding::Raw => {
                for i in (0..bits).rev() {
                    let bit = (value >> i) & 1 != 0;
                    self.cells.push(bit);
                    self.prev_data_bit = bit;
                }
            }
            BitcellEncoding::Mfm => {
                for i in (0..bits).rev() {
                    self.mfm_bit((value >> i) & 1 != 0);
                }
            }
            BitcellEncoding::MfmEven => self.bits(BitcellEncoding::MfmOdd, bits, value >> 1),
            BitcellEncoding::MfmOdd => {
                for i in (0..bits).rev().filter(|i| i % 2 == 0) {
                    self.mfm_bit((value >> i) & 1 != 0);
                }
            }
            BitcellEncoding::MfmEvenOdd | BitcellEncoding::MfmEvenOddLongs => {
                self.bits(BitcellEncoding::MfmEven, bits, value);
                self.bits(BitcellEncoding::MfmOdd, bits, value);
            }
        }
    }

    /// Emit a block of bytes
    pub fn bytes(&mut self, enc: BitcellEncoding, data: &[u8]) {
        match enc {
            BitcellEncoding::MfmEvenOdd => {
                for &byte in data {
                    self.bits(BitcellEncoding::MfmEven, 8, byte as u32);
                }
                for &byte in data {
                    self.bits(BitcellEncoding::MfmOdd, 8, byte as u32);
                }
            }
            BitcellEncoding::MfmEvenOddLongs => {
                for long in data.chunks(4) {
                    self.bytes(BitcellEncoding::MfmEvenOdd, long);
                }
            }
            _ => {
                for &byte in data {
                    self.bits(enc, 8, byte as u32);
                }
            }
        }
    }

    fn mfm_bit(&mut self, bit: bool) {
        self.cells.push(!(self.prev_data_bit || bit));
        self.cells.push(bit);
        self.prev_data_bit = bit;
    }

    /// Pad the revolution and place the emitted data at `data_bitoff`
    pub fn finish(mut self) -> Bitcells {
        let total = self.total_bits as usize;
        if total == 0 {
            return Bitcells::new();
        }

        if self.cells.len() > total {
            warn!(
                "Track data overruns revolution: {} of {} bitcells, truncating",
                self.cells.len(),
                total
            );
            self.cells.truncate(total);
        }
        debug!(
            "Emitted {} bitcells at offset {}, gap {}",
            self.cells.len(),
            self.data_bitoff,
            total - self.cells.len()
        );

        while self.cells.len() < total {
            self.mfm_bit(false);
        }
        self.cells.truncate(total);

        let start = total - (self.data_bitoff as usize % total);
        Bitcells::from_bits((0..total).map(|i| self.cells[(i + start) % total]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mfm;
    use crate::stream::{FluxSource, Stream};

    fn collect(cells: &Bitcells) -> Vec<bool> {
        (0..cells.len()).map(|i| cells.bit(i)).collect()
    }

    #[test]
    fn test_raw_bits() {
        let mut tbuf = TrackBuffer::new(16, 0);
        tbuf.bits(BitcellEncoding::Raw, 16, 0x4489);
        let cells = tbuf.finish();
        assert_eq!(cells.as_bytes(), &[0x44, 0x89]);
    }

    #[test]
    fn test_mfm_clocking() {
        let mut tbuf = TrackBuffer::new(16, 0);
        tbuf.bits(BitcellEncoding::Mfm, 8, 0x00);
        assert_eq!(tbuf.finish().as_bytes(), &[0xAA, 0xAA]);

        let mut tbuf = TrackBuffer::new(32, 0);
        tbuf.bytes(BitcellEncoding::Mfm, b"12");
        assert_eq!(tbuf.finish().as_bytes(), &[0xA5, 0x29, 0x25, 0x24]);
    }

    #[test]
    fn test_odd_half() {
        let mut tbuf = TrackBuffer::new(32, 0);
        tbuf.bits(BitcellEncoding::MfmOdd, 32, 0x5555_5555);
        let cells = tbuf.finish();
        let raw = u32::from_be_bytes(cells.as_bytes().try_into().unwrap());
        assert_eq!(mfm::decode_bits(BitcellEncoding::MfmOdd, raw), 0x5555_5555);
    }

    #[test]
    fn test_even_odd_block() {
        let data = [0x12, 0x34, 0x56, 0x78, 0x9A];
        let mut tbuf = TrackBuffer::new(80, 0);
        tbuf.bytes(BitcellEncoding::MfmEvenOdd, &data);
        assert_eq!(tbuf.emitted(), 80);
        let cells = tbuf.finish();
        let mut out = [0u8; 5];
        mfm::decode_bytes(BitcellEncoding::MfmEvenOdd, cells.as_bytes(), &mut out);
        assert_eq!(out, data);
    }

    #[test]
    fn test_even_odd_longs() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x01, 0x02, 0x03, 0x04];
        let mut tbuf = TrackBuffer::new(128, 0);
        tbuf.bytes(BitcellEncoding::MfmEvenOddLongs, &data);
        let cells = tbuf.finish();
        let mut out = [0u8; 8];
        mfm::decode_bytes(BitcellEncoding::MfmEvenOddLongs, cells.as_bytes(), &mut out);
        assert_eq!(out, data);
    }

    #[test]
    fn test_gap_fill_and_offset() {
        let mut tbuf = TrackBuffer::new(64, 40);
        tbuf.bits(BitcellEncoding::Raw, 16, 0x4489);
        let cells = tbuf.finish();
        assert_eq!(cells.len(), 64);

        let mut s = Stream::new(&cells);
        s.next_bits(56);
        assert_eq!(s.word() as u16, 0x4489);
        assert_eq!(s.word_offset(16), 40);
        // Gap after the sync decodes as zeroes
        s.next_bits(8);
        assert_eq!(mfm::decode_word(s.word() as u16) & 0x0F, 0);
    }

    #[test]
    fn test_overrun_truncates() {
        let mut tbuf = TrackBuffer::new(8, 0);
        tbuf.bits(BitcellEncoding::Raw, 16, 0xFF00);
        let cells = tbuf.finish();
        assert_eq!(collect(&cells), vec![true; 8]);
    }
}
