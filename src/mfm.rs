/// MFM bitcell encodings
///
/// Every MFM data bit occupies two bitcells: a clock cell followed by the data
/// cell. A clock cell is set only when both neighbouring data bits are zero.
///
/// Amiga formats frequently split a value into two halves before encoding it.
/// The *odd* half carries the bits under mask `0x5555...` and the *even* half
/// carries the bits under mask `0xAAAA...`; the even half is always written
/// first.

/// Data bits of an MFM bitcell word
pub const DATA_MASK: u32 = 0x5555_5555;

/// How a value is laid out in bitcells
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitcellEncoding {
    /// Bits are copied to the track verbatim (sync marks)
    Raw,
    /// Every data bit is MFM encoded, most significant first
    Mfm,
    /// Only the bits under mask `0xAAAA...` are MFM encoded
    MfmEven,
    /// Only the bits under mask `0x5555...` are MFM encoded
    MfmOdd,
    /// Whole block split: all even halves, then all odd halves
    MfmEvenOdd,
    /// Block split independently for every 4-byte long
    MfmEvenOddLongs,
}

impl BitcellEncoding {
    /// Number of bitcells produced for `bits` data bits
    pub fn bitcells(&self, bits: u32) -> u32 {
        match self {
            BitcellEncoding::Raw => bits,
            BitcellEncoding::MfmEven | BitcellEncoding::MfmOdd => bits,
            _ => bits * 2,
        }
    }
}

/// Extract the eight data bits from a 16-bitcell MFM word
#[inline]
pub fn decode_word(raw: u16) -> u8 {
    let mut out = 0u8;
    for i in 0..8 {
        out |= (((raw >> (2 * i)) & 1) as u8) << i;
    }
    out
}

/// Decode a 32-bitcell word
///
/// `Mfm` returns the sixteen data bits. `MfmOdd` and `MfmEven` return the
/// data bits in the positions of the half they were taken from.
pub fn decode_bits(enc: BitcellEncoding, raw: u32) -> u32 {
    match enc {
        BitcellEncoding::Mfm => {
            let mut out = 0u32;
            for i in 0..16 {
                out |= ((raw >> (2 * i)) & 1) << i;
            }
            out
        }
        BitcellEncoding::MfmOdd => raw & DATA_MASK,
        BitcellEncoding::MfmEven => (raw & DATA_MASK) << 1,
        BitcellEncoding::Raw | BitcellEncoding::MfmEvenOdd | BitcellEncoding::MfmEvenOddLongs => {
            raw
        }
    }
}

/// Decode a block of raw bytes into `out`
///
/// `raw` must hold two raw bytes for every decoded byte. Encodings without a
/// block layout copy the input unchanged.
pub fn decode_bytes(enc: BitcellEncoding, raw: &[u8], out: &mut [u8]) {
    let n = out.len();
    debug_assert!(raw.len() >= 2 * n);

    match enc {
        BitcellEncoding::Mfm => {
            for (i, byte) in out.iter_mut().enumerate() {
                *byte = decode_word(u16::from_be_bytes([raw[2 * i], raw[2 * i + 1]]));
            }
        }
        BitcellEncoding::MfmEvenOdd => {
            split_even_odd(&raw[..n], &raw[n..2 * n], out);
        }
        BitcellEncoding::MfmEvenOddLongs => {
            for (group, chunk) in out.chunks_mut(4).enumerate() {
                let len = chunk.len();
                let base = 2 * 4 * group;
                split_even_odd(
                    &raw[base..base + len],
                    &raw[base + len..base + 2 * len],
                    chunk,
                );
            }
        }
        _ => {
            let len = n.min(raw.len());
            out[..len].copy_from_slice(&raw[..len]);
        }
    }
}

/// Recombine even and odd halves
fn split_even_odd(even: &[u8], odd: &[u8], out: &mut [u8]) {
    for (i, byte) in out.iter_mut().enumerate() {
        *byte = ((even[i] & 0x55) << 1) | (odd[i] & 0x55);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_word() {
        // 0x00 following a zero data bit
        assert_eq!(decode_word(0xAAAA), 0x00);
        assert_eq!(decode_word(0x5555), 0xFF);
        // "R" with clock bits
        assert_eq!(decode_word(0x4489), 0xA1);
    }

    #[test]
    fn test_decode_bits() {
        assert_eq!(decode_bits(BitcellEncoding::Mfm, 0x4489_4489), 0xA1A1);
        assert_eq!(decode_bits(BitcellEncoding::MfmOdd, 0xFFFF_FFFF), 0x5555_5555);
        assert_eq!(decode_bits(BitcellEncoding::MfmEven, 0xFFFF_FFFF), 0xAAAA_AAAA);
    }

    #[test]
    fn test_decode_bytes_even_odd() {
        // 0xF0: even half 1,1,0,0 and odd half 1,1,0,0
        let raw = [0x50, 0x50];
        let mut out = [0u8; 1];
        decode_bytes(BitcellEncoding::MfmEvenOdd, &raw, &mut out);
        assert_eq!(out, [0xF0]);
    }

    #[test]
    fn test_decode_bytes_longs() {
        let mut raw = [0u8; 16];
        // Second long: even half all ones, odd half all zeroes
        raw[8..12].copy_from_slice(&[0x55; 4]);
        let mut out = [0u8; 8];
        decode_bytes(BitcellEncoding::MfmEvenOddLongs, &raw, &mut out);
        assert_eq!(out, [0, 0, 0, 0, 0xAA, 0xAA, 0xAA, 0xAA]);
    }

    #[test]
    fn test_bitcell_counts() {
        assert_eq!(BitcellEncoding::Raw.bitcells(16), 16);
        assert_eq!(BitcellEncoding::Mfm.bitcells(8), 16);
        assert_eq!(BitcellEncoding::MfmOdd.bitcells(32), 32);
        assert_eq!(BitcellEncoding::MfmEvenOdd.bitcells(32), 64);
    }
}
