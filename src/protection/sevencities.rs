/// Seven Cities Of Gold key track by Electronic Arts
///
/// Not really a long track: `0x9251` sync, 122 raw bytes, MFM zeroes, then a
/// `0x924a` sync. The game combines the raw bytes with the gap between the two
/// syncs to compute a key, so the bytes are kept exactly as read.

use crate::error::{Result, TrackError};
use crate::format::scan::{next_candidate, scan};
use crate::format::{Rejection, SyncMark, TrackHandler, TrackType, Verdict};
use crate::image::TrackInfo;
use crate::mfm::BitcellEncoding;
use crate::stream::Stream;
use crate::tbuf::TrackBuffer;

/// Raw bytes following the data sync
pub const SEVENCITIES_DATSZ: usize = 122;

/// CRC16 of the key block on every original disk
pub const SEVENCITIES_CRC: u16 = 0x010a;

const LEAD_SYNC: SyncMark = SyncMark::word(0x924a);
const DATA_SYNC: SyncMark = SyncMark::word(0x9251);

/// Seven Cities Of Gold handler
#[derive(Debug, Clone, Copy)]
pub struct SevenCities;

/// The Seven Cities Of Gold handler instance
pub static SEVEN_CITIES: SevenCities = SevenCities;

impl TrackHandler for SevenCities {
    fn track_type(&self) -> TrackType {
        TrackType::SevencitiesLongtrack
    }

    fn decode(&self, s: &mut Stream<'_>, ti: &mut TrackInfo) -> Result<Vec<u8>> {
        let track_type = self.track_type();

        // The key block is only looked for after the trailing sync
        next_candidate(s, LEAD_SYNC).ok_or(TrackError::no_match(track_type))?;

        let dat = scan(s, track_type, DATA_SYNC, |s| {
            s.start_crc();
            let mut dat = vec![0u8; SEVENCITIES_DATSZ];
            if s.next_bytes(&mut dat).is_none() || s.crc16() != SEVENCITIES_CRC {
                return Verdict::Reject(Rejection::Crc(s.crc16()));
            }
            Verdict::Accept(dat)
        })?;

        ti.len = SEVENCITIES_DATSZ;
        ti.data_bitoff = 76_000;
        ti.total_bits = 101_500;
        Ok(dat)
    }

    fn encode(&self, ti: &TrackInfo, tbuf: &mut TrackBuffer) {
        tbuf.bits(BitcellEncoding::Raw, 16, DATA_SYNC.value);
        tbuf.bytes(BitcellEncoding::Raw, &ti.dat);
        for _ in 0..6052usize.saturating_sub(ti.dat.len() / 2) {
            tbuf.bits(BitcellEncoding::Mfm, 8, 0);
        }
        // Encodes to the 0x924a sync
        tbuf.bits(BitcellEncoding::Mfm, 16, 0x0480);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum::crc16_ccitt;
    use crate::stream::Bitcells;

    /// Raw bytes of a key block whose CRC matches
    fn key_block() -> Vec<u8> {
        let mut decoded: Vec<u8> = (0..61u8).map(|i| i.wrapping_mul(37) ^ 0x5A).collect();
        let prefix = crc16_ccitt(&decoded[..59], 0xFFFF);
        let tail = (0..=0xFFFFu16)
            .find(|&tail| crc16_ccitt(&tail.to_be_bytes(), prefix) == SEVENCITIES_CRC)
            .unwrap();
        decoded[59..].copy_from_slice(&tail.to_be_bytes());

        let mut tbuf = TrackBuffer::new(16 * 61, 0);
        tbuf.bytes(BitcellEncoding::Mfm, &decoded);
        tbuf.finish().as_bytes().to_vec()
    }

    fn track(dat: Vec<u8>) -> Bitcells {
        let mut ti = TrackInfo::new(TrackType::SevencitiesLongtrack, SEVEN_CITIES.geometry());
        ti.total_bits = 101_500;
        ti.data_bitoff = 76_000;
        ti.len = dat.len();
        ti.dat = dat;
        let mut tbuf = TrackBuffer::new(ti.total_bits, ti.data_bitoff);
        SEVEN_CITIES.encode(&ti, &mut tbuf);
        tbuf.finish()
    }

    fn decode(cells: &Bitcells) -> Result<TrackInfo> {
        let mut ti = TrackInfo::new(TrackType::SevencitiesLongtrack, SEVEN_CITIES.geometry());
        let mut s = Stream::new(cells);
        ti.dat = SEVEN_CITIES.decode(&mut s, &mut ti)?;
        Ok(ti)
    }

    #[test]
    fn test_key_block_size() {
        let block = key_block();
        assert_eq!(block.len(), SEVENCITIES_DATSZ);
    }

    #[test]
    fn test_accepts_block_verbatim() {
        let block = key_block();
        let ti = decode(&track(block.clone())).unwrap();
        assert_eq!(ti.dat, block);
        assert_eq!(ti.len, SEVENCITIES_DATSZ);
        assert_eq!(ti.total_bits, 101_500);
        assert_eq!(ti.data_bitoff, 76_000);
    }

    #[test]
    fn test_round_trip() {
        let first = decode(&track(key_block())).unwrap();
        let second = decode(&track(first.dat.clone())).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_rejects_bad_crc() {
        let mut block = key_block();
        // Flip a data bit of the tenth decoded byte
        block[19] ^= 0x01;
        let err = decode(&track(block)).unwrap_err();
        assert!(matches!(err, TrackError::NoMatch { .. }));
    }

    #[test]
    fn test_blank_track() {
        let err = decode(&TrackBuffer::new(101_500, 0).finish()).unwrap_err();
        assert!(matches!(err, TrackError::NoMatch { .. }));
    }
}
