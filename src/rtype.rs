/// R-Type custom track format (Electric Dreams / Factor 5 / Rainbow Arts)
///
/// The disk contains four track layouts:
///
/// | tracks  | layout               |
/// |---------|----------------------|
/// | 0-9     | AmigaDOS             |
/// | 10-62   | R-Type variant A     |
/// | 63-67   | R-Type variant B     |
/// | 68      | protection track     |
/// | 69-158  | R-Type variant B     |
/// | 159     | unformatted          |
///
/// Both variants start with a `0x9521` sync and an MFM-encoded zero byte and
/// hold a single block guarded by an AmigaDOS-style checksum. The checksum is
/// always recomputed from the data on encode.

use crate::checksum::amigados_checksum;
use crate::error::{Result, TrackError};
use crate::format::constants::EXTENDED_TRACK_BITS;
use crate::format::scan::scan;
use crate::format::{Rejection, SectorGeometry, SyncMark, TrackHandler, TrackType, Verdict};
use crate::image::TrackInfo;
use crate::mfm::{self, BitcellEncoding, DATA_MASK};
use crate::stream::Stream;
use crate::tbuf::TrackBuffer;

const SYNC: SyncMark = SyncMark::word(0x9521);

/// Fixed even half of the variant B checksum
pub const CHECKSUM_MARKER: u32 = 0xaaaa_aaaa;

/// Variant A: tracks 10-62
///
/// ```text
/// u16 0x9521            :: raw sync
/// u8  0                 :: MFM
/// u32 csum              :: MFM odd half, AmigaDOS-style checksum
/// u8  data_even[5968]   :: MFM even halves
/// u8  data_odd[5968]    :: MFM odd halves
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RTypeA;

/// Variant B: tracks 63-67 and 69-158
///
/// ```text
/// u16 0x9521            :: raw sync
/// u8  0                 :: MFM
/// u32 data[6552/4]      :: MFM even/odd, split per long
/// u32 csum              :: MFM even/odd, checksum | 0xaaaaaaaa
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RTypeB;

/// The variant A handler instance
pub static RTYPE_A: RTypeA = RTypeA;
/// The variant B handler instance
pub static RTYPE_B: RTypeB = RTypeB;

/// Both R-Type handlers
pub fn handlers() -> impl Iterator<Item = &'static dyn TrackHandler> {
    [
        &RTYPE_A as &'static dyn TrackHandler,
        &RTYPE_B as &'static dyn TrackHandler,
    ]
    .into_iter()
}

/// Checksum written after a variant B block
pub fn marked_checksum(data: &[u8]) -> u32 {
    (amigados_checksum(data) & DATA_MASK) | CHECKSUM_MARKER
}

/// Read the zero byte following the sync
fn check_marker<T>(s: &mut Stream<'_>, track_type: TrackType) -> std::result::Result<(), Verdict<T>> {
    let word = s
        .next_bits(16)
        .ok_or(Verdict::Fail(TrackError::no_match(track_type)))?;
    match mfm::decode_word(word as u16) {
        0 => Ok(()),
        marker => Err(Verdict::Reject(Rejection::Marker(marker))),
    }
}

/// Read `len` raw bytes or end the scan
fn read_raw<T>(s: &mut Stream<'_>, track_type: TrackType, len: usize) -> std::result::Result<Vec<u8>, Verdict<T>> {
    let mut raw = vec![0u8; len];
    s.next_bytes(&mut raw)
        .ok_or(Verdict::Fail(TrackError::no_match(track_type)))?;
    Ok(raw)
}

/// Record an accepted block in the track metadata
fn accept(ti: &mut TrackInfo, geometry: SectorGeometry, data_bitoff: u32) {
    ti.data_bitoff = data_bitoff;
    ti.len = geometry.len();
    ti.bytes_per_sector = geometry.bytes_per_sector;
    ti.nr_sectors = geometry.nr_sectors;
    ti.valid_sectors = geometry.all_sectors();
}

impl RTypeA {
    fn candidate(&self, s: &mut Stream<'_>) -> Verdict<(u32, Vec<u8>)> {
        let track_type = self.track_type();
        let len = self.geometry().len();
        let data_bitoff = s.word_offset(SYNC.bits);

        if let Err(verdict) = check_marker(s, track_type) {
            return verdict;
        }
        let stored = match s.next_bits(32) {
            Some(raw) => mfm::decode_bits(BitcellEncoding::MfmOdd, raw),
            None => return Verdict::Fail(TrackError::no_match(track_type)),
        };
        let raw = match read_raw(s, track_type, 2 * len) {
            Ok(raw) => raw,
            Err(verdict) => return verdict,
        };

        let mut dat = vec![0u8; len];
        mfm::decode_bytes(BitcellEncoding::MfmEvenOdd, &raw, &mut dat);
        let computed = amigados_checksum(&dat);
        if computed != stored {
            return Verdict::Reject(Rejection::Checksum { stored, computed });
        }
        Verdict::Accept((data_bitoff, dat))
    }
}

impl TrackHandler for RTypeA {
    fn track_type(&self) -> TrackType {
        TrackType::RTypeA
    }

    fn geometry(&self) -> SectorGeometry {
        SectorGeometry::new(5968, 1)
    }

    fn decode(&self, s: &mut Stream<'_>, ti: &mut TrackInfo) -> Result<Vec<u8>> {
        let (data_bitoff, dat) = scan(s, self.track_type(), SYNC, |s| self.candidate(s))?;
        accept(ti, self.geometry(), data_bitoff);
        Ok(dat)
    }

    fn encode(&self, ti: &TrackInfo, tbuf: &mut TrackBuffer) {
        tbuf.bits(BitcellEncoding::Raw, 16, SYNC.value);
        tbuf.bits(BitcellEncoding::Mfm, 8, 0);
        tbuf.bits(BitcellEncoding::MfmOdd, 32, amigados_checksum(&ti.dat));
        tbuf.bytes(BitcellEncoding::MfmEvenOdd, &ti.dat);
    }
}

impl RTypeB {
    fn candidate(&self, s: &mut Stream<'_>) -> Verdict<(u32, Vec<u8>)> {
        let track_type = self.track_type();
        let len = self.geometry().len();
        let data_bitoff = s.word_offset(SYNC.bits);

        if let Err(verdict) = check_marker(s, track_type) {
            return verdict;
        }
        let raw = match read_raw(s, track_type, 2 * len) {
            Ok(raw) => raw,
            Err(verdict) => return verdict,
        };
        let mut dat = vec![0u8; len];
        mfm::decode_bytes(BitcellEncoding::MfmEvenOddLongs, &raw, &mut dat);

        let raw_csum = match read_raw(s, track_type, 8) {
            Ok(raw) => raw,
            Err(verdict) => return verdict,
        };
        let mut csum = [0u8; 4];
        mfm::decode_bytes(BitcellEncoding::MfmEvenOdd, &raw_csum, &mut csum);
        let stored = u32::from_be_bytes(csum);

        let computed = amigados_checksum(&dat);
        if stored & !DATA_MASK != CHECKSUM_MARKER || stored & DATA_MASK != computed {
            return Verdict::Reject(Rejection::Checksum {
                stored,
                computed: computed | CHECKSUM_MARKER,
            });
        }
        Verdict::Accept((data_bitoff, dat))
    }
}

impl TrackHandler for RTypeB {
    fn track_type(&self) -> TrackType {
        TrackType::RTypeB
    }

    fn geometry(&self) -> SectorGeometry {
        SectorGeometry::new(6552, 1)
    }

    fn decode(&self, s: &mut Stream<'_>, ti: &mut TrackInfo) -> Result<Vec<u8>> {
        let (data_bitoff, dat) = scan(s, self.track_type(), SYNC, |s| self.candidate(s))?;
        accept(ti, self.geometry(), data_bitoff);
        ti.total_bits = EXTENDED_TRACK_BITS;
        Ok(dat)
    }

    fn encode(&self, ti: &TrackInfo, tbuf: &mut TrackBuffer) {
        tbuf.bits(BitcellEncoding::Raw, 16, SYNC.value);
        tbuf.bits(BitcellEncoding::Mfm, 8, 0);
        tbuf.bytes(BitcellEncoding::MfmEvenOddLongs, &ti.dat);
        tbuf.bits(BitcellEncoding::MfmEvenOdd, 32, marked_checksum(&ti.dat));
    }
}
