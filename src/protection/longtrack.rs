/// Long-track protections
///
/// A long track is written with a drive running slightly slow, so it holds
/// more bitcells than a standard duplicator can reproduce. The protections
/// below differ only in their sync mark, the pattern written after it and how
/// long the track must be, so they share one detector driven by a table.

use crate::error::Result;
use crate::format::constants::{EXTENDED_TRACK_BITS, LONG_TRACK_BITS};
use crate::format::scan::{check_length, check_sequence, scan};
use crate::format::{Rejection, SyncMark, TrackHandler, TrackType, Verdict};
use crate::image::TrackInfo;
use crate::mfm::{self, BitcellEncoding};
use crate::stream::Stream;
use crate::tbuf::TrackBuffer;
use log::debug;

/// Byte repeated after the sync mark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    /// A fixed byte
    Byte(u8),
    /// Whatever byte follows the sync; it is kept as the track data
    Captured,
}

/// How many fill bytes are written back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillCount {
    /// A fixed number of bytes
    Bytes(u32),
    /// One byte per 16 bitcells of the track, less the given margin
    TrackRelative(u32),
}

/// One long-track protection
#[derive(Debug, Clone, Copy)]
pub struct LongTrack {
    /// Track type recognised
    pub track_type: TrackType,
    /// Sync mark scanned for; `None` checks the track length only
    pub sync: Option<SyncMark>,
    /// Trailing bitcells of the sync mark written back on encode
    pub sync_bits: u32,
    /// MFM-encoded bytes that must follow the sync
    pub signature: &'static [u8],
    /// Byte repeated after the sync
    pub fill: Fill,
    /// Fill bytes that must be present, counting the final unchecked one
    pub min_repeats: u32,
    /// Minimum revolution length; `None` leaves the length unmeasured
    pub min_bits: Option<u32>,
    /// Revolution length written on accept; `None` keeps the image default
    pub total_bits: Option<u32>,
    /// Fill bytes written back on encode
    pub fill_count: FillCount,
}

/// Every long-track protection
pub static LONG_TRACKS: [LongTrack; 8] = [
    // u16 0x4454, then one byte (0x33 on most releases, 0x44 on Robocod)
    // repeated to the track gap. The protection wants >= 6700 raw words
    // between successive syncs.
    LongTrack {
        track_type: TrackType::ProtecLongtrack,
        sync: Some(SyncMark::word(0x4454)),
        sync_bits: 16,
        signature: &[],
        fill: Fill::Captured,
        min_repeats: 1000,
        min_bits: Some(107_200),
        total_bits: Some(LONG_TRACK_BITS),
        fill_count: FillCount::Bytes(6000),
    },
    // u16 0x4124,0x4124 then zeroes or unformatted garbage. Only successive
    // syncs are checked (>= 6400 raw words apart); tracks are ~105500 bits.
    LongTrack {
        track_type: TrackType::GremlinLongtrack,
        sync: Some(SyncMark::long(0x4124_4124)),
        sync_bits: 32,
        signature: &[],
        fill: Fill::Byte(0x00),
        min_repeats: 8,
        min_bits: None,
        total_bits: Some(EXTENDED_TRACK_BITS),
        fill_count: FillCount::TrackRelative(250),
    },
    // Strider II. Checks 6208..=6480 raw words between syncs, which is a
    // normal-length track, so the revolution keeps its captured length.
    LongTrack {
        track_type: TrackType::TiertexLongtrack,
        sync: Some(SyncMark::long(0x4124_4124)),
        sync_bits: 32,
        signature: &[],
        fill: Fill::Byte(0x00),
        min_repeats: 8,
        min_bits: None,
        total_bits: None,
        fill_count: FillCount::TrackRelative(250),
    },
    // u16 0xa144, "ROD0", then zeroes. The protection counts > 6500 zero
    // words from 12 bytes after the sync.
    LongTrack {
        track_type: TrackType::CrystalsOfArboreaLongtrack,
        sync: Some(SyncMark::long(0xaaaa_a144)),
        sync_bits: 16,
        signature: b"ROD0",
        fill: Fill::Byte(0x00),
        min_repeats: 6500,
        min_bits: Some(104_128),
        total_bits: Some(LONG_TRACK_BITS),
        fill_count: FillCount::Bytes(6550),
    },
    // u16 0xa144 then zeroes. The protection counts > 13020 0xaa raw bytes
    // from the first one after the sync.
    LongTrack {
        track_type: TrackType::InfogramesLongtrack,
        sync: Some(SyncMark::word(0xa144)),
        sync_bits: 16,
        signature: &[],
        fill: Fill::Byte(0x00),
        min_repeats: 6510,
        min_bits: Some(104_160),
        total_bits: Some(EXTENDED_TRACK_BITS),
        fill_count: FillCount::Bytes(6550),
    },
    // u16 0x8945 then zeroes. The protection counts >= 3412 0xaaaaaaaa raw
    // longs from 4 bytes after the sync.
    LongTrack {
        track_type: TrackType::BatLongtrack,
        sync: Some(SyncMark::long(0xaaaa_8945)),
        sync_bits: 16,
        signature: &[],
        fill: Fill::Byte(0x00),
        min_repeats: 6826,
        min_bits: Some(109_500),
        total_bits: Some(LONG_TRACK_BITS),
        fill_count: FillCount::Bytes(6840),
    },
    // u16 0x924a then 0xdc 6600 times (105600 bitcells); track is ~111000.
    LongTrack {
        track_type: TrackType::AppLongtrack,
        sync: Some(SyncMark::word(0x924a)),
        sync_bits: 16,
        signature: &[],
        fill: Fill::Byte(0xdc),
        min_repeats: 6600,
        min_bits: Some(110_000),
        total_bits: Some(111_000),
        fill_count: FillCount::Bytes(6600),
    },
    // Nothing but MFM-encoded zeroes; only the length is checked.
    LongTrack {
        track_type: TrackType::EmptyLongtrack,
        sync: None,
        sync_bits: 0,
        signature: &[],
        fill: Fill::Byte(0x00),
        min_repeats: 0,
        min_bits: Some(105_000),
        total_bits: Some(LONG_TRACK_BITS),
        fill_count: FillCount::Bytes(4),
    },
];

/// Look up the table entry for a track type
pub fn long_track(track_type: TrackType) -> Option<&'static LongTrack> {
    LONG_TRACKS.iter().find(|t| t.track_type == track_type)
}

impl LongTrack {
    /// Validate the signature and fill after a sync candidate
    fn check_candidate(&self, s: &mut Stream<'_>) -> std::result::Result<u8, Rejection> {
        if !self.signature.is_empty() {
            let mut raw = vec![0u8; 2 * self.signature.len()];
            let mut sig = vec![0u8; self.signature.len()];
            s.next_bytes(&mut raw).ok_or(Rejection::Signature)?;
            mfm::decode_bytes(BitcellEncoding::Mfm, &raw, &mut sig);
            if sig != self.signature {
                return Err(Rejection::Signature);
            }
        }

        let byte = match self.fill {
            Fill::Byte(byte) => byte,
            Fill::Captured => {
                let word = s.next_bits(16).ok_or(Rejection::Pattern { at: 0, found: 0 })?;
                mfm::decode_word(word as u16)
            }
        };
        check_sequence(s, self.min_repeats, byte)?;
        Ok(byte)
    }

    fn data(&self, byte: u8) -> Vec<u8> {
        match self.fill {
            Fill::Captured => vec![byte],
            Fill::Byte(_) => Vec::new(),
        }
    }

    /// Length-only recognition
    fn decode_length(&self, s: &mut Stream<'_>, ti: &mut TrackInfo) -> Result<Vec<u8>> {
        let measured = check_length(s, self.track_type, self.min_bits.unwrap_or(0))?;
        if let Some(total_bits) = self.total_bits {
            ti.total_bits = total_bits;
        }
        // Write splice at the index pulse
        ti.data_bitoff = ti.total_bits / 2;
        ti.len = 0;
        debug!("{}: revolution of {} bits", self.track_type, measured);
        Ok(Vec::new())
    }
}

impl TrackHandler for LongTrack {
    fn track_type(&self) -> TrackType {
        self.track_type
    }

    fn decode(&self, s: &mut Stream<'_>, ti: &mut TrackInfo) -> Result<Vec<u8>> {
        let sync = match self.sync {
            Some(sync) => sync,
            None => return self.decode_length(s, ti),
        };

        let data = scan(s, self.track_type, sync, |s| {
            let data_bitoff = s.word_offset(self.sync_bits);
            let byte = match self.check_candidate(s) {
                Ok(byte) => byte,
                Err(why) => return Verdict::Reject(why),
            };
            if let Some(min_bits) = self.min_bits {
                if let Err(err) = check_length(s, self.track_type, min_bits) {
                    return Verdict::Fail(err);
                }
            }
            Verdict::Accept((data_bitoff, self.data(byte)))
        });

        let (data_bitoff, data) = data?;
        ti.data_bitoff = data_bitoff;
        if let Some(total_bits) = self.total_bits {
            ti.total_bits = total_bits;
        }
        ti.len = data.len();
        Ok(data)
    }

    fn encode(&self, ti: &TrackInfo, tbuf: &mut TrackBuffer) {
        if let Some(sync) = self.sync {
            tbuf.bits(BitcellEncoding::Raw, self.sync_bits, sync.value);
        }
        tbuf.bytes(BitcellEncoding::Mfm, self.signature);

        let byte = match self.fill {
            Fill::Byte(byte) => byte,
            Fill::Captured => ti.dat.first().copied().unwrap_or(0),
        };
        let count = match self.fill_count {
            FillCount::Bytes(count) => count,
            FillCount::TrackRelative(margin) => (ti.total_bits / 16).saturating_sub(margin),
        };
        for _ in 0..count {
            tbuf.bits(BitcellEncoding::Mfm, 8, byte as u32);
        }
    }
}
