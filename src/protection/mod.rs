/// Copy protection track detection
///
/// Detects the long-track protections used on many Amiga releases, plus the
/// Seven Cities Of Gold key track.

/// Table-driven long-track protections
pub mod longtrack;
/// Seven Cities Of Gold key track
pub mod sevencities;

pub use longtrack::{long_track, Fill, FillCount, LongTrack, LONG_TRACKS};
pub use sevencities::{SevenCities, SEVEN_CITIES};

use crate::format::{SectorGeometry, TrackHandler, TrackType};
use crate::image::TrackInfo;
use crate::stream::{FluxSource, Stream};

/// Every protection handler
pub fn handlers() -> impl Iterator<Item = &'static dyn TrackHandler> {
    LONG_TRACKS
        .iter()
        .map(|t| t as &'static dyn TrackHandler)
        .chain(std::iter::once(&SEVEN_CITIES as &'static dyn TrackHandler))
}

/// Result of copy protection detection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectionResult {
    /// Detected protection
    pub track_type: TrackType,
    /// Track metadata as decoded
    pub track: TrackInfo,
}

impl ProtectionResult {
    /// Name of the detected protection scheme
    pub fn name(&self) -> &'static str {
        self.track_type.description()
    }
}

impl std::fmt::Display for ProtectionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({} bits, data at bit {})",
            self.name(),
            self.track.total_bits,
            self.track.data_bitoff
        )
    }
}

/// Detect a protection track
///
/// Each protection is tried in turn against a fresh stream. The empty long
/// track matches any long revolution, so it is tried last.
///
/// # Example
///
/// ```no_run
/// use fluxtrack::{io, protection};
///
/// let cells = io::read_bitcells("track00.0.raw")?;
/// if let Some(result) = protection::detect(&cells) {
///     println!("Protection: {}", result);
/// } else {
///     println!("No protection detected");
/// }
/// # Ok::<(), fluxtrack::TrackError>(())
/// ```
pub fn detect(source: &dyn FluxSource) -> Option<ProtectionResult> {
    let (empty, scanned): (Vec<_>, Vec<_>) =
        handlers().partition(|h| h.track_type() == TrackType::EmptyLongtrack);

    scanned.into_iter().chain(empty).find_map(|handler| {
        let geometry: SectorGeometry = handler.geometry();
        let mut track = TrackInfo::new(handler.track_type(), geometry);
        let mut s = Stream::new(source);
        let dat = handler.decode(&mut s, &mut track).ok()?;
        track.dat = dat;
        Some(ProtectionResult {
            track_type: handler.track_type(),
            track,
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mfm::BitcellEncoding;
    use crate::tbuf::TrackBuffer;

    #[test]
    fn test_handlers_cover_protections() {
        let types: Vec<TrackType> = handlers().map(|h| h.track_type()).collect();
        assert_eq!(types.len(), 9);
        assert!(types.contains(&TrackType::SevencitiesLongtrack));
        assert!(types.contains(&TrackType::EmptyLongtrack));
    }

    #[test]
    fn test_detect_protec() {
        let mut tbuf = TrackBuffer::new(110_000, 1000);
        tbuf.bits(BitcellEncoding::Raw, 16, 0x4454);
        for _ in 0..6000 {
            tbuf.bits(BitcellEncoding::Mfm, 8, 0x44);
        }
        let result = detect(&tbuf.finish()).unwrap();
        assert_eq!(result.track_type, TrackType::ProtecLongtrack);
        assert_eq!(result.track.dat, vec![0x44]);
        assert_eq!(
            result.to_string(),
            "PROTEC Long Track (110000 bits, data at bit 1000)"
        );
    }

    #[test]
    fn test_detect_plain_long_track() {
        let result = detect(&TrackBuffer::new(106_000, 0).finish()).unwrap();
        assert_eq!(result.track_type, TrackType::EmptyLongtrack);
    }

    #[test]
    fn test_detect_standard_track() {
        assert!(detect(&TrackBuffer::new(100_150, 0).finish()).is_none());
    }
}
