/// Track formats: identifiers, the handler contract and the handler registry

/// Track geometry constants
pub mod constants;
/// Immutable map from track type to handler
pub mod registry;
/// Sync scanning and candidate validation
pub mod scan;

pub use constants::*;
pub use registry::Registry;
pub use scan::{Rejection, SyncMark, Verdict};

use crate::error::{Result, TrackError};
use crate::image::TrackInfo;
use crate::stream::Stream;
use crate::tbuf::TrackBuffer;
use std::fmt;
use std::str::FromStr;

/// Track format identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TrackType {
    /// No recognised data
    Unformatted,
    /// PROTEC long track, used on many releases
    ProtecLongtrack,
    /// Gremlin long track (Lotus I/II and many others)
    GremlinLongtrack,
    /// Tiertex variant of the Gremlin long track (Strider II)
    TiertexLongtrack,
    /// Crystals Of Arborea long track
    CrystalsOfArboreaLongtrack,
    /// Infogrames long track (Hostages, Jumping Jack Son and others)
    InfogramesLongtrack,
    /// B.A.T. long track by Ubisoft
    BatLongtrack,
    /// Amiga Power Pack long track by Softgang
    AppLongtrack,
    /// Seven Cities Of Gold key track by Electronic Arts
    SevencitiesLongtrack,
    /// Long track of nothing but MFM-encoded zeroes
    EmptyLongtrack,
    /// R-Type custom format, 5968-byte block
    RTypeA,
    /// R-Type custom format, 6552-byte block
    RTypeB,
}

impl TrackType {
    /// Every track type, in registry order
    pub const ALL: [TrackType; 12] = [
        TrackType::Unformatted,
        TrackType::ProtecLongtrack,
        TrackType::GremlinLongtrack,
        TrackType::TiertexLongtrack,
        TrackType::CrystalsOfArboreaLongtrack,
        TrackType::InfogramesLongtrack,
        TrackType::BatLongtrack,
        TrackType::AppLongtrack,
        TrackType::SevencitiesLongtrack,
        TrackType::EmptyLongtrack,
        TrackType::RTypeA,
        TrackType::RTypeB,
    ];

    /// Stable identifier used in images and on the console
    pub fn name(&self) -> &'static str {
        match self {
            TrackType::Unformatted => "unformatted",
            TrackType::ProtecLongtrack => "protec_longtrack",
            TrackType::GremlinLongtrack => "gremlin_longtrack",
            TrackType::TiertexLongtrack => "tiertex_longtrack",
            TrackType::CrystalsOfArboreaLongtrack => "crystals_of_arborea_longtrack",
            TrackType::InfogramesLongtrack => "infogrames_longtrack",
            TrackType::BatLongtrack => "bat_longtrack",
            TrackType::AppLongtrack => "app_longtrack",
            TrackType::SevencitiesLongtrack => "sevencities_longtrack",
            TrackType::EmptyLongtrack => "empty_longtrack",
            TrackType::RTypeA => "rtype_a",
            TrackType::RTypeB => "rtype_b",
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            TrackType::Unformatted => "Unformatted",
            TrackType::ProtecLongtrack => "PROTEC Long Track",
            TrackType::GremlinLongtrack => "Gremlin Long Track",
            TrackType::TiertexLongtrack => "Tiertex Long Track",
            TrackType::CrystalsOfArboreaLongtrack => "Crystals Of Arborea Long Track",
            TrackType::InfogramesLongtrack => "Infogrames Long Track",
            TrackType::BatLongtrack => "B.A.T. Long Track",
            TrackType::AppLongtrack => "Amiga Power Pack Long Track",
            TrackType::SevencitiesLongtrack => "Seven Cities Of Gold Long Track",
            TrackType::EmptyLongtrack => "Empty Long Track",
            TrackType::RTypeA => "R-Type (Variant A)",
            TrackType::RTypeB => "R-Type (Variant B)",
        }
    }
}

impl fmt::Display for TrackType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TrackType {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        TrackType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or(TrackError::UnknownTrackType(s))
    }
}

/// Sector layout a handler declares for its canonical data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorGeometry {
    /// Bytes in each sector
    pub bytes_per_sector: usize,
    /// Sectors on the track
    pub nr_sectors: u32,
}

impl SectorGeometry {
    /// Geometry of a raw track with no sectoring
    pub const RAW: SectorGeometry = SectorGeometry::new(0, 0);

    /// Create a new geometry
    pub const fn new(bytes_per_sector: usize, nr_sectors: u32) -> Self {
        Self {
            bytes_per_sector,
            nr_sectors,
        }
    }

    /// Length of the canonical data buffer
    pub fn len(&self) -> usize {
        self.bytes_per_sector * self.nr_sectors as usize
    }

    /// Check if the track carries no sector data
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bitmask with a bit set for every sector
    pub fn all_sectors(&self) -> u32 {
        match self.nr_sectors {
            0 => 0,
            n if n >= 32 => u32::MAX,
            n => (1u32 << n) - 1,
        }
    }
}

/// Decoder and encoder for one track format
///
/// `decode` scans a stream for the format and, on success, returns the
/// canonical data and updates the scalar fields of `ti`. `encode` regenerates
/// the track from previously accepted data and cannot fail.
pub trait TrackHandler {
    /// Track type this handler recognises
    fn track_type(&self) -> TrackType;

    /// Sector layout of the canonical data
    fn geometry(&self) -> SectorGeometry {
        SectorGeometry::RAW
    }

    /// Recognise the track in `s`
    fn decode(&self, s: &mut Stream<'_>, ti: &mut TrackInfo) -> Result<Vec<u8>>;

    /// Emit the track described by `ti`
    fn encode(&self, ti: &TrackInfo, tbuf: &mut TrackBuffer);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_type_names_round_trip() {
        for t in TrackType::ALL {
            assert_eq!(t.name().parse::<TrackType>().unwrap(), t);
        }
    }

    #[test]
    fn test_track_type_parse_case_insensitive() {
        assert_eq!(
            " RType_B ".parse::<TrackType>().unwrap(),
            TrackType::RTypeB
        );
        assert!(matches!(
            "copylock".parse::<TrackType>(),
            Err(TrackError::UnknownTrackType(_))
        ));
    }

    #[test]
    fn test_geometry() {
        let g = SectorGeometry::new(5968, 1);
        assert_eq!(g.len(), 5968);
        assert_eq!(g.all_sectors(), 1);
        assert!(SectorGeometry::RAW.is_empty());
        assert_eq!(SectorGeometry::RAW.all_sectors(), 0);
        assert_eq!(SectorGeometry::new(512, 11).all_sectors(), 0x7FF);
    }
}
