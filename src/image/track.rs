/// Per-track metadata and canonical data

use crate::format::constants::DEFAULT_BITS_PER_TRACK;
use crate::format::{SectorGeometry, TrackType};

/// A decoded track: canonical data plus what is needed to regenerate it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    /// Track format
    pub track_type: TrackType,
    /// Bitcell offset from the index pulse where the data starts
    pub data_bitoff: u32,
    /// Bitcells in the regenerated revolution
    pub total_bits: u32,
    /// Length of the canonical data
    pub len: usize,
    /// Bytes in each sector, from the handler geometry
    pub bytes_per_sector: usize,
    /// Sectors on the track, from the handler geometry
    pub nr_sectors: u32,
    /// Bitmask of sectors decoded without error
    pub valid_sectors: u32,
    /// Canonical data; empty when the track type implies the whole layout
    pub dat: Vec<u8>,
}

impl TrackInfo {
    /// Create an unformatted track
    pub fn unformatted() -> Self {
        Self::new(TrackType::Unformatted, SectorGeometry::RAW)
    }

    /// Create track metadata ready for a decode of `track_type`
    pub fn new(track_type: TrackType, geometry: SectorGeometry) -> Self {
        Self {
            track_type,
            data_bitoff: 0,
            total_bits: DEFAULT_BITS_PER_TRACK,
            len: geometry.len(),
            bytes_per_sector: geometry.bytes_per_sector,
            nr_sectors: geometry.nr_sectors,
            valid_sectors: 0,
            dat: Vec::new(),
        }
    }

    /// Sector layout of the track
    pub fn geometry(&self) -> SectorGeometry {
        SectorGeometry::new(self.bytes_per_sector, self.nr_sectors)
    }

    /// Check if the track holds recognised data
    pub fn is_formatted(&self) -> bool {
        self.track_type != TrackType::Unformatted
    }

    /// Count of sectors decoded without error
    pub fn valid_sector_count(&self) -> u32 {
        self.valid_sectors.count_ones()
    }

    /// Check if every sector decoded without error
    pub fn all_sectors_valid(&self) -> bool {
        self.valid_sectors == self.geometry().all_sectors()
    }
}

impl Default for TrackInfo {
    fn default() -> Self {
        Self::unformatted()
    }
}
