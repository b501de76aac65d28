/// Disk track table

/// Per-track metadata and canonical data
pub mod track;

pub use track::TrackInfo;

use log::{debug, info};

use crate::error::{Result, TrackError};
use crate::format::{Registry, TrackType};
use crate::stream::{Bitcells, FluxSource, Stream};
use crate::tbuf::TrackBuffer;

/// Decoded tracks of one disk, indexed by track number
///
/// Track numbers count cylinders and heads together (`cyl * 2 + head`).
#[derive(Debug, Clone, Default)]
pub struct Disk {
    tracks: Vec<TrackInfo>,
}

impl Disk {
    /// Create a disk with `nr_tracks` unformatted tracks
    pub fn new(nr_tracks: usize) -> Self {
        Self {
            tracks: vec![TrackInfo::unformatted(); nr_tracks],
        }
    }

    /// Get the number of tracks
    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }

    /// Get a reference to all tracks
    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    /// Get a track by its track number
    pub fn get_track(&self, tracknr: usize) -> Option<&TrackInfo> {
        self.tracks.get(tracknr)
    }

    fn check_track(&self, tracknr: usize) -> Result<()> {
        if tracknr < self.tracks.len() {
            Ok(())
        } else {
            Err(TrackError::InvalidTrack {
                track: tracknr,
                max: self.tracks.len().saturating_sub(1),
            })
        }
    }

    /// Decode a track as `track_type`
    ///
    /// The track entry is only replaced when the decode succeeds; on failure
    /// it keeps whatever it held before.
    pub fn decode_track(
        &mut self,
        tracknr: usize,
        track_type: TrackType,
        source: &dyn FluxSource,
        registry: &Registry,
    ) -> Result<&TrackInfo> {
        self.check_track(tracknr)?;
        let handler = registry.handler(track_type)?;

        let mut ti = TrackInfo::new(track_type, handler.geometry());
        let mut s = Stream::new(source);
        ti.dat = handler.decode(&mut s, &mut ti)?;

        info!(
            "T{}: {} ({} bits, data at {}, {} bytes)",
            tracknr,
            track_type.description(),
            ti.total_bits,
            ti.data_bitoff,
            ti.dat.len()
        );
        self.tracks[tracknr] = ti;
        Ok(&self.tracks[tracknr])
    }

    /// Try each track type in order, committing the first that decodes
    ///
    /// Returns `Ok(None)` when no type matches, leaving the track untouched.
    /// Errors other than unrecognised data end the search.
    pub fn identify_track(
        &mut self,
        tracknr: usize,
        candidates: &[TrackType],
        source: &dyn FluxSource,
        registry: &Registry,
    ) -> Result<Option<TrackType>> {
        self.check_track(tracknr)?;
        for &track_type in candidates {
            match self.decode_track(tracknr, track_type, source, registry) {
                Ok(_) => return Ok(Some(track_type)),
                Err(e) if e.is_unrecognised() => {
                    debug!("T{}: not {}: {}", tracknr, track_type, e);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Regenerate the bitcells of a decoded track
    pub fn encode_track(&self, tracknr: usize, registry: &Registry) -> Result<Bitcells> {
        self.check_track(tracknr)?;
        let ti = &self.tracks[tracknr];
        if !ti.is_formatted() {
            return Err(TrackError::Unformatted { track: tracknr });
        }
        let handler = registry.handler(ti.track_type)?;

        let mut tbuf = TrackBuffer::new(ti.total_bits, ti.data_bitoff);
        handler.encode(ti, &mut tbuf);
        Ok(tbuf.finish())
    }

    /// Mark a track as unformatted
    pub fn clear_track(&mut self, tracknr: usize) -> Result<()> {
        self.check_track(tracknr)?;
        self.tracks[tracknr] = TrackInfo::unformatted();
        Ok(())
    }

    /// Count of tracks holding recognised data
    pub fn formatted_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_formatted()).count()
    }
}
