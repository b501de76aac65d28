/*!
# fluxtrack

A Rust library for decoding and regenerating Amiga copy protection tracks and
custom track formats from flux-level bitcell streams.

## Features

- Long-track protection detectors: PROTEC, Gremlin, Tiertex, Crystals Of
  Arborea, Infogrames, B.A.T., Amiga Power Pack, plain long tracks
- Seven Cities Of Gold key track, kept byte for byte
- R-Type custom sector formats (variants A and B)
- Regeneration of decoded tracks as MFM bitcells at their captured offset and length

## Quick Start

```rust,no_run
use fluxtrack::{io, Disk, Registry, TrackType};

let registry = Registry::new();
let mut disk = Disk::new(160);

// Decode one revolution as a PROTEC long track
let cells = io::read_bitcells("track01.0.raw")?;
let track = disk.decode_track(2, TrackType::ProtecLongtrack, &cells, &registry)?;
println!("{} bits, data at bit {}", track.total_bits, track.data_bitoff);

// Regenerate it
let regenerated = disk.encode_track(2, &registry)?;
io::write_bitcells(&regenerated, "track01.0.out")?;
# Ok::<(), fluxtrack::TrackError>(())
```

## Modules

- `stream`: bitcell sources and the replaying stream cursor
- `tbuf`: track buffer that emits regenerated bitcells
- `format`: track types, the handler trait and registry
- `protection`: long-track protection handlers
- `rtype`: R-Type sector codecs
- `image`: per-track metadata and the disk track table
- `io`: bitcell dump files
*/

#![warn(missing_docs)]

/// AmigaDOS-style checksum and CRC16-CCITT
pub mod checksum;
/// Error types and Result alias
pub mod error;
/// Track types, handler trait and registry
pub mod format;
/// Track metadata and disk track table
pub mod image;
/// I/O operations for reading and writing bitcell dumps
pub mod io;
/// MFM bitcell encodings
pub mod mfm;
/// Copy protection detection
pub mod protection;
/// R-Type custom track format
pub mod rtype;
/// Bitcell sources and stream cursor
pub mod stream;
/// Track buffer for regenerating bitcells
pub mod tbuf;

// Re-export common types
pub use error::{Result, TrackError};
pub use format::{Registry, SectorGeometry, TrackHandler, TrackType};
pub use image::{Disk, TrackInfo};
pub use mfm::BitcellEncoding;
pub use protection::{detect, ProtectionResult};
pub use stream::{Bitcells, FluxSource, Stream};
pub use tbuf::TrackBuffer;
