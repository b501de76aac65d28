/// Bitcell dump reader
///
/// A dump is one revolution of bitcells packed MSB first, starting at the
/// index pulse. With a `BITC` header the bitcell count follows as a
/// big-endian `u32`; a headerless file is taken to use every bit.

use crate::error::{Result, TrackError};
use crate::io::{BITCELL_HEADER_SIZE, BITCELL_MAGIC};
use crate::stream::Bitcells;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a bitcell dump from disk
pub fn read_bitcells<P: AsRef<Path>>(path: P) -> Result<Bitcells> {
    let mut file = File::open(path)?;
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    parse_bitcells(data)
}

/// Parse the contents of a bitcell dump
pub fn parse_bitcells(mut data: Vec<u8>) -> Result<Bitcells> {
    if data.starts_with(BITCELL_MAGIC) {
        if data.len() < BITCELL_HEADER_SIZE {
            return Err(TrackError::invalid_format("Truncated bitcell header"));
        }
        let len = u32::from_be_bytes([data[4], data[5], data[6], data[7]]);
        data.drain(..BITCELL_HEADER_SIZE);
        if len == 0 {
            return Err(TrackError::invalid_format("Empty revolution"));
        }
        return Bitcells::from_bytes(data, len).ok_or_else(|| {
            TrackError::invalid_format(format!("Bitcell count {} exceeds file data", len))
        });
    }

    if data.is_empty() {
        return Err(TrackError::invalid_format("Empty revolution"));
    }
    let len = u32::try_from(data.len() * 8)
        .map_err(|_| TrackError::invalid_format("Revolution too long"))?;
    Bitcells::from_bytes(data, len)
        .ok_or_else(|| TrackError::invalid_format("Unreadable bitcell data"))
}
