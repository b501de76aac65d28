/// Bitcell dump writer

use crate::error::Result;
use crate::io::{BITCELL_HEADER_SIZE, BITCELL_MAGIC};
use crate::stream::Bitcells;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Write a bitcell dump to disk, always with a length header
pub fn write_bitcells<P: AsRef<Path>>(cells: &Bitcells, path: P) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(&serialize_bitcells(cells))?;
    Ok(())
}

/// Serialize a revolution in dump format
pub fn serialize_bitcells(cells: &Bitcells) -> Vec<u8> {
    let mut out = Vec::with_capacity(BITCELL_HEADER_SIZE + cells.as_bytes().len());
    out.extend_from_slice(BITCELL_MAGIC);
    out.extend_from_slice(&cells.len().to_be_bytes());
    out.extend_from_slice(cells.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::read_bitcells;

    #[test]
    fn test_serialize_header() {
        let cells = Bitcells::from_bits([true, false, true]);
        let out = serialize_bitcells(&cells);
        assert_eq!(&out[..4], b"BITC");
        assert_eq!(&out[4..8], &[0, 0, 0, 3]);
        assert_eq!(&out[8..], &[0xA0]);
    }

    #[test]
    fn test_write_and_read() {
        let path = std::env::temp_dir().join(format!("fluxtrack_writer_{}.raw", std::process::id()));
        let cells = Bitcells::from_bits((0..1001).map(|i| i % 3 == 0));
        write_bitcells(&cells, &path).unwrap();
        let read = read_bitcells(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(read, cells);
    }
}
