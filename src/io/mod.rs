/// I/O operations for reading and writing bitcell dumps

/// Reader for bitcell dumps
pub mod reader;
/// Writer for bitcell dumps
pub mod writer;

pub use reader::{parse_bitcells, read_bitcells};
pub use writer::{serialize_bitcells, write_bitcells};

/// Magic at the start of a bitcell dump with an explicit length
pub const BITCELL_MAGIC: &[u8; 4] = b"BITC";

/// Size of the dump header: magic plus a big-endian bitcell count
pub const BITCELL_HEADER_SIZE: usize = 8;
