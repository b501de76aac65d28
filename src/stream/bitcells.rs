/// In-memory revolution of bitcells

use crate::stream::FluxSource;

/// One revolution of bitcells, packed most significant bit first
///
/// Bitcell 0 is the first cell after the index pulse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitcells {
    data: Vec<u8>,
    len: u32,
}

impl Bitcells {
    /// Create an empty revolution
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap packed bytes holding `len` bitcells
    ///
    /// Returns `None` if `data` is too short for `len` cells.
    pub fn from_bytes(mut data: Vec<u8>, len: u32) -> Option<Self> {
        if (data.len() as u64) * 8 < len as u64 {
            return None;
        }
        data.truncate(len.div_ceil(8) as usize);
        if len % 8 != 0 {
            if let Some(last) = data.last_mut() {
                *last &= 0xFF << (8 - len % 8);
            }
        }
        Some(Self { data, len })
    }

    /// Build a revolution from individual bits
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut cells = Self::new();
        for bit in bits {
            cells.push(bit);
        }
        cells
    }

    /// Append a bitcell
    pub fn push(&mut self, bit: bool) {
        let byte = (self.len / 8) as usize;
        if byte == self.data.len() {
            self.data.push(0);
        }
        if bit {
            self.data[byte] |= 0x80 >> (self.len % 8);
        }
        self.len += 1;
    }

    /// Number of bitcells in the revolution
    pub fn len(&self) -> u32 {
        self.len
    }

    /// Check if the revolution holds no bitcells
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the bitcell at `pos`, or `None` past the end
    pub fn get(&self, pos: u32) -> Option<bool> {
        if pos >= self.len {
            return None;
        }
        Some(self.data[(pos / 8) as usize] & (0x80 >> (pos % 8)) != 0)
    }

    /// Get the packed bytes; unused bits of the last byte are zero
    pub fn as_bytes(&self) -> &[u8] {
        &self.data[..self.len.div_ceil(8) as usize]
    }
}

impl FluxSource for Bitcells {
    fn bitcell_count(&self) -> u32 {
        self.len
    }

    fn bit(&self, pos: u32) -> bool {
        self.get(pos).unwrap_or(false)
    }
}
