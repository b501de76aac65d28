/// Checksums shared by the track formats

/// AmigaDOS-style checksum over big-endian longs
///
/// The longs are folded together, the result is folded onto itself by one bit
/// and only the bits under mask `0x5555_5555` are kept, so the value can be
/// written as a single odd half. Trailing bytes that do not fill a long are
/// ignored.
pub fn amigados_checksum(data: &[u8]) -> u32 {
    let mut csum = data
        .chunks_exact(4)
        .map(|long| u32::from_be_bytes([long[0], long[1], long[2], long[3]]))
        .fold(0u32, |acc, long| acc ^ long);
    csum ^= csum >> 1;
    csum & crate::mfm::DATA_MASK
}

/// CRC16-CCITT (polynomial 0x1021) continuing from `crc`
pub fn crc16_ccitt(data: &[u8], crc: u16) -> u16 {
    let mut crc = crc;
    for &byte in data {
        crc ^= (byte as u16) << 8;
        for _bit in 0..8 {
            crc = (crc << 1) ^ match crc & 0x8000 { 0 => 0, _ => 0x1021 };
        }
    }
    crc
}
