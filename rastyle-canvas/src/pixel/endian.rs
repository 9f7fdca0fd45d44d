//! Host byte-order helpers for native 32-bit pixel words.
//!
//! Native 2D surfaces store each pixel as one `u32` holding premultiplied
//! ARGB, so the byte sequence in memory is BGRA on little-endian hosts and
//! ARGB on big-endian hosts. These helpers hide that difference.

/// Whether the host stores integers least-significant byte first: the
/// first memory byte of the integer 1 is 1.
pub const fn is_little_endian() -> bool {
    1u32.to_ne_bytes()[0] == 1
}

/// Split a native ARGB word into `[a, r, g, b]` bytes.
pub const fn argb32_to_bytes(word: u32) -> [u8; 4] {
    word.to_be_bytes()
}

/// Pack `[a, r, g, b]` bytes into a native ARGB word.
pub const fn bytes_to_argb32(argb: [u8; 4]) -> u32 {
    u32::from_be_bytes(argb)
}

/// Byte offsets of (r, g, b, a) inside a native ARGB word viewed as memory.
pub const fn native_rgba_offsets() -> [usize; 4] {
    if is_little_endian() {
        [2, 1, 0, 3]
    } else {
        [1, 2, 3, 0]
    }
}

/// Reorder one native pixel stored as raw memory bytes into `(r, g, b, a)`.
/// The color components stay premultiplied by alpha.
pub fn read_native_pixel(bytes: &[u8; 4]) -> [u8; 4] {
    let [r, g, b, a] = native_rgba_offsets();
    [bytes[r], bytes[g], bytes[b], bytes[a]]
}
