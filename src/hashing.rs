//! Stable string hashing for hair type identities.
//!
//! Hair types are persisted by the FNV-1 hash of their id string, so the
//! exact algorithm is part of the save format. The string is hashed as a
//! sequence of UTF-16 code units, one multiply-then-xor step per unit.

/// FNV-1 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811c9dc5;

/// FNV-1 32-bit prime.
pub const FNV_PRIME: u32 = 0x01000193;

/// Hashes a string with FNV-1 (multiply, then xor) over its UTF-16 code units.
///
/// This is a `const fn` so built-in hair types can expose their hash as an
/// associated constant.
///
/// # Example
///
/// ```
/// use hyperline::hashing::fnv1_hash;
///
/// assert_eq!(fnv1_hash(""), 0x811c9dc5);
/// assert_eq!(fnv1_hash("Hyperline_SolidHair"), fnv1_hash("Hyperline_SolidHair"));
/// ```
pub const fn fnv1_hash(s: &str) -> u32 {
    let bytes = s.as_bytes();
    let mut hash = FNV_OFFSET_BASIS;
    let mut i = 0;

    while i < bytes.len() {
        let b0 = bytes[i] as u32;
        let (code_point, width) = if b0 < 0x80 {
            (b0, 1)
        } else if b0 < 0xE0 {
            (((b0 & 0x1F) << 6) | (bytes[i + 1] as u32 & 0x3F), 2)
        } else if b0 < 0xF0 {
            (
                ((b0 & 0x0F) << 12)
                    | ((bytes[i + 1] as u32 & 0x3F) << 6)
                    | (bytes[i + 2] as u32 & 0x3F),
                3,
            )
        } else {
            (
                ((b0 & 0x07) << 18)
                    | ((bytes[i + 1] as u32 & 0x3F) << 12)
                    | ((bytes[i + 2] as u32 & 0x3F) << 6)
                    | (bytes[i + 3] as u32 & 0x3F),
                4,
            )
        };

        if code_point >= 0x10000 {
            // Surrogate pair
            let v = code_point - 0x10000;
            hash = step(hash, 0xD800 + (v >> 10));
            hash = step(hash, 0xDC00 + (v & 0x3FF));
        } else {
            hash = step(hash, code_point);
        }

        i += width;
    }

    hash
}

const fn step(hash: u32, unit: u32) -> u32 {
    hash.wrapping_mul(FNV_PRIME) ^ unit
}

// ============================================================================
// Tests
// ============================================================================
