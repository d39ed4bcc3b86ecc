//! IUPAC nucleotide ambiguity classes
//!
//! Each uppercase IUPAC code maps to the set of concrete bases it may stand
//! for, stored as a 4-bit mask (A=1, C=2, G=4, T=8). Two codes are compatible
//! when their masks intersect.

const A: u8 = 1;
const C: u8 = 2;
const G: u8 = 4;
const T: u8 = 8;

// Compile-time lookup indexed by ASCII byte; 0 means "not an IUPAC code"
const AMBIGUITY_MASKS: [u8; 128] = {
    let mut table = [0u8; 128];
    table[b'A' as usize] = A;
    table[b'C' as usize] = C;
    table[b'G' as usize] = G;
    table[b'T' as usize] = T;
    table[b'U' as usize] = T;
    table[b'R' as usize] = A | G;
    table[b'Y' as usize] = C | T;
    table[b'S' as usize] = C | G;
    table[b'W' as usize] = A | T;
    table[b'K' as usize] = G | T;
    table[b'M' as usize] = A | C;
    table[b'B' as usize] = C | G | T;
    table[b'D' as usize] = A | G | T;
    table[b'H' as usize] = A | C | T;
    table[b'V' as usize] = A | C | G;
    table[b'N' as usize] = A | C | G | T;
    table
};

/// All characters that have an ambiguity class.
pub const AMBIGUITY_CODES: &[char] = &[
    'A', 'C', 'G', 'T', 'U', 'R', 'Y', 'S', 'W', 'K', 'M', 'B', 'D', 'H', 'V', 'N',
];

/// Bit mask of concrete bases compatible with `c`, or `None` if `c` is not
/// an uppercase IUPAC nucleotide code.
#[inline]
pub fn ambiguity_class(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    match AMBIGUITY_MASKS[c as usize] {
        0 => None,
        mask => Some(mask),
    }
}

/// Whether two aligned characters may represent the same base.
///
/// Identical characters are always similar. Otherwise both must be IUPAC codes
/// whose classes overlap; anything outside the table (gaps, lowercase,
/// protein residues) only matches itself.
#[inline]
pub fn is_similar(a: char, b: char) -> bool {
    if a == b {
        return true;
    }
    match (ambiguity_class(a), ambiguity_class(b)) {
        (Some(x), Some(y)) => x & y != 0,
        _ => false,
    }
}
