//! Bit-reversal lookup table
//!
//! Used to emulate LSB-first shifting on controllers that only shift
//! MSB-first: every byte is mirrored before it goes on the wire and again
//! after it comes back.

/// Maps each byte to the byte with its bit order reversed (0x01 -> 0x80)
pub static REVERSE_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0;
    while i < 256 {
        table[i] = (i as u8).reverse_bits();
        i += 1;
    }
    table
}

/// Reverse the bit order of a single byte
#[inline]
pub fn reverse_byte(b: u8) -> u8 {
    REVERSE_TABLE[b as usize]
}

/// Write the bit-reversed image of `src` into `dest`
///
/// Only `min(dest.len(), src.len())` bytes are touched.
pub fn reverse_into(dest: &mut [u8], src: &[u8]) {
    for (d, &s) in dest.iter_mut().zip(src) {
        *d = reverse_byte(s);
    }
}

/// Reverse the bit order of every byte in `buf`
pub fn reverse_in_place(buf: &mut [u8]) {
    for b in buf.iter_mut() {
        *b = reverse_byte(*b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(reverse_byte(0x00), 0x00);
        assert_eq!(reverse_byte(0x01), 0x80);
        assert_eq!(reverse_byte(0x0F), 0xF0);
        assert_eq!(reverse_byte(0xA5), 0xA5);
        assert_eq!(reverse_byte(0x12), 0x48);
        assert_eq!(reverse_byte(0xFF), 0xFF);
    }

    #[test]
    fn test_table_is_involution() {
        for x in 0..=255u8 {
            assert_eq!(reverse_byte(reverse_byte(x)), x);
        }
    }

    #[test]
    fn test_buffer_round_trip() {
        let original: [u8; 6] = [0x00, 0x01, 0x02, 0x7F, 0xC3, 0xFE];
        let mut buf = [0u8; 6];
        reverse_into(&mut buf, &original);
        assert_eq!(buf, [0x00, 0x80, 0x40, 0xFE, 0xC3, 0x7F]);
        reverse_in_place(&mut buf);
        assert_eq!(buf, original);
    }
}
