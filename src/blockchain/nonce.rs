/// Derive the fixed-width challenge for a block from its predecessor's hash.
///
/// Every byte of `previous_hash` is rendered as 8 bits; the last `width` bits
/// of that encoding are the nonce. Encodings shorter than `width` are
/// left-padded with zeros.
pub fn derive_nonce(previous_hash: &str, width: usize) -> String {
    let bits: String = previous_hash
        .bytes()
        .map(|b| format!("{b:08b}"))
        .collect();

    if bits.len() >= width {
        bits[bits.len() - width..].to_string()
    } else {
        format!("{bits:0>width$}")
    }
}

/// The oracle pattern scored for a nonce: its bit-reversal.
pub fn target_pattern(nonce: &str) -> String {
    nonce.chars().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::{derive_nonce, target_pattern};

    #[test]
    fn takes_trailing_bits_of_byte_encoding() {
        // 'a' = 0x61 = 01100001, 'b' = 0x62 = 01100010
        assert_eq!(derive_nonce("ab", 12), "000101100010");
        assert_eq!(derive_nonce("ab", 4), "0010");
    }

    #[test]
    fn short_input_is_left_padded() {
        // "0" = 0x30 = 00110000
        assert_eq!(derive_nonce("0", 12), "000000110000");
        assert_eq!(derive_nonce("", 3), "000");
    }

    #[test]
    fn derivation_is_pure_and_fixed_width() {
        let h = "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08";
        let a = derive_nonce(h, 12);
        assert_eq!(a, derive_nonce(h, 12));
        assert_eq!(a.len(), 12);
        // '8' = 0x38 = 00111000 preceded by '0' = 00110000
        assert_eq!(a, "000000111000");
    }

    #[test]
    fn target_is_bit_reversal() {
        assert_eq!(target_pattern("000000110000"), "000011000000");
        assert_eq!(target_pattern("1"), "1");
    }
}
