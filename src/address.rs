/// An address split into the fields the cache looks at.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    pub tag: u64,
    pub set_index: u64,
    pub block_offset: u64,
}

/// Splits `address` into `| tag | set index | block offset |`.
///
/// Widths of zero are valid: `set_bits = 0` maps everything to set 0 and
/// `block_bits = 0` leaves no offset. Shifts by 64 or more yield 0 instead of
/// overflowing.
pub fn decode(address: u64, set_bits: u32, block_bits: u32) -> DecodedAddress {
    let block_offset = address & low_mask(block_bits);
    let set_index = shr(address, block_bits) & low_mask(set_bits);
    let tag = shr(address, block_bits.saturating_add(set_bits));

    DecodedAddress {
        tag,
        set_index,
        block_offset,
    }
}

/// Mask with the lowest `bits` bits set.
fn low_mask(bits: u32) -> u64 {
    match bits {
        0 => 0,
        1..64 => !(!0u64 << bits),
        _ => u64::MAX,
    }
}

fn shr(value: u64, bits: u32) -> u64 {
    value.checked_shr(bits).unwrap_or(0)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn splits_fields() {
        // | tag 0xAB | set 0x5 | offset 0x3 | with s = 4, b = 4
        let decoded = decode(0xAB53, 4, 4);
        assert_eq!(
            decoded,
            DecodedAddress {
                tag: 0xAB,
                set_index: 0x5,
                block_offset: 0x3,
            }
        );
    }

    #[test]
    fn zero_widths() {
        let decoded = decode(0xDEAD_BEEF, 0, 0);
        assert_eq!(decoded.tag, 0xDEAD_BEEF);
        assert_eq!(decoded.set_index, 0);
        assert_eq!(decoded.block_offset, 0);

        let decoded = decode(0x31, 1, 0);
        assert_eq!(decoded.set_index, 1);
        assert_eq!(decoded.tag, 0x18);
    }

    #[test]
    fn full_width_fields() {
        let decoded = decode(u64::MAX, 0, 64);
        assert_eq!(decoded.block_offset, u64::MAX);
        assert_eq!(decoded.set_index, 0);
        assert_eq!(decoded.tag, 0);

        let decoded = decode(u64::MAX, 60, 4);
        assert_eq!(decoded.block_offset, 0xF);
        assert_eq!(decoded.set_index, (1 << 60) - 1);
        assert_eq!(decoded.tag, 0);
    }

    #[test]
    fn masks() {
        assert_eq!(low_mask(0), 0);
        assert_eq!(low_mask(1), 1);
        assert_eq!(low_mask(12), 0xFFF);
        assert_eq!(low_mask(63), u64::MAX >> 1);
        assert_eq!(low_mask(64), u64::MAX);
    }
}
