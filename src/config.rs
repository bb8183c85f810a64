use crate::error::ConfigError;
use crate::lru;

/// Cache geometry.
///
/// - `set_bits`: `s`, the cache has `2^s` sets
/// - `lines_per_set`: `E`, the associativity
/// - `block_bits`: `b`, a block holds `2^b` bytes
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    set_bits: u32,
    lines_per_set: usize,
    block_bits: u32,
    total_lines: usize,
}

impl CacheConfig {
    pub fn new(set_bits: u32, lines_per_set: usize, block_bits: u32) -> Result<Self, ConfigError> {
        if lines_per_set == 0 {
            return Err(ConfigError::NoLines(lines_per_set));
        }
        if set_bits.saturating_add(block_bits) > u64::BITS {
            return Err(ConfigError::AddressBits {
                set_bits,
                block_bits,
            });
        }
        if set_bits >= usize::BITS {
            return Err(ConfigError::TooManySets(set_bits));
        }
        let total_lines = 1usize
            .checked_shl(set_bits)
            .and_then(|sets| sets.checked_mul(lines_per_set))
            .filter(|&total_lines| total_lines <= lru::MAX_LINES)
            .ok_or(ConfigError::TooManyLines {
                set_bits,
                lines_per_set,
            })?;

        Ok(Self {
            set_bits,
            lines_per_set,
            block_bits,
            total_lines,
        })
    }

    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    pub fn lines_per_set(&self) -> usize {
        self.lines_per_set
    }

    pub fn sets(&self) -> usize {
        1 << self.set_bits
    }

    /// Block size in bytes, `None` for a 64-bit offset field.
    pub fn block_size(&self) -> Option<u64> {
        1u64.checked_shl(self.block_bits)
    }

    pub fn tag_bits(&self) -> u32 {
        u64::BITS - self.set_bits - self.block_bits
    }

    pub fn total_lines(&self) -> usize {
        self.total_lines
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn geometry() {
        let config = CacheConfig::new(4, 2, 6).unwrap();
        assert_eq!(config.sets(), 16);
        assert_eq!(config.lines_per_set(), 2);
        assert_eq!(config.block_size(), Some(64));
        assert_eq!(config.tag_bits(), 54);
        assert_eq!(config.total_lines(), 32);
    }

    #[test]
    fn degenerate_geometry() {
        let config = CacheConfig::new(0, 1, 0).unwrap();
        assert_eq!(config.sets(), 1);
        assert_eq!(config.block_size(), Some(1));
        assert_eq!(config.tag_bits(), 64);

        let config = CacheConfig::new(0, 1, 64).unwrap();
        assert_eq!(config.block_size(), None);
        assert_eq!(config.tag_bits(), 0);
    }

    #[test]
    fn rejects_zero_lines() {
        assert_eq!(CacheConfig::new(2, 0, 2), Err(ConfigError::NoLines(0)));
    }

    #[test]
    fn rejects_oversized_address_fields() {
        assert_eq!(
            CacheConfig::new(40, 1, 30),
            Err(ConfigError::AddressBits {
                set_bits: 40,
                block_bits: 30
            })
        );
        assert!(matches!(
            CacheConfig::new(u32::MAX, 1, 1),
            Err(ConfigError::AddressBits { .. })
        ));
    }

    #[test]
    fn rejects_overflowing_line_count() {
        assert_eq!(
            CacheConfig::new(0, usize::MAX, 0),
            Err(ConfigError::TooManyLines {
                set_bits: 0,
                lines_per_set: usize::MAX
            })
        );
        assert!(matches!(
            CacheConfig::new(usize::BITS - 2, 8, 0),
            Err(ConfigError::TooManyLines { .. })
        ));
        assert!(matches!(
            CacheConfig::new(0, lru::MAX_LINES + 1, 0),
            Err(ConfigError::TooManyLines { .. })
        ));

        let config = CacheConfig::new(0, lru::MAX_LINES, 0).unwrap();
        assert_eq!(config.total_lines(), lru::MAX_LINES);
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn rejects_unrepresentable_set_count() {
        assert_eq!(
            CacheConfig::new(64, 1, 0),
            Err(ConfigError::TooManySets(64))
        );
    }
}
