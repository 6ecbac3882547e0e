//! Comparison levels and strengths

use crate::error::CollError;

/// Comparison strength requested by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[repr(u8)]
pub enum Strength {
    /// Base letters only
    Primary = 0,
    /// Plus accents
    Secondary = 1,
    /// Plus case and variants
    #[default]
    Tertiary = 2,
    /// Plus shifted punctuation
    Quaternary = 3,
    /// Plus code point tiebreak
    Identical = 15,
}

impl Strength {
    /// Convert from the numeric strength value
    pub fn from_u8(val: u8) -> Result<Self, CollError> {
        match val {
            0 => Ok(Strength::Primary),
            1 => Ok(Strength::Secondary),
            2 => Ok(Strength::Tertiary),
            3 => Ok(Strength::Quaternary),
            15 => Ok(Strength::Identical),
            _ => Err(CollError::InvalidSetting(format!("Unknown strength: {}", val))),
        }
    }

    /// Level flags written up to the quaternary level for this strength.
    ///
    /// The identical level is never part of this mask; it is appended separately.
    pub fn level_mask(self) -> u32 {
        match self {
            Strength::Primary => Level::Primary.flag(),
            Strength::Secondary => Level::Primary.flag() | Level::Secondary.flag(),
            Strength::Tertiary => {
                Level::Primary.flag() | Level::Secondary.flag() | Level::Tertiary.flag()
            }
            Strength::Quaternary | Strength::Identical => {
                Level::Primary.flag()
                    | Level::Secondary.flag()
                    | Level::Tertiary.flag()
                    | Level::Quaternary.flag()
            }
        }
    }
}

/// Sort key levels in the order they appear in a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Level {
    /// Primary weights
    Primary = 1,
    /// Secondary weights
    Secondary = 2,
    /// Case bits (optional level)
    Case = 3,
    /// Tertiary weights
    Tertiary = 4,
    /// Quaternary weights
    Quaternary = 5,
    /// BOCSU-encoded code points
    Identical = 6,
}

impl Level {
    /// Bit for this level in a level mask.
    pub const fn flag(self) -> u32 {
        1 << (self as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_flags() {
        assert_eq!(Level::Primary.flag(), 0x02);
        assert_eq!(Level::Secondary.flag(), 0x04);
        assert_eq!(Level::Case.flag(), 0x08);
        assert_eq!(Level::Tertiary.flag(), 0x10);
        assert_eq!(Level::Quaternary.flag(), 0x20);
        assert_eq!(Level::Identical.flag(), 0x40);
    }

    #[test]
    fn test_strength_level_masks() {
        assert_eq!(Strength::Primary.level_mask(), 0x02);
        assert_eq!(Strength::Secondary.level_mask(), 0x06);
        assert_eq!(Strength::Tertiary.level_mask(), 0x16);
        assert_eq!(Strength::Quaternary.level_mask(), 0x36);
        assert_eq!(Strength::Identical.level_mask(), 0x36);
    }

    #[test]
    fn test_strength_from_u8() {
        assert_eq!(Strength::from_u8(0).unwrap(), Strength::Primary);
        assert_eq!(Strength::from_u8(15).unwrap(), Strength::Identical);
        assert!(Strength::from_u8(4).is_err());
    }
}
