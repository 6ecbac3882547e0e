//! Collation settings
//!
//! A plain value type. Collators hold it behind an `Arc` and clone it on
//! write, so many collators can share one configuration.

use crate::data::CollationData;
use collkey_format::constants::*;
use collkey_format::{CollError, Result, Strength};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Treatment of variable (space, punctuation, ...) primaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlternateHandling {
    /// Variable primaries are ordinary primaries
    #[default]
    NonIgnorable,
    /// Variable primaries move to the quaternary level
    Shifted,
}

/// Case ordering at the tertiary (or case) level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseFirst {
    /// Tertiary weights as in the data
    #[default]
    Off,
    /// Lowercase before uppercase
    LowerFirst,
    /// Uppercase before lowercase
    UpperFirst,
}

/// Highest special group that counts as variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MaxVariable {
    /// Spaces only
    Space,
    /// Spaces and punctuation
    #[default]
    Punctuation,
    /// Spaces, punctuation and symbols
    Symbol,
    /// Spaces, punctuation, symbols and currency symbols
    Currency,
}

impl MaxVariable {
    /// Reorder code of the group
    pub fn reorder_code(self) -> i32 {
        match self {
            MaxVariable::Space => REORDER_CODE_SPACE,
            MaxVariable::Punctuation => REORDER_CODE_PUNCTUATION,
            MaxVariable::Symbol => REORDER_CODE_SYMBOL,
            MaxVariable::Currency => REORDER_CODE_CURRENCY,
        }
    }
}

macro_rules! impl_setting_names {
    ($ty:ty, $what:literal, { $($name:literal => $variant:expr),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = CollError;

            fn from_str(s: &str) -> Result<Self> {
                match s.to_ascii_lowercase().as_str() {
                    $($name => Ok($variant),)+
                    other => Err(CollError::InvalidSetting(format!(
                        "unknown {} '{}'",
                        $what, other
                    ))),
                }
            }
        }
    };
}

impl_setting_names!(AlternateHandling, "alternate handling", {
    "non-ignorable" => AlternateHandling::NonIgnorable,
    "shifted" => AlternateHandling::Shifted,
});

impl_setting_names!(CaseFirst, "case-first mode", {
    "off" => CaseFirst::Off,
    "lower" => CaseFirst::LowerFirst,
    "upper" => CaseFirst::UpperFirst,
});

impl_setting_names!(MaxVariable, "max-variable group", {
    "space" => MaxVariable::Space,
    "punct" => MaxVariable::Punctuation,
    "symbol" => MaxVariable::Symbol,
    "currency" => MaxVariable::Currency,
});

const REORDER_CODE_NAMES: [(&str, i32); 15] = [
    ("default", REORDER_CODE_DEFAULT),
    ("others", REORDER_CODE_OTHERS),
    ("space", REORDER_CODE_SPACE),
    ("punct", REORDER_CODE_PUNCTUATION),
    ("symbol", REORDER_CODE_SYMBOL),
    ("currency", REORDER_CODE_CURRENCY),
    ("digit", REORDER_CODE_DIGIT),
    ("zyyy", SCRIPT_COMMON),
    ("cyrl", SCRIPT_CYRILLIC),
    ("grek", SCRIPT_GREEK),
    ("hani", SCRIPT_HAN),
    ("hang", SCRIPT_HANGUL),
    ("hebr", SCRIPT_HEBREW),
    ("latn", SCRIPT_LATIN),
    ("kore", SCRIPT_KOREAN),
];

/// Parse a reorder code from a group name (`punct`, `digit`, ...), a
/// four-letter script code (`Latn`, `Grek`, ...) or a decimal number.
pub fn parse_reorder_code(name: &str) -> Result<i32> {
    let lower = name.trim().to_ascii_lowercase();
    let lower = match lower.as_str() {
        "zzzz" | "unknown" => "others",
        "latin" => "latn",
        "greek" => "grek",
        "cyrillic" => "cyrl",
        "hebrew" => "hebr",
        "hangul" => "hang",
        "korean" => "kore",
        "han" => "hani",
        "punctuation" => "punct",
        other => other,
    };
    if let Some(&(_, code)) = REORDER_CODE_NAMES.iter().find(|(n, _)| *n == lower) {
        return Ok(code);
    }
    lower
        .parse::<i32>()
        .map_err(|_| CollError::InvalidReorder(format!("unknown script or group '{}'", name)))
}

/// Short name of a reorder code, if it has one
pub fn reorder_code_name(code: i32) -> Option<&'static str> {
    REORDER_CODE_NAMES
        .iter()
        .find(|&&(_, c)| c == code)
        .map(|&(n, _)| n)
}

/// Strength, level and reordering options for one collator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollationSettings {
    /// Comparison strength
    pub strength: Strength,
    /// Variable-weight handling
    pub alternate: AlternateHandling,
    /// Case ordering
    pub case_first: CaseFirst,
    /// Separate case level between secondary and tertiary
    pub case_level: bool,
    /// Compare secondary weights from the end of each segment
    pub backward_secondary: bool,
    max_variable: MaxVariable,
    variable_top: u32,
    reorder_codes: Vec<i32>,
    /// Lead byte permutation; `None` without reordering. 0 marks a split byte.
    reorder_table: Option<Box<[u8; 256]>>,
    /// Primaries at or above this value never move
    min_high_no_reorder: u32,
    /// (limit, offset) pairs for split lead bytes
    reorder_ranges: Vec<u32>,
}

impl CollationSettings {
    /// Default settings for `data`: tertiary strength, punctuation variable.
    pub fn new(data: &CollationData) -> Self {
        let max_variable = MaxVariable::default();
        Self {
            strength: Strength::default(),
            alternate: AlternateHandling::default(),
            case_first: CaseFirst::default(),
            case_level: false,
            backward_secondary: false,
            max_variable,
            variable_top: data.get_last_primary_for_group(max_variable.reorder_code()),
            reorder_codes: Vec::new(),
            reorder_table: None,
            min_high_no_reorder: 0,
            reorder_ranges: Vec::new(),
        }
    }

    /// Whether variable primaries are shifted to the quaternary level
    #[inline]
    pub fn is_shifted(&self) -> bool {
        self.alternate == AlternateHandling::Shifted
    }

    /// Highest group counted as variable
    pub fn max_variable(&self) -> MaxVariable {
        self.max_variable
    }

    /// Last primary of the variable range
    pub fn variable_top(&self) -> u32 {
        self.variable_top
    }

    /// Change the highest variable group; `data` supplies its last primary.
    pub fn set_max_variable(&mut self, max_variable: MaxVariable, data: &CollationData) -> Result<()> {
        let top = data.get_last_primary_for_group(max_variable.reorder_code());
        if top == 0 {
            return Err(CollError::InvalidSetting(format!(
                "data has no {:?} group",
                max_variable
            )));
        }
        self.max_variable = max_variable;
        self.variable_top = top;
        Ok(())
    }

    /// Requested script order, empty if none
    pub fn reorder_codes(&self) -> &[i32] {
        &self.reorder_codes
    }

    /// Whether a non-identity script order is active
    #[inline]
    pub fn has_reordering(&self) -> bool {
        self.reorder_table.is_some()
    }

    /// Split-byte (limit, offset) pairs in effect
    pub fn reorder_ranges(&self) -> &[u32] {
        &self.reorder_ranges
    }

    /// Set the script order.
    ///
    /// An empty list, `[none]` or `[default]` removes any reordering. On error
    /// the settings are unchanged.
    pub fn set_reordering(&mut self, data: &CollationData, codes: &[i32]) -> Result<()> {
        if codes.is_empty()
            || (codes.len() == 1 && (codes[0] == REORDER_CODE_NONE || codes[0] == REORDER_CODE_DEFAULT))
        {
            self.reset_reordering();
            return Ok(());
        }
        let ranges = data.make_reorder_ranges(codes)?;
        if ranges.is_empty() {
            self.reset_reordering();
            return Ok(());
        }
        debug_assert!(ranges.len() >= 2);
        debug_assert!(ranges[0] & 0xffff == 0 && ranges[ranges.len() - 1] & 0xffff != 0);

        let mut table = Box::new([0u8; 256]);
        let mut b: usize = 0;
        let mut first_split_byte_range = None;
        for (i, &pair) in ranges.iter().enumerate() {
            let limit1 = (pair >> 24) as usize;
            while b < limit1 {
                table[b] = (b as u32).wrapping_add(pair) as u8;
                b += 1;
            }
            // A limit with a non-zero second byte splits its lead byte.
            if pair & 0xff_0000 != 0 {
                table[limit1] = 0;
                b = limit1 + 1;
                first_split_byte_range.get_or_insert(i);
            }
        }
        while b <= 0xff {
            table[b] = b as u8;
            b += 1;
        }

        self.min_high_no_reorder = ranges[ranges.len() - 1] & 0xffff_0000;
        self.reorder_ranges = match first_split_byte_range {
            Some(i) => ranges[i..].to_vec(),
            None => Vec::new(),
        };
        self.reorder_table = Some(table);
        self.reorder_codes = codes.to_vec();
        debug!(
            codes = ?codes,
            split_ranges = self.reorder_ranges.len(),
            "reordering set"
        );
        Ok(())
    }

    fn reset_reordering(&mut self) {
        self.reorder_codes.clear();
        self.reorder_table = None;
        self.min_high_no_reorder = 0;
        self.reorder_ranges.clear();
    }

    /// Map a primary into the configured script order.
    #[inline]
    pub fn reorder(&self, p: u32) -> u32 {
        let Some(table) = &self.reorder_table else {
            return p;
        };
        let b = table[(p >> 24) as usize] as u32;
        if b != 0 || p <= NO_CE_PRIMARY {
            (b << 24) | (p & 0xff_ffff)
        } else {
            self.reorder_ex(p)
        }
    }

    fn reorder_ex(&self, p: u32) -> u32 {
        if p >= self.min_high_no_reorder {
            return p;
        }
        // Round up so the low 16 bits compare above any offset bits.
        let q = p | 0xffff;
        let r = self
            .reorder_ranges
            .iter()
            .copied()
            .find(|&r| q < r)
            .unwrap_or(0);
        p.wrapping_add(((r as i16) as i32 as u32) << 24)
    }
}

impl fmt::Display for CollationSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "strength={:?} alternate={:?} case_first={:?} case_level={} backward_secondary={} max_variable={:?}",
            self.strength,
            self.alternate,
            self.case_first,
            self.case_level,
            self.backward_secondary,
            self.max_variable
        )?;
        if !self.reorder_codes.is_empty() {
            write!(f, " reorder={:?}", self.reorder_codes)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::sample_root;

    #[test]
    fn test_defaults() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        assert_eq!(settings.strength, Strength::Tertiary);
        assert!(!settings.is_shifted());
        assert_eq!(
            settings.variable_top(),
            data.get_last_primary_for_group(REORDER_CODE_PUNCTUATION)
        );
        assert!(!settings.has_reordering());
        assert_eq!(settings.reorder(0x2a05_0000), 0x2a05_0000);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("Shifted".parse::<AlternateHandling>().unwrap(), AlternateHandling::Shifted);
        assert_eq!("upper".parse::<CaseFirst>().unwrap(), CaseFirst::UpperFirst);
        assert_eq!("symbol".parse::<MaxVariable>().unwrap(), MaxVariable::Symbol);
        assert!(matches!(
            "sideways".parse::<CaseFirst>(),
            Err(CollError::InvalidSetting(_))
        ));
    }

    #[test]
    fn test_max_variable_moves_variable_top() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        let punct_top = settings.variable_top();
        settings.set_max_variable(MaxVariable::Space, &data).unwrap();
        assert!(settings.variable_top() < punct_top);
        settings.set_max_variable(MaxVariable::Currency, &data).unwrap();
        assert!(settings.variable_top() > punct_top);
    }

    #[test]
    fn test_reordering_moves_greek_before_latin() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.set_reordering(&data, &[SCRIPT_GREEK, SCRIPT_LATIN]).unwrap();
        assert!(settings.has_reordering());

        let latin = data.get_first_primary_for_group(SCRIPT_LATIN);
        let greek = data.get_first_primary_for_group(SCRIPT_GREEK);
        assert!(latin < greek);
        assert!(settings.reorder(greek) < settings.reorder(latin));

        // special groups and sentinels stay put
        let space = data.get_first_primary_for_group(REORDER_CODE_SPACE);
        assert_eq!(settings.reorder(space), space);
        assert_eq!(settings.reorder(0), 0);
        assert_eq!(settings.reorder(NO_CE_PRIMARY), NO_CE_PRIMARY);
        assert_eq!(settings.reorder(FIRST_UNASSIGNED_PRIMARY), FIRST_UNASSIGNED_PRIMARY);
    }

    #[test]
    fn test_reordering_reset() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.set_reordering(&data, &[SCRIPT_CYRILLIC]).unwrap();
        assert!(settings.has_reordering());
        settings.set_reordering(&data, &[REORDER_CODE_DEFAULT]).unwrap();
        assert!(!settings.has_reordering());
        assert!(settings.reorder_codes().is_empty());
    }

    #[test]
    fn test_invalid_reordering_leaves_settings_unchanged() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.set_reordering(&data, &[SCRIPT_GREEK]).unwrap();
        let before = settings.clone();
        let err = settings
            .set_reordering(&data, &[SCRIPT_LATIN, SCRIPT_LATIN])
            .unwrap_err();
        assert!(matches!(err, CollError::InvalidReorder(_)));
        assert_eq!(settings, before);
    }

    #[test]
    fn test_reorder_code_names() {
        assert_eq!(parse_reorder_code("Latn").unwrap(), SCRIPT_LATIN);
        assert_eq!(parse_reorder_code("greek").unwrap(), SCRIPT_GREEK);
        assert_eq!(parse_reorder_code("punct").unwrap(), REORDER_CODE_PUNCTUATION);
        assert_eq!(parse_reorder_code("Zzzz").unwrap(), REORDER_CODE_OTHERS);
        assert_eq!(parse_reorder_code("default").unwrap(), REORDER_CODE_DEFAULT);
        assert_eq!(parse_reorder_code("17").unwrap(), SCRIPT_HAN);
        assert!(matches!(
            parse_reorder_code("Klingon"),
            Err(CollError::InvalidReorder(_))
        ));
        assert_eq!(reorder_code_name(SCRIPT_HEBREW), Some("hebr"));
        assert_eq!(reorder_code_name(4242), None);
    }
}
