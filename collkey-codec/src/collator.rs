//! Collator facade
//!
//! Ties data, settings and the sort key writer together. A collator owns
//! `Arc`s to both; cloning one is cheap and the clones share settings until
//! one of them changes a setting.

use crate::data::CollationData;
use crate::iter::CodePointCeIterator;
use crate::settings::{CollationSettings, MaxVariable};
use crate::sort_key::{write_sort_key_up_to_quaternary, AllLevels, LevelCallback};
use collkey_format::bocsu::write_identical_level_run;
use collkey_format::constants::{LEVEL_SEPARATOR_BYTE, TERMINATOR_BYTE};
use collkey_format::{Level, Result, SortKeyByteSink, Strength, VecSink};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::trace;

/// Append the identical level: a level separator and the BOCSU run of
/// `code_points`.
pub fn write_identical_level(code_points: &[u32], sink: &mut dyn SortKeyByteSink) -> Result<()> {
    sink.append_byte(LEVEL_SEPARATOR_BYTE);
    write_identical_level_run(0, code_points, sink)?;
    Ok(())
}

/// Sort key generator over shared collation data
#[derive(Debug, Clone)]
pub struct Collator {
    data: Arc<CollationData>,
    settings: Arc<CollationSettings>,
}

impl Collator {
    /// Collator with default settings for `data`
    pub fn new(data: Arc<CollationData>) -> Self {
        let settings = Arc::new(CollationSettings::new(&data));
        Self { data, settings }
    }

    /// Collator sharing an existing settings object
    pub fn with_settings(data: Arc<CollationData>, settings: Arc<CollationSettings>) -> Self {
        Self { data, settings }
    }

    /// Collation data in use
    pub fn data(&self) -> &Arc<CollationData> {
        &self.data
    }

    /// Current settings
    pub fn settings(&self) -> &CollationSettings {
        &self.settings
    }

    /// Shared handle to the current settings
    pub fn shared_settings(&self) -> Arc<CollationSettings> {
        Arc::clone(&self.settings)
    }

    /// Settings for modification; cloned first if another collator shares them.
    pub fn settings_mut(&mut self) -> &mut CollationSettings {
        Arc::make_mut(&mut self.settings)
    }

    /// Whether both collators use the very same settings object
    pub fn shares_settings_with(&self, other: &Collator) -> bool {
        Arc::ptr_eq(&self.settings, &other.settings)
    }

    /// Set the comparison strength
    pub fn set_strength(&mut self, strength: Strength) {
        if self.settings.strength != strength {
            self.settings_mut().strength = strength;
        }
    }

    /// Set the variable group boundary for shifted alternate handling
    pub fn set_max_variable(&mut self, max_variable: MaxVariable) -> Result<()> {
        if self.settings.max_variable() == max_variable {
            return Ok(());
        }
        let data = Arc::clone(&self.data);
        self.settings_mut().set_max_variable(max_variable, &data)
    }

    /// Set the script reordering; on error the settings are unchanged
    pub fn set_reordering(&mut self, codes: &[i32]) -> Result<()> {
        if self.settings.reorder_codes() == codes {
            return Ok(());
        }
        let mut settings = (*self.settings).clone();
        settings.set_reordering(&self.data, codes)?;
        self.settings = Arc::new(settings);
        Ok(())
    }

    /// Sort key for `s`, terminator included
    pub fn sort_key(&self, s: &str) -> Result<Vec<u8>> {
        let mut sink = VecSink::with_capacity(s.len() * 3 + 8);
        self.sort_key_into(s, &mut sink)?;
        Ok(sink.into_bytes())
    }

    /// Append the sort key for `s` to `sink`
    pub fn sort_key_into(&self, s: &str, sink: &mut dyn SortKeyByteSink) -> Result<()> {
        let code_points: Vec<u32> = s.chars().map(u32::from).collect();
        self.code_point_sort_key_into(&code_points, sink)
    }

    /// Append the sort key for a code point sequence to `sink`.
    ///
    /// The input should be in NFD; no normalization happens here.
    pub fn code_point_sort_key_into(
        &self,
        code_points: &[u32],
        sink: &mut dyn SortKeyByteSink,
    ) -> Result<()> {
        self.partial_sort_key_into(code_points, Level::Primary, &mut AllLevels, sink)?;
        sink.append_byte(TERMINATOR_BYTE);
        trace!(
            code_points = code_points.len(),
            key_len = sink.number_of_bytes_appended(),
            overflowed = sink.overflowed(),
            "sort key"
        );
        Ok(())
    }

    /// Write the levels from `min_level` on that `callback` accepts,
    /// without the terminator.
    pub fn partial_sort_key_into(
        &self,
        code_points: &[u32],
        min_level: Level,
        callback: &mut dyn LevelCallback,
        sink: &mut dyn SortKeyByteSink,
    ) -> Result<()> {
        let mut iter = CodePointCeIterator::new(&self.data, code_points);
        write_sort_key_up_to_quaternary(
            &mut iter,
            self.data.compressible_bytes(),
            &self.settings,
            sink,
            min_level,
            callback,
            false,
        )?;
        if self.settings.strength == Strength::Identical
            && !(sink.overflowed() && min_level == Level::Primary)
            && callback.need_to_write(Level::Identical)
        {
            write_identical_level(code_points, sink)?;
        }
        Ok(())
    }

    /// Compare two strings by their sort keys
    pub fn compare(&self, a: &str, b: &str) -> Result<Ordering> {
        Ok(self.sort_key(a)?.cmp(&self.sort_key(b)?))
    }
}
