//! Duration selector: the minutes picked before a run starts

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{error::AlarmError, utils::format::minutes_label};

/// A validated alarm length in whole minutes, always within `1..=60`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Minutes(u32);

impl Minutes {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 60;

    /// Validate a raw minute count
    pub fn new(minutes: u32) -> Result<Self, AlarmError> {
        if (Self::MIN..=Self::MAX).contains(&minutes) {
            Ok(Self(minutes))
        } else {
            Err(AlarmError::DurationOutOfRange { minutes })
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Length of a run started with this duration
    pub fn as_seconds(self) -> u64 {
        u64::from(self.0) * 60
    }

    pub fn label(self) -> String {
        minutes_label(self.0)
    }
}

impl Default for Minutes {
    fn default() -> Self {
        Self(15)
    }
}

impl TryFrom<u32> for Minutes {
    type Error = AlarmError;

    fn try_from(minutes: u32) -> Result<Self, Self::Error> {
        Self::new(minutes)
    }
}

impl fmt::Display for Minutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// One entry of the picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationChoice {
    pub minutes: u32,
    pub label: String,
}

/// Holds the user's current selection
#[derive(Debug, Clone, Default)]
pub struct DurationSelector {
    selected: Minutes,
}

impl DurationSelector {
    pub fn new(selected: Minutes) -> Self {
        Self { selected }
    }

    pub fn selected(&self) -> Minutes {
        self.selected
    }

    /// Replace the selection; out-of-range values are rejected and the old value kept
    pub fn select(&mut self, minutes: u32) -> Result<Minutes, AlarmError> {
        self.selected = Minutes::new(minutes)?;
        Ok(self.selected)
    }

    /// Every value the picker offers, in ascending order
    pub fn choices() -> impl Iterator<Item = DurationChoice> {
        (Minutes::MIN..=Minutes::MAX).map(|minutes| DurationChoice {
            minutes,
            label: minutes_label(minutes),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_bounds() {
        assert_eq!(Minutes::new(1).map(Minutes::get), Ok(1));
        assert_eq!(Minutes::new(60).map(Minutes::get), Ok(60));
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            Minutes::new(0),
            Err(AlarmError::DurationOutOfRange { minutes: 0 })
        );
        assert_eq!(
            Minutes::try_from(61),
            Err(AlarmError::DurationOutOfRange { minutes: 61 })
        );
    }

    #[test]
    fn rejected_select_keeps_previous_value() {
        let mut selector = DurationSelector::default();
        assert_eq!(selector.selected().get(), 15);

        assert!(selector.select(90).is_err());
        assert_eq!(selector.selected().get(), 15);

        assert_eq!(selector.select(5).map(Minutes::get), Ok(5));
        assert_eq!(selector.selected().get(), 5);
    }

    #[test]
    fn choices_cover_full_range() {
        let choices: Vec<_> = DurationSelector::choices().collect();
        assert_eq!(choices.len(), 60);
        assert_eq!(choices[0].label, "1 minute");
        assert_eq!(choices[59].label, "60 minutes");
    }

    #[test]
    fn seconds_from_minutes() {
        assert_eq!(Minutes::new(25).map(Minutes::as_seconds), Ok(1500));
    }
}
