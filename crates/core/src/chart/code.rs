//! Dot-hierarchical account codes.
//!
//! A code such as `120.01.001` is a sequence of segments. The first segment
//! names the top-level (ledger) account the code rolls up into.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::ChartError;

/// Separator between code segments.
pub const SEGMENT_SEPARATOR: char = '.';

/// A validated account code.
///
/// Ordering is segment-wise. Two numeric segments compare as numbers
/// (`"99" < "100"`), otherwise segments compare as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AccountCode(String);

impl AccountCode {
    /// Parses and validates an account code.
    ///
    /// # Errors
    ///
    /// Returns `ChartError::InvalidCode` if the code is empty, has an empty
    /// segment, or contains anything other than ASCII letters and digits
    /// between separators.
    pub fn parse(raw: &str) -> Result<Self, ChartError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ChartError::InvalidCode {
                code: raw.to_string(),
                reason: "code is empty",
            });
        }

        for segment in trimmed.split(SEGMENT_SEPARATOR) {
            if segment.is_empty() {
                return Err(ChartError::InvalidCode {
                    code: raw.to_string(),
                    reason: "code has an empty segment",
                });
            }
            if !segment.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ChartError::InvalidCode {
                    code: raw.to_string(),
                    reason: "segments may only contain letters and digits",
                });
            }
        }

        Ok(Self(trimmed.to_string()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Iterates over the code's segments.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEGMENT_SEPARATOR)
    }

    /// Number of segments in the code.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        self.segments().count()
    }

    /// The first segment, i.e. the top-level account this code belongs to.
    #[must_use]
    pub fn top_level(&self) -> &str {
        self.0
            .split(SEGMENT_SEPARATOR)
            .next()
            .unwrap_or(self.0.as_str())
    }

    /// Returns true if this code is `other` or lies beneath it.
    ///
    /// Matching is segment-wise: `120` covers `120.01` but not `1200`.
    #[must_use]
    pub fn starts_with(&self, other: &AccountCode) -> bool {
        let mut mine = self.segments();
        other.segments().all(|segment| mine.next() == Some(segment))
    }
}

fn compare_segment(a: &str, b: &str) -> Ordering {
    let numeric = |s: &str| !s.is_empty() && s.bytes().all(|c| c.is_ascii_digit());
    if numeric(a) && numeric(b) {
        let a_trim = a.trim_start_matches('0');
        let b_trim = b.trim_start_matches('0');
        // Longer digit string is larger once leading zeros are gone.
        a_trim
            .len()
            .cmp(&b_trim.len())
            .then_with(|| a_trim.cmp(b_trim))
            .then_with(|| a.len().cmp(&b.len()))
    } else {
        a.cmp(b)
    }
}

impl Ord for AccountCode {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.segments();
        let mut right = other.segments();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                (None, Some(_)) => return Ordering::Less,
                (Some(_), None) => return Ordering::Greater,
                (Some(a), Some(b)) => match compare_segment(a, b) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                },
            }
        }
    }
}

impl PartialOrd for AccountCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AccountCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for AccountCode {
    type Error = ChartError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<AccountCode> for String {
    fn from(code: AccountCode) -> Self {
        code.0
    }
}

impl std::str::FromStr for AccountCode {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}
