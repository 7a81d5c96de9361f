//! Series identity.
//!
//! A series is identified by its family name plus the verbatim label block
//! text. Labels are not decomposed, so `{a="1",b="2"}` and `{b="2",a="1"}`
//! are two different series.

use std::fmt;

/// Stable key for one time series: `(family name, label-set text)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesKey {
    family: String,
    labels: String,
}

impl SeriesKey {
    pub fn new(family: impl Into<String>, labels: impl Into<String>) -> Self {
        Self {
            family: family.into(),
            labels: labels.into(),
        }
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Label block contents without the braces; empty for unlabeled series.
    pub fn labels(&self) -> &str {
        &self.labels
    }
}

impl fmt::Display for SeriesKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.labels.is_empty() {
            f.write_str(&self.family)
        } else {
            write!(f, "{}{{{}}}", self.family, self.labels)
        }
    }
}
