//! Exposition text -> [`Exposition`].

use crate::error::Result;
use crate::exposition::line::{Line, LineClassifier};
use crate::exposition::Exposition;

/// Reusable parser owning the compiled line patterns.
#[derive(Debug, Clone)]
pub struct Parser {
    classifier: LineClassifier,
}

impl Parser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            classifier: LineClassifier::new()?,
        })
    }

    /// Parse a full scrape body. Never fails: unusable lines are skipped.
    ///
    /// TYPE, HELP and sample lines of one family may come in any order.
    pub fn parse(&self, input: &str) -> Exposition {
        let mut out = Exposition::new();
        let mut skipped = 0usize;

        for line in input.lines() {
            match self.classifier.classify_line(line) {
                Line::Sample {
                    name,
                    labels,
                    value,
                    timestamp,
                } => out.family_mut(name).upsert(labels, value, timestamp),
                Line::TypeDecl { name, kind } => out.family_mut(name).kind = Some(kind),
                Line::HelpDecl { name, help } => out.family_mut(name).help = help.to_string(),
                Line::Unrecognized => {
                    if !line.trim().is_empty() && !line.starts_with('#') {
                        skipped += 1;
                        tracing::trace!(%line, "skipping unparseable exposition line");
                    }
                }
            }
        }

        if skipped > 0 {
            tracing::debug!(skipped, "exposition lines skipped");
        }
        out
    }
}

/// One-shot parse. Prefer a long-lived [`Parser`] on hot paths.
pub fn parse(input: &str) -> Result<Exposition> {
    Ok(Parser::new()?.parse(input))
}
