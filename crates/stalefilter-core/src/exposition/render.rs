//! [`Exposition`] -> exposition text, keeping only LIVE series.

use std::fmt::Write;

use crate::exposition::{Exposition, MetricFamily};
use crate::tracker::Classification;

/// Render the LIVE series of `scrape`.
///
/// A family gets its `# HELP`/`# TYPE` preamble only when at least one of its
/// series is LIVE. Histogram and summary families never appear. Timestamps
/// are dropped.
pub fn render(scrape: &Exposition, verdicts: &Classification) -> String {
    let mut out = String::new();
    for family in scrape.supported_families() {
        render_family(family, verdicts, &mut out);
    }
    out
}

fn render_family(family: &MetricFamily, verdicts: &Classification, out: &mut String) {
    let name = family.name.as_str();
    let mut live = family
        .series()
        .iter()
        .filter(|s| verdicts.is_live(name, &s.labels))
        .peekable();

    if live.peek().is_none() {
        return;
    }

    if family.help.is_empty() {
        let _ = writeln!(out, "# HELP {name}");
    } else {
        let _ = writeln!(out, "# HELP {} {}", name, family.help);
    }
    let _ = writeln!(out, "# TYPE {} {}", name, family.metric_type());

    for s in live {
        let value = format_value(s.value);
        if s.labels.is_empty() {
            let _ = writeln!(out, "{name} {value}");
        } else {
            let _ = writeln!(out, "{}{{{}}} {}", name, s.labels, value);
        }
    }
}

/// Format a sample value so that parsing it back yields the same `f64`.
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        return "NaN".into();
    }
    if v.is_infinite() {
        return if v > 0.0 { "+Inf".into() } else { "-Inf".into() };
    }
    let abs = v.abs();
    if abs != 0.0 && !(1e-6..1e21).contains(&abs) {
        format!("{v:e}")
    } else {
        format!("{v}")
    }
}
