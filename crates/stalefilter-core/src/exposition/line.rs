//! Single-line classification (panic-free).
//!
//! Each line is looked at once: the prefix picks which of the three patterns
//! applies, so a line is never scanned by more than one regex.

use regex::Regex;

use crate::error::{Result, StaleFilterError};
use crate::exposition::MetricType;

const SAMPLE_PATTERN: &str = concat!(
    r"^([a-zA-Z_:][a-zA-Z0-9_:]*)",
    r"(?:\{([^}]*)\})?",
    r"[ \t]+([+-]?Inf|NaN|[+-]?(?:[0-9]+(?:\.[0-9]*)?|\.[0-9]+)(?:[eE][+-]?[0-9]+)?)",
    r"(?:[ \t]+(-?[0-9]+))?[ \t]*$",
);
const TYPE_PATTERN: &str =
    r"^# TYPE ([a-zA-Z_:][a-zA-Z0-9_:]*)[ \t]+(counter|gauge|histogram|summary|untyped)[ \t]*$";
const HELP_PATTERN: &str = r"^# HELP ([a-zA-Z_:][a-zA-Z0-9_:]*)(?: (.*))?$";

/// One classified exposition line, borrowing from the input.
#[derive(Debug, Clone, PartialEq)]
pub enum Line<'a> {
    /// `name[{labels}] value [timestamp]`
    Sample {
        name: &'a str,
        labels: &'a str,
        value: f64,
        timestamp: Option<i64>,
    },
    /// `# TYPE name kind`
    TypeDecl { name: &'a str, kind: MetricType },
    /// `# HELP name text`
    HelpDecl { name: &'a str, help: &'a str },
    /// Blank lines, free comments and anything malformed.
    Unrecognized,
}

/// Compiled line patterns. Build once, reuse for every scrape.
#[derive(Debug, Clone)]
pub struct LineClassifier {
    sample: Regex,
    type_decl: Regex,
    help_decl: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            sample: compile(SAMPLE_PATTERN)?,
            type_decl: compile(TYPE_PATTERN)?,
            help_decl: compile(HELP_PATTERN)?,
        })
    }

    pub fn classify_line<'a>(&self, line: &'a str) -> Line<'a> {
        if line.starts_with("# TYPE ") {
            self.type_decl(line)
        } else if line.starts_with("# HELP ") {
            self.help_decl(line)
        } else if line.starts_with('#') || line.trim().is_empty() {
            Line::Unrecognized
        } else {
            self.sample(line)
        }
    }

    fn sample<'a>(&self, line: &'a str) -> Line<'a> {
        let Some(caps) = self.sample.captures(line) else {
            return Line::Unrecognized;
        };
        let (Some(name), Some(raw_value)) = (caps.get(1), caps.get(3)) else {
            return Line::Unrecognized;
        };
        let Some(value) = parse_value(raw_value.as_str()) else {
            return Line::Unrecognized;
        };
        Line::Sample {
            name: name.as_str(),
            labels: caps.get(2).map_or("", |m| m.as_str()),
            value,
            timestamp: caps.get(4).and_then(|m| m.as_str().parse().ok()),
        }
    }

    fn type_decl<'a>(&self, line: &'a str) -> Line<'a> {
        let Some(caps) = self.type_decl.captures(line) else {
            return Line::Unrecognized;
        };
        match (caps.get(1), caps.get(2).map(|m| m.as_str().parse::<MetricType>())) {
            (Some(name), Some(Ok(kind))) => Line::TypeDecl {
                name: name.as_str(),
                kind,
            },
            _ => Line::Unrecognized,
        }
    }

    fn help_decl<'a>(&self, line: &'a str) -> Line<'a> {
        let Some(caps) = self.help_decl.captures(line) else {
            return Line::Unrecognized;
        };
        let Some(name) = caps.get(1) else {
            return Line::Unrecognized;
        };
        Line::HelpDecl {
            name: name.as_str(),
            help: caps.get(2).map_or("", |m| m.as_str()),
        }
    }
}

/// Parse a sample value. Accepts the exposition spellings of the special
/// values plus anything `f64::from_str` takes.
pub fn parse_value(s: &str) -> Option<f64> {
    match s {
        "+Inf" | "Inf" => Some(f64::INFINITY),
        "-Inf" => Some(f64::NEG_INFINITY),
        "NaN" => Some(f64::NAN),
        _ => s.parse().ok(),
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern)
        .map_err(|e| StaleFilterError::Internal(format!("line pattern failed to compile: {e}")))
}
