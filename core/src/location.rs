use std::fmt;

use serde::{Deserialize, Serialize};

/// A source position as reported by the front end. `file` is empty for
/// positions inside nodes the front end synthesized itself.
#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize, column: usize) -> Self {
        Location { file: file.into(), line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.file.is_empty() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            write!(f, "{}:{}:{}", self.file, self.line, self.column)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: Location,
    pub end: Location,
}

impl Span {
    pub fn new(start: Location, end: Location) -> Self {
        Span { start, end }
    }

    /// Zero-width span at `at`; diagnostics only ever carry a start position.
    pub fn point(at: Location) -> Self {
        Span { end: at.clone(), start: at }
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{} - {}", self.start, self.end)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_location_omits_file() {
        assert_eq!(Location::new("", 3, 7).to_string(), "3:7");
        assert_eq!(Location::new("demo/A.java", 3, 7).to_string(), "demo/A.java:3:7");
    }

    #[test]
    fn point_span_prints_once() {
        let at = Location::new("A.java", 1, 2);
        assert_eq!(Span::point(at.clone()).to_string(), "A.java:1:2");
        assert_eq!(Span::new(at, Location::new("A.java", 1, 9)).to_string(), "A.java:1:2 - A.java:1:9");
    }
}
