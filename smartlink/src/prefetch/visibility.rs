//! Visibility notifier options.
//!
//! The link does not observe element visibility itself. Whatever does (an
//! intersection observer, a scroll tracker, a terminal viewport) is configured
//! from these options and reports enter/leave transitions back to the link.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Default proximity margin around the viewport.
pub const DEFAULT_PROXIMITY_MARGIN: &str = "200px";

/// Default fraction of the element that must be visible.
pub const DEFAULT_INTERSECTION_THRESHOLD: f64 = 0.1;

/// Error parsing a margin string.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid margin '{input}' - expected 1 to 4 lengths like '200px' or '10%'")]
pub struct MarginParseError {
    input: String,
}

impl MarginParseError {
    fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// One side of a margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarginLength {
    Pixels(f64),
    Percent(f64),
}

impl MarginLength {
    fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if let Some(num) = lower.strip_suffix("px") {
            num.trim().parse().ok().map(Self::Pixels)
        } else if let Some(num) = lower.strip_suffix('%') {
            num.trim().parse().ok().map(Self::Percent)
        } else {
            // Bare zero is the only unitless length allowed.
            match lower.parse::<f64>() {
                Ok(n) if n == 0.0 => Some(Self::Pixels(0.0)),
                _ => None,
            }
        }
    }
}

impl fmt::Display for MarginLength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pixels(n) => write!(f, "{}px", n),
            Self::Percent(n) => write!(f, "{}%", n),
        }
    }
}

/// Margin grown around the viewport before intersection is tested.
///
/// Accepts the CSS shorthand: one value for all sides, two for
/// vertical/horizontal, three for top/horizontal/bottom, four for
/// top/right/bottom/left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProximityMargin {
    pub top: MarginLength,
    pub right: MarginLength,
    pub bottom: MarginLength,
    pub left: MarginLength,
}

impl ProximityMargin {
    pub fn uniform(length: MarginLength) -> Self {
        Self {
            top: length,
            right: length,
            bottom: length,
            left: length,
        }
    }
}

impl Default for ProximityMargin {
    fn default() -> Self {
        Self::uniform(MarginLength::Pixels(200.0))
    }
}

impl FromStr for ProximityMargin {
    type Err = MarginParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s
            .split_whitespace()
            .map(|p| MarginLength::parse(p).ok_or_else(|| MarginParseError::new(s)))
            .collect::<Result<Vec<_>, _>>()?;

        match parts.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self {
                top: *vertical,
                right: *horizontal,
                bottom: *vertical,
                left: *horizontal,
            }),
            [top, horizontal, bottom] => Ok(Self {
                top: *top,
                right: *horizontal,
                bottom: *bottom,
                left: *horizontal,
            }),
            [top, right, bottom, left] => Ok(Self {
                top: *top,
                right: *right,
                bottom: *bottom,
                left: *left,
            }),
            _ => Err(MarginParseError::new(s)),
        }
    }
}

impl fmt::Display for ProximityMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.top == self.right && self.top == self.bottom && self.top == self.left {
            write!(f, "{}", self.top)
        } else {
            write!(f, "{} {} {} {}", self.top, self.right, self.bottom, self.left)
        }
    }
}

/// Configuration handed to the visibility notifier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityOptions {
    pub proximity_margin: ProximityMargin,
    /// Fraction of the element (0.0–1.0) that must intersect.
    pub intersection_threshold: f64,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            proximity_margin: ProximityMargin::default(),
            intersection_threshold: DEFAULT_INTERSECTION_THRESHOLD,
        }
    }
}
