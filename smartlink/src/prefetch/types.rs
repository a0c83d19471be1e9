//! Core value types for link prefetching.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Error parsing one of the prefetch value types from text.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid {kind} '{input}' - expected one of: {expected}")]
pub struct ParseValueError {
    kind: &'static str,
    input: String,
    expected: &'static str,
}

impl ParseValueError {
    fn new(kind: &'static str, input: &str, expected: &'static str) -> Self {
        Self {
            kind,
            input: input.to_string(),
            expected,
        }
    }
}

/// Declared importance of a link's destination.
///
/// Higher priorities tolerate worse networks before prefetching is denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PriorityClass {
    High,
    #[default]
    Medium,
    Low,
}

impl PriorityClass {
    /// All priorities, highest first.
    pub const ALL: [PriorityClass; 3] = [Self::High, Self::Medium, Self::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Which networks this priority prefetches on, for user-facing help text.
    pub fn network_description(&self) -> &'static str {
        match self {
            Self::High => "prefetches on all networks except slow-2g",
            Self::Medium => "prefetches on 3g and better",
            Self::Low => "prefetches only on 4g",
        }
    }
}

impl fmt::Display for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PriorityClass {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(ParseValueError::new("priority", s, "high, medium, low")),
        }
    }
}

/// Coarse bucket summarizing current connection quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EffectiveClass {
    Slow2G,
    TwoG,
    ThreeG,
    #[default]
    FourG,
}

impl EffectiveClass {
    /// All classes, slowest first.
    pub const ALL: [EffectiveClass; 4] = [Self::Slow2G, Self::TwoG, Self::ThreeG, Self::FourG];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Slow2G => "slow-2g",
            Self::TwoG => "2g",
            Self::ThreeG => "3g",
            Self::FourG => "4g",
        }
    }
}

impl fmt::Display for EffectiveClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EffectiveClass {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "slow-2g" | "slow2g" => Ok(Self::Slow2G),
            "2g" => Ok(Self::TwoG),
            "3g" => Ok(Self::ThreeG),
            "4g" => Ok(Self::FourG),
            _ => Err(ParseValueError::new(
                "network class",
                s,
                "slow-2g, 2g, 3g, 4g",
            )),
        }
    }
}

/// Point-in-time reading of network conditions.
///
/// The default is the most capable class with data saving off, so links
/// prefetch optimistically until a reading says otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetworkSnapshot {
    pub effective_class: EffectiveClass,
    /// User or platform asked to reduce data usage.
    pub reduced_data: bool,
}

impl NetworkSnapshot {
    pub fn new(effective_class: EffectiveClass, reduced_data: bool) -> Self {
        Self {
            effective_class,
            reduced_data,
        }
    }
}

impl fmt::Display for NetworkSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.effective_class)?;
        if self.reduced_data {
            write!(f, " (Data Saver)")?;
        }
        Ok(())
    }
}

/// Normalized destination of a link.
///
/// Derived once from the declared destination and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LinkTarget(String);

impl LinkTarget {
    /// Use a plain destination string verbatim.
    pub fn new(href: impl Into<String>) -> Self {
        Self(href.into())
    }

    /// Normalize a structured destination: its path, or `/` when absent.
    pub fn from_pathname(pathname: Option<&str>) -> Self {
        match pathname {
            Some(path) if !path.is_empty() => Self(path.to_string()),
            _ => Self("/".to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the destination is a path on this site.
    ///
    /// Absolute URLs and protocol-relative `//host` forms are external.
    pub fn is_site_local(&self) -> bool {
        self.0.starts_with('/') && !self.0.starts_with("//")
    }
}

impl fmt::Display for LinkTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LinkTarget {
    fn from(href: &str) -> Self {
        Self::new(href)
    }
}

/// Lifecycle of a link's prefetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrefetchStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
    Retrying,
}

impl PrefetchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Success => "success",
            Self::Error => "error",
            Self::Retrying => "retrying",
        }
    }

    /// No further automatic attempts happen from this state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::Error)
    }
}

impl fmt::Display for PrefetchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
