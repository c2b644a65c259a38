//! # Responsive Property Overlay
//!
//! Each node carries base `props` plus one override map per breakpoint.
//! The effective view at a breakpoint is a shallow merge:
//!
//! ```text
//! effective(bp) = props ⊕ responsive_props[bp]
//! ```
//!
//! Nothing is cached here; the overlay is recomputed on every read.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// Property bag of a node (string, number, boolean or structured values)
pub type Props = Map<String, Value>;

/// Named responsive context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    #[default]
    Desktop,
    Tablet,
    Mobile,
}

impl Breakpoint {
    pub const ALL: [Breakpoint; 3] = [Breakpoint::Desktop, Breakpoint::Tablet, Breakpoint::Mobile];

    pub fn as_str(&self) -> &'static str {
        match self {
            Breakpoint::Desktop => "desktop",
            Breakpoint::Tablet => "tablet",
            Breakpoint::Mobile => "mobile",
        }
    }

    /// Nominal viewport width in CSS pixels
    pub fn viewport_width(&self) -> u32 {
        match self {
            Breakpoint::Desktop => 1280,
            Breakpoint::Tablet => 768,
            Breakpoint::Mobile => 375,
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown breakpoint: {0} (expected desktop, tablet or mobile)")]
pub struct UnknownBreakpoint(pub String);

impl FromStr for Breakpoint {
    type Err = UnknownBreakpoint;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desktop" => Ok(Breakpoint::Desktop),
            "tablet" => Ok(Breakpoint::Tablet),
            "mobile" => Ok(Breakpoint::Mobile),
            other => Err(UnknownBreakpoint(other.to_string())),
        }
    }
}

/// Per-breakpoint overrides. Absent maps read as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponsiveProps {
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub desktop: Props,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub tablet: Props,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub mobile: Props,
}

impl ResponsiveProps {
    pub fn get(&self, breakpoint: Breakpoint) -> &Props {
        match breakpoint {
            Breakpoint::Desktop => &self.desktop,
            Breakpoint::Tablet => &self.tablet,
            Breakpoint::Mobile => &self.mobile,
        }
    }

    pub fn get_mut(&mut self, breakpoint: Breakpoint) -> &mut Props {
        match breakpoint {
            Breakpoint::Desktop => &mut self.desktop,
            Breakpoint::Tablet => &mut self.tablet,
            Breakpoint::Mobile => &mut self.mobile,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.desktop.is_empty() && self.tablet.is_empty() && self.mobile.is_empty()
    }
}

/// Shallow-merge `partial` into `target` (later keys win)
pub fn merge_props(target: &mut Props, partial: &Props) {
    for (key, value) in partial {
        target.insert(key.clone(), value.clone());
    }
}

/// Compute the effective properties of a node at `breakpoint`
pub fn effective_props(base: &Props, overrides: &ResponsiveProps, breakpoint: Breakpoint) -> Props {
    let mut merged = base.clone();
    merge_props(&mut merged, overrides.get(breakpoint));
    merged
}
