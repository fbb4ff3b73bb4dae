//! Rectangles and viewport margins in document coordinates (px, y down).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// An axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Overlap of two rectangles. Rectangles that only share an edge
    /// intersect in a zero-area rectangle; disjoint ones return `None`.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Grow (positive margins) or shrink (negative margins) each side
    pub fn expand(&self, margin: &RootMargin) -> Rect {
        Rect::new(
            self.x - margin.left,
            self.y - margin.top,
            (self.width + margin.left + margin.right).max(0.0),
            (self.height + margin.top + margin.bottom).max(0.0),
        )
    }
}

/// Per-side viewport adjustment, in px, following the CSS margin shorthand.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RootMargin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl RootMargin {
    pub const ZERO: RootMargin = RootMargin::uniform(0.0);

    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    pub const fn uniform(px: f64) -> Self {
        Self::new(px, px, px, px)
    }
}

/// Invalid root margin string
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarginParseError {
    #[error("root margin must have 1 to 4 values, got {0}")]
    ValueCount(usize),

    #[error("invalid root margin value `{0}` (expected px, e.g. `-50px`)")]
    InvalidValue(String),
}

impl FromStr for RootMargin {
    type Err = MarginParseError;

    /// Parse `"10px"`, `"10px 20px"`, `"10px 20px 30px"` or
    /// `"0px 0px -50px 0px"`. The `px` suffix is optional.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split_whitespace()
            .map(parse_px)
            .collect::<Result<Vec<f64>, _>>()?;

        match values.as_slice() {
            [all] => Ok(Self::uniform(*all)),
            [vertical, horizontal] => Ok(Self::new(*vertical, *horizontal, *vertical, *horizontal)),
            [top, horizontal, bottom] => Ok(Self::new(*top, *horizontal, *bottom, *horizontal)),
            [top, right, bottom, left] => Ok(Self::new(*top, *right, *bottom, *left)),
            other => Err(MarginParseError::ValueCount(other.len())),
        }
    }
}

fn parse_px(token: &str) -> Result<f64, MarginParseError> {
    let number = token.strip_suffix("px").unwrap_or(token);
    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(MarginParseError::InvalidValue(token.to_string())),
    }
}

impl fmt::Display for RootMargin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}px {}px {}px {}px",
            self.top, self.right, self.bottom, self.left
        )
    }
}

impl Serialize for RootMargin {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RootMargin {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Px(f64),
            Css(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Px(px) => Ok(RootMargin::uniform(px)),
            Repr::Css(css) => css.parse().map_err(serde::de::Error::custom),
        }
    }
}
