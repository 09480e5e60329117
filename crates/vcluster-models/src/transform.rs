//! Per-frame transform definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The closed set of transforms a worker can apply to a frame.
///
/// A worker picks exactly one at startup and keeps it for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrameTransform {
    /// Frame passes through unchanged
    #[default]
    Identity,
    /// Color negative
    Invert,
    /// Luma only, emitted as RGB
    Grayscale,
    /// Laplacian edge detection on luma
    EdgeDetect,
    /// Gaussian blur
    Blur,
    /// Warm brown tone
    Sepia,
}

impl FrameTransform {
    pub const ALL: &'static [FrameTransform] = &[
        FrameTransform::Identity,
        FrameTransform::Invert,
        FrameTransform::Grayscale,
        FrameTransform::EdgeDetect,
        FrameTransform::Blur,
        FrameTransform::Sepia,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FrameTransform::Identity => "identity",
            FrameTransform::Invert => "invert",
            FrameTransform::Grayscale => "grayscale",
            FrameTransform::EdgeDetect => "edge_detect",
            FrameTransform::Blur => "blur",
            FrameTransform::Sepia => "sepia",
        }
    }
}

impl fmt::Display for FrameTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error returned when parsing an unknown transform name.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown transform '{0}' (expected one of: identity, invert, grayscale, edge_detect, blur, sepia)")]
pub struct TransformParseError(pub String);

impl FromStr for FrameTransform {
    type Err = TransformParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "identity" | "none" | "" => Ok(FrameTransform::Identity),
            "invert" => Ok(FrameTransform::Invert),
            "grayscale" | "gray" | "greyscale" => Ok(FrameTransform::Grayscale),
            "edge_detect" | "edge-detect" | "edges" => Ok(FrameTransform::EdgeDetect),
            "blur" => Ok(FrameTransform::Blur),
            "sepia" => Ok(FrameTransform::Sepia),
            other => Err(TransformParseError(other.to_string())),
        }
    }
}
