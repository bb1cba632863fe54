use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Per-channel combination of a base pixel with a lens pixel, applied before
/// alpha weighting. Values are normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlendMode {
    #[default]
    Normal,
    SoftLight,
    Overlay,
}

impl BlendMode {
    pub const ALL: [BlendMode; 3] = [BlendMode::Normal, BlendMode::SoftLight, BlendMode::Overlay];

    pub fn apply(self, base: f32, overlay: f32) -> f32 {
        match self {
            BlendMode::Normal => overlay,
            BlendMode::SoftLight => soft_light(base, overlay),
            BlendMode::Overlay => {
                if base <= 0.5 {
                    2.0 * base * overlay
                } else {
                    1.0 - 2.0 * (1.0 - base) * (1.0 - overlay)
                }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BlendMode::Normal => "normal",
            BlendMode::SoftLight => "soft_light",
            BlendMode::Overlay => "overlay",
        }
    }
}

/// W3C compositing soft light.
fn soft_light(base: f32, overlay: f32) -> f32 {
    if overlay <= 0.5 {
        base - (1.0 - 2.0 * overlay) * base * (1.0 - base)
    } else {
        let d = if base <= 0.25 {
            ((16.0 * base - 12.0) * base + 4.0) * base
        } else {
            base.sqrt()
        };
        base + (2.0 * overlay - 1.0) * (d - base)
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(BlendMode::Normal),
            "soft_light" => Ok(BlendMode::SoftLight),
            "overlay" => Ok(BlendMode::Overlay),
            other => Err(format!(
                "unknown blend mode '{other}' (expected normal, soft_light or overlay)"
            )),
        }
    }
}
