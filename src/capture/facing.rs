//! Facing mode selection.
//!
//! Mobile devices default to the back camera (pointing at the sheet),
//! everything else to the front camera.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// User-agent markers that identify a mobile device.
const MOBILE_MARKERS: &[&str] = &[
    "android",
    "webos",
    "iphone",
    "ipad",
    "ipod",
    "blackberry",
    "iemobile",
    "opera mini",
];

/// Which physical camera a capture session uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    Front,
    Back,
}

impl FacingMode {
    /// Preferred facing mode for a device with the given mobility.
    pub fn preferred(mobile: bool) -> Self {
        if mobile {
            FacingMode::Back
        } else {
            FacingMode::Front
        }
    }

    /// Preferred facing mode derived from a user-agent string.
    pub fn from_user_agent(user_agent: &str) -> Self {
        Self::preferred(is_mobile_user_agent(user_agent))
    }

    /// Preferred facing mode for the host this process runs on.
    pub fn for_host() -> Self {
        Self::preferred(matches!(std::env::consts::OS, "android" | "ios"))
    }

    /// The other camera.
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::Front => FacingMode::Back,
            FacingMode::Back => FacingMode::Front,
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Front => write!(f, "front"),
            FacingMode::Back => write!(f, "back"),
        }
    }
}

impl FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "front" | "user" => Ok(FacingMode::Front),
            "back" | "environment" => Ok(FacingMode::Back),
            other => Err(format!("unknown facing mode `{other}` (expected front or back)")),
        }
    }
}

/// Returns true when the user-agent string belongs to a mobile device.
pub fn is_mobile_user_agent(user_agent: &str) -> bool {
    let ua = user_agent.to_ascii_lowercase();
    MOBILE_MARKERS.iter().any(|marker| ua.contains(marker))
}
