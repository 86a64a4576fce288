use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ShdwError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShadowDriveVersion {
    V1,
    #[default]
    V2,
}

impl ShadowDriveVersion {
    pub const ALL: [ShadowDriveVersion; 2] = [ShadowDriveVersion::V1, ShadowDriveVersion::V2];

    pub fn as_str(self) -> &'static str {
        match self {
            ShadowDriveVersion::V1 => "v1",
            ShadowDriveVersion::V2 => "v2",
        }
    }
}

impl fmt::Display for ShadowDriveVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShadowDriveVersion {
    type Err = ShdwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "v1" => Ok(ShadowDriveVersion::V1),
            "v2" => Ok(ShadowDriveVersion::V2),
            other => Err(ShdwError::Validation(format!("unknown version: {other}"))),
        }
    }
}
