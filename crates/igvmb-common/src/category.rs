//! Track categories and the backend paths that serve them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::IgvError;

/// Path of the default browser configuration.
pub const DEFAULT_CONFIG_PATH: &str = "/data/default";

/// Category of loadable track, each served under its own path prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackCategory {
    BigWig,
    Bam,
}

impl TrackCategory {
    /// Fixed prefix; the group identifier is appended verbatim.
    pub fn path_prefix(self) -> &'static str {
        match self {
            TrackCategory::BigWig => "/data/bigWigsTrack/",
            TrackCategory::Bam => "/data/bamTrack/",
        }
    }

    /// Full request path for a group id. The id is an opaque segment and is
    /// not escaped.
    pub fn path_for(self, id: &str) -> String {
        format!("{}{}", self.path_prefix(), id)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TrackCategory::BigWig => "bigwig",
            TrackCategory::Bam => "bam",
        }
    }
}

impl fmt::Display for TrackCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrackCategory {
    type Err = IgvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bigwig" | "bigwigs" | "wig" => Ok(TrackCategory::BigWig),
            "bam" => Ok(TrackCategory::Bam),
            other => Err(IgvError::UnknownCategory(other.to_string())),
        }
    }
}
