//! igv.js track and browser configuration documents.
//!
//! Field names follow the igv.js configuration keys
//! (https://github.com/igvteam/igv.js/wiki/Tracks-2.0). Every field is
//! optional and omitted from the JSON when unset.

use serde::{Deserialize, Serialize};

/// Default colour for coverage and alignment tracks.
pub const DEFAULT_TRACK_COLOR: &str = "rgb(0, 0, 150)";

/// A single igv track descriptor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(rename = "indexURL", default, skip_serializing_if = "Option::is_none")]
    pub index_url: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub track_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(rename = "autoscale", default, skip_serializing_if = "is_false")]
    pub auto_scale: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed: Option<bool>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub auto_height: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub searchable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub guidelines: Vec<GuideLine>,
}

/// Horizontal reference line drawn on a wig track.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuideLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub dotted: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<i64>,
}

/// Genome reference: sequence, index and reference-bound tracks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub name: String,
    #[serde(rename = "fastaURL")]
    pub fasta_url: String,
    #[serde(rename = "indexURL")]
    pub index_url: String,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

/// Initial configuration handed to `igv.createBrowser`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BrowserConfig {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locus: Option<String>,
    pub reference: Reference,
    #[serde(default)]
    pub tracks: Vec<Track>,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl Track {
    /// Coverage track for a single BigWig file.
    pub fn wig(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            track_type: Some("wig".to_string()),
            color: Some(DEFAULT_TRACK_COLOR.to_string()),
            auto_scale: true,
            ..Default::default()
        }
    }

    /// Alignment track skeleton; name, url and index are filled from the group.
    pub fn alignment() -> Self {
        Self {
            track_type: Some("alignment".to_string()),
            format: Some("bam".to_string()),
            color: Some(DEFAULT_TRACK_COLOR.to_string()),
            auto_scale: true,
            ..Default::default()
        }
    }

    /// Feature annotation track (GFF3 by default).
    pub fn annotation(name: impl Into<String>, url: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            format: Some(format.into()),
            track_type: Some("annotation".to_string()),
            auto_height: true,
            ..Default::default()
        }
    }
}
