//! Build igv documents from catalog entries.

use igvmb_common::{BrowserConfig, Reference, Track};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

use crate::catalog::{AnnotationFile, ObjectGroup, ReferenceFiles};

/// Listing key used by the browser page.
pub const ALL_GROUPS: &str = "ALL";

/// Entry of the browser page drop-down.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileGroup {
    pub group_id: String,
    pub group_name: String,
    pub objects: Vec<FileDescription>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileDescription {
    pub id: String,
    pub name: String,
}

pub fn default_browser_config(reference: &ReferenceFiles, annotation: Option<&AnnotationFile>) -> BrowserConfig {
    let reference_tracks = annotation
        .map(|a| vec![Track::annotation(&a.name, &a.url, &a.format)])
        .unwrap_or_default();

    BrowserConfig {
        id: reference.id.clone(),
        name: reference.name.clone(),
        locus: reference.locus.clone(),
        reference: Reference {
            id: reference.id.clone(),
            name: reference.name.clone(),
            fasta_url: reference.fasta_url.clone(),
            index_url: reference.index_url.clone(),
            tracks: reference_tracks,
        },
        tracks: Vec::new(),
    }
}

/// One wig track per file in the group.
pub fn bigwig_tracks(group: &ObjectGroup) -> Vec<Track> {
    group
        .objects
        .iter()
        .map(|o| Track::wig(&o.filename, &o.url))
        .collect()
}

/// One alignment track per group: the `.bam` file plus its `.bam.bai` index.
pub fn bam_tracks(group: &ObjectGroup) -> Vec<Track> {
    if group.objects.len() < 2 {
        warn!(group = %group.id, objects = group.objects.len(), "Not enough objects in object group for bam file");
    }

    let mut track = Track::alignment();
    for object in &group.objects {
        if object.filename.ends_with(".bam") {
            track.name = Some(object.filename.clone());
            track.url = Some(object.url.clone());
        } else if object.filename.ends_with(".bam.bai") {
            track.index_url = Some(object.url.clone());
        }
    }
    if track.url.is_none() {
        warn!(group = %group.id, "No .bam file in object group");
    }
    vec![track]
}

/// BigWig groups named after their files minus the trailing `_` segment
/// (`wt_fwd.bw` -> `wt`).
pub fn bigwig_listing(groups: &[ObjectGroup]) -> BTreeMap<String, Vec<FileGroup>> {
    let entries: Vec<FileGroup> = groups
        .iter()
        .map(|group| {
            let group_name = group
                .objects
                .last()
                .map(|o| strip_last_segment(&o.filename))
                .unwrap_or_else(|| group.name.clone());
            FileGroup {
                group_id: group.id.clone(),
                group_name,
                objects: group
                    .objects
                    .iter()
                    .map(|o| FileDescription { id: o.id.clone(), name: o.filename.clone() })
                    .collect(),
            }
        })
        .collect();
    BTreeMap::from([(ALL_GROUPS.to_string(), entries)])
}

/// BAM groups named after their first file; empty groups are left out.
pub fn bam_listing(groups: &[ObjectGroup]) -> BTreeMap<String, Vec<FileGroup>> {
    let entries: Vec<FileGroup> = groups
        .iter()
        .filter_map(|group| {
            let Some(first) = group.objects.first() else {
                warn!(group = %group.id, name = %group.name, "Object group has no associated objects");
                return None;
            };
            Some(FileGroup {
                group_id: group.id.clone(),
                group_name: first.filename.clone(),
                objects: Vec::new(),
            })
        })
        .collect();
    BTreeMap::from([(ALL_GROUPS.to_string(), entries)])
}

fn strip_last_segment(filename: &str) -> String {
    match filename.rsplit_once('_') {
        Some((head, _)) => head.to_string(),
        None => filename.to_string(),
    }
}
