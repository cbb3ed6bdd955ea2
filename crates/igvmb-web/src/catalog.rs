//! Dataset catalog: where reference, annotation and track files live.

use async_trait::async_trait;
use igvmb_common::{IgvError, Result, TrackCategory};
use serde::Serialize;

use crate::config::{Config, GroupConfig};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataObject {
    pub id: String,
    pub filename: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObjectGroup {
    pub id: String,
    pub name: String,
    pub objects: Vec<DataObject>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceFiles {
    pub id: String,
    pub name: String,
    pub fasta_url: String,
    pub index_url: String,
    pub locus: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationFile {
    pub name: String,
    pub url: String,
    pub format: String,
}

/// Source of dataset metadata and download links.
#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    async fn reference(&self) -> Result<ReferenceFiles>;

    async fn annotation(&self) -> Result<Option<AnnotationFile>>;

    /// All groups of one category, in catalog order.
    async fn object_groups(&self, kind: TrackCategory) -> Result<Vec<ObjectGroup>>;

    /// A single group; `GroupNotFound` if `id` is unknown for this category.
    async fn object_group(&self, kind: TrackCategory, id: &str) -> Result<ObjectGroup>;
}

/// Catalog fixed at startup from the configuration file.
#[derive(Debug, Clone)]
pub struct StaticCatalog {
    reference: ReferenceFiles,
    annotation: Option<AnnotationFile>,
    bigwigs: Vec<ObjectGroup>,
    bam: Vec<ObjectGroup>,
}

impl StaticCatalog {
    pub fn from_config(config: &Config) -> Self {
        let reference = ReferenceFiles {
            id: config.reference.id.clone(),
            name: config
                .reference
                .name
                .clone()
                .unwrap_or_else(|| config.reference.id.clone()),
            fasta_url: config.reference.fasta_url.clone(),
            index_url: config.reference.index_url.clone(),
            locus: config.reference.locus.clone(),
        };

        let annotation = config.annotation.as_ref().map(|a| AnnotationFile {
            name: a.name.clone(),
            url: a.url.clone(),
            format: a.format.clone(),
        });

        Self {
            reference,
            annotation,
            bigwigs: config.bigwigs.iter().map(group_from_config).collect(),
            bam: config.bam.iter().map(group_from_config).collect(),
        }
    }

    fn groups(&self, kind: TrackCategory) -> &[ObjectGroup] {
        match kind {
            TrackCategory::BigWig => &self.bigwigs,
            TrackCategory::Bam => &self.bam,
        }
    }
}

fn group_from_config(group: &GroupConfig) -> ObjectGroup {
    ObjectGroup {
        id: group.id.clone(),
        name: group.name.clone(),
        objects: group
            .objects
            .iter()
            .map(|o| DataObject {
                id: o.id.clone().unwrap_or_else(|| o.filename.clone()),
                filename: o.filename.clone(),
                url: o.url.clone(),
            })
            .collect(),
    }
}

#[async_trait]
impl DatasetCatalog for StaticCatalog {
    async fn reference(&self) -> Result<ReferenceFiles> {
        Ok(self.reference.clone())
    }

    async fn annotation(&self) -> Result<Option<AnnotationFile>> {
        Ok(self.annotation.clone())
    }

    async fn object_groups(&self, kind: TrackCategory) -> Result<Vec<ObjectGroup>> {
        Ok(self.groups(kind).to_vec())
    }

    async fn object_group(&self, kind: TrackCategory, id: &str) -> Result<ObjectGroup> {
        self.groups(kind)
            .iter()
            .find(|g| g.id == id)
            .cloned()
            .ok_or_else(|| IgvError::GroupNotFound(format!("{} group {}", kind, id)))
    }
}
