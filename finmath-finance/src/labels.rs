//! Cluster id -> category label table.
//!
//! The default table ships inside the crate; a replacement can be loaded from
//! a TOML file with the same layout.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

use crate::error::ClassifyError;

const EMBEDDED_LABELS: &str = include_str!("../cluster_labels.toml");

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterLabel {
    pub id: usize,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabelTable {
    #[serde(default = "default_version")]
    pub version: u32,
    pub n_clusters: usize,
    #[serde(rename = "cluster", default)]
    pub clusters: Vec<ClusterLabel>,
}

fn default_version() -> u32 {
    1
}

impl LabelTable {
    /// The table bundled with the crate (11 clusters).
    pub fn embedded() -> Result<Self, ClassifyError> {
        Self::from_toml_str(EMBEDDED_LABELS)
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ClassifyError> {
        let mut table: LabelTable = toml::from_str(s)?;
        table.clusters.sort_by_key(|c| c.id);
        Ok(table)
    }

    pub fn load(path: &Path) -> Result<Self, ClassifyError> {
        let s = std::fs::read_to_string(path).map_err(|source| ClassifyError::LabelRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&s)
    }

    /// Check the table against the number of clusters the classifier will fit.
    pub fn validate(&self, n_clusters: usize) -> Result<(), ClassifyError> {
        if self.n_clusters != n_clusters {
            return Err(ClassifyError::LabelTable(format!(
                "table declares {} clusters, classifier uses {}",
                self.n_clusters, n_clusters
            )));
        }

        let mut seen = BTreeSet::new();
        for c in &self.clusters {
            if !seen.insert(c.id) {
                return Err(ClassifyError::LabelTable(format!("duplicate cluster id {}", c.id)));
            }
            if c.label.trim().is_empty() {
                return Err(ClassifyError::LabelTable(format!("cluster {} has an empty label", c.id)));
            }
        }
        if let Some(missing) = (0..n_clusters).find(|id| !seen.contains(id)) {
            return Err(ClassifyError::LabelTable(format!("no label for cluster {missing}")));
        }
        if let Some(extra) = seen.iter().find(|id| **id >= n_clusters) {
            return Err(ClassifyError::LabelTable(format!(
                "cluster id {extra} out of range 0..{n_clusters}"
            )));
        }
        Ok(())
    }

    pub fn label(&self, id: usize) -> Option<&str> {
        self.clusters
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.label.as_str())
    }
}
