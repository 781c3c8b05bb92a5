//! Serializable project document.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mask::Mask;
use crate::region::RegionSnapshot;

/// Version written into every saved document.
pub const DOCUMENT_VERSION: &str = "1.0";

/// Errors loading or saving a [`ProjectDocument`].
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported project version {0}")]
    UnsupportedVersion(String),
}

/// Snapshot of every region and mask in a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDocument {
    pub version: String,
    #[serde(default, alias = "sketches")]
    pub regions: Vec<RegionSnapshot>,
    #[serde(default)]
    pub masks: Vec<Mask>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self::new(Vec::new(), Vec::new())
    }
}

impl ProjectDocument {
    pub fn new(regions: Vec<RegionSnapshot>, masks: Vec<Mask>) -> Self {
        Self {
            version: DOCUMENT_VERSION.to_string(),
            regions,
            masks,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty() && self.masks.is_empty()
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document. Only the `1.x` format is understood.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let document: Self = serde_json::from_str(json)?;
        let major = document.version.split('.').next().unwrap_or_default();
        if major != "1" {
            return Err(DocumentError::UnsupportedVersion(document.version));
        }
        Ok(document)
    }
}
