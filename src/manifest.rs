//! Docker V2 manifest schema types
//!
//! Typed pass-through of the registry's image manifest: the client decodes,
//! inspects, and re-encodes these documents without interpreting layer
//! content.

use serde::{Deserialize, Serialize};

/// Media type for V2 schema 2 manifests, sent as `Accept` on fetches and
/// `Content-Type` on stores.
pub const MANIFEST_V2_MEDIA_TYPE: &str = "application/vnd.docker.distribution.manifest.v2+json";

/// A content-addressed reference to a blob (image config or layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: String,
    pub size: u64,
    pub digest: String,
}

/// A Docker V2 schema 2 image manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    pub schema_version: u32,
    pub media_type: String,
    pub config: Descriptor,
    pub layers: Vec<Descriptor>,
}

impl Manifest {
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Total size in bytes of the referenced layers (config excluded).
    /// Saturates rather than overflowing; sizes are registry-supplied.
    pub fn total_layer_size(&self) -> u64 {
        self.layers
            .iter()
            .fold(0u64, |total, layer| total.saturating_add(layer.size))
    }
}
