//! # Collection Envelope
//!
//! The `{metadata, resources}` wrapper carried by most request and response bodies.

use crate::codec::Model;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Envelope metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionMetadata {
    /// Media type of the resources, e.g. `application/vnd.ibm.secrets-manager.secret+json`
    pub collection_type: String,
    pub collection_total: i64,
}

impl CollectionMetadata {
    pub fn new(collection_type: impl Into<String>, collection_total: i64) -> Self {
        Self {
            collection_type: collection_type.into(),
            collection_total,
        }
    }
}

/// `{metadata, resources: [T]}`
///
/// Both fields are required when decoding. `collection_total` is advisory and
/// is not checked against the resource count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionEnvelope<T> {
    pub metadata: CollectionMetadata,
    pub resources: Vec<T>,
}

impl<T> CollectionEnvelope<T> {
    /// Wrap `resources`, setting `collection_total` to their count
    pub fn new(collection_type: impl Into<String>, resources: Vec<T>) -> Self {
        let total = i64::try_from(resources.len()).unwrap_or(i64::MAX);
        Self {
            metadata: CollectionMetadata::new(collection_type, total),
            resources,
        }
    }

    /// Whether `collection_total` agrees with the number of resources
    pub fn is_consistent(&self) -> bool {
        usize::try_from(self.metadata.collection_total).is_ok_and(|total| total == self.resources.len())
    }

    pub fn first(&self) -> Option<&T> {
        self.resources.first()
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<T: Model> Model for CollectionEnvelope<T> {
    fn check_model(&self) -> Result<()> {
        self.resources.check_model()
    }
}
