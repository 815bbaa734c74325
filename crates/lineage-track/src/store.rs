//! Side table from tracking annotations to the elements they stand for.
//!
//! Entries are keyed by annotation identity and removed as soon as the last
//! handle to the annotation is dropped, so the store never keeps a
//! transformed tree alive on its own.

use std::sync::{Arc, Weak};

use dashmap::DashMap;
use lineage_syntax::{
    Annotation, AnnotationId, AnnotationKind, AnnotationOwner, NodeOrToken, SyntaxElement,
    SyntaxNode, SyntaxToken, TrackingData,
};
use rustc_hash::FxBuildHasher;

use crate::{Result, TrackingError};

/// Shared, thread-safe provenance table.
///
/// Clones refer to the same table.
#[derive(Clone, Default)]
pub struct AnnotationStore {
    shared: Arc<StoreShared>,
}

#[derive(Default)]
struct StoreShared {
    entries: DashMap<AnnotationId, SyntaxElement, FxBuildHasher>,
}

impl AnnotationOwner for StoreShared {
    fn release(&self, id: AnnotationId) {
        // The removed element is dropped after the shard lock is released;
        // dropping it may release further annotations of this store.
        if self.entries.remove(&id).is_some() {
            tracing::trace!(%id, "released provenance entry");
        }
    }
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a tracking annotation standing for `provenance`.
    pub fn create_annotation(
        &self,
        provenance: &SyntaxNode,
        include_descendants: bool,
    ) -> Annotation {
        let data = if include_descendants {
            TrackingData::IncludeDescendants
        } else {
            TrackingData::ExcludeDescendants
        };
        self.insert(data, NodeOrToken::Node(provenance.clone()))
    }

    /// Creates a tracking annotation standing for the token `provenance`.
    pub fn create_token_annotation(&self, provenance: &SyntaxToken) -> Annotation {
        self.insert(TrackingData::Token, NodeOrToken::Token(provenance.clone()))
    }

    fn insert(&self, data: TrackingData, provenance: SyntaxElement) -> Annotation {
        let owner: Weak<dyn AnnotationOwner> = {
            let weak: Weak<StoreShared> = Arc::downgrade(&self.shared);
            weak
        };
        let annotation = Annotation::owned(AnnotationKind::Tracking(data), owner);
        tracing::trace!(
            id = %annotation.id(),
            kind = ?provenance.kind(),
            range = ?provenance.full_range(),
            "recorded provenance"
        );
        self.shared.entries.insert(annotation.id(), provenance);
        annotation
    }

    /// Returns the element `annotation` was created for.
    pub fn provenance(&self, annotation: &Annotation) -> Result<SyntaxElement> {
        if !annotation.is_tracking() {
            return Err(TrackingError::NotTrackingAnnotation(annotation.id()));
        }
        let element = self.shared.entries.get(&annotation.id()).map(|entry| entry.value().clone());
        element.ok_or(TrackingError::MissingProvenance(annotation.id()))
    }

    pub fn node_provenance(&self, annotation: &Annotation) -> Result<SyntaxNode> {
        match self.provenance(annotation)? {
            NodeOrToken::Node(node) => Ok(node),
            NodeOrToken::Token(_) => Err(TrackingError::ProvenanceMismatch {
                id: annotation.id(),
                expected: "node",
                found: "token",
            }),
        }
    }

    pub fn token_provenance(&self, annotation: &Annotation) -> Result<SyntaxToken> {
        match self.provenance(annotation)? {
            NodeOrToken::Token(token) => Ok(token),
            NodeOrToken::Node(_) => Err(TrackingError::ProvenanceMismatch {
                id: annotation.id(),
                expected: "token",
                found: "node",
            }),
        }
    }

    /// Number of live annotations created by this store.
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.entries.is_empty()
    }
}

impl std::fmt::Debug for AnnotationStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationStore").field("len", &self.len()).finish()
    }
}
