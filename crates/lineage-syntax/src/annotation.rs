//! Identity-unique markers attached to green nodes and tokens.
//!
//! Two annotations are equal only if they are clones of the same handle; equal
//! kind and data do not make them interchangeable.

use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicU64, Ordering};

use triomphe::Arc;

/// Kind name shared by all provenance-carrying annotations.
pub const TRACKING_KIND: &str = "Tracking";

static NEXT_ANNOTATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of an annotation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnnotationId(u64);

impl AnnotationId {
    fn fresh() -> Self {
        Self(NEXT_ANNOTATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How far a tracking annotation's provenance reaches into the annotated subtree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TrackingData {
    /// Descendants resolve by translating their offset into the original subtree.
    IncludeDescendants,
    /// Only the annotated node itself has a counterpart.
    ExcludeDescendants,
    /// Attached to a token; tokens have no descendants.
    Token,
}

impl TrackingData {
    pub fn as_str(self) -> Option<&'static str> {
        match self {
            Self::IncludeDescendants => Some("IncludeDescendants"),
            Self::ExcludeDescendants => Some("ExcludeDescendants"),
            Self::Token => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AnnotationKind {
    Tracking(TrackingData),
    Custom { kind: Box<str>, data: Option<Box<str>> },
}

/// Receives the identity of an annotation once its last handle is gone.
pub trait AnnotationOwner: Send + Sync {
    fn release(&self, id: AnnotationId);
}

/// Cheap, cloneable annotation handle.
#[derive(Clone)]
pub struct Annotation {
    inner: Arc<AnnotationInner>,
}

struct AnnotationInner {
    id: AnnotationId,
    kind: AnnotationKind,
    owner: Option<Weak<dyn AnnotationOwner>>,
}

impl Drop for AnnotationInner {
    fn drop(&mut self) {
        if let Some(owner) = self.owner.as_ref().and_then(Weak::upgrade) {
            owner.release(self.id);
        }
    }
}

impl Annotation {
    /// Creates a free-standing annotation with a caller-defined kind.
    pub fn custom(kind: &str, data: Option<&str>) -> Self {
        Self::with_owner(
            AnnotationKind::Custom { kind: kind.into(), data: data.map(Into::into) },
            None,
        )
    }

    /// Creates an annotation whose owner is told when it becomes unreachable.
    pub fn owned(kind: AnnotationKind, owner: Weak<dyn AnnotationOwner>) -> Self {
        Self::with_owner(kind, Some(owner))
    }

    fn with_owner(kind: AnnotationKind, owner: Option<Weak<dyn AnnotationOwner>>) -> Self {
        Self { inner: Arc::new(AnnotationInner { id: AnnotationId::fresh(), kind, owner }) }
    }

    #[inline]
    pub fn id(&self) -> AnnotationId {
        self.inner.id
    }

    #[inline]
    pub fn kind(&self) -> &AnnotationKind {
        &self.inner.kind
    }

    pub fn kind_name(&self) -> &str {
        match &self.inner.kind {
            AnnotationKind::Tracking(_) => TRACKING_KIND,
            AnnotationKind::Custom { kind, .. } => kind,
        }
    }

    pub fn data(&self) -> Option<&str> {
        match &self.inner.kind {
            AnnotationKind::Tracking(data) => data.as_str(),
            AnnotationKind::Custom { data, .. } => data.as_deref(),
        }
    }

    #[inline]
    pub fn tracking_data(&self) -> Option<TrackingData> {
        match self.inner.kind {
            AnnotationKind::Tracking(data) => Some(data),
            AnnotationKind::Custom { .. } => None,
        }
    }

    #[inline]
    pub fn is_tracking(&self) -> bool {
        self.tracking_data().is_some()
    }
}

impl PartialEq for Annotation {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Annotation {}

impl std::hash::Hash for Annotation {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Annotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("Annotation");
        debug.field("id", &self.inner.id.0).field("kind", &self.kind_name());
        if let Some(data) = self.data() {
            debug.field("data", &data);
        }
        debug.finish()
    }
}
