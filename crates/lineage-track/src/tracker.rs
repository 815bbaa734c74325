//! Provenance of nodes and tokens across rewrites.
//!
//! A rewrite that replaces a subtree attaches a tracking annotation to the
//! replacement, recording the node it stands for. Anything below an
//! `IncludeDescendants` annotation resolves by translating its offset into
//! the recorded node; anything below `ExcludeDescendants` has no provenance.

use lineage_syntax::{
    Annotation, GreenNode, GreenToken, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken,
    TextRange, TextSize, TrackingData,
};

use crate::locator::{find_node_where, find_token_at};
use crate::{AnnotationStore, Result, TokenMatch, TrackerConfig, TrackingError};

/// A pre-transformation element and whether it was found by its span.
struct Counterpart<T> {
    element: T,
    exact: bool,
}

impl<T> Counterpart<T> {
    fn exact(element: T) -> Self {
        Self { element, exact: true }
    }
}

/// Elements whose provenance can be tracked: nodes and tokens.
pub trait Trackable: Clone {
    /// Green storage an annotation is attached to.
    type Green: Clone;

    /// `"node"` or `"token"`, for diagnostics.
    const ELEMENT: &'static str;

    fn kind(&self) -> SyntaxKind;
    fn offset(&self) -> TextSize;
    fn full_range(&self) -> TextRange;
    fn green(&self) -> &Self::Green;
    fn annotations(&self) -> &[Annotation];

    /// Nearest enclosing node, excluding `self`.
    fn parent_node(&self) -> Option<SyntaxNode>;
    fn root(&self) -> SyntaxNode;

    /// Whether the element has an identity of its own. List nodes are
    /// containers and do not.
    fn has_identity(&self) -> bool {
        true
    }

    fn from_provenance(store: &AnnotationStore, annotation: &Annotation) -> Result<Self>;

    /// Finds the counterpart of an element of `kind` at `span` below `ancestor`,
    /// along with whether it matched `span` exactly.
    fn locate(
        ancestor: &SyntaxNode,
        span: TextRange,
        kind: SyntaxKind,
        config: &TrackerConfig,
    ) -> Option<(Self, bool)>;

    fn create_annotation(store: &AnnotationStore, original: &Self) -> Annotation;
    fn with_annotation(green: &Self::Green, annotation: Annotation) -> Self::Green;
}

impl Trackable for SyntaxNode {
    type Green = GreenNode;

    const ELEMENT: &'static str = "node";

    fn kind(&self) -> SyntaxKind {
        self.kind()
    }

    fn offset(&self) -> TextSize {
        self.offset()
    }

    fn full_range(&self) -> TextRange {
        self.full_range()
    }

    fn green(&self) -> &GreenNode {
        self.green()
    }

    fn annotations(&self) -> &[Annotation] {
        self.annotations()
    }

    fn parent_node(&self) -> Option<Self> {
        self.parent()
    }

    fn root(&self) -> Self {
        self.root()
    }

    fn has_identity(&self) -> bool {
        !self.kind().is_list()
    }

    fn from_provenance(store: &AnnotationStore, annotation: &Annotation) -> Result<Self> {
        store.node_provenance(annotation)
    }

    fn locate(
        ancestor: &Self,
        span: TextRange,
        kind: SyntaxKind,
        _: &TrackerConfig,
    ) -> Option<(Self, bool)> {
        find_node_where(ancestor, span, |node| node.kind() == kind).map(|node| (node, true))
    }

    fn create_annotation(store: &AnnotationStore, original: &Self) -> Annotation {
        store.create_annotation(original, true)
    }

    fn with_annotation(green: &GreenNode, annotation: Annotation) -> GreenNode {
        green.with_additional_annotations([annotation])
    }
}

impl Trackable for SyntaxToken {
    type Green = GreenToken;

    const ELEMENT: &'static str = "token";

    fn kind(&self) -> SyntaxKind {
        self.kind()
    }

    fn offset(&self) -> TextSize {
        self.offset()
    }

    fn full_range(&self) -> TextRange {
        self.full_range()
    }

    fn green(&self) -> &GreenToken {
        self.green()
    }

    fn annotations(&self) -> &[Annotation] {
        self.annotations()
    }

    fn parent_node(&self) -> Option<SyntaxNode> {
        Some(self.parent())
    }

    fn root(&self) -> SyntaxNode {
        self.parent().root()
    }

    fn from_provenance(store: &AnnotationStore, annotation: &Annotation) -> Result<Self> {
        store.token_provenance(annotation)
    }

    fn locate(
        ancestor: &SyntaxNode,
        span: TextRange,
        kind: SyntaxKind,
        config: &TrackerConfig,
    ) -> Option<(Self, bool)> {
        find_token_at(ancestor, span, kind, config).map(|found| (found.token, found.exact))
    }

    fn create_annotation(store: &AnnotationStore, original: &Self) -> Annotation {
        store.create_token_annotation(original)
    }

    fn with_annotation(green: &GreenToken, annotation: Annotation) -> GreenToken {
        green.with_additional_annotations([annotation])
    }
}

/// Where an element's provenance comes from.
enum Anchor {
    /// The element is annotated itself.
    Itself(Annotation),
    /// The nearest annotated ancestor.
    Ancestor(SyntaxNode, Annotation),
}

fn tracking_annotation(annotations: &[Annotation]) -> Option<&Annotation> {
    annotations.iter().find(|annotation| annotation.is_tracking())
}

fn find_anchor<T: Trackable>(element: &T) -> Option<Anchor> {
    if let Some(annotation) = tracking_annotation(element.annotations()) {
        return Some(Anchor::Itself(annotation.clone()));
    }
    let mut node = element.parent_node();
    while let Some(current) = node {
        if let Some(annotation) = tracking_annotation(current.annotations()) {
            let annotation = annotation.clone();
            return Some(Anchor::Ancestor(current, annotation));
        }
        node = current.parent();
    }
    None
}

/// Answers provenance queries against one [`AnnotationStore`].
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    store: AnnotationStore,
    config: TrackerConfig,
}

impl Tracker {
    pub fn new(store: AnnotationStore, config: TrackerConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &AnnotationStore {
        &self.store
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Whether `element` carries a tracking annotation itself.
    pub fn is_tracked<T: Trackable>(&self, element: &T) -> bool {
        tracking_annotation(element.annotations()).is_some()
    }

    /// Returns the pre-transformation counterpart `element` would need to be
    /// annotated with if it were moved out of its current subtree.
    ///
    /// `None` when the element is annotated itself, has no annotated ancestor,
    /// sits below an `ExcludeDescendants` annotation, is a list or has no
    /// counterpart under its anchor.
    pub fn needs_tracking<T: Trackable>(&self, element: &T) -> Result<Option<T>> {
        if !element.has_identity() {
            return Ok(None);
        }
        match find_anchor(element) {
            Some(Anchor::Ancestor(ancestor, annotation)) => Ok(self
                .translate(element, &ancestor, &annotation)?
                .map(|counterpart| counterpart.element)),
            Some(Anchor::Itself(_)) | None => Ok(None),
        }
    }

    fn translate<T: Trackable>(
        &self,
        element: &T,
        ancestor: &SyntaxNode,
        annotation: &Annotation,
    ) -> Result<Option<Counterpart<T>>> {
        if annotation.tracking_data() == Some(TrackingData::ExcludeDescendants) {
            return Ok(None);
        }
        let pre_ancestor = self.store.node_provenance(annotation)?;
        let offset = element.offset() - ancestor.offset() + pre_ancestor.offset();
        let span = TextRange::at(offset, element.full_range().len());
        let kind = element.kind();

        let found = T::locate(&pre_ancestor, span, kind, &self.config);
        if found.is_none() {
            tracing::debug!(
                element = T::ELEMENT,
                ?kind,
                ?span,
                annotation = %annotation.id(),
                "no counterpart under the pre-transformation anchor"
            );
        }
        Ok(found.map(|(element, exact)| Counterpart { element, exact }))
    }

    /// Returns `element`'s green storage annotated with its counterpart, if
    /// it needs one; otherwise the storage unchanged.
    ///
    /// Call this on a node or token before moving it out of its subtree.
    pub fn track_if_needed<T: Trackable>(&self, element: &T) -> Result<T::Green> {
        match self.needs_tracking(element)? {
            Some(original) => {
                let annotation = T::create_annotation(&self.store, &original);
                tracing::trace!(
                    element = T::ELEMENT,
                    kind = ?element.kind(),
                    range = ?element.full_range(),
                    annotation = %annotation.id(),
                    "tracking moved element"
                );
                Ok(T::with_annotation(element.green(), annotation))
            }
            None => Ok(element.green().clone()),
        }
    }

    /// Annotates a replacement node with the node it stands for.
    pub fn annotate(
        &self,
        replacement: &GreenNode,
        original: &SyntaxNode,
        include_descendants: bool,
    ) -> Result<GreenNode> {
        if tracking_annotation(replacement.annotations()).is_some() {
            return Err(TrackingError::AlreadyTracked {
                kind: replacement.kind(),
                range: TextRange::up_to(replacement.text_len()),
            });
        }
        let annotation = self.store.create_annotation(original, include_descendants);
        Ok(replacement.with_additional_annotations([annotation]))
    }

    /// Annotates a replacement token with the token it stands for.
    pub fn annotate_token(
        &self,
        replacement: &GreenToken,
        original: &SyntaxToken,
    ) -> Result<GreenToken> {
        if tracking_annotation(replacement.annotations()).is_some() {
            return Err(TrackingError::AlreadyTracked {
                kind: replacement.kind(),
                range: TextRange::up_to(replacement.text_len()),
            });
        }
        let annotation = self.store.create_token_annotation(original);
        Ok(replacement.with_additional_annotations([annotation]))
    }

    /// Returns the node `node` was derived from.
    ///
    /// In a tree without any annotations every node is its own original.
    pub fn get_pre_transformation_syntax(&self, node: &SyntaxNode) -> Result<Option<SyntaxNode>> {
        Ok(self.pre_transformation(node)?.map(|counterpart| counterpart.element))
    }

    /// Returns the token `token` was derived from.
    ///
    /// [`TokenMatch::exact`] is `false` when a renamed token was matched to
    /// the nearest preceding token of its kind.
    pub fn get_pre_transformation_token(&self, token: &SyntaxToken) -> Result<Option<TokenMatch>> {
        Ok(self.pre_transformation(token)?.map(|Counterpart { element, exact }| TokenMatch {
            token: element,
            exact,
        }))
    }

    /// Element form of the node and token lookups. Approximate token matches
    /// are returned like exact ones.
    pub fn get_pre_transformation_element(
        &self,
        element: &SyntaxElement,
    ) -> Result<Option<SyntaxElement>> {
        Ok(match element {
            SyntaxElement::Node(node) => {
                self.get_pre_transformation_syntax(node)?.map(SyntaxElement::Node)
            }
            SyntaxElement::Token(token) => self
                .get_pre_transformation_token(token)?
                .map(|found| SyntaxElement::Token(found.token)),
        })
    }

    fn pre_transformation<T: Trackable>(&self, element: &T) -> Result<Option<Counterpart<T>>> {
        match find_anchor(element) {
            Some(Anchor::Itself(annotation)) => {
                let pre = T::from_provenance(&self.store, &annotation)?;
                Ok(Some(Counterpart::exact(pre)))
            }
            Some(Anchor::Ancestor(ancestor, annotation)) => {
                if !element.has_identity() {
                    return Ok(None);
                }
                self.translate(element, &ancestor, &annotation)
            }
            None if !element.root().contains_annotations() => {
                Ok(Some(Counterpart::exact(element.clone())))
            }
            None => Ok(None),
        }
    }
}
