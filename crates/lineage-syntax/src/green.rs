//! Position-independent tree shapes.
//!
//! Green elements know their kind, width, children and annotations, but not
//! where they sit. The same green node can appear at different offsets in
//! different trees, which is what lets an edit share every untouched subtree
//! with the tree it was derived from.

use std::fmt;

use text_size::TextSize;
use triomphe::{Arc, ThinArc};

use crate::{Annotation, NodeOrToken, SyntaxKind, TriviaPiece};

pub type GreenElement = NodeOrToken<GreenNode, GreenToken>;

impl GreenElement {
    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn text_len(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.text_len(),
            NodeOrToken::Token(token) => token.text_len(),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            NodeOrToken::Node(node) => node.annotations(),
            NodeOrToken::Token(token) => token.annotations(),
        }
    }

    pub fn contains_annotations(&self) -> bool {
        match self {
            NodeOrToken::Node(node) => node.contains_annotations(),
            NodeOrToken::Token(token) => !token.annotations().is_empty(),
        }
    }
}

impl From<GreenNode> for GreenElement {
    fn from(node: GreenNode) -> Self {
        NodeOrToken::Node(node)
    }
}

impl From<GreenToken> for GreenElement {
    fn from(token: GreenToken) -> Self {
        NodeOrToken::Token(token)
    }
}

/// Interior node of the green tree. Cloning shares the node.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

struct GreenNodeData {
    kind: SyntaxKind,
    text_len: TextSize,
    /// Set when this node or any descendant carries an annotation.
    contains_annotations: bool,
    children: Box<[GreenElement]>,
    annotations: Box<[Annotation]>,
}

impl GreenNode {
    pub fn new(kind: SyntaxKind, children: impl IntoIterator<Item = GreenElement>) -> Self {
        Self::from_parts(kind, children.into_iter().collect(), Box::default())
    }

    fn from_parts(
        kind: SyntaxKind,
        children: Box<[GreenElement]>,
        annotations: Box<[Annotation]>,
    ) -> Self {
        let text_len = children.iter().map(GreenElement::text_len).sum();
        let contains_annotations =
            !annotations.is_empty() || children.iter().any(GreenElement::contains_annotations);
        Self {
            data: Arc::new(GreenNodeData {
                kind,
                text_len,
                contains_annotations,
                children,
                annotations,
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Full width, trivia included.
    #[inline]
    pub fn text_len(&self) -> TextSize {
        self.data.text_len
    }

    #[inline]
    pub fn children(&self) -> &[GreenElement] {
        &self.data.children
    }

    /// Annotations attached to exactly this node.
    #[inline]
    pub fn annotations(&self) -> &[Annotation] {
        &self.data.annotations
    }

    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.data.contains_annotations
    }

    pub fn has_annotation(&self, annotation: &Annotation) -> bool {
        self.annotations().contains(annotation)
    }

    /// Returns a copy of this node carrying `annotations` as well.
    ///
    /// Children are shared, not copied. Annotations already present are not
    /// added twice.
    pub fn with_additional_annotations(
        &self,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> Self {
        let merged = merge_annotations(self.annotations(), annotations);
        if merged.len() == self.annotations().len() {
            return self.clone();
        }
        Self::from_parts(self.kind(), self.children().into(), merged)
    }

    /// Returns a copy of this node without `annotation`.
    pub fn without_annotation(&self, annotation: &Annotation) -> Self {
        if !self.has_annotation(annotation) {
            return self.clone();
        }
        let annotations = self.annotations().iter().filter(|it| *it != annotation).cloned();
        Self::from_parts(self.kind(), self.children().into(), annotations.collect())
    }

    /// Returns a copy of this node with the child at `index` swapped out.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    #[track_caller]
    pub fn replace_child(&self, index: usize, new_child: GreenElement) -> Self {
        let mut children: Box<[GreenElement]> = self.children().into();
        children[index] = new_child;
        Self::from_parts(self.kind(), children, self.annotations().into())
    }

    /// Returns a copy of this node with `new_child` inserted at `index`.
    #[track_caller]
    pub fn insert_child(&self, index: usize, new_child: GreenElement) -> Self {
        let mut children = self.children().to_vec();
        children.insert(index, new_child);
        Self::from_parts(self.kind(), children.into(), self.annotations().into())
    }

    /// Returns a copy of this node without the child at `index`.
    #[track_caller]
    pub fn remove_child(&self, index: usize) -> Self {
        let mut children = self.children().to_vec();
        children.remove(index);
        Self::from_parts(self.kind(), children.into(), self.annotations().into())
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    pub fn text(&self) -> String {
        let mut buf = String::with_capacity(usize::from(self.text_len()));
        self.write_text(&mut buf);
        buf
    }

    fn write_text(&self, buf: &mut String) {
        for child in self.children() {
            match child {
                NodeOrToken::Node(node) => node.write_text(buf),
                NodeOrToken::Token(token) => buf.push_str(token.text()),
            }
        }
    }
}

impl PartialEq for GreenNode {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for GreenNode {}

impl std::hash::Hash for GreenNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(&*self.data, state);
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenNode")
            .field("kind", &self.kind())
            .field("text_len", &self.text_len())
            .field("children", &self.children().len())
            .field("annotations", &self.annotations())
            .finish()
    }
}

/// Leaf of the green tree.
///
/// The stored text includes leading and trailing trivia; the trivia lengths
/// say how much of it is not content.
#[derive(Clone)]
pub struct GreenToken {
    data: Arc<GreenTokenData>,
}

struct GreenTokenData {
    kind: SyntaxKind,
    leading: GreenTrivia,
    text: Box<str>,
    trailing: GreenTrivia,
    annotations: Box<[Annotation]>,
}

impl GreenToken {
    /// Creates a token without trivia.
    pub fn new(kind: SyntaxKind, text: &str) -> Self {
        Self::with_trivia(GreenTrivia::empty(), kind, text, GreenTrivia::empty())
    }

    /// Creates a token whose `text` spans its trivia as well as its content.
    ///
    /// # Panics
    ///
    /// Panics if the trivia is longer than `text` or does not end on a char
    /// boundary.
    #[track_caller]
    pub fn with_trivia(
        leading: GreenTrivia,
        kind: SyntaxKind,
        text: &str,
        trailing: GreenTrivia,
    ) -> Self {
        let trivia_len = usize::from(leading.len() + trailing.len());
        assert!(trivia_len <= text.len(), "trivia is longer than the token text");
        assert!(text.is_char_boundary(usize::from(leading.len())));
        assert!(text.is_char_boundary(text.len() - usize::from(trailing.len())));
        Self::from_parts(kind, leading, text.into(), trailing, Box::default())
    }

    fn from_parts(
        kind: SyntaxKind,
        leading: GreenTrivia,
        text: Box<str>,
        trailing: GreenTrivia,
        annotations: Box<[Annotation]>,
    ) -> Self {
        Self { data: Arc::new(GreenTokenData { kind, leading, text, trailing, annotations }) }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Full text, trivia included.
    #[inline]
    pub fn text(&self) -> &str {
        &self.data.text
    }

    pub fn text_trimmed(&self) -> &str {
        let start = usize::from(self.leading().len());
        let end = self.data.text.len() - usize::from(self.trailing().len());
        &self.data.text[start..end]
    }

    #[inline]
    pub fn text_len(&self) -> TextSize {
        TextSize::of(self.text())
    }

    #[inline]
    pub fn leading(&self) -> &GreenTrivia {
        &self.data.leading
    }

    #[inline]
    pub fn trailing(&self) -> &GreenTrivia {
        &self.data.trailing
    }

    #[inline]
    pub fn annotations(&self) -> &[Annotation] {
        &self.data.annotations
    }

    pub fn has_annotation(&self, annotation: &Annotation) -> bool {
        self.annotations().contains(annotation)
    }

    pub fn with_additional_annotations(
        &self,
        annotations: impl IntoIterator<Item = Annotation>,
    ) -> Self {
        let merged = merge_annotations(self.annotations(), annotations);
        if merged.len() == self.annotations().len() {
            return self.clone();
        }
        Self::from_parts(
            self.kind(),
            self.leading().clone(),
            self.data.text.clone(),
            self.trailing().clone(),
            merged,
        )
    }

    /// Returns a token of the same kind and trivia with different content.
    pub fn with_text_trimmed(&self, content: &str) -> Self {
        let text = format!(
            "{}{content}{}",
            &self.text()[..usize::from(self.leading().len())],
            &self.text()[self.text().len() - usize::from(self.trailing().len())..],
        );
        Self::from_parts(
            self.kind(),
            self.leading().clone(),
            text.into(),
            self.trailing().clone(),
            self.annotations().into(),
        )
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

impl PartialEq for GreenToken {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for GreenToken {}

impl std::hash::Hash for GreenToken {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::ptr::hash(&*self.data, state);
    }
}

impl fmt::Debug for GreenToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenToken")
            .field("kind", &self.kind())
            .field("text", &self.text())
            .field("annotations", &self.annotations())
            .finish()
    }
}

fn merge_annotations(
    existing: &[Annotation],
    additional: impl IntoIterator<Item = Annotation>,
) -> Box<[Annotation]> {
    let mut merged = existing.to_vec();
    for annotation in additional {
        if !merged.contains(&annotation) {
            merged.push(annotation);
        }
    }
    merged.into_boxed_slice()
}

#[derive(Clone, Eq, Hash, PartialEq)]
pub struct GreenTrivia {
    ptr: Option<ThinArc<TextSize, TriviaPiece>>,
}

impl fmt::Debug for GreenTrivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GreenTrivia")
            .field("pieces", &self.pieces())
            .field("total_len", &self.len())
            .finish()
    }
}

impl GreenTrivia {
    pub fn new(pieces: &[TriviaPiece]) -> Self {
        if pieces.is_empty() {
            return Self::empty();
        }
        let total_len = pieces.iter().map(|piece| piece.len).sum();
        Self { ptr: Some(ThinArc::from_header_and_slice(total_len, pieces)) }
    }

    pub const fn empty() -> Self {
        Self { ptr: None }
    }

    pub fn len(&self) -> TextSize {
        match self.ptr {
            None => TextSize::new(0),
            Some(ref ptr) => ptr.header.header,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    pub fn pieces(&self) -> &[TriviaPiece] {
        match &self.ptr {
            None => &[],
            Some(ptr) => &ptr.slice,
        }
    }
}
