//! Positioned view over a green tree.
//!
//! A `SyntaxNode` pairs a green node with its parent and absolute offset.
//! Handles are created on the way down and never stored in the green tree, so
//! the same green subtree gets a fresh position in every tree that reuses it.

use std::fmt::{self, Write as _};
use std::hash::{Hash, Hasher};

use text_size::{TextRange, TextSize};
use triomphe::Arc;

use crate::cursor::{Preorder, PreorderWithTokens, WalkEventWithTokens};
use crate::{Annotation, GreenElement, GreenNode, GreenToken, SyntaxKind};

/// Node handle with a parent link and an absolute offset.
#[derive(Clone)]
pub struct SyntaxNode {
    data: Arc<NodeData>,
}

struct NodeData {
    parent: Option<SyntaxNode>,
    index: u32,
    offset: TextSize,
    green: GreenNode,
}

impl SyntaxNode {
    /// Creates the root of a positioned view at offset zero.
    pub fn new_root(green: GreenNode) -> Self {
        let data = NodeData { parent: None, index: 0, offset: TextSize::new(0), green };
        Self { data: Arc::new(data) }
    }

    fn new_child(parent: &Self, index: usize, offset: TextSize, green: GreenNode) -> Self {
        Self {
            data: Arc::new(NodeData {
                parent: Some(parent.clone()),
                index: index as u32,
                offset,
                green,
            }),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.data.parent.clone()
    }

    /// Position of this node among its parent's children.
    #[inline]
    pub fn index(&self) -> usize {
        self.data.index as usize
    }

    /// Absolute start of the full span.
    #[inline]
    pub fn offset(&self) -> TextSize {
        self.data.offset
    }

    /// Span including leading and trailing trivia.
    #[inline]
    pub fn full_range(&self) -> TextRange {
        TextRange::at(self.data.offset, self.data.green.text_len())
    }

    /// Span of the content, from the first token's content to the last token's.
    pub fn range(&self) -> TextRange {
        match (self.first_token(true), self.last_token(true)) {
            (Some(first), Some(last)) => TextRange::new(first.range().start(), last.range().end()),
            _ => TextRange::empty(self.offset()),
        }
    }

    pub fn text(&self) -> String {
        self.green().text()
    }

    pub fn root(&self) -> Self {
        self.ancestors().last().unwrap_or_else(|| self.clone())
    }

    /// Iterates from this node up to the root, inclusive.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> + Clone + use<> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    pub fn children_with_tokens(&self) -> SyntaxElementChildren {
        SyntaxElementChildren::new(self.clone())
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = Self> + use<> {
        self.children_with_tokens().filter_map(SyntaxElement::into_node)
    }

    pub fn first_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next()
    }

    pub fn last_child_or_token(&self) -> Option<SyntaxElement> {
        self.children_with_tokens().next_back()
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        let parent = self.parent()?;
        let index = self.index() + 1;
        let green = parent.green().children().get(index)?.clone();
        Some(SyntaxElement::new(&parent, index, self.full_range().end(), green))
    }

    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        let parent = self.parent()?;
        let index = self.index().checked_sub(1)?;
        let green = parent.green().children()[index].clone();
        let offset = self.offset() - green.text_len();
        Some(SyntaxElement::new(&parent, index, offset, green))
    }

    /// First token in this subtree, optionally skipping zero-width tokens.
    pub fn first_token(&self, include_zero_width: bool) -> Option<SyntaxToken> {
        for child in self.children_with_tokens() {
            if let Some(token) = child.first_token(include_zero_width) {
                return Some(token);
            }
        }
        None
    }

    /// Last token in this subtree, optionally skipping zero-width tokens.
    pub fn last_token(&self, include_zero_width: bool) -> Option<SyntaxToken> {
        for child in self.children_with_tokens().rev() {
            if let Some(token) = child.last_token(include_zero_width) {
                return Some(token);
            }
        }
        None
    }

    /// Deepest node reached by repeatedly stepping into the last child node.
    ///
    /// Zero-width children are followed too, which is what makes a zero-width
    /// node at the very end of a subtree reachable.
    pub fn last_descendant(&self) -> Self {
        let mut node = self.clone();
        while let Some(SyntaxElement::Node(child)) = node.last_child_or_token() {
            node = child;
        }
        node
    }

    /// Annotations attached to exactly this node.
    #[inline]
    pub fn annotations(&self) -> &[Annotation] {
        self.green().annotations()
    }

    pub fn annotations_of_kind<'a>(
        &'a self,
        kind: &'a str,
    ) -> impl Iterator<Item = &'a Annotation> + 'a {
        self.annotations().iter().filter(move |annotation| annotation.kind_name() == kind)
    }

    pub fn has_annotation(&self, annotation: &Annotation) -> bool {
        self.green().has_annotation(annotation)
    }

    /// `true` if this node or anything below it is annotated.
    #[inline]
    pub fn contains_annotations(&self) -> bool {
        self.green().contains_annotations()
    }

    /// Elements in this subtree that carry `annotation`.
    pub fn descendants_with_annotation(&self, annotation: &Annotation) -> Vec<SyntaxElement> {
        let mut found = Vec::new();
        let mut walk = self.preorder_with_tokens();
        while let Some(event) = walk.next() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    if node.has_annotation(annotation) {
                        found.push(SyntaxElement::Node(node.clone()));
                    }
                    if !node.contains_annotations() {
                        walk.skip_subtree();
                    }
                }
                WalkEventWithTokens::Token(token) => {
                    if token.has_annotation(annotation) {
                        found.push(SyntaxElement::Token(token));
                    }
                }
                WalkEventWithTokens::LeaveNode(_) => {}
            }
        }
        found
    }

    /// Finds the token whose full span contains `position`.
    ///
    /// Zero-width tokens contain no position, so they are only returned when
    /// `include_zero_width` is set and one starts exactly at `position`. At
    /// the end of this node's span the last token is returned, stepping back
    /// over zero-width tokens unless they are included.
    pub fn find_token(&self, position: TextSize, include_zero_width: bool) -> Option<SyntaxToken> {
        let range = self.full_range();
        if !range.contains_inclusive(position) {
            return None;
        }
        if position == range.end() {
            return self.last_token(include_zero_width);
        }

        let mut node = self.clone();
        'descend: loop {
            for child in node.children_with_tokens() {
                let child_range = child.full_range();
                if child_range.is_empty() {
                    if include_zero_width
                        && child_range.start() == position
                        && let Some(token) = child.first_token(true)
                    {
                        return Some(token);
                    }
                    continue;
                }
                if !child_range.contains(position) {
                    continue;
                }
                match child {
                    SyntaxElement::Token(token) => return Some(token),
                    SyntaxElement::Node(child) => {
                        node = child;
                        continue 'descend;
                    }
                }
            }
            return None;
        }
    }

    /// Returns the tokens touching `offset`, both of them on a boundary.
    pub fn token_at_offset(&self, offset: TextSize) -> TokenAtOffset<SyntaxToken> {
        let range = self.full_range();
        let right =
            if offset < range.end() { self.find_token(offset, false) } else { None };
        let left = if offset > range.start() && offset <= range.end() {
            self.find_token(offset - TextSize::new(1), false)
        } else {
            None
        };

        match (left, right) {
            (Some(left), Some(right)) if left != right => TokenAtOffset::Between(left, right),
            (_, Some(token)) | (Some(token), None) => TokenAtOffset::Single(token),
            (None, None) => TokenAtOffset::None,
        }
    }

    /// Returns the smallest element whose full span covers `range`.
    pub fn covering_element(&self, range: TextRange) -> Option<SyntaxElement> {
        if !self.full_range().contains_range(range) {
            return None;
        }
        let Some(token) = self.find_token(range.start(), false) else {
            return Some(SyntaxElement::Node(self.clone()));
        };
        if token.full_range().contains_range(range) {
            return Some(SyntaxElement::Token(token));
        }
        token
            .parent()
            .ancestors()
            .find(|ancestor| ancestor.full_range().contains_range(range))
            .map(SyntaxElement::Node)
    }

    /// Builds the green root obtained by putting `replacement` where this node is.
    ///
    /// Only the path from this node to the root is copied; every sibling
    /// along the way is shared with the current tree.
    pub fn replace_with(&self, replacement: GreenNode) -> GreenNode {
        match self.parent() {
            None => replacement,
            Some(parent) => {
                let new_parent = parent.green().replace_child(self.index(), replacement.into());
                parent.replace_with(new_parent)
            }
        }
    }

    /// Returns a preorder iterator over nodes.
    #[inline]
    pub fn preorder(&self) -> Preorder {
        Preorder::new(self.clone())
    }

    /// Returns a preorder iterator over nodes and tokens.
    #[inline]
    pub fn preorder_with_tokens(&self) -> PreorderWithTokens {
        PreorderWithTokens::new(self.clone())
    }

    /// Renders one `KIND@start..end` line per element, tokens with their text.
    pub fn debug_dump(&self) -> String {
        let mut buf = String::new();
        let mut depth = 0usize;
        for event in self.preorder_with_tokens() {
            match event {
                WalkEventWithTokens::EnterNode(node) => {
                    let marker = if node.annotations().is_empty() { "" } else { " *" };
                    let _ = writeln!(
                        buf,
                        "{:indent$}{:?}@{:?}{marker}",
                        "",
                        node.kind(),
                        node.full_range(),
                        indent = depth * 2
                    );
                    depth += 1;
                }
                WalkEventWithTokens::LeaveNode(_) => depth -= 1,
                WalkEventWithTokens::Token(token) => {
                    let marker = if token.annotations().is_empty() { "" } else { " *" };
                    let _ = writeln!(
                        buf,
                        "{:indent$}{:?}@{:?} {:?}{marker}",
                        "",
                        token.kind(),
                        token.full_range(),
                        token.text(),
                        indent = depth * 2
                    );
                }
            }
        }
        buf
    }
}

impl PartialEq for SyntaxNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
            || (self.data.offset == other.data.offset
                && self.data.index == other.data.index
                && self.data.green.ptr_eq(&other.data.green)
                && self.data.parent == other.data.parent)
    }
}

impl Eq for SyntaxNode {}

impl Hash for SyntaxNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.data.green.hash(state);
        self.data.offset.hash(state);
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?}", self.kind(), self.full_range())
    }
}

/// Token handle; tokens always have a parent node.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken {
    parent: SyntaxNode,
    index: u32,
    offset: TextSize,
    green: GreenToken,
}

impl SyntaxToken {
    fn new(parent: &SyntaxNode, index: usize, offset: TextSize, green: GreenToken) -> Self {
        Self { parent: parent.clone(), index: index as u32, offset, green }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.green.kind()
    }

    #[inline]
    pub fn green(&self) -> &GreenToken {
        &self.green
    }

    #[inline]
    pub fn parent(&self) -> SyntaxNode {
        self.parent.clone()
    }

    /// Iterates parent nodes, starting from the immediate parent.
    pub fn parent_ancestors(&self) -> impl Iterator<Item = SyntaxNode> + Clone + use<> {
        self.parent.ancestors()
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }

    #[inline]
    pub fn offset(&self) -> TextSize {
        self.offset
    }

    /// Returns the token text range including attached trivia.
    #[inline]
    pub fn full_range(&self) -> TextRange {
        TextRange::at(self.offset, self.green.text_len())
    }

    /// Returns the token text range excluding trivia.
    pub fn range(&self) -> TextRange {
        let full = self.full_range();
        TextRange::new(
            full.start() + self.green.leading().len(),
            full.end() - self.green.trailing().len(),
        )
    }

    /// Returns the token text including trivia.
    #[inline]
    pub fn text(&self) -> &str {
        self.green.text()
    }

    /// Returns the token text excluding trivia.
    #[inline]
    pub fn text_trimmed(&self) -> &str {
        self.green.text_trimmed()
    }

    #[inline]
    pub fn is_zero_width(&self) -> bool {
        self.green.text_len() == TextSize::new(0)
    }

    #[inline]
    pub fn annotations(&self) -> &[Annotation] {
        self.green.annotations()
    }

    pub fn has_annotation(&self, annotation: &Annotation) -> bool {
        self.green.has_annotation(annotation)
    }

    pub fn next_sibling_or_token(&self) -> Option<SyntaxElement> {
        let index = self.index() + 1;
        let green = self.parent.green().children().get(index)?.clone();
        Some(SyntaxElement::new(&self.parent, index, self.full_range().end(), green))
    }

    pub fn prev_sibling_or_token(&self) -> Option<SyntaxElement> {
        let index = self.index().checked_sub(1)?;
        let green = self.parent.green().children()[index].clone();
        let offset = self.offset - green.text_len();
        Some(SyntaxElement::new(&self.parent, index, offset, green))
    }

    /// Returns the next token in document order, if any.
    pub fn next_token(&self, include_zero_width: bool) -> Option<Self> {
        let mut element = SyntaxElement::Token(self.clone());
        loop {
            let mut sibling = element.next_sibling_or_token();
            while let Some(current) = sibling {
                if let Some(token) = current.first_token(include_zero_width) {
                    return Some(token);
                }
                sibling = current.next_sibling_or_token();
            }
            element = SyntaxElement::Node(element.parent()?);
        }
    }

    /// Returns the previous token in document order, if any.
    pub fn prev_token(&self, include_zero_width: bool) -> Option<Self> {
        let mut element = SyntaxElement::Token(self.clone());
        loop {
            let mut sibling = element.prev_sibling_or_token();
            while let Some(current) = sibling {
                if let Some(token) = current.last_token(include_zero_width) {
                    return Some(token);
                }
                sibling = current.prev_sibling_or_token();
            }
            element = SyntaxElement::Node(element.parent()?);
        }
    }

    /// Builds the green root obtained by putting `replacement` where this token is.
    pub fn replace_with(&self, replacement: GreenToken) -> GreenNode {
        let new_parent = self.parent.green().replace_child(self.index(), replacement.into());
        self.parent.replace_with(new_parent)
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.full_range(), self.text())
    }
}

/// Node or token inside the tree.
pub type SyntaxElement = NodeOrToken<SyntaxNode, SyntaxToken>;

impl SyntaxElement {
    fn new(parent: &SyntaxNode, index: usize, offset: TextSize, green: GreenElement) -> Self {
        match green {
            NodeOrToken::Node(node) => {
                NodeOrToken::Node(SyntaxNode::new_child(parent, index, offset, node))
            }
            NodeOrToken::Token(token) => {
                NodeOrToken::Token(SyntaxToken::new(parent, index, offset, token))
            }
        }
    }

    pub fn kind(&self) -> SyntaxKind {
        match self {
            NodeOrToken::Node(node) => node.kind(),
            NodeOrToken::Token(token) => token.kind(),
        }
    }

    pub fn offset(&self) -> TextSize {
        match self {
            NodeOrToken::Node(node) => node.offset(),
            NodeOrToken::Token(token) => token.offset(),
        }
    }

    pub fn full_range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.full_range(),
            NodeOrToken::Token(token) => token.full_range(),
        }
    }

    pub fn range(&self) -> TextRange {
        match self {
            NodeOrToken::Node(node) => node.range(),
            NodeOrToken::Token(token) => token.range(),
        }
    }

    pub fn parent(&self) -> Option<SyntaxNode> {
        match self {
            NodeOrToken::Node(node) => node.parent(),
            NodeOrToken::Token(token) => Some(token.parent()),
        }
    }

    pub fn annotations(&self) -> &[Annotation] {
        match self {
            NodeOrToken::Node(node) => node.annotations(),
            NodeOrToken::Token(token) => token.annotations(),
        }
    }

    pub fn next_sibling_or_token(&self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.next_sibling_or_token(),
            NodeOrToken::Token(token) => token.next_sibling_or_token(),
        }
    }

    pub fn prev_sibling_or_token(&self) -> Option<Self> {
        match self {
            NodeOrToken::Node(node) => node.prev_sibling_or_token(),
            NodeOrToken::Token(token) => token.prev_sibling_or_token(),
        }
    }

    fn first_token(&self, include_zero_width: bool) -> Option<SyntaxToken> {
        match self {
            NodeOrToken::Token(token) => {
                (include_zero_width || !token.is_zero_width()).then(|| token.clone())
            }
            NodeOrToken::Node(node) => {
                if !include_zero_width && node.green().text_len() == TextSize::new(0) {
                    return None;
                }
                node.first_token(include_zero_width)
            }
        }
    }

    fn last_token(&self, include_zero_width: bool) -> Option<SyntaxToken> {
        match self {
            NodeOrToken::Token(token) => {
                (include_zero_width || !token.is_zero_width()).then(|| token.clone())
            }
            NodeOrToken::Node(node) => {
                if !include_zero_width && node.green().text_len() == TextSize::new(0) {
                    return None;
                }
                node.last_token(include_zero_width)
            }
        }
    }
}

/// Children of a node, tokens included, in source order.
#[derive(Clone)]
pub struct SyntaxElementChildren {
    parent: SyntaxNode,
    front: usize,
    front_offset: TextSize,
    back: usize,
    back_offset: TextSize,
}

impl SyntaxElementChildren {
    fn new(parent: SyntaxNode) -> Self {
        let range = parent.full_range();
        let back = parent.green().children().len();
        Self { parent, front: 0, front_offset: range.start(), back, back_offset: range.end() }
    }
}

impl Iterator for SyntaxElementChildren {
    type Item = SyntaxElement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        let green = self.parent.green().children()[self.front].clone();
        let offset = self.front_offset;
        self.front_offset += green.text_len();
        let element = SyntaxElement::new(&self.parent, self.front, offset, green);
        self.front += 1;
        Some(element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.back - self.front;
        (len, Some(len))
    }
}

impl DoubleEndedIterator for SyntaxElementChildren {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.front == self.back {
            return None;
        }
        self.back -= 1;
        let green = self.parent.green().children()[self.back].clone();
        self.back_offset -= green.text_len();
        Some(SyntaxElement::new(&self.parent, self.back, self.back_offset, green))
    }
}

impl ExactSizeIterator for SyntaxElementChildren {}

/// Node-or-token wrapper used throughout the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeOrToken<N, T> {
    Node(N),
    Token(T),
}

impl<N, T> NodeOrToken<N, T> {
    /// Converts into the node variant, if any.
    pub fn into_node(self) -> Option<N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Converts into the token variant, if any.
    pub fn into_token(self) -> Option<T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }

    /// Returns a shared reference to the node, if any.
    pub fn as_node(&self) -> Option<&N> {
        match self {
            NodeOrToken::Node(node) => Some(node),
            NodeOrToken::Token(_) => None,
        }
    }

    /// Returns a shared reference to the token, if any.
    pub fn as_token(&self) -> Option<&T> {
        match self {
            NodeOrToken::Node(_) => None,
            NodeOrToken::Token(token) => Some(token),
        }
    }
}

impl<N: fmt::Display, T: fmt::Display> fmt::Display for NodeOrToken<N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeOrToken::Node(node) => fmt::Display::fmt(node, f),
            NodeOrToken::Token(token) => fmt::Display::fmt(token, f),
        }
    }
}

/// There might be zero, one or two tokens at a given offset.
#[derive(Clone, Debug)]
pub enum TokenAtOffset<T> {
    /// No tokens at offset.
    None,
    /// Only a single token at offset.
    Single(T),
    /// Offset is exactly between two tokens.
    Between(T, T),
}

impl<T> TokenAtOffset<T> {
    /// Maps tokens to a different type.
    pub fn map<F: Fn(T) -> U, U>(self, f: F) -> TokenAtOffset<U> {
        match self {
            TokenAtOffset::None => TokenAtOffset::None,
            TokenAtOffset::Single(it) => TokenAtOffset::Single(f(it)),
            TokenAtOffset::Between(l, r) => TokenAtOffset::Between(f(l), f(r)),
        }
    }

    /// Convert to option, preferring the right token in case of a tie.
    pub fn right_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(_, right) => Some(right),
        }
    }

    /// Convert to option, preferring the left token in case of a tie.
    pub fn left_biased(self) -> Option<T> {
        match self {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, _) => Some(left),
        }
    }
}

impl<T> Iterator for TokenAtOffset<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        match std::mem::replace(self, Self::None) {
            Self::None => None,
            Self::Single(node) => Some(node),
            Self::Between(left, right) => {
                *self = Self::Single(right);
                Some(left)
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Self::None => (0, Some(0)),
            Self::Single(_) => (1, Some(1)),
            Self::Between(_, _) => (2, Some(2)),
        }
    }
}

impl<T> ExactSizeIterator for TokenAtOffset<T> {}
