//! Persistent, annotatable syntax trees.
//!
//! Green nodes hold the shape of a tree and are shared between every tree
//! that contains them. `SyntaxNode` and `SyntaxToken` are positioned handles
//! computed on traversal, so a subtree can be reused verbatim at a different
//! offset. Editing never mutates: it produces a new root that aliases every
//! unchanged subtree of the old one.

/// Typed AST wrappers around the raw syntax tree.
pub mod ast;
mod annotation;
mod builder;
mod cursor;
mod green;
mod syntax;
mod syntax_kind;
mod syntax_set;
mod trivia;

/// Identity-unique annotations and their tracking payloads.
pub use annotation::{
    Annotation, AnnotationId, AnnotationKind, AnnotationOwner, TRACKING_KIND, TrackingData,
};
/// Incremental builder for constructing green trees.
pub use builder::Builder;
/// Preorder traversal.
pub use cursor::{Preorder, PreorderWithTokens, WalkEvent, WalkEventWithTokens};
/// Position-independent tree storage.
pub use green::{GreenElement, GreenNode, GreenToken, GreenTrivia};
/// Primary syntax tree API types.
pub use syntax::{
    NodeOrToken, SyntaxElement, SyntaxElementChildren, SyntaxNode, SyntaxToken, TokenAtOffset,
};
/// Token and node kinds used throughout the tree.
pub use syntax_kind::SyntaxKind;
/// Compact set for grouping `SyntaxKind` values.
pub use syntax_set::SyntaxSet;
pub use text_size::{TextRange, TextSize};
/// Trivia pieces attached to tokens.
pub use trivia::{TriviaPiece, TriviaPieceKind};
