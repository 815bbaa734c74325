//! Finding the node or token that occupies a span.

use lineage_syntax::ast::AstNode;
use lineage_syntax::{SyntaxKind, SyntaxNode, SyntaxToken, TextRange};

use crate::TrackerConfig;

/// Result of a token lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenMatch {
    pub token: SyntaxToken,
    /// `false` when the token was found by scanning backwards for its kind
    /// rather than by its span.
    pub exact: bool,
}

/// Finds the node of type `T` under `ancestor` whose full span is exactly `span`.
pub fn find_node<T: AstNode>(ancestor: &SyntaxNode, span: TextRange) -> Option<T> {
    find_node_where(ancestor, span, |node| T::can_cast(node.kind())).and_then(T::cast)
}

/// Finds the innermost node under `ancestor` whose full span is exactly
/// `span` and that satisfies `accept`.
///
/// Zero-width nodes cover no position, so an empty `span` is resolved by
/// looking at the node that ends the surrounding subtree, or at the parent of
/// the token just before `span`.
pub fn find_node_where(
    ancestor: &SyntaxNode,
    span: TextRange,
    accept: impl Fn(&SyntaxNode) -> bool,
) -> Option<SyntaxNode> {
    let naive = innermost_node(ancestor, span)?;

    let found = if span.is_empty() {
        zero_width_node(ancestor, &naive, span, &accept)
            .or_else(|| walk_up(&naive, ancestor, span, &accept))
    } else {
        walk_up(&naive, ancestor, span, &accept)
    };

    if found.is_none() {
        tracing::debug!(?span, ancestor = ?ancestor.kind(), "no node with matching span");
    }
    found
}

/// Finds the token of `kind` under `ancestor` at `span`.
///
/// With [`TrackerConfig::approximate_tokens`] set, a mismatch falls back to
/// the nearest preceding token of the same kind.
pub fn find_token_at(
    ancestor: &SyntaxNode,
    span: TextRange,
    kind: SyntaxKind,
    config: &TrackerConfig,
) -> Option<TokenMatch> {
    let bounds = ancestor.full_range();
    let found = ancestor.find_token(span.start(), span.is_empty())?;
    if found.full_range() == span && found.kind() == kind {
        return Some(TokenMatch { token: found, exact: true });
    }
    if !config.approximate_tokens {
        return None;
    }

    let mut candidate = Some(found);
    let mut scanned = 0;
    while let Some(token) = candidate {
        if scanned > config.scan_limit() || !bounds.contains_range(token.full_range()) {
            break;
        }
        if token.kind() == kind {
            tracing::debug!(
                ?span,
                ?kind,
                found = ?token.full_range(),
                "approximate token match"
            );
            return Some(TokenMatch { token, exact: false });
        }
        scanned += 1;
        candidate = token.prev_token(true);
    }
    None
}

/// Smallest node under `ancestor` whose full span contains `span`.
pub(crate) fn innermost_node(ancestor: &SyntaxNode, span: TextRange) -> Option<SyntaxNode> {
    if !ancestor.full_range().contains_range(span) {
        return None;
    }
    let Some(token) = ancestor.find_token(span.start(), false) else {
        return Some(ancestor.clone());
    };
    token.parent_ancestors().find(|node| node.full_range().contains_range(span))
}

fn zero_width_node(
    ancestor: &SyntaxNode,
    naive: &SyntaxNode,
    span: TextRange,
    accept: &impl Fn(&SyntaxNode) -> bool,
) -> Option<SyntaxNode> {
    let position = span.start();
    if position == naive.full_range().end() {
        // Innermost first: every subtree ending at `position` may end with it.
        let mut node = Some(naive.clone());
        while let Some(current) = node {
            if current.full_range().end() != position {
                break;
            }
            if let Some(found) = walk_up(&current.last_descendant(), ancestor, span, accept) {
                return Some(found);
            }
            if current == *ancestor {
                break;
            }
            node = current.parent();
        }
        return None;
    }
    let token = ancestor.find_token(position, false)?;
    walk_up(&token.prev_token(true)?.parent(), ancestor, span, accept)
}

/// Walks from `start` towards `ancestor` and returns the first node spanning
/// exactly `span` that `accept`s.
fn walk_up(
    start: &SyntaxNode,
    ancestor: &SyntaxNode,
    span: TextRange,
    accept: &impl Fn(&SyntaxNode) -> bool,
) -> Option<SyntaxNode> {
    if !is_within(start, ancestor) {
        return None;
    }
    for node in start.ancestors() {
        if node.full_range() == span && accept(&node) {
            return Some(node);
        }
        if node == *ancestor || !node.full_range().contains_range(span) {
            break;
        }
    }
    None
}

fn is_within(node: &SyntaxNode, ancestor: &SyntaxNode) -> bool {
    node.ancestors().any(|it| it == *ancestor)
}
